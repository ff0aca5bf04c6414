//! Lexicographic enumeration of all permutations of `{1..n}`

use super::{label, parse_label, VertexId, MAX_N, MIN_N};
use crate::IstError;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;

/// `n!` for the small `n` this crate works with
pub const fn factorial(n: usize) -> usize {
    let mut acc = 1;
    let mut i = 2;
    while i <= n {
        acc *= i;
        i += 1;
    }
    acc
}

/// Whether `a` and `b` differ by exactly one swap of neighbouring positions
pub fn is_adjacent_transposition(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff: Vec<usize> = (0..a.len()).filter(|&i| a[i] != b[i]).collect();
    matches!(diff.as_slice(), [i, j] if *j == i + 1 && a[*i] == b[*j] && a[*j] == b[*i])
}

/// A permutation packed four bits per symbol
///
/// Symbols never exceed 10, so `n <= 10` symbols fit in 40 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermutationKey(u64);

impl PermutationKey {
    /// Pack a symbol sequence
    pub fn pack(symbols: &[u8]) -> Self {
        let packed = symbols
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, &s)| acc | (u64::from(s) << (4 * i)));
        PermutationKey(packed)
    }

    /// Raw packed value
    pub fn value(self) -> u64 {
        self.0
    }
}

/// All `n!` permutations in lexicographic order, with a reverse lookup
///
/// - Symbols are stored flat, `n` bytes per vertex
/// - The id of a vertex is its lexicographic rank, so id 0 is the identity
#[derive(Clone)]
pub struct PermutationUniverse {
    n: usize,
    symbols: Vec<u8>,
    lookup: HashMap<PermutationKey, VertexId>,
}

impl PermutationUniverse {
    /// Enumerate the universe for `n` in `[2, 10]`
    pub fn new(n: usize) -> crate::Result<Self> {
        if !(MIN_N..=MAX_N).contains(&n) {
            return Err(IstError::Usage(format!(
                "n must be in [{}..{}], got {}",
                MIN_N, MAX_N, n
            )));
        }

        let count = factorial(n);
        let mut symbols = vec![0u8; count * n];
        symbols
            .par_chunks_mut(n)
            .enumerate()
            .for_each(|(rank, slot)| unrank(n, rank, slot));

        let lookup: HashMap<PermutationKey, VertexId> = symbols
            .par_chunks(n)
            .enumerate()
            .map(|(id, s)| (PermutationKey::pack(s), id as VertexId))
            .collect();

        Ok(PermutationUniverse { n, symbols, lookup })
    }

    /// Network size
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of vertices
    pub fn len(&self) -> usize {
        self.symbols.len() / self.n
    }

    /// Always false: the smallest universe has two vertices
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Id of the identity permutation
    pub fn root(&self) -> VertexId {
        0
    }

    /// Whether `id` is the identity permutation
    pub fn is_root(&self, id: VertexId) -> bool {
        id == self.root()
    }

    /// Whether `id` is a vertex of this universe
    pub fn contains(&self, id: VertexId) -> bool {
        (id as usize) < self.len()
    }

    /// Symbols of vertex `id`
    pub fn symbols(&self, id: VertexId) -> &[u8] {
        let start = id as usize * self.n;
        &self.symbols[start..start + self.n]
    }

    /// Packed key of vertex `id`
    pub fn key_of(&self, id: VertexId) -> PermutationKey {
        PermutationKey::pack(self.symbols(id))
    }

    /// Look up a permutation by content
    pub fn id_of(&self, symbols: &[u8]) -> Option<VertexId> {
        if symbols.len() != self.n {
            return None;
        }
        self.id_of_key(PermutationKey::pack(symbols))
    }

    /// Look up a permutation by packed key
    pub fn id_of_key(&self, key: PermutationKey) -> Option<VertexId> {
        self.lookup.get(&key).copied()
    }

    /// Display label of vertex `id`
    pub fn label(&self, id: VertexId) -> String {
        label(self.symbols(id))
    }

    /// Look up a vertex by its display label
    pub fn id_of_label(&self, text: &str) -> crate::Result<VertexId> {
        let symbols = parse_label(text, self.n)?;
        self.id_of(&symbols)
            .ok_or_else(|| IstError::Label(format!("\"{}\" is not a vertex", text)))
    }

    /// Ids of the `n - 1` neighbours of `id`, one per adjacent position pair
    pub fn neighbors(&self, id: VertexId) -> Vec<VertexId> {
        let mut buf = [0u8; MAX_N];
        let n = self.n;
        (0..n - 1)
            .filter_map(|i| {
                buf[..n].copy_from_slice(self.symbols(id));
                buf.swap(i, i + 1);
                self.id_of(&buf[..n])
            })
            .collect()
    }

    /// Iterate over `(id, symbols)` in id order
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &[u8])> + '_ {
        self.symbols
            .chunks(self.n)
            .enumerate()
            .map(|(id, s)| (id as VertexId, s))
    }
}

impl fmt::Debug for PermutationUniverse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PermutationUniverse(n={}, vertices={})", self.n, self.len())
    }
}

/// Write the permutation of lexicographic rank `rank` into `out`
fn unrank(n: usize, mut rank: usize, out: &mut [u8]) {
    let mut pool = [0u8; MAX_N];
    for (i, p) in pool.iter_mut().enumerate().take(n) {
        *p = (i + 1) as u8;
    }

    let mut remaining = n;
    for (i, slot) in out.iter_mut().enumerate() {
        let block = factorial(n - 1 - i);
        let pick = rank / block;
        rank %= block;
        *slot = pool[pick];
        pool.copy_within(pick + 1..remaining, pick);
        remaining -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0), 1);
        assert_eq!(factorial(2), 2);
        assert_eq!(factorial(5), 120);
        assert_eq!(factorial(10), 3_628_800);
    }

    #[test]
    fn test_lexicographic_order() {
        let u = PermutationUniverse::new(3).unwrap();
        let labels: Vec<String> = (0..u.len() as VertexId).map(|id| u.label(id)).collect();
        assert_eq!(labels, vec!["123", "132", "213", "231", "312", "321"]);
        assert_eq!(u.symbols(u.root()), &[1, 2, 3]);
    }

    #[test]
    fn test_ids_are_sorted_for_n5() {
        let u = PermutationUniverse::new(5).unwrap();
        let all: Vec<&[u8]> = u.iter().map(|(_, s)| s).collect();
        assert!(all.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(u.symbols(119), &[5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_reverse_lookup() {
        let u = PermutationUniverse::new(4).unwrap();
        for (id, s) in u.iter() {
            assert_eq!(u.id_of(s), Some(id));
            assert_eq!(u.id_of_key(u.key_of(id)), Some(id));
        }
        assert_eq!(u.id_of(&[1, 2, 3]), None);
        assert_eq!(u.id_of(&[1, 1, 2, 3]), None);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(PermutationUniverse::new(1), Err(IstError::Usage(_))));
        assert!(matches!(PermutationUniverse::new(11), Err(IstError::Usage(_))));
    }

    #[test]
    fn test_neighbors() {
        let u = PermutationUniverse::new(3).unwrap();
        let id = u.id_of_label("213").unwrap();
        let mut labels: Vec<String> = u.neighbors(id).into_iter().map(|v| u.label(v)).collect();
        labels.sort();
        assert_eq!(labels, vec!["123", "231"]);
    }

    #[test]
    fn test_adjacent_transposition() {
        assert!(is_adjacent_transposition(&[2, 1, 3], &[1, 2, 3]));
        assert!(!is_adjacent_transposition(&[3, 2, 1], &[1, 2, 3]));
        assert!(!is_adjacent_transposition(&[1, 2, 3], &[1, 2, 3]));
        assert!(!is_adjacent_transposition(&[1, 2], &[1, 2, 3]));
    }

    #[test]
    fn test_key_packing_is_injective_on_n10_samples() {
        let a = PermutationKey::pack(&[10, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let b = PermutationKey::pack(&[1, 10, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_ne!(a, b);
        assert_eq!(PermutationKey::pack(&[1, 2]).value(), 0x21);
    }
}
