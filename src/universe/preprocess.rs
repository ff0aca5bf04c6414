//! Per-vertex facts cached once before the parent rule runs

use super::{PermutationUniverse, VertexId};
use rayon::prelude::*;

/// Rightmost 1-based position `r` with `symbols[r - 1] != r`, or 1 for the identity
pub fn first_wrong_of(symbols: &[u8]) -> usize {
    symbols
        .iter()
        .enumerate()
        .rev()
        .find(|&(i, &s)| s as usize != i + 1)
        .map_or(1, |(i, _)| i + 1)
}

/// Position table and first-wrong cache for every vertex
///
/// `positions` is laid out with stride `n + 1` and indexed by symbol, so
/// slot 0 of every row is unused.
#[derive(Clone, Debug)]
pub struct VertexTables {
    stride: usize,
    positions: Vec<u8>,
    first_wrong: Vec<u8>,
}

impl VertexTables {
    /// Derive both tables, one independent row per vertex
    pub fn build(universe: &PermutationUniverse) -> Self {
        let stride = universe.n() + 1;
        let count = universe.len();
        let mut positions = vec![0u8; count * stride];
        let mut first_wrong = vec![0u8; count];

        positions
            .par_chunks_mut(stride)
            .zip(first_wrong.par_iter_mut())
            .enumerate()
            .for_each(|(id, (row, fw))| {
                let symbols = universe.symbols(id as VertexId);
                for (i, &s) in symbols.iter().enumerate() {
                    row[s as usize] = i as u8;
                }
                *fw = first_wrong_of(symbols) as u8;
            });

        VertexTables {
            stride,
            positions,
            first_wrong,
        }
    }

    /// 0-based index of `symbol` within vertex `v`
    pub fn position(&self, v: VertexId, symbol: u8) -> usize {
        self.positions[v as usize * self.stride + symbol as usize] as usize
    }

    /// Cached first-wrong position of vertex `v` (1-based)
    pub fn first_wrong(&self, v: VertexId) -> usize {
        self.first_wrong[v as usize] as usize
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.first_wrong.len()
    }

    /// Whether the tables are empty
    pub fn is_empty(&self) -> bool {
        self.first_wrong.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_wrong_of() {
        assert_eq!(first_wrong_of(&[1, 2, 3, 4]), 1);
        assert_eq!(first_wrong_of(&[2, 1, 3, 4]), 2);
        assert_eq!(first_wrong_of(&[1, 2, 4, 3]), 4);
        assert_eq!(first_wrong_of(&[3, 1, 2, 4]), 3);
    }

    #[test]
    fn test_positions_invert_symbols() {
        let u = PermutationUniverse::new(5).unwrap();
        let tables = VertexTables::build(&u);
        assert_eq!(tables.len(), 120);
        for (id, symbols) in u.iter() {
            for (i, &s) in symbols.iter().enumerate() {
                assert_eq!(tables.position(id, s), i);
            }
            assert_eq!(tables.first_wrong(id), first_wrong_of(symbols));
        }
    }

    #[test]
    fn test_root_defaults_to_one() {
        let u = PermutationUniverse::new(3).unwrap();
        let tables = VertexTables::build(&u);
        assert_eq!(tables.first_wrong(u.root()), 1);
        let v = u.id_of_label("132").unwrap();
        assert_eq!(tables.first_wrong(v), 3);
    }
}
