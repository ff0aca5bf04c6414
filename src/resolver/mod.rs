//! The parent rule of the independent spanning trees
//!
//! For a non-root vertex `v` and a tree index `t`, the parent is `v` with one
//! symbol moved one place to the right. The rule looks at the trailing symbols:
//!
//! 1. If `v` already ends in `n`, tree `n - 1` moves the second-to-last symbol
//!    and every other tree delegates to [`ParentResolver::find_position`], which
//!    works on the shortest non-identity prefix.
//! 2. If the active region ends in `m, m - 1`, the wrong prefix before it
//!    decides whether the tree crosses over it or routes through it.
//! 3. Otherwise symbol `t` moves, unless `t` is the last symbol of the region,
//!    in which case the region's top symbol moves.
//!
//! The rule never touches positions that already hold their identity symbol
//! beyond the active region, which keeps every tree acyclic.

mod rule;

use crate::universe::{label, Context, PermutationUniverse, TreeIndex, VertexId, VertexTables, MAX_N};
use crate::IstError;

/// Pure `(vertex, tree) -> parent` mapping over a shared context
#[derive(Clone, Copy, Debug)]
pub struct ParentResolver<'a> {
    universe: &'a PermutationUniverse,
    tables: &'a VertexTables,
    n: usize,
}

impl<'a> ParentResolver<'a> {
    /// Borrow the tables of `ctx`
    pub fn new(ctx: &'a Context) -> Self {
        ParentResolver {
            universe: ctx.universe(),
            tables: ctx.tables(),
            n: ctx.n(),
        }
    }

    /// Id of the parent of `v` in tree `t`
    pub fn resolve(&self, v: VertexId, t: TreeIndex) -> crate::Result<VertexId> {
        let parent = self.parent_symbols(v, t)?;
        let parent = &parent[..self.n];
        self.universe.id_of(parent).ok_or_else(|| {
            IstError::Consistency(format!(
                "parent {} of {} in tree {} is not a vertex",
                label(parent),
                self.universe.label(v),
                t
            ))
        })
    }

    /// Symbols of the parent of `v` in tree `t`; only the first `n` are meaningful
    pub fn parent_symbols(&self, v: VertexId, t: TreeIndex) -> crate::Result<[u8; MAX_N]> {
        if self.universe.is_root(v) {
            return Err(IstError::Consistency(format!(
                "the root has no parent in tree {}",
                t
            )));
        }
        let t = t as usize;
        if t == 0 || t >= self.n {
            return Err(IstError::Consistency(format!(
                "tree index {} outside 1..={}",
                t,
                self.n - 1
            )));
        }

        let symbol = self.moving_symbol(v, t);
        self.swap_adjacent(v, symbol as u8)
    }

    /// `v` with `symbol` exchanged with its right neighbour
    ///
    /// A symbol in the last position has no right neighbour; that would make
    /// `v` its own parent and is reported as an error.
    pub fn swap_adjacent(&self, v: VertexId, symbol: u8) -> crate::Result<[u8; MAX_N]> {
        let j = self.tables.position(v, symbol);
        if j + 1 >= self.n {
            return Err(IstError::Consistency(format!(
                "symbol {} is last in {}",
                symbol,
                self.universe.label(v)
            )));
        }

        let mut out = [0u8; MAX_N];
        out[..self.n].copy_from_slice(self.universe.symbols(v));
        out.swap(j, j + 1);
        Ok(out)
    }

    /// Symbol to move when `v` already ends in `n` and `t <= n - 2`
    pub fn find_position(&self, v: VertexId, t: TreeIndex) -> usize {
        rule::find_position(self.universe.symbols(v), t as usize, self.tables.first_wrong(v))
    }

    fn moving_symbol(&self, v: VertexId, t: usize) -> usize {
        let symbols = self.universe.symbols(v);
        let n = self.n;

        if symbols[n - 1] as usize == n {
            if t != n - 1 {
                return self.find_position(v, t as TreeIndex);
            }
            return symbols[n - 2] as usize;
        }

        rule::settle(symbols, t, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::universe::is_adjacent_transposition;

    fn parent_label(ctx: &Context, v: &str, t: TreeIndex) -> String {
        let resolver = ParentResolver::new(ctx);
        let id = ctx.universe().id_of_label(v).unwrap();
        ctx.universe().label(resolver.resolve(id, t).unwrap())
    }

    #[test]
    fn test_n2_single_edge() {
        let ctx = Context::build(2).unwrap();
        assert_eq!(parent_label(&ctx, "21", 1), "12");
    }

    #[test]
    fn test_n3_tables() {
        let ctx = Context::build(3).unwrap();
        let expected = [
            (1, [("132", "312"), ("213", "123"), ("231", "213"), ("312", "321"), ("321", "231")]),
            (2, [("132", "123"), ("213", "231"), ("231", "321"), ("312", "132"), ("321", "312")]),
        ];
        for (t, pairs) in expected {
            for (child, parent) in pairs {
                assert_eq!(parent_label(&ctx, child, t), parent, "tree {} child {}", t, child);
            }
        }
    }

    #[test]
    fn test_n5_no_two_cycles() {
        let ctx = Context::build(5).unwrap();
        assert_eq!(parent_label(&ctx, "21345", 2), "23145");
        assert_eq!(parent_label(&ctx, "23145", 2), "32145");
        assert_eq!(parent_label(&ctx, "21534", 4), "21354");
        assert_eq!(parent_label(&ctx, "21354", 4), "12354");
    }

    #[test]
    fn test_parent_is_neighbor() {
        for n in 2..=6 {
            let ctx = Context::build(n).unwrap();
            let resolver = ParentResolver::new(&ctx);
            let u = ctx.universe();
            for t in ctx.tree_indices() {
                for v in 1..u.len() as VertexId {
                    let p = resolver.resolve(v, t).unwrap();
                    assert!(
                        is_adjacent_transposition(u.symbols(v), u.symbols(p)),
                        "n={} t={} v={} p={}",
                        n,
                        t,
                        u.label(v),
                        u.label(p)
                    );
                }
            }
        }
    }

    #[test]
    fn test_root_and_bad_tree_index_are_errors() {
        let ctx = Context::build(4).unwrap();
        let resolver = ParentResolver::new(&ctx);
        assert!(matches!(resolver.resolve(0, 1), Err(IstError::Consistency(_))));
        assert!(matches!(resolver.resolve(5, 0), Err(IstError::Consistency(_))));
        assert!(matches!(resolver.resolve(5, 4), Err(IstError::Consistency(_))));
    }

    #[test]
    fn test_swap_adjacent_last_symbol() {
        let ctx = Context::build(3).unwrap();
        let resolver = ParentResolver::new(&ctx);
        let v = ctx.universe().id_of_label("213").unwrap();
        let swapped = resolver.swap_adjacent(v, 2).unwrap();
        assert_eq!(&swapped[..3], &[1, 2, 3]);
        assert!(resolver.swap_adjacent(v, 3).is_err());
    }

    /// The four-step rule in its short form, which is only sound up to n = 4.
    fn short_rule(resolver: &ParentResolver, ctx: &Context, v: VertexId, t: usize) -> Option<Vec<u8>> {
        let n = ctx.n();
        let s = ctx.universe().symbols(v);
        let root: Vec<u8> = (1..=n as u8).collect();
        let swp = |sym: usize| resolver.swap_adjacent(v, sym as u8).ok().map(|a| a[..n].to_vec());
        let (vn, vn1) = (s[n - 1] as usize, s[n - 2] as usize);

        if vn == n {
            if t == n - 1 {
                return swp(vn1);
            }
            let u = swp(t)?;
            if t == 2 && u == root {
                return swp(t - 1);
            }
            if vn1 == t || vn1 == n - 1 {
                // The cache is 1-based, so it already names the symbol to move.
                return swp(ctx.tables().first_wrong(v));
            }
            return Some(u);
        }
        if vn == n - 1 && vn1 == n && swp(n)? != root {
            return if t == 1 { swp(n) } else { swp(t - 1) };
        }
        if vn == t {
            swp(n)
        } else {
            swp(t)
        }
    }

    #[test]
    fn test_agrees_with_short_rule_up_to_n4() {
        for n in 2..=4 {
            let ctx = Context::build(n).unwrap();
            let resolver = ParentResolver::new(&ctx);
            for t in ctx.tree_indices() {
                for v in 1..ctx.vertex_count() as VertexId {
                    let ours = resolver.parent_symbols(v, t).unwrap()[..n].to_vec();
                    assert_eq!(Some(ours), short_rule(&resolver, &ctx, v, t as usize));
                }
            }
        }
    }
}
