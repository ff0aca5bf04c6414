//! The vertex set of the bubble-sort network and its shared lookup tables

mod permutation;
mod preprocess;
mod labels;

use std::ops::RangeInclusive;

pub use permutation::{factorial, is_adjacent_transposition, PermutationKey, PermutationUniverse};
pub use preprocess::{first_wrong_of, VertexTables};
pub use labels::{label, parse_label, symbol_char};

/// Dense vertex id: the lexicographic rank of a permutation
pub type VertexId = u32;

/// Tree selector in `1..=n-1`
pub type TreeIndex = u32;

/// Smallest supported network size
pub const MIN_N: usize = 2;

/// Largest supported network size
pub const MAX_N: usize = 10;

/// Read-only state shared by every worker and lane of a run
///
/// Built once from `n` before any concurrent phase starts. Workers hold it
/// behind an `Arc` and never mutate it.
#[derive(Debug)]
pub struct Context {
    universe: PermutationUniverse,
    tables: VertexTables,
}

impl Context {
    /// Enumerate the universe and derive the per-vertex tables
    pub fn build(n: usize) -> crate::Result<Self> {
        let universe = PermutationUniverse::new(n)?;
        let tables = VertexTables::build(&universe);
        Ok(Context { universe, tables })
    }

    /// Network size
    pub fn n(&self) -> usize {
        self.universe.n()
    }

    /// Number of vertices, `n!`
    pub fn vertex_count(&self) -> usize {
        self.universe.len()
    }

    /// Number of trees, `n - 1`
    pub fn tree_count(&self) -> usize {
        self.n() - 1
    }

    /// All tree indices in ascending order
    pub fn tree_indices(&self) -> RangeInclusive<TreeIndex> {
        1..=self.tree_count() as TreeIndex
    }

    /// Whether `t` names one of this network's trees
    pub fn is_tree_index(&self, t: TreeIndex) -> bool {
        self.tree_indices().contains(&t)
    }

    /// The permutation universe
    pub fn universe(&self) -> &PermutationUniverse {
        &self.universe
    }

    /// Position table and first-wrong cache
    pub fn tables(&self) -> &VertexTables {
        &self.tables
    }
}
