//! Per-worker children-by-tree structure

use super::wire;
use crate::partition::LaneBlock;
use crate::universe::{TreeIndex, VertexId};
use crate::IstError;
use std::collections::BTreeMap;

/// Parent slot value of the root, and of vertices not yet assigned
pub const NO_PARENT: VertexId = VertexId::MAX;

/// Buffer produced by one lane block: the parents of the block's vertices, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaneOutput {
    /// Block that was computed
    pub block: LaneBlock,
    /// `parents[i]` is the parent of vertex `block.start + i`
    pub parents: Vec<VertexId>,
}

impl LaneOutput {
    /// `(parent, child)` pairs of this buffer
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.block.vertices().zip(self.parents.iter().copied()).map(|(c, p)| (p, c))
    }
}

/// Edges of several trees, each kept as a child-indexed parent array
///
/// A child slot is written at most once; a second write means two edges
/// claim the same child and is rejected. Children lists are derived from the
/// parent arrays when trees are finalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildrenByTree {
    vertex_count: usize,
    trees: BTreeMap<TreeIndex, Vec<VertexId>>,
}

impl ChildrenByTree {
    /// Empty structure for a universe of `vertex_count` vertices
    pub fn new(vertex_count: usize) -> Self {
        ChildrenByTree {
            vertex_count,
            trees: BTreeMap::new(),
        }
    }

    /// Register tree `t` even if it never receives an edge
    pub fn ensure_tree(&mut self, t: TreeIndex) {
        let count = self.vertex_count;
        self.trees.entry(t).or_insert_with(|| vec![NO_PARENT; count]);
    }

    /// Record `parent -> child` in tree `t`
    pub fn insert_edge(&mut self, t: TreeIndex, parent: VertexId, child: VertexId) -> crate::Result<()> {
        let count = self.vertex_count;
        if child == 0 || child as usize >= count || parent as usize >= count || parent == child {
            return Err(IstError::Consistency(format!(
                "invalid edge {} -> {} in tree {}",
                parent, child, t
            )));
        }

        self.ensure_tree(t);
        let slots = self
            .trees
            .get_mut(&t)
            .ok_or_else(|| IstError::Consistency(format!("tree {} is not registered", t)))?;
        let slot = &mut slots[child as usize];
        if *slot != NO_PARENT {
            return Err(IstError::Consistency(format!(
                "vertex {} already has parent {} in tree {}",
                child, *slot, t
            )));
        }
        *slot = parent;
        Ok(())
    }

    /// Merge one lane buffer
    pub fn absorb(&mut self, output: LaneOutput) -> crate::Result<()> {
        if output.parents.len() != output.block.len() {
            return Err(IstError::Consistency(format!(
                "lane buffer for tree {} holds {} parents for {} vertices",
                output.block.tree,
                output.parents.len(),
                output.block.len()
            )));
        }
        let t = output.block.tree;
        for (parent, child) in output.edges() {
            self.insert_edge(t, parent, child)?;
        }
        Ok(())
    }

    /// Single-threaded reduction of all lane buffers of a worker
    pub fn fold<I>(vertex_count: usize, trees: &[TreeIndex], outputs: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = LaneOutput>,
    {
        let mut merged = ChildrenByTree::new(vertex_count);
        for &t in trees {
            merged.ensure_tree(t);
        }
        for output in outputs {
            merged.absorb(output)?;
        }
        Ok(merged)
    }

    /// Vertex count of the universe
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Registered tree indices in ascending order
    pub fn tree_ids(&self) -> impl Iterator<Item = TreeIndex> + '_ {
        self.trees.keys().copied()
    }

    /// Parent array of tree `t`
    pub fn parents(&self, t: TreeIndex) -> Option<&[VertexId]> {
        self.trees.get(&t).map(Vec::as_slice)
    }

    /// Number of edges recorded for tree `t`
    pub fn edge_count(&self, t: TreeIndex) -> usize {
        self.parents(t)
            .map_or(0, |p| p.iter().filter(|&&x| x != NO_PARENT).count())
    }

    /// Wire buffer for tree `t`; an unknown tree encodes as the empty marker
    pub fn encode_tree(&self, t: TreeIndex) -> Vec<u32> {
        wire::encode_tree(t, self.parents(t).unwrap_or(&[]))
    }

    /// Hand over the parent arrays
    pub fn into_parent_arrays(self) -> BTreeMap<TreeIndex, Vec<VertexId>> {
        self.trees
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(tree: TreeIndex, start: VertexId, end: VertexId) -> LaneBlock {
        LaneBlock { tree, start, end }
    }

    #[test]
    fn test_fold_lane_buffers() {
        let outputs = vec![
            LaneOutput { block: block(1, 3, 6), parents: vec![0, 1, 2] },
            LaneOutput { block: block(1, 1, 3), parents: vec![0, 0] },
        ];
        let merged = ChildrenByTree::fold(6, &[1, 2], outputs).unwrap();
        assert_eq!(merged.tree_ids().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(merged.parents(1).unwrap(), &[NO_PARENT, 0, 0, 0, 1, 2]);
        assert_eq!(merged.edge_count(1), 5);
        assert_eq!(merged.edge_count(2), 0);
    }

    #[test]
    fn test_duplicate_child_is_rejected() {
        let mut merged = ChildrenByTree::new(4);
        merged.insert_edge(1, 0, 2).unwrap();
        let err = merged.insert_edge(1, 3, 2).unwrap_err();
        assert!(matches!(err, IstError::Consistency(_)));
    }

    #[test]
    fn test_invalid_edges() {
        let mut merged = ChildrenByTree::new(4);
        assert!(merged.insert_edge(1, 1, 0).is_err());
        assert!(merged.insert_edge(1, 2, 2).is_err());
        assert!(merged.insert_edge(1, 9, 2).is_err());
        assert!(merged.insert_edge(1, 0, 4).is_err());
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        let mut merged = ChildrenByTree::new(6);
        let output = LaneOutput { block: block(1, 1, 4), parents: vec![0] };
        assert!(merged.absorb(output).is_err());
    }

    #[test]
    fn test_encode_unknown_tree() {
        let merged = ChildrenByTree::new(6);
        assert_eq!(merged.encode_tree(3), vec![3]);
    }
}
