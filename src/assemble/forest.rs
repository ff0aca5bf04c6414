//! The assembled spanning trees

use crate::aggregate::{ChildrenByTree, NO_PARENT};
use crate::universe::{TreeIndex, VertexId};
use crate::IstError;
use serde::{Serialize, Deserialize};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::fmt;

/// Depth reported for vertices the root cannot reach
pub const UNREACHED: u32 = u32::MAX;

/// One spanning tree of the network, rooted at vertex 0
///
/// - `parents[v]` is the parent of `v`, `NO_PARENT` for the root
/// - children are stored in CSR form, ascending within each parent
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanningTree {
    index: TreeIndex,
    parents: Vec<VertexId>,
    offsets: Vec<u32>,
    children: Vec<VertexId>,
}

impl SpanningTree {
    /// Build a tree from a complete parent array
    pub fn from_parents(index: TreeIndex, parents: Vec<VertexId>) -> crate::Result<Self> {
        let count = parents.len();
        if count == 0 || parents[0] != NO_PARENT {
            return Err(IstError::Consistency(format!(
                "tree {} does not have vertex 0 as its root",
                index
            )));
        }
        if let Some(orphan) = parents.iter().skip(1).position(|&p| p == NO_PARENT) {
            return Err(IstError::Consistency(format!(
                "tree {} is incomplete: vertex {} has no parent",
                index,
                orphan + 1
            )));
        }
        if let Some((v, &p)) = parents
            .iter()
            .enumerate()
            .skip(1)
            .find(|&(v, &p)| p as usize >= count || p as usize == v)
        {
            return Err(IstError::Consistency(format!(
                "tree {} gives vertex {} the invalid parent {}",
                index, v, p
            )));
        }

        // Counting sort by parent; scanning children in id order keeps each list sorted.
        let mut offsets = vec![0u32; count + 1];
        for &p in &parents[1..] {
            offsets[p as usize + 1] += 1;
        }
        for i in 0..count {
            offsets[i + 1] += offsets[i];
        }
        let mut cursor = offsets.clone();
        let mut children = vec![0; count - 1];
        for (child, &p) in parents.iter().enumerate().skip(1) {
            let slot = &mut cursor[p as usize];
            children[*slot as usize] = child as VertexId;
            *slot += 1;
        }

        Ok(SpanningTree {
            index,
            parents,
            offsets,
            children,
        })
    }

    /// Tree index
    pub fn index(&self) -> TreeIndex {
        self.index
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.parents.len()
    }

    /// Number of edges, one per non-root vertex
    pub fn edge_count(&self) -> usize {
        self.children.len()
    }

    /// Parent of `v` (None for the root)
    pub fn parent(&self, v: VertexId) -> Option<VertexId> {
        match self.parents[v as usize] {
            NO_PARENT => None,
            p => Some(p),
        }
    }

    /// The raw parent array
    pub fn parents(&self) -> &[VertexId] {
        &self.parents
    }

    /// Children of `v` in ascending order
    pub fn children(&self, v: VertexId) -> &[VertexId] {
        let v = v as usize;
        &self.children[self.offsets[v] as usize..self.offsets[v + 1] as usize]
    }

    /// All `(parent, child)` edges, ordered by parent then child
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        (0..self.vertex_count() as VertexId)
            .flat_map(move |p| self.children(p).iter().map(move |&c| (p, c)))
    }

    /// Depth of every vertex from the root, `UNREACHED` where no path exists
    pub fn depths(&self) -> Vec<u32> {
        let mut depths = vec![UNREACHED; self.vertex_count()];
        let mut queue = VecDeque::new();
        depths[0] = 0;
        queue.push_back(0);

        while let Some(node) = queue.pop_front() {
            let next = depths[node as usize] + 1;
            for &child in self.children(node) {
                if depths[child as usize] == UNREACHED {
                    depths[child as usize] = next;
                    queue.push_back(child);
                }
            }
        }

        depths
    }

    /// Length of the longest root path
    pub fn height(&self) -> usize {
        self.depths()
            .into_iter()
            .filter(|&d| d != UNREACHED)
            .max()
            .unwrap_or(0) as usize
    }

    /// Count of leaf vertices
    pub fn leaf_count(&self) -> usize {
        (0..self.vertex_count() as VertexId)
            .filter(|&v| self.children(v).is_empty())
            .count()
    }

    /// Vertices from `v` up to and including the root
    ///
    /// Stops after `vertex_count` steps, so a corrupt parent array cannot loop.
    pub fn path_to_root(&self, v: VertexId) -> Vec<VertexId> {
        let mut path = vec![v];
        let mut node = v;
        while let Some(parent) = self.parent(node) {
            if path.len() > self.vertex_count() {
                break;
            }
            path.push(parent);
            node = parent;
        }
        path
    }

    /// SHA-256 of the parent array, as lowercase hex
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.index.to_le_bytes());
        for p in &self.parents {
            hasher.update(p.to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

impl fmt::Debug for SpanningTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SpanningTree(t={}, vertices={}, edges={})",
            self.index,
            self.vertex_count(),
            self.edge_count()
        )
    }
}

/// The `n - 1` trees of one network, ordered by tree index
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanningForest {
    n: usize,
    trees: Vec<SpanningTree>,
}

impl SpanningForest {
    /// Finalize every tree of a merged children-by-tree structure
    pub fn from_children(n: usize, merged: ChildrenByTree) -> crate::Result<Self> {
        let arrays = merged.into_parent_arrays();
        let expected = n - 1;
        if arrays.len() != expected || arrays.keys().copied().ne(1..=expected as TreeIndex) {
            return Err(IstError::Consistency(format!(
                "expected trees 1..={}, have {:?}",
                expected,
                arrays.keys().collect::<Vec<_>>()
            )));
        }

        let trees = arrays
            .into_iter()
            .map(|(t, parents)| SpanningTree::from_parents(t, parents))
            .collect::<crate::Result<Vec<_>>>()?;

        Ok(SpanningForest { n, trees })
    }

    /// Network size
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of vertices of every tree
    pub fn vertex_count(&self) -> usize {
        self.trees.first().map_or(0, SpanningTree::vertex_count)
    }

    /// All trees in index order
    pub fn trees(&self) -> &[SpanningTree] {
        &self.trees
    }

    /// Tree `t`, or None when `t` is outside `1..=n-1`
    pub fn get(&self, t: TreeIndex) -> Option<&SpanningTree> {
        (t as usize).checked_sub(1).and_then(|i| self.trees.get(i))
    }

    /// Tree `t`
    ///
    /// # Panics
    ///
    /// Panics if `t` is outside `1..=n-1`.
    pub fn tree(&self, t: TreeIndex) -> &SpanningTree {
        &self.trees[t as usize - 1]
    }

    /// Fingerprint of tree `t`
    pub fn fingerprint(&self, t: TreeIndex) -> Option<String> {
        self.get(t).map(SpanningTree::fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 0 <- 1, 0 <- 2, 1 <- 3, 2 <- 4, 2 <- 5
    fn sample() -> SpanningTree {
        SpanningTree::from_parents(1, vec![NO_PARENT, 0, 0, 1, 2, 2]).unwrap()
    }

    #[test]
    fn test_children_sorted() {
        let tree = sample();
        assert_eq!(tree.children(0), &[1, 2]);
        assert_eq!(tree.children(2), &[4, 5]);
        assert!(tree.children(5).is_empty());
        assert_eq!(tree.edge_count(), 5);
        assert_eq!(tree.leaf_count(), 3);
    }

    #[test]
    fn test_edges_order() {
        let edges: Vec<_> = sample().edges().collect();
        assert_eq!(edges, vec![(0, 1), (0, 2), (1, 3), (2, 4), (2, 5)]);
    }

    #[test]
    fn test_depths_and_paths() {
        let tree = sample();
        assert_eq!(tree.depths(), vec![0, 1, 1, 2, 2, 2]);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.path_to_root(4), vec![4, 2, 0]);
        assert_eq!(tree.path_to_root(0), vec![0]);
        assert_eq!(tree.parent(0), None);
        assert_eq!(tree.parent(3), Some(1));
    }

    #[test]
    fn test_cycle_is_unreached() {
        let tree = SpanningTree::from_parents(1, vec![NO_PARENT, 0, 3, 2]).unwrap();
        assert_eq!(tree.depths(), vec![0, 1, UNREACHED, UNREACHED]);
        assert!(tree.path_to_root(2).len() > tree.vertex_count());
    }

    #[test]
    fn test_incomplete_tree_is_rejected() {
        let err = SpanningTree::from_parents(2, vec![NO_PARENT, 0, NO_PARENT]).unwrap_err();
        assert!(matches!(err, IstError::Consistency(_)));
        assert!(SpanningTree::from_parents(2, vec![0, 0]).is_err());
        assert!(SpanningTree::from_parents(2, vec![NO_PARENT, 1]).is_err());
        assert!(SpanningTree::from_parents(2, vec![NO_PARENT, 7]).is_err());
    }

    #[test]
    fn test_fingerprint_distinguishes_trees() {
        let a = sample();
        let b = SpanningTree::from_parents(1, vec![NO_PARENT, 0, 0, 1, 2, 1]).unwrap();
        assert_eq!(a.fingerprint(), sample().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_forest_requires_every_tree() {
        let mut merged = ChildrenByTree::new(2);
        merged.insert_edge(1, 0, 1).unwrap();
        let forest = SpanningForest::from_children(2, merged).unwrap();
        assert_eq!(forest.trees().len(), 1);
        assert!(forest.get(0).is_none());
        assert!(forest.get(2).is_none());
        assert_eq!(forest.tree(1).edge_count(), 1);

        let mut partial = ChildrenByTree::new(6);
        partial.ensure_tree(2);
        assert!(SpanningForest::from_children(3, partial).is_err());
    }
}
