//! Flat numeric message format: `[tree_id, p0, c0, p1, c1, ...]`

use super::NO_PARENT;
use crate::universe::{Context, TreeIndex, VertexId};
use crate::IstError;

/// A decoded worker message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedTree {
    /// Tree the message belongs to
    pub tree: TreeIndex,
    /// `(parent, child)` pairs in message order
    pub edges: Vec<(VertexId, VertexId)>,
}

/// Serialize one tree from its parent array, children in ascending order
///
/// A tree without edges still produces `[tree_id]`, which the coordinator
/// treats as a completion marker.
pub fn encode_tree(t: TreeIndex, parents: &[VertexId]) -> Vec<u32> {
    let edges = parents.iter().filter(|&&p| p != NO_PARENT).count();
    let mut buffer = Vec::with_capacity(1 + 2 * edges);
    buffer.push(t);
    for (child, &parent) in parents.iter().enumerate() {
        if parent != NO_PARENT {
            buffer.push(parent);
            buffer.push(child as VertexId);
        }
    }
    buffer
}

/// Parse and range-check a worker message
pub fn decode_message(payload: &[u32], ctx: &Context) -> crate::Result<DecodedTree> {
    let (&tree, rest) = payload
        .split_first()
        .ok_or_else(|| IstError::Communication("empty message".to_string()))?;

    if !ctx.is_tree_index(tree) {
        return Err(IstError::Communication(format!(
            "message names tree {}, outside 1..={}",
            tree,
            ctx.tree_count()
        )));
    }
    if rest.len() % 2 != 0 {
        return Err(IstError::Communication(format!(
            "message for tree {} has a dangling id",
            tree
        )));
    }

    let count = ctx.vertex_count();
    let edges = rest
        .chunks_exact(2)
        .map(|pair| {
            let (parent, child) = (pair[0], pair[1]);
            if parent as usize >= count || child as usize >= count {
                Err(IstError::Communication(format!(
                    "message for tree {} references vertex outside 0..{}",
                    tree, count
                )))
            } else {
                Ok((parent, child))
            }
        })
        .collect::<crate::Result<Vec<_>>>()?;

    Ok(DecodedTree { tree, edges })
}
