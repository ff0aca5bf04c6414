//! Static block partition of a worker's (tree × vertex) space

use crate::universe::{TreeIndex, VertexId};
use std::ops::Range;

/// A contiguous run of non-root vertices of one tree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneBlock {
    /// Tree the block belongs to
    pub tree: TreeIndex,
    /// First vertex id, inclusive
    pub start: VertexId,
    /// Last vertex id, exclusive
    pub end: VertexId,
}

impl LaneBlock {
    /// Vertex ids covered by this block
    pub fn vertices(&self) -> Range<VertexId> {
        self.start..self.end
    }

    /// Number of vertices in the block
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// Whether the block is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Blocks for every assigned tree, at most `lanes` per tree
#[derive(Clone, Debug)]
pub struct LanePlan {
    lanes: usize,
    blocks: Vec<LaneBlock>,
}

impl LanePlan {
    /// Split vertices `1..vertex_count` of each assigned tree into up to `lanes` blocks
    pub fn new(assigned: &[TreeIndex], vertex_count: usize, lanes: usize) -> Self {
        let lanes = lanes.max(1);
        let span = vertex_count.saturating_sub(1);
        let chunk = span.div_ceil(lanes).max(1);

        let blocks = assigned
            .iter()
            .flat_map(|&tree| {
                (1..vertex_count).step_by(chunk).map(move |start| LaneBlock {
                    tree,
                    start: start as VertexId,
                    end: (start + chunk).min(vertex_count) as VertexId,
                })
            })
            .collect();

        LanePlan { lanes, blocks }
    }

    /// Lane count the plan was cut for
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// All blocks in tree order, then vertex order
    pub fn blocks(&self) -> &[LaneBlock] {
        &self.blocks
    }

    /// Total number of (tree, vertex) cells
    pub fn cells(&self) -> usize {
        self.blocks.iter().map(LaneBlock::len).sum()
    }
}
