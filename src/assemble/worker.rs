//! A distributed worker: computes its trees on a lane pool and ships them

use super::Envelope;
use crate::aggregate::{ChildrenByTree, LaneOutput};
use crate::partition::{LaneBlock, LanePlan};
use crate::resolver::ParentResolver;
use crate::universe::{Context, TreeIndex};
use crate::IstError;
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::Sender;
use std::sync::Barrier;
use tracing::{debug, info, warn};

/// One worker unit and the trees it owns
#[derive(Debug)]
pub struct Worker<'a> {
    id: usize,
    ctx: &'a Context,
    trees: Vec<TreeIndex>,
    lanes: usize,
}

impl<'a> Worker<'a> {
    /// Worker `id` owning `trees`, running `lanes` concurrent lanes
    pub fn new(id: usize, ctx: &'a Context, trees: Vec<TreeIndex>, lanes: usize) -> Self {
        Worker { id, ctx, trees, lanes }
    }

    /// Resolve every (owned tree, non-root vertex) cell and fold the lane buffers
    pub fn compute(&self) -> crate::Result<ChildrenByTree> {
        let plan = LanePlan::new(&self.trees, self.ctx.vertex_count(), self.lanes);
        let id = self.id;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(plan.lanes())
            .thread_name(move |lane| format!("worker{}-lane{}", id, lane))
            .build()
            .map_err(|e| IstError::Usage(format!("cannot start {} lanes: {}", plan.lanes(), e)))?;

        let ctx = self.ctx;
        let outputs = pool.install(|| {
            plan.blocks()
                .par_iter()
                .map(|&block| resolve_block(ctx, block))
                .collect::<crate::Result<Vec<_>>>()
        })?;

        let merged = ChildrenByTree::fold(ctx.vertex_count(), &self.trees, outputs)?;
        for &t in &self.trees {
            info!(worker = self.id, tree = t, "Process {} completed tree {}", self.id, t);
        }
        Ok(merged)
    }

    /// Compute, send every owned tree to the coordinator, then wait at the barrier
    ///
    /// The barrier is reached on every path, including failures and panics,
    /// so the coordinator can never be left waiting for this worker.
    pub fn run(self, outbox: Sender<Envelope>, barrier: &Barrier) -> crate::Result<()> {
        let outcome = catch_panic(self.id, || {
            self.compute().and_then(|merged| self.send_all(&merged, &outbox))
        });

        if let Err(e) = &outcome {
            warn!(worker = self.id, error = %e, "worker failed, notifying coordinator");
            // The coordinator may already be gone; the error is returned either way.
            let _ = outbox.send(Envelope::Abort { source: self.id });
        }

        barrier.wait();
        outcome
    }

    fn send_all(&self, merged: &ChildrenByTree, outbox: &Sender<Envelope>) -> crate::Result<()> {
        for t in merged.tree_ids() {
            let payload = merged.encode_tree(t);
            let edges = (payload.len() - 1) / 2;
            outbox
                .send(Envelope::Tree { source: self.id, payload })
                .map_err(|_| {
                    IstError::Communication(format!(
                        "worker {} could not deliver tree {}: coordinator inbox closed",
                        self.id, t
                    ))
                })?;
            if edges == 0 {
                info!(worker = self.id, tree = t, "Process {} sent empty tree {} to coordinator", self.id, t);
            } else {
                debug!(worker = self.id, tree = t, edges, "Process {} sent tree {} to coordinator", self.id, t);
            }
        }
        Ok(())
    }
}

/// Run `work`, turning a panic into a communication error for worker `id`
pub(crate) fn catch_panic<T, F>(id: usize, work: F) -> crate::Result<T>
where
    F: FnOnce() -> crate::Result<T>,
{
    panic::catch_unwind(AssertUnwindSafe(work))
        .unwrap_or_else(|_| Err(IstError::Communication(format!("worker {} panicked", id))))
}

/// One lane's share: the parents of a block's vertices, in vertex order
fn resolve_block(ctx: &Context, block: LaneBlock) -> crate::Result<LaneOutput> {
    let resolver = ParentResolver::new(ctx);
    let parents = block
        .vertices()
        .map(|v| resolver.resolve(v, block.tree))
        .collect::<crate::Result<Vec<_>>>()?;
    Ok(LaneOutput { block, parents })
}
