//! Coordinator-side assembly of the spanning trees
//!
//! Worker 0 is the coordinator. It computes its own trees like any other
//! worker, then drains a single inbox until every tree owned by the other
//! workers has arrived. Messages may arrive in any order; each one names its
//! tree. A deadline turns a lost message into an error instead of a hang.

mod forest;
mod worker;

use crate::aggregate::{decode_message, ChildrenByTree};
use crate::config::RunConfig;
use crate::universe::{Context, TreeIndex};
use crate::IstError;
use std::collections::BTreeSet;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub use forest::{SpanningForest, SpanningTree, UNREACHED};
use worker::{catch_panic, Worker};

/// A worker-to-coordinator message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Envelope {
    /// One tree in wire format
    Tree {
        /// Sending worker
        source: usize,
        /// `[tree_id, p0, c0, ...]`
        payload: Vec<u32>,
    },
    /// The sender failed and will not deliver its remaining trees
    Abort {
        /// Sending worker
        source: usize,
    },
}

/// Build every tree on a single worker with `lanes` lanes
pub fn construct(ctx: &Context, lanes: usize) -> crate::Result<SpanningForest> {
    let trees: Vec<TreeIndex> = ctx.tree_indices().collect();
    let merged = Worker::new(0, ctx, trees, lanes).compute()?;
    SpanningForest::from_children(ctx.n(), merged)
}

/// Runs workers, receives their trees, and assembles the forest
#[derive(Debug)]
pub struct TreeAssembler {
    ctx: Arc<Context>,
    config: RunConfig,
}

impl TreeAssembler {
    /// Check `config` against the context it will run on
    pub fn new(ctx: Arc<Context>, config: RunConfig) -> crate::Result<Self> {
        config.validate()?;
        if config.n != ctx.n() {
            return Err(IstError::Usage(format!(
                "config is for n={} but the context was built for n={}",
                config.n,
                ctx.n()
            )));
        }
        Ok(TreeAssembler { ctx, config })
    }

    /// Tree indices owned by each worker under the configured policy
    pub fn assignment(&self) -> Vec<Vec<TreeIndex>> {
        self.config
            .partition
            .assign(self.ctx.tree_count(), self.config.workers)
    }

    /// Run all workers and assemble the forest at the coordinator
    pub fn run(&self) -> crate::Result<SpanningForest> {
        let ctx: &Context = &self.ctx;
        let workers = self.config.workers;
        let lanes = self.config.lanes;
        let assignment = self.assignment();

        info!("Building {} trees for n={}", ctx.tree_count(), ctx.n());
        for (w, trees) in assignment.iter().enumerate() {
            info!(worker = w, "Process {} will build trees: {:?}", w, trees);
        }

        let barrier = Barrier::new(workers);
        let (outbox, inbox) = mpsc::channel();

        thread::scope(|scope| {
            let handles: Vec<_> = assignment
                .iter()
                .enumerate()
                .skip(1)
                .map(|(id, trees)| {
                    let worker = Worker::new(id, ctx, trees.clone(), lanes);
                    let outbox = outbox.clone();
                    let barrier = &barrier;
                    scope.spawn(move || worker.run(outbox, barrier))
                })
                .collect();
            drop(outbox);

            // A coordinator panic must still reach the barrier below.
            let received = catch_panic(0, || {
                let own = Worker::new(0, ctx, assignment[0].clone(), lanes).compute()?;
                let expected = assignment.iter().skip(1).flatten().copied();
                self.receive(own, &inbox, expected)
            });

            barrier.wait();
            let worker_results: Vec<crate::Result<()>> = handles
                .into_iter()
                .enumerate()
                .map(|(i, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(IstError::Communication(format!("worker {} thread panicked", i + 1)))
                    })
                })
                .collect();

            match received {
                Err(e) if !matches!(e, IstError::Communication(_)) => Err(e),
                received => {
                    for result in worker_results {
                        result?;
                    }
                    received
                }
            }
        })
    }

    /// Drain the inbox until every expected tree has been replayed into `global`
    fn receive<I>(
        &self,
        mut global: ChildrenByTree,
        inbox: &Receiver<Envelope>,
        expected: I,
    ) -> crate::Result<SpanningForest>
    where
        I: IntoIterator<Item = TreeIndex>,
    {
        let mut pending: BTreeSet<TreeIndex> = expected.into_iter().collect();
        let deadline = Instant::now().checked_add(self.config.deadline());
        info!("Coordinator needs to receive {} trees", pending.len());

        while !pending.is_empty() {
            let remaining = deadline.map_or(Duration::MAX, |d| d.saturating_duration_since(Instant::now()));
            match inbox.recv_timeout(remaining) {
                Ok(Envelope::Tree { source, payload }) => {
                    let decoded = decode_message(&payload, &self.ctx)?;
                    let t = decoded.tree;
                    if !pending.remove(&t) {
                        warn!(tree = t, source, "ignoring tree that is not pending");
                        continue;
                    }

                    global.ensure_tree(t);
                    for &(parent, child) in &decoded.edges {
                        global.insert_edge(t, parent, child)?;
                    }
                    if decoded.edges.is_empty() {
                        info!(tree = t, source, "Coordinator received empty tree {} from process {}", t, source);
                    } else {
                        info!(
                            tree = t,
                            source,
                            "Coordinator received tree {} with {} edges from process {}",
                            t,
                            decoded.edges.len(),
                            source
                        );
                    }
                    debug!(pending = ?pending, "still waiting");
                }
                Ok(Envelope::Abort { source }) => {
                    return Err(IstError::Communication(format!(
                        "worker {} aborted with trees {:?} pending",
                        source,
                        listed(&pending)
                    )));
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!(pending = ?listed(&pending), "deadline passed");
                    return Err(IstError::Communication(format!(
                        "deadline of {:?} passed with trees {:?} pending",
                        self.config.deadline(),
                        listed(&pending)
                    )));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(IstError::Communication(format!(
                        "every worker hung up with trees {:?} pending",
                        listed(&pending)
                    )));
                }
            }
        }

        SpanningForest::from_children(self.ctx.n(), global)
    }
}

/// Pending tree ids in ascending order, printed as `[a, b]`
fn listed(pending: &BTreeSet<TreeIndex>) -> Vec<TreeIndex> {
    pending.iter().copied().collect()
}
