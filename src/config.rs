//! Run configuration for a construction

use crate::partition::PartitionPolicy;
use crate::universe::{MAX_N, MIN_N};
use crate::IstError;
use serde::{Serialize, Deserialize};
use std::path::PathBuf;
use std::time::Duration;

/// Everything a run needs besides the context itself
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Network size
    pub n: usize,
    /// Distributed worker units; worker 0 is the coordinator
    pub workers: usize,
    /// Concurrent lanes per worker
    pub lanes: usize,
    /// How trees are dealt out to workers
    pub partition: PartitionPolicy,
    /// How long the coordinator waits for outstanding trees, in milliseconds
    pub deadline_ms: u64,
    /// Directory for exported DOT files
    pub output_dir: PathBuf,
    /// Whether to write DOT files at all
    pub export_dot: bool,
    /// Optional path of a JSON run report
    pub report: Option<PathBuf>,
    /// Check the trees after construction
    pub verify: bool,
    /// Vertices sampled by the independence check
    pub verify_samples: usize,
    /// Seed for the sampled independence check
    pub seed: u64,
}

impl RunConfig {
    /// Defaults for network size `n`: one worker, one lane per available core
    pub fn for_n(n: usize) -> Self {
        RunConfig {
            n,
            workers: 1,
            lanes: rayon::current_num_threads(),
            partition: PartitionPolicy::Contiguous,
            deadline_ms: 300_000,
            output_dir: PathBuf::from("."),
            export_dot: true,
            report: None,
            verify: false,
            verify_samples: 1000,
            seed: 42,
        }
    }

    /// Set the worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the lane count
    pub fn with_lanes(mut self, lanes: usize) -> Self {
        self.lanes = lanes;
        self
    }

    /// Set the partition policy
    pub fn with_partition(mut self, partition: PartitionPolicy) -> Self {
        self.partition = partition;
        self
    }

    /// Set the coordinator deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Coordinator deadline
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        if !(MIN_N..=MAX_N).contains(&self.n) {
            return Err(IstError::Usage(format!(
                "n must be in [{}..{}], got {}",
                MIN_N, MAX_N, self.n
            )));
        }

        if self.workers == 0 {
            return Err(IstError::Usage("at least one worker is required".to_string()));
        }

        if self.lanes == 0 {
            return Err(IstError::Usage("at least one lane is required".to_string()));
        }

        if self.deadline_ms == 0 {
            return Err(IstError::Usage("deadline must be positive".to_string()));
        }

        if self.verify && self.verify_samples == 0 {
            return Err(IstError::Usage("verification needs at least one sample".to_string()));
        }

        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::for_n(4)
    }
}
