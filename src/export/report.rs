//! JSON summary of a run

use crate::assemble::SpanningForest;
use crate::config::RunConfig;
use crate::partition::PartitionPolicy;
use crate::utils::save_json;
use crate::verify::VerifyReport;
use crate::universe::TreeIndex;
use serde::{Serialize, Deserialize};
use std::path::Path;
use std::time::Duration;

/// Per-tree line of the report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeSummary {
    /// Tree index
    pub tree: TreeIndex,
    /// Edge count, `n! - 1`
    pub edges: usize,
    /// Longest root path
    pub height: usize,
    /// Vertices without children
    pub leaves: usize,
    /// SHA-256 of the parent array
    pub fingerprint: String,
}

/// Everything worth keeping from one run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Network size
    pub n: usize,
    /// Worker count
    pub workers: usize,
    /// Lanes per worker
    pub lanes: usize,
    /// Partition policy
    pub partition: PartitionPolicy,
    /// `n!`
    pub vertex_count: usize,
    /// One entry per tree
    pub trees: Vec<TreeSummary>,
    /// Wall time from context build to assembled forest
    pub elapsed_secs: f64,
    /// Present when verification ran
    pub verification: Option<VerifyReport>,
}

impl RunReport {
    /// Summarize `forest` as produced under `config`
    pub fn new(config: &RunConfig, forest: &SpanningForest, elapsed: Duration) -> Self {
        let trees = forest
            .trees()
            .iter()
            .map(|tree| TreeSummary {
                tree: tree.index(),
                edges: tree.edge_count(),
                height: tree.height(),
                leaves: tree.leaf_count(),
                fingerprint: tree.fingerprint(),
            })
            .collect();

        RunReport {
            n: forest.n(),
            workers: config.workers,
            lanes: config.lanes,
            partition: config.partition,
            vertex_count: forest.vertex_count(),
            trees,
            elapsed_secs: elapsed.as_secs_f64(),
            verification: None,
        }
    }

    /// Attach a verification outcome
    pub fn with_verification(mut self, report: VerifyReport) -> Self {
        self.verification = Some(report);
        self
    }

    /// Write as pretty JSON
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        save_json(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::construct;
    use crate::universe::Context;
    use crate::utils::load_json;

    #[test]
    fn test_report_contents() {
        let ctx = Context::build(3).unwrap();
        let forest = construct(&ctx, 1).unwrap();
        let config = RunConfig::for_n(3).with_lanes(1);
        let report = RunReport::new(&config, &forest, Duration::from_millis(1500));

        assert_eq!(report.vertex_count, 6);
        assert_eq!(report.trees.len(), 2);
        assert_eq!(report.trees[0].edges, 5);
        assert_eq!(report.trees[0].height, 5);
        assert_eq!(report.trees[0].leaves, 1);
        assert_eq!(report.trees[1].fingerprint, forest.fingerprint(2).unwrap());
        assert!((report.elapsed_secs - 1.5).abs() < 1e-9);
        assert!(report.verification.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let ctx = Context::build(3).unwrap();
        let forest = construct(&ctx, 1).unwrap();
        let config = RunConfig::for_n(3);
        let report = RunReport::new(&config, &forest, Duration::ZERO);

        let path = std::env::temp_dir().join(format!("bubble-ist-report-{}.json", std::process::id()));
        report.save(&path).unwrap();
        let loaded: RunReport = load_json(&path).unwrap();
        assert_eq!(loaded, report);
        std::fs::remove_file(&path).ok();
    }
}
