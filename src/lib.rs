//! # bubble-ist: Independent Spanning Trees of the Bubble-Sort Network
//!
//! The bubble-sort network `B_n` has every permutation of `{1..n}` as a vertex
//! and joins two permutations when they differ by one adjacent transposition.
//! This crate builds its `n - 1` independent spanning trees, all rooted at the
//! identity permutation, for `2 <= n <= 10`.
//!
//! ## Features
//!
//! - **Universe**: lexicographic vertex ids, packed-key reverse lookup, per-vertex
//!   position tables and first-wrong cache
//! - **Resolver**: the deterministic parent rule `(vertex, tree) -> parent`
//! - **Partitioning**: trees spread over workers, vertices over rayon lanes
//! - **Assembly**: a coordinator that receives per-tree wire buffers over a channel
//! - **Export**: Graphviz DOT files and a JSON run report
//!
//! ```
//! use bubble_ist::prelude::*;
//!
//! let ctx = Context::build(4)?;
//! let forest = construct(&ctx, 2)?;
//! assert_eq!(forest.trees().len(), 3);
//! assert_eq!(forest.tree(1).edge_count(), 23);
//! # Ok::<(), bubble_ist::IstError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Permutations, lookup tables and labels
pub mod universe;

/// The parent-selection rule
pub mod resolver;

/// Distribution of trees over workers and vertices over lanes
pub mod partition;

/// Lane folding and the worker-to-coordinator wire format
pub mod aggregate;

/// The coordinator and the assembled forest
pub mod assemble;

/// Bridges to petgraph
pub mod graph;

/// Structural checks on assembled trees
pub mod verify;

/// DOT export and run reports
pub mod export;

/// Run configuration
pub mod config;

/// Utility functions and helpers
pub mod utils;

// Re-export commonly used types
pub use universe::{Context, PermutationUniverse, VertexTables, VertexId, TreeIndex};
pub use resolver::ParentResolver;
pub use partition::{PartitionPolicy, LanePlan};
pub use assemble::{construct, SpanningForest, SpanningTree, TreeAssembler};
pub use config::RunConfig;

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum IstError {
    /// Invalid invocation or configuration
    #[error("Usage error: {0}")]
    Usage(String),

    /// The parent rule produced something that is not a valid tree edge
    #[error("Consistency error: {0}")]
    Consistency(String),

    /// A worker message was lost, malformed, or never arrived
    #[error("Communication error: {0}")]
    Communication(String),

    /// A vertex label could not be parsed
    #[error("Label error: {0}")]
    Label(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the library
pub type Result<T> = std::result::Result<T, IstError>;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        universe::{Context, PermutationUniverse, VertexTables, VertexId, TreeIndex},
        resolver::ParentResolver,
        partition::{PartitionPolicy, LanePlan},
        assemble::{construct, SpanningForest, SpanningTree, TreeAssembler},
        config::RunConfig,
        Result, IstError,
    };
}
