//! Output written after a successful run

mod dot;
mod report;

pub use dot::{dot_file_name, export_dot, write_tree_dot};
pub use report::{RunReport, TreeSummary};
