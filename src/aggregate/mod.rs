//! Folding lane results into per-tree structures, and the wire format between workers

mod children;
mod wire;

pub use children::{ChildrenByTree, LaneOutput, NO_PARENT};
pub use wire::{decode_message, encode_tree, DecodedTree};
