pub mod conflict;
pub mod digraph;

pub use conflict::{ConflictEdge, ConflictGraph, ConflictPolicy};
pub use digraph::DiGraph;
