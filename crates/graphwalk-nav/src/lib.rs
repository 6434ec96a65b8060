//! Navigation over graphwalk graphs.
//!
//! Provides [`dfs::DepthFirstSearch`], a lazy, predicate-driven depth-first walk
//! from a single start node.

pub mod dfs;

pub use dfs::{DepthFirstSearch, Matches, SearchStats};
