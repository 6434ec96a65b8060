//! Core types for graphwalk: a directed, kind-labelled multigraph.
//!
//! Provides the arena-backed graph model ([`graph::Graph`]), node and relationship
//! types, the shared [`error::GraphError`], and traversal configuration.

pub mod config;
pub mod error;
pub mod graph;

pub use error::GraphError;
pub use graph::{EdgeId, Graph, Node, NodeId, Relationship, Relationships};
