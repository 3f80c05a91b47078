//! Component graph for attack path search
//!
//! Pure Rust implementation on petgraph. The graph lives only for the
//! duration of one analysis; persisted artifacts go to the artifact store.

pub mod component_graph;
pub mod graph_models;

pub use component_graph::{ComponentGraph, GraphBuild, GraphStats};
pub use graph_models::{AttackEdge, ComponentNode};
