//! Attack path and chain analysis
//!
//! Pipeline stages, in execution order:
//! - `context`: constraints, assumptions and threat-scenario reweighting
//! - `classifier`: entry point and target selection
//! - `enumerator`: bounded simple paths per (entry, target) pair
//! - `scorer`: path metrics and steps
//! - `chains`: union-find aggregation of related paths
//! - `assembler`: summary and persistence
//!
//! [`AttackPathAnalyzer`] wires them together.

pub mod assembler;
pub mod chains;
pub mod classifier;
pub mod context;
pub mod engine;
pub mod enumerator;
pub mod scorer;

pub use assembler::AnalysisOutcome;
pub use classifier::Classification;
pub use context::{AnalysisContext, Constraint};
pub use engine::AttackPathAnalyzer;
pub use enumerator::EnumerationLimits;
pub use scorer::PathScorer;
