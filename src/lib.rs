//! attackpath - attack path and chain analysis for vehicle architectures
//!
//! Given a set of vehicle components (ECUs, gateways, sensors, telematics
//! units), attackpath builds a directed connectivity graph, selects likely
//! entry points and high-value targets, enumerates bounded simple paths
//! between them, scores each path and groups overlapping paths into
//! attack chains. Results are persisted in a local redb store.
//!
//! ```no_run
//! use std::sync::Arc;
//! use attackpath::{AnalysisRequest, ArtifactStore, AttackPathAnalyzer, Inventory};
//!
//! let inventory = Arc::new(Inventory::load("vehicle.json".as_ref())?);
//! let store = Arc::new(ArtifactStore::in_memory());
//! let analyzer = AttackPathAnalyzer::new(inventory.clone(), inventory, store);
//! let outcome = analyzer.analyze(&AnalysisRequest::new("tcu", &["tcu", "gw", "brake"]))?;
//! println!("{} paths", outcome.summary.total_paths);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod analysis;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod inventory;
pub mod models;
pub mod reporters;
pub mod store;

pub use analysis::{AnalysisOutcome, AttackPathAnalyzer};
pub use config::ProjectConfig;
pub use error::{AnalysisError, StoreError, ValidationError};
pub use inventory::{ComponentSource, Inventory, VulnerabilitySource};
pub use models::AnalysisRequest;
pub use store::{ArtifactRepository, ArtifactStore};
