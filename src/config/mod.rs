//! Configuration module for attackpath
//!
//! This module handles:
//! - Project-level configuration (attackpath.toml)
//! - Enumeration bounds and high-risk threshold
//! - Constraint enforcement and scoring toggles

mod project_config;

pub use project_config::{
    load_config_file, load_project_config, AnalysisSettings, ConstraintSettings, ProjectConfig,
    ScoringSettings, CONFIG_FILE_NAME,
};
