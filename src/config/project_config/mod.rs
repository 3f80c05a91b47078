//! Project-level configuration support
//!
//! Loads per-project configuration from `attackpath.toml` or
//! `.attackpathrc.json` in the working directory.
//!
//! # Configuration Format
//!
//! ```toml
//! # attackpath.toml
//!
//! [analysis]
//! max_depth = 5
//! include_chains = true
//! high_risk_threshold = 7.0
//! direct_path_prune_threshold = 5
//! max_depth_limit = 10
//! max_paths_per_pair = 1000
//! max_explored_per_pair = 100000
//! max_total_paths = 10000
//! workers = 0
//!
//! [constraints]
//! enforce_access_constraints = false
//!
//! [scoring]
//! apply_attacker_skill = true
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// File name searched for in the project directory
pub const CONFIG_FILE_NAME: &str = "attackpath.toml";

/// Project-level configuration loaded from attackpath.toml or similar
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Enumeration and summary settings
    #[serde(default)]
    pub analysis: AnalysisSettings,

    /// How request constraints are enforced
    #[serde(default)]
    pub constraints: ConstraintSettings,

    /// Scoring toggles
    #[serde(default)]
    pub scoring: ScoringSettings,
}

/// Path search bounds and reporting thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    /// Maximum edges per path when the request does not set one (default: 5)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Ceiling for any requested depth (default: 10)
    #[serde(default = "default_max_depth_limit")]
    pub max_depth_limit: usize,

    /// Aggregate related paths into chains unless the request says otherwise
    #[serde(default = "default_include_chains")]
    pub include_chains: bool,

    /// Paths and chains at or above this risk score count as high risk (default: 7.0)
    #[serde(default = "default_high_risk_threshold")]
    pub high_risk_threshold: f64,

    /// Above this many candidates per pair, direct edges are dropped (default: 5)
    #[serde(default = "default_prune_threshold")]
    pub direct_path_prune_threshold: usize,

    /// Stop exploring a pair after this many simple paths (default: 1000)
    #[serde(default = "default_max_paths_per_pair")]
    pub max_paths_per_pair: usize,

    /// Stop exploring a pair after this many partial-path extensions (default: 100000)
    #[serde(default = "default_max_explored_per_pair")]
    pub max_explored_per_pair: usize,

    /// Hard cap on paths kept for a single analysis (default: 10000)
    #[serde(default = "default_max_total_paths")]
    pub max_total_paths: usize,

    /// Worker threads for pair enumeration (0 = auto)
    #[serde(default)]
    pub workers: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_depth_limit: default_max_depth_limit(),
            include_chains: default_include_chains(),
            high_risk_threshold: default_high_risk_threshold(),
            direct_path_prune_threshold: default_prune_threshold(),
            max_paths_per_pair: default_max_paths_per_pair(),
            max_explored_per_pair: default_max_explored_per_pair(),
            max_total_paths: default_max_total_paths(),
            workers: 0,
        }
    }
}

fn default_max_depth() -> usize {
    5
}
fn default_max_depth_limit() -> usize {
    10
}
fn default_include_chains() -> bool {
    true
}
fn default_high_risk_threshold() -> f64 {
    7.0
}
fn default_prune_threshold() -> usize {
    5
}
fn default_max_paths_per_pair() -> usize {
    1000
}
fn default_max_explored_per_pair() -> usize {
    100_000
}
fn default_max_total_paths() -> usize {
    10_000
}

impl AnalysisSettings {
    /// Effective worker count, auto-detected when unset
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
                .min(16)
        } else {
            self.workers
        }
    }
}

/// Constraint enforcement mode
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConstraintSettings {
    /// When true, access constraints such as `exclude_remote_access` prune
    /// heuristic entry points instead of being recorded only
    #[serde(default)]
    pub enforce_access_constraints: bool,
}

/// Scoring toggles
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    /// Scale likelihood by the assumed attacker skill level (default: true)
    #[serde(default = "default_apply_attacker_skill")]
    pub apply_attacker_skill: bool,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            apply_attacker_skill: default_apply_attacker_skill(),
        }
    }
}

fn default_apply_attacker_skill() -> bool {
    true
}

/// Load project configuration from a directory.
///
/// Searches for configuration files in this order:
/// 1. `attackpath.toml`
/// 2. `.attackpathrc.json`
///
/// Returns default configuration if no config file is found or it fails to parse.
pub fn load_project_config(dir: &Path) -> ProjectConfig {
    let toml_path = dir.join(CONFIG_FILE_NAME);
    if toml_path.exists() {
        match load_config_file(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    let json_path = dir.join(".attackpathrc.json");
    if json_path.exists() {
        match load_config_file(&json_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", json_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", json_path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

/// Load configuration from an explicit file (TOML unless the extension is `.json`)
pub fn load_config_file(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let config: ProjectConfig = if is_json {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };
    config.validate()?;
    Ok(config)
}

impl ProjectConfig {
    /// Reject settings that would make every analysis meaningless
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.analysis.max_paths_per_pair == 0 {
            anyhow::bail!("analysis.max_paths_per_pair must be at least 1");
        }
        if self.analysis.max_explored_per_pair == 0 {
            anyhow::bail!("analysis.max_explored_per_pair must be at least 1");
        }
        if self.analysis.max_depth > self.analysis.max_depth_limit {
            anyhow::bail!(
                "analysis.max_depth ({}) exceeds analysis.max_depth_limit ({})",
                self.analysis.max_depth,
                self.analysis.max_depth_limit
            );
        }
        if self.analysis.max_total_paths == 0 {
            anyhow::bail!("analysis.max_total_paths must be at least 1");
        }
        if !self.analysis.high_risk_threshold.is_finite() {
            anyhow::bail!("analysis.high_risk_threshold must be a finite number");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
