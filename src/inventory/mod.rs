//! Component and vulnerability collaborators
//!
//! The engine never owns the vehicle inventory. It reads components and
//! vulnerability associations through these traits, so a database-backed
//! product catalogue and the file-backed [`Inventory`] used by the CLI are
//! interchangeable.

mod traits;

pub use traits::{ComponentSource, VulnerabilitySource};

use crate::models::{Component, Vulnerability};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// In-memory inventory of components and known vulnerabilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
    /// Extra connections keyed by source component id, consulted when a
    /// component declares none of its own
    #[serde(default)]
    pub connections: HashMap<String, Vec<String>>,
}

impl Inventory {
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            components,
            ..Default::default()
        }
    }

    pub fn with_vulnerability(mut self, vulnerability: Vulnerability) -> Self {
        self.vulnerabilities.push(vulnerability);
        self
    }

    pub fn with_connection(mut self, from: &str, to: &str) -> Self {
        self.connections
            .entry(from.to_string())
            .or_default()
            .push(to.to_string());
        self
    }

    /// Load an inventory from a JSON or TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read inventory {}", path.display()))?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        let inventory: Inventory = if is_toml {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML inventory {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON inventory {}", path.display()))?
        };

        debug!(
            "Loaded inventory from {}: {} components, {} vulnerabilities",
            path.display(),
            inventory.components.len(),
            inventory.vulnerabilities.len()
        );
        Ok(inventory)
    }

    /// All component ids in declaration order
    pub fn component_ids(&self) -> Vec<String> {
        self.components.iter().map(|c| c.id.clone()).collect()
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }
}

impl ComponentSource for Inventory {
    fn fetch_components(&self, ids: &[String]) -> Result<Vec<Component>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.component(id).cloned())
            .collect())
    }

    fn connections_of(&self, id: &str) -> Result<Vec<String>> {
        Ok(self.connections.get(id).cloned().unwrap_or_default())
    }
}

impl VulnerabilitySource for Inventory {
    fn fetch_vulnerabilities(&self, ids: &[String]) -> Result<Vec<Vulnerability>> {
        Ok(self
            .vulnerabilities
            .iter()
            .filter(|v| ids.contains(&v.id))
            .cloned()
            .collect())
    }

    fn vulnerabilities_for_component(&self, component_id: &str) -> Result<Vec<String>> {
        Ok(self
            .vulnerabilities
            .iter()
            .filter(|v| v.component_ids.iter().any(|c| c == component_id))
            .map(|v| v.id.clone())
            .collect())
    }
}
