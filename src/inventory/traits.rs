//! Collaborator traits for read-only inventory access

use crate::models::{Component, Vulnerability};
use anyhow::Result;

/// Read-only access to the component catalogue
pub trait ComponentSource: Send + Sync {
    /// Fetch the components with the given ids; unknown ids are skipped
    fn fetch_components(&self, ids: &[String]) -> Result<Vec<Component>>;

    /// Outgoing connections of a component, used when the component record
    /// itself carries no connection list
    fn connections_of(&self, id: &str) -> Result<Vec<String>>;
}

/// Read-only access to known vulnerabilities
pub trait VulnerabilitySource: Send + Sync {
    /// Fetch vulnerabilities by id; unknown ids are skipped
    fn fetch_vulnerabilities(&self, ids: &[String]) -> Result<Vec<Vulnerability>>;

    /// Ids of vulnerabilities associated with a component
    fn vulnerabilities_for_component(&self, component_id: &str) -> Result<Vec<String>>;
}
