//! Analysis context: assumptions, constraints and threat scenarios
//!
//! Constraints shrink the component subset before the graph is built.
//! Threat scenarios never add edges; they only soften the complexity of
//! edges that already exist.

use crate::config::ConstraintSettings;
use crate::graph::{AttackEdge, ComponentGraph, ComponentNode};
use crate::models::{
    AccessPoint, AnalysisRequest, Assumptions, Complexity, Component, ComponentKind,
    ThreatScenario, ThreatType, SPOOFABLE_INTERFACES,
};
use tracing::{debug, info};

/// A parsed request constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `exclude_component_type:<type>`
    ExcludeComponentType(ComponentKind),
    /// `exclude_component:<id>`
    ExcludeComponent(String),
    ExcludeRemoteAccess,
    ExcludePhysicalAccess,
    ExcludeWirelessAccess,
    RequireAuthentication,
    /// Kept for the audit trail, otherwise ignored
    Unrecognized(String),
}

impl Constraint {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Some((key, value)) = trimmed.split_once(':') {
            let value = value.trim();
            return match key.trim() {
                "exclude_component_type" => {
                    Constraint::ExcludeComponentType(ComponentKind::from(value))
                }
                "exclude_component" => Constraint::ExcludeComponent(value.to_string()),
                _ => Constraint::Unrecognized(trimmed.to_string()),
            };
        }

        match trimmed {
            "exclude_remote_access" | "no_remote_access" => Constraint::ExcludeRemoteAccess,
            "exclude_physical_access" | "no_physical_access" => Constraint::ExcludePhysicalAccess,
            "exclude_wireless_access" | "no_wireless_access" => Constraint::ExcludeWirelessAccess,
            "require_authentication" => Constraint::RequireAuthentication,
            _ => Constraint::Unrecognized(trimmed.to_string()),
        }
    }

    /// Constraints about how the attacker gets in, as opposed to subset filters
    pub fn is_access_constraint(&self) -> bool {
        matches!(
            self,
            Constraint::ExcludeRemoteAccess
                | Constraint::ExcludePhysicalAccess
                | Constraint::ExcludeWirelessAccess
                | Constraint::RequireAuthentication
        )
    }
}

/// Context derived from a request, applied across the pipeline
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub assumptions: Assumptions,
    pub constraints: Vec<Constraint>,
    pub threat_scenarios: Vec<ThreatScenario>,
    enforce_access: bool,
}

impl AnalysisContext {
    pub fn new(request: &AnalysisRequest, settings: &ConstraintSettings) -> Self {
        let threat_scenarios = request
            .threat_scenarios
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let mut scenario = s.clone();
                if scenario.id.is_empty() {
                    scenario.id = format!("threat-{}", i + 1);
                }
                scenario
            })
            .collect();

        let ctx = Self {
            assumptions: request.assumptions.clone(),
            constraints: request.constraints.iter().map(|c| Constraint::parse(c)).collect(),
            threat_scenarios,
            enforce_access: settings.enforce_access_constraints,
        };

        for constraint in &ctx.constraints {
            match constraint {
                Constraint::Unrecognized(raw) => debug!("Unrecognized constraint '{}' recorded", raw),
                c if c.is_access_constraint() && !ctx.enforces_access() => {
                    debug!("Access constraint {:?} recorded but not enforced", c)
                }
                _ => {}
            }
        }

        ctx
    }

    /// Drop components excluded by subset constraints.
    ///
    /// The primary component is never removed. Returns the surviving
    /// components and the constraints that removed at least one component.
    pub fn filter_components(
        &self,
        components: Vec<Component>,
        primary_id: &str,
    ) -> (Vec<Component>, Vec<String>) {
        let mut applied: Vec<String> = Vec::new();
        let mut kept = Vec::with_capacity(components.len());

        for component in components {
            let excluded_by = self.constraints.iter().find(|c| match c {
                Constraint::ExcludeComponentType(kind) => component.kind == *kind,
                Constraint::ExcludeComponent(id) => component.id == *id,
                _ => false,
            });

            match excluded_by {
                Some(constraint) if component.id != primary_id => {
                    debug!("Constraint {:?} removes component {}", constraint, component.id);
                    let label = format!("{:?}", constraint);
                    if !applied.contains(&label) {
                        applied.push(label);
                    }
                }
                _ => kept.push(component),
            }
        }

        (kept, applied)
    }

    fn excludes_remote(&self) -> bool {
        self.constraints.contains(&Constraint::ExcludeRemoteAccess)
            || self.assumptions.remote_access == Some(false)
    }

    fn excludes_physical(&self) -> bool {
        self.constraints.contains(&Constraint::ExcludePhysicalAccess)
            || self.assumptions.physical_access == Some(false)
    }

    fn excludes_wireless(&self) -> bool {
        self.constraints.contains(&Constraint::ExcludeWirelessAccess)
    }

    /// Whether access constraints are enforced on entry point selection
    pub fn enforces_access(&self) -> bool {
        self.enforce_access
    }

    /// Access points an attacker may still use under the enforced constraints
    pub fn permitted_access(&self, access: AccessPoint) -> bool {
        if !self.enforce_access {
            return true;
        }
        !(self.excludes_remote() && access.is_remote()
            || self.excludes_physical() && access.is_physical()
            || self.excludes_wireless() && access.is_wireless())
    }

    /// Whether an external location still counts as exposure
    pub fn permits_external_location(&self) -> bool {
        !(self.enforce_access && self.excludes_remote())
    }

    /// Likelihood multiplier for the assumed attacker skill
    pub fn skill_factor(&self) -> f64 {
        self.assumptions
            .attacker_skill_level
            .map(|s| s.likelihood_factor())
            .unwrap_or(1.0)
    }

    /// Soften edges according to the threat scenarios, in request order.
    ///
    /// Returns the number of edges changed.
    pub fn reweight(&self, graph: &mut ComponentGraph) -> usize {
        if self.threat_scenarios.is_empty() {
            return 0;
        }

        let changed = graph.update_edges(|src, dst, edge| {
            let mut updated = edge.clone();
            let mut touched = false;

            for scenario in &self.threat_scenarios {
                if let Some(softer) = softened_complexity(scenario, src, dst, &updated) {
                    updated.complexity = softer;
                    if !updated.threat_ids.contains(&scenario.id) {
                        updated.threat_ids.push(scenario.id.clone());
                    }
                    touched = true;
                }
            }

            touched.then_some(updated)
        });

        info!(
            "Threat scenarios reweighted {} edge(s) from {} scenario(s)",
            changed,
            self.threat_scenarios.len()
        );
        changed
    }
}

/// New complexity for an edge under one scenario, or None if it is unaffected
fn softened_complexity(
    scenario: &ThreatScenario,
    src: &ComponentNode,
    dst: &ComponentNode,
    edge: &AttackEdge,
) -> Option<Complexity> {
    let (high_threshold, medium_threshold) = match scenario.threat_type {
        ThreatType::Spoofing => {
            let spoofable = src.has_interface_in(SPOOFABLE_INTERFACES)
                || dst.has_interface_in(SPOOFABLE_INTERFACES);
            if !spoofable {
                return None;
            }
            (0.5, 0.7)
        }
        ThreatType::Tampering => {
            if !edge.trust_boundary {
                return None;
            }
            (0.6, 0.8)
        }
        other => {
            debug!("Threat type {:?} does not reweight edges", other);
            return None;
        }
    };

    match edge.complexity {
        Complexity::High if scenario.likelihood > high_threshold => Some(Complexity::Medium),
        Complexity::Medium if scenario.likelihood > medium_threshold => Some(Complexity::Low),
        _ => None,
    }
}
