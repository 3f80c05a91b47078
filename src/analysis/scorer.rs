//! Path scoring and step materialization
//!
//! Every metric here is a pure function of the node sequence and the
//! reweighted graph, so identical inputs always produce identical paths.

use crate::graph::{AttackEdge, ComponentGraph, ComponentNode};
use crate::models::{
    deterministic_artifact_id, risk_score, round_to, AttackPath, AttackStep, Complexity, DataType,
    Impact, PathType, SafetyLevel, StepType, TrustZone,
};
use std::collections::HashMap;

const CONFIDENTIAL_DATA: &[DataType] = &[
    DataType::Personal,
    DataType::Private,
    DataType::Credential,
    DataType::Key,
];
const CONTROL_DATA: &[DataType] = &[DataType::Control, DataType::Command, DataType::Safety];
const SECRET_DATA: &[DataType] = &[DataType::Credential, DataType::Key];

/// Path type from boundary crossings and trust-zone climb
pub fn path_type(nodes: &[&ComponentNode], edges: &[&AttackEdge]) -> PathType {
    if nodes.len() <= 2 {
        return PathType::Direct;
    }

    let crossings = edges.iter().filter(|e| e.trust_boundary).count();
    if crossings > 1 {
        return PathType::Lateral;
    }

    let (Some(first), Some(last)) = (nodes.first(), nodes.last()) else {
        return PathType::Direct;
    };
    if last.trust_zone.ordinal() - first.trust_zone.ordinal() >= 2 {
        PathType::PrivilegeEscalation
    } else {
        PathType::MultiStep
    }
}

/// Overall complexity: a strict HIGH or LOW majority wins, otherwise MEDIUM
pub fn path_complexity(edges: &[&AttackEdge]) -> Complexity {
    let total = edges.len();
    let high = edges
        .iter()
        .filter(|e| e.complexity == Complexity::High)
        .count();
    let low = edges
        .iter()
        .filter(|e| e.complexity == Complexity::Low)
        .count();

    if high * 2 > total {
        Complexity::High
    } else if low * 2 > total {
        Complexity::Low
    } else {
        Complexity::Medium
    }
}

/// Success likelihood for a path with `hops` edges.
///
/// Longer paths lose 5% per extra hop, never dropping below half the base.
pub fn success_likelihood(complexity: Complexity, hops: usize, skill_factor: f64) -> f64 {
    let extra_hops = hops.saturating_sub(1) as f64;
    let length_factor = (1.0 - 0.05 * extra_hops).max(0.5);
    let raw = complexity.base_likelihood() * length_factor * skill_factor;
    round_to(raw.clamp(0.0, 1.0), 2)
}

/// CIA impact of compromising `target`
pub fn target_impact(target: &ComponentNode) -> Impact {
    let mut impact = Impact::baseline();

    let safety = match target.safety_level {
        Some(SafetyLevel::AsilD) => Some(10),
        Some(SafetyLevel::AsilC) => Some(9),
        Some(SafetyLevel::AsilB) => Some(7),
        Some(SafetyLevel::AsilA) => Some(6),
        Some(SafetyLevel::Qm) | None => None,
    };
    if let Some(value) = safety {
        impact.raise_integrity(value);
        impact.raise_availability(value);
    }

    match target.trust_zone {
        TrustZone::Critical => {
            impact.raise_confidentiality(9);
            impact.raise_integrity(8);
        }
        TrustZone::Trusted => impact.raise_confidentiality(7),
        _ => {}
    }

    if target.has_data_in(CONFIDENTIAL_DATA) {
        impact.raise_confidentiality(10);
    }
    if target.has_data_in(CONTROL_DATA) {
        impact.raise_integrity(9);
        impact.raise_availability(9);
    }

    impact
}

/// Tactic for the step at `position` in a path of `len` nodes
pub fn step_type(node: &ComponentNode, position: usize, len: usize) -> StepType {
    if position == 0 {
        return StepType::InitialAccess;
    }
    if position + 1 == len {
        return StepType::Impact;
    }
    if node.kind.is_relay() {
        return StepType::LateralMovement;
    }
    if node.has_data_in(SECRET_DATA) {
        return StepType::CredentialAccess;
    }
    if position == 1 {
        return StepType::Execution;
    }
    // Past the midpoint of the node sequence
    if node.trust_zone == TrustZone::Critical && position * 2 > len - 1 {
        return StepType::PrivilegeEscalation;
    }
    StepType::LateralMovement
}

/// Scores node sequences into attack paths for one analysis
pub struct PathScorer<'a> {
    graph: &'a ComponentGraph,
    analysis_id: &'a str,
    scope_id: Option<&'a str>,
    skill_factor: f64,
    /// Request vulnerability ids known to affect each component
    vulnerabilities: &'a HashMap<String, Vec<String>>,
}

impl<'a> PathScorer<'a> {
    pub fn new(
        graph: &'a ComponentGraph,
        analysis_id: &'a str,
        scope_id: Option<&'a str>,
        skill_factor: f64,
        vulnerabilities: &'a HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            graph,
            analysis_id,
            scope_id,
            skill_factor,
            vulnerabilities,
        }
    }

    /// Score a path given as component ids.
    ///
    /// Returns None when the sequence has fewer than two nodes or does not
    /// follow graph edges.
    pub fn score(&self, ids: &[String]) -> Option<AttackPath> {
        if ids.len() < 2 {
            return None;
        }

        let nodes: Vec<&ComponentNode> = ids
            .iter()
            .map(|id| self.graph.get_node(id))
            .collect::<Option<_>>()?;
        let edges: Vec<&AttackEdge> = ids
            .windows(2)
            .map(|pair| self.graph.edge_by_id(&pair[0], &pair[1]))
            .collect::<Option<_>>()?;

        let entry = nodes.first()?;
        let target = nodes.last()?;

        let parts: Vec<&str> = ids.iter().map(String::as_str).collect();
        let id = deterministic_artifact_id("path", self.analysis_id, &parts);

        let path_type = path_type(&nodes, &edges);
        let complexity = path_complexity(&edges);
        let success_likelihood = success_likelihood(complexity, edges.len(), self.skill_factor);
        let impact = target_impact(target);
        let risk_score = risk_score(success_likelihood, &impact);

        let steps = self.steps(&id, &nodes, &edges);

        let route: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        let description = format!(
            "{} attack from {} to {} via {} ({} complexity)",
            path_type,
            entry.name,
            target.name,
            route.join(" -> "),
            complexity
        );

        Some(AttackPath {
            id,
            analysis_id: self.analysis_id.to_string(),
            scope_id: self.scope_id.map(str::to_string),
            name: format!("{} -> {}", entry.name, target.name),
            description,
            path_type,
            complexity,
            entry_point_id: entry.id.clone(),
            target_id: target.id.clone(),
            success_likelihood,
            impact,
            risk_score,
            steps,
        })
    }

    fn steps(
        &self,
        path_id: &str,
        nodes: &[&ComponentNode],
        edges: &[&AttackEdge],
    ) -> Vec<AttackStep> {
        let len = nodes.len();

        nodes
            .iter()
            .enumerate()
            .map(|(position, node)| {
                let step_type = step_type(node, position, len);
                let entering = position.checked_sub(1).map(|i| (nodes[i], edges[i]));

                let prerequisites = match entering {
                    None => initial_prerequisites(node),
                    Some((prev, edge)) => {
                        let mut reqs = vec![format!("Control of {}", prev.name)];
                        if edge.trust_boundary {
                            reqs.push(format!(
                                "Cross trust boundary {} -> {}",
                                prev.trust_zone, node.trust_zone
                            ));
                        }
                        reqs
                    }
                };

                let order = position as u32 + 1;
                AttackStep {
                    id: format!("{}-s{}", path_id, order),
                    path_id: path_id.to_string(),
                    component_id: node.id.clone(),
                    step_type,
                    description: format!("{} on {} ({})", step_type, node.name, node.kind),
                    prerequisites,
                    vulnerability_ids: self
                        .vulnerabilities
                        .get(&node.id)
                        .cloned()
                        .unwrap_or_default(),
                    threat_ids: entering
                        .map(|(_, edge)| edge.threat_ids.clone())
                        .unwrap_or_default(),
                    order,
                }
            })
            .collect()
    }
}

fn initial_prerequisites(node: &ComponentNode) -> Vec<String> {
    if node.access_points.is_empty() {
        vec![format!("Access to {}", node.name)]
    } else {
        node.access_points
            .iter()
            .map(|ap| format!("Access via {}", ap))
            .collect()
    }
}
