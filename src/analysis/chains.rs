//! Chain aggregation
//!
//! Paths that share any component belong to the same chain, transitively.
//! This is a connected-components problem over paths, solved with a
//! union-find keyed by a component -> paths reverse index.

use crate::graph::{ComponentGraph, ComponentNode};
use crate::models::{
    deterministic_artifact_id, risk_score, AttackChain, AttackGoal, AttackPath,
    Complexity, DataType, Impact,
};
use petgraph::unionfind::UnionFind;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use tracing::debug;

const CREDENTIAL_DATA: &[DataType] = &[DataType::Key, DataType::Credential, DataType::Certificate];
const PERSONAL_DATA: &[DataType] = &[DataType::Personal, DataType::User, DataType::Driver];

/// Group paths into chains of at least two members.
///
/// Chains are ordered by their first member path; members keep path order.
pub fn aggregate(
    paths: &[AttackPath],
    graph: &ComponentGraph,
    analysis_id: &str,
    scope_id: Option<&str>,
) -> Vec<AttackChain> {
    if paths.len() < 2 {
        return Vec::new();
    }

    let mut by_component: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for (i, path) in paths.iter().enumerate() {
        let touched = std::iter::once(path.entry_point_id.as_str())
            .chain(path.component_ids())
            .chain(std::iter::once(path.target_id.as_str()));
        for component in touched {
            let members = by_component.entry(component).or_default();
            if members.last() != Some(&i) {
                members.push(i);
            }
        }
    }

    let mut sets = UnionFind::<usize>::new(paths.len());
    for members in by_component.values() {
        for pair in members.windows(2) {
            sets.union(pair[0], pair[1]);
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_of_root: FxHashMap<usize, usize> = FxHashMap::default();
    for i in 0..paths.len() {
        let root = sets.find(i);
        let slot = *group_of_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(i);
    }

    let chains: Vec<AttackChain> = groups
        .into_iter()
        .filter(|members| members.len() > 1)
        .map(|members| {
            let members: Vec<&AttackPath> = members.iter().map(|&i| &paths[i]).collect();
            build_chain(&members, graph, analysis_id, scope_id)
        })
        .collect();

    debug!("Aggregated {} path(s) into {} chain(s)", paths.len(), chains.len());
    chains
}

fn build_chain(
    members: &[&AttackPath],
    graph: &ComponentGraph,
    analysis_id: &str,
    scope_id: Option<&str>,
) -> AttackChain {
    let entry_points: BTreeSet<String> = members.iter().map(|p| p.entry_point_id.clone()).collect();
    let targets: BTreeSet<String> = members.iter().map(|p| p.target_id.clone()).collect();

    let complexity = members
        .iter()
        .map(|p| p.complexity)
        .max()
        .unwrap_or(Complexity::Medium);
    let success_likelihood =
        members.iter().map(|p| p.success_likelihood).sum::<f64>() / members.len() as f64;
    let impact = members
        .iter()
        .map(|p| p.impact)
        .reduce(|acc, i| acc.merge_max(&i))
        .unwrap_or_else(Impact::baseline);
    let risk_score = risk_score(success_likelihood, &impact);

    let target_nodes: Vec<&ComponentNode> =
        targets.iter().filter_map(|id| graph.get_node(id)).collect();
    let attack_goal = attack_goal(&target_nodes);

    let path_ids: Vec<String> = members.iter().map(|p| p.id.clone()).collect();
    let id_parts: Vec<&str> = path_ids.iter().map(String::as_str).collect();

    AttackChain {
        id: deterministic_artifact_id("chain", analysis_id, &id_parts),
        analysis_id: analysis_id.to_string(),
        scope_id: scope_id.map(str::to_string),
        name: format!("{} ({} paths)", attack_goal, members.len()),
        description: format!(
            "{} paths from {} entry point(s) to {} target(s) sharing components",
            members.len(),
            entry_points.len(),
            targets.len()
        ),
        entry_points,
        targets,
        attack_goal,
        complexity,
        success_likelihood,
        impact,
        risk_score,
        path_ids,
    }
}

/// First matching goal rule over the chain's target components
pub fn attack_goal(targets: &[&ComponentNode]) -> AttackGoal {
    let any = |pred: &dyn Fn(&ComponentNode) -> bool| targets.iter().any(|n| pred(*n));

    if any(&|n| n.kind.is_control_unit() && n.domain.is_some_and(|d| d.is_motion_safety())) {
        AttackGoal::SafetySystemCompromise
    } else if any(&|n| n.kind.is_control_unit()) {
        AttackGoal::VehicleControlCompromise
    } else if any(&|n| n.kind.is_network_infrastructure()) {
        AttackGoal::NetworkInfrastructureCompromise
    } else if any(&|n| n.has_data_in(CREDENTIAL_DATA)) {
        AttackGoal::CredentialTheft
    } else if any(&|n| n.has_data_in(PERSONAL_DATA)) {
        AttackGoal::PersonalDataExfiltration
    } else if any(&|n| n.kind.is_perception()) {
        AttackGoal::SensorTampering
    } else {
        AttackGoal::MultipleSystemCompromise
    }
}
