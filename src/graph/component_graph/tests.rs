use super::*;
use crate::inventory::Inventory;
use crate::models::{ComponentKind, Interface, SafetyLevel, TrustZone};

fn ecu(id: &str, zone: TrustZone) -> Component {
    Component::new(id, &id.to_uppercase(), ComponentKind::Ecu).with_trust_zone(zone)
}

fn build(components: Vec<Component>) -> ComponentGraph {
    let inventory = Inventory::new(components.clone());
    ComponentGraph::build(&components, &inventory).graph
}

#[test]
fn test_basic_operations() {
    let graph = build(vec![
        ecu("a", TrustZone::Standard).connected_to("b"),
        ecu("b", TrustZone::Standard),
    ]);

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.get_node("a").map(|n| n.name.as_str()), Some("A"));
    assert!(graph.edge_by_id("a", "b").is_some());
    assert!(graph.edge_by_id("b", "a").is_none());
}

#[test]
fn test_same_zone_edge_is_medium() {
    let graph = build(vec![
        ecu("a", TrustZone::Standard).connected_to("b"),
        ecu("b", TrustZone::Standard),
    ]);
    let edge = graph.edge_by_id("a", "b").expect("edge");
    assert!(!edge.trust_boundary);
    assert_eq!(edge.complexity, Complexity::Medium);
}

#[test]
fn test_trust_boundary_edge_is_high() {
    let graph = build(vec![
        ecu("a", TrustZone::Untrusted).connected_to("b"),
        ecu("b", TrustZone::Critical),
    ]);
    let edge = graph.edge_by_id("a", "b").expect("edge");
    assert!(edge.trust_boundary);
    assert_eq!(edge.complexity, Complexity::High);
}

#[test]
fn test_safety_critical_target_hardens_medium_edge() {
    let graph = build(vec![
        ecu("a", TrustZone::Standard).connected_to("b"),
        ecu("b", TrustZone::Standard).with_safety_level(SafetyLevel::AsilD),
    ]);
    assert_eq!(
        graph.edge_by_id("a", "b").expect("edge").complexity,
        Complexity::High
    );
}

#[test]
fn test_low_integrity_source_softens_high_edge() {
    let graph = build(vec![
        ecu("a", TrustZone::Untrusted)
            .with_safety_level(SafetyLevel::Qm)
            .connected_to("b"),
        ecu("b", TrustZone::Trusted),
    ]);
    assert_eq!(
        graph.edge_by_id("a", "b").expect("edge").complexity,
        Complexity::Medium
    );
}

#[test]
fn test_adjustments_apply_in_order() {
    // MEDIUM -> HIGH (ASIL_C target) -> MEDIUM (QM source) -> LOW (telnet)
    let graph = build(vec![
        ecu("a", TrustZone::Standard)
            .with_safety_level(SafetyLevel::Qm)
            .with_interface(Interface::Telnet)
            .connected_to("b"),
        ecu("b", TrustZone::Standard).with_safety_level(SafetyLevel::AsilC),
    ]);
    assert_eq!(
        graph.edge_by_id("a", "b").expect("edge").complexity,
        Complexity::Low
    );
}

#[test]
fn test_insecure_interface_on_target_degrades() {
    let graph = build(vec![
        ecu("a", TrustZone::Untrusted).connected_to("b"),
        ecu("b", TrustZone::Standard).with_interface(Interface::Bluetooth),
    ]);
    assert_eq!(
        graph.edge_by_id("a", "b").expect("edge").complexity,
        Complexity::Medium
    );
}

#[test]
fn test_unselected_endpoint_is_skipped() {
    let graph = build(vec![ecu("a", TrustZone::Standard).connected_to("elsewhere")]);
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_duplicate_connections_are_idempotent() {
    let mut graph = build(vec![
        ecu("a", TrustZone::Standard).connected_to("b").connected_to("b"),
        ecu("b", TrustZone::Standard),
    ]);
    assert_eq!(graph.edge_count(), 1);

    assert!(graph.add_connection("a", "b"));
    assert_eq!(graph.edge_count(), 1);

    // Self-loops never become edges
    assert!(!graph.add_connection("a", "a"));
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_build_is_deterministic() {
    let components = vec![
        ecu("a", TrustZone::Untrusted).connected_to("b").connected_to("c"),
        ecu("b", TrustZone::Standard).connected_to("c"),
        ecu("c", TrustZone::Critical),
    ];
    let first = build(components.clone());
    let second = build(components);
    assert_eq!(first.edges(), second.edges());
    assert_eq!(first.stats(), second.stats());
}

#[test]
fn test_single_node_graph_is_valid() {
    let graph = build(vec![ecu("solo", TrustZone::Critical)]);
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_connection_lookup_fallback() {
    let components = vec![ecu("a", TrustZone::Standard), ecu("b", TrustZone::Standard)];
    let inventory = Inventory::new(components.clone()).with_connection("a", "b");

    let graph = ComponentGraph::build(&components, &inventory).graph;
    assert!(graph.edge_by_id("a", "b").is_some());
}

#[test]
fn test_failed_lookup_isolates_node() {
    struct BrokenSource;

    impl ComponentSource for BrokenSource {
        fn fetch_components(&self, _ids: &[String]) -> anyhow::Result<Vec<Component>> {
            Ok(vec![])
        }

        fn connections_of(&self, _id: &str) -> anyhow::Result<Vec<String>> {
            anyhow::bail!("connection table unavailable")
        }
    }

    let components = vec![ecu("a", TrustZone::Standard), ecu("b", TrustZone::Standard)];
    let build = ComponentGraph::build(&components, &BrokenSource);
    assert_eq!(build.graph.node_count(), 2);
    assert_eq!(build.graph.edge_count(), 0);
    assert_eq!(build.warnings.len(), 2);
}

#[test]
fn test_update_edges_counts_replacements() {
    let mut graph = build(vec![
        ecu("a", TrustZone::Untrusted).connected_to("b"),
        ecu("b", TrustZone::Standard).connected_to("c"),
        ecu("c", TrustZone::Standard),
    ]);

    let changed = graph.update_edges(|_, _, edge| {
        edge.trust_boundary.then(|| AttackEdge {
            complexity: edge.complexity.degrade(),
            ..edge.clone()
        })
    });

    assert_eq!(changed, 1);
    assert_eq!(
        graph.edge_by_id("a", "b").expect("edge").complexity,
        Complexity::Medium
    );
    assert_eq!(
        graph.edge_by_id("b", "c").expect("edge").complexity,
        Complexity::Medium
    );
}

#[test]
fn test_stats() {
    let graph = build(vec![
        ecu("a", TrustZone::Untrusted).connected_to("b"),
        ecu("b", TrustZone::Standard).connected_to("c"),
        ecu("c", TrustZone::Standard),
    ]);
    let stats = graph.stats();
    assert_eq!(stats.nodes, 3);
    assert_eq!(stats.edges, 2);
    assert_eq!(stats.trust_boundary_edges, 1);
    assert_eq!(stats.high_complexity_edges, 1);
    assert_eq!(stats.medium_complexity_edges, 1);
}
