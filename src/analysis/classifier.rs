//! Entry point and target selection
//!
//! Explicit overrides win. Otherwise attribute heuristics pick the sets, and
//! when they match nothing a deterministic fallback keeps the analysis going.

use super::context::AnalysisContext;
use crate::models::{
    Component, Location, SafetyLevel, SelectionSource, TrustZone, EXPOSED_ACCESS_POINTS,
    TARGET_DATA_TYPES,
};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Chosen endpoints plus how they were chosen
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub entry_points: Vec<String>,
    pub targets: Vec<String>,
    pub entry_point_source: SelectionSource,
    pub target_source: SelectionSource,
    pub warnings: Vec<String>,
}

impl Classification {
    /// A fallback replaced heuristic selection
    pub fn is_degraded(&self) -> bool {
        self.entry_point_source == SelectionSource::Fallback
            || self.target_source == SelectionSource::Fallback
    }
}

/// Whether an attacker can plausibly start from this component
pub fn is_entry_point(component: &Component, ctx: &AnalysisContext) -> bool {
    if component.location == Location::External && ctx.permits_external_location() {
        return true;
    }

    let exposed = component
        .access_points
        .iter()
        .any(|ap| EXPOSED_ACCESS_POINTS.contains(ap) && ctx.permitted_access(*ap));
    if exposed {
        return true;
    }

    matches!(component.trust_zone, TrustZone::Untrusted | TrustZone::Boundary)
}

/// Whether compromising this component is an attacker objective
pub fn is_target(component: &Component) -> bool {
    matches!(
        component.safety_level,
        Some(SafetyLevel::AsilC | SafetyLevel::AsilD)
    ) || component.trust_zone == TrustZone::Critical
        || component
            .data_types
            .iter()
            .any(|d| TARGET_DATA_TYPES.contains(d))
}

/// Pick entry points and targets among the selected components.
///
/// `components` must be in request order; output order follows it.
pub fn classify(
    components: &[Component],
    primary_id: &str,
    entry_overrides: Option<&[String]>,
    target_overrides: Option<&[String]>,
    ctx: &AnalysisContext,
) -> Classification {
    let selected: HashSet<&str> = components.iter().map(|c| c.id.as_str()).collect();
    let mut warnings = Vec::new();

    let (entry_points, entry_point_source) = match entry_overrides {
        Some(ids) => (
            keep_selected(ids, &selected, "entry point", &mut warnings),
            SelectionSource::Override,
        ),
        None => {
            let found: Vec<String> = components
                .iter()
                .filter(|c| is_entry_point(c, ctx))
                .map(|c| c.id.clone())
                .collect();
            if found.is_empty() {
                let msg = format!(
                    "No entry points matched; using primary component '{}'",
                    primary_id
                );
                warn!("{}", msg);
                warnings.push(msg);
                (vec![primary_id.to_string()], SelectionSource::Fallback)
            } else {
                (found, SelectionSource::Heuristic)
            }
        }
    };

    let (targets, target_source) = match target_overrides {
        Some(ids) => (
            keep_selected(ids, &selected, "target", &mut warnings),
            SelectionSource::Override,
        ),
        None => {
            let found: Vec<String> = components
                .iter()
                .filter(|c| is_target(c))
                .map(|c| c.id.clone())
                .collect();
            if found.is_empty() {
                let others: Vec<String> = components
                    .iter()
                    .filter(|c| c.id != primary_id)
                    .map(|c| c.id.clone())
                    .collect();
                let fallback = if others.is_empty() {
                    vec![primary_id.to_string()]
                } else {
                    others
                };
                let msg = format!(
                    "No critical targets matched; treating {} component(s) as targets",
                    fallback.len()
                );
                warn!("{}", msg);
                warnings.push(msg);
                (fallback, SelectionSource::Fallback)
            } else {
                (found, SelectionSource::Heuristic)
            }
        }
    };

    debug!(
        "Classified {} entry point(s) ({:?}) and {} target(s) ({:?})",
        entry_points.len(),
        entry_point_source,
        targets.len(),
        target_source
    );

    Classification {
        entry_points,
        targets,
        entry_point_source,
        target_source,
        warnings,
    }
}

/// Keep override ids that are selected, in caller order, without duplicates
fn keep_selected(
    ids: &[String],
    selected: &HashSet<&str>,
    role: &str,
    warnings: &mut Vec<String>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(ids.len());
    for id in ids {
        if !selected.contains(id.as_str()) {
            let msg = format!("Ignoring {} override '{}': not a selected component", role, id);
            warn!("{}", msg);
            warnings.push(msg);
            continue;
        }
        if seen.insert(id.as_str()) {
            kept.push(id.clone());
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConstraintSettings;
    use crate::models::{AccessPoint, AnalysisRequest, ComponentKind, DataType};

    fn ctx() -> AnalysisContext {
        AnalysisContext::new(&AnalysisRequest::new("a", &["a"]), &ConstraintSettings::default())
    }

    fn enforcing(constraint: &str) -> AnalysisContext {
        AnalysisContext::new(
            &AnalysisRequest::new("a", &["a"]).with_constraint(constraint),
            &ConstraintSettings {
                enforce_access_constraints: true,
            },
        )
    }

    fn ecu(id: &str) -> Component {
        Component::new(id, id, ComponentKind::Ecu)
    }

    #[test]
    fn test_entry_point_heuristics() {
        let ctx = ctx();
        assert!(is_entry_point(&ecu("a").with_location(Location::External), &ctx));
        assert!(is_entry_point(&ecu("a").with_access_point(AccessPoint::Usb), &ctx));
        assert!(is_entry_point(&ecu("a").with_trust_zone(TrustZone::Boundary), &ctx));
        assert!(!is_entry_point(&ecu("a").with_access_point(AccessPoint::Debug), &ctx));
        assert!(!is_entry_point(&ecu("a"), &ctx));
    }

    #[test]
    fn test_target_heuristics() {
        assert!(is_target(&ecu("a").with_safety_level(SafetyLevel::AsilC)));
        assert!(is_target(&ecu("a").with_trust_zone(TrustZone::Critical)));
        assert!(is_target(&ecu("a").with_data_type(DataType::Credential)));
        assert!(!is_target(&ecu("a").with_safety_level(SafetyLevel::AsilB)));
        assert!(!is_target(&ecu("a").with_data_type(DataType::Telemetry)));
    }

    #[test]
    fn test_enforced_remote_exclusion() {
        let ctx = enforcing("exclude_remote_access");
        let telematics = ecu("tcu")
            .with_location(Location::External)
            .with_access_point(AccessPoint::Internet);
        assert!(!is_entry_point(&telematics, &ctx));

        // Zone criterion still applies
        assert!(is_entry_point(&telematics.with_trust_zone(TrustZone::Untrusted), &ctx));
        // Physical access is untouched
        assert!(is_entry_point(&ecu("obd").with_access_point(AccessPoint::Usb), &ctx));
    }

    #[test]
    fn test_heuristic_classification() {
        let components = vec![
            ecu("a")
                .with_location(Location::External)
                .with_trust_zone(TrustZone::Untrusted)
                .with_access_point(AccessPoint::Usb),
            ecu("b")
                .with_trust_zone(TrustZone::Critical)
                .with_safety_level(SafetyLevel::AsilD),
        ];
        let result = classify(&components, "a", None, None, &ctx());
        assert_eq!(result.entry_points, vec!["a"]);
        assert_eq!(result.targets, vec!["b"]);
        assert_eq!(result.entry_point_source, SelectionSource::Heuristic);
        assert!(!result.is_degraded());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_fallbacks() {
        let components = vec![ecu("p"), ecu("q"), ecu("r")];
        let result = classify(&components, "q", None, None, &ctx());
        assert_eq!(result.entry_points, vec!["q"]);
        assert_eq!(result.targets, vec!["p", "r"]);
        assert_eq!(result.entry_point_source, SelectionSource::Fallback);
        assert_eq!(result.target_source, SelectionSource::Fallback);
        assert!(result.is_degraded());
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_single_component_fallback_targets_primary() {
        let result = classify(&[ecu("solo")], "solo", None, None, &ctx());
        assert_eq!(result.entry_points, vec!["solo"]);
        assert_eq!(result.targets, vec!["solo"]);
    }

    #[test]
    fn test_overrides_filtered_to_selection() {
        let components = vec![ecu("a"), ecu("b"), ecu("c")];
        let entries = vec!["c".to_string(), "zz".to_string(), "c".to_string()];
        let targets = vec!["a".to_string()];
        let result = classify(&components, "a", Some(&entries), Some(&targets), &ctx());

        assert_eq!(result.entry_points, vec!["c"]);
        assert_eq!(result.targets, vec!["a"]);
        assert_eq!(result.entry_point_source, SelectionSource::Override);
        assert_eq!(result.warnings.len(), 1);
        assert!(!result.is_degraded());
    }

    #[test]
    fn test_classification_is_deterministic() {
        let components = vec![
            ecu("x").with_trust_zone(TrustZone::Boundary),
            ecu("y").with_data_type(DataType::Key),
            ecu("z").with_access_point(AccessPoint::Bluetooth),
        ];
        let first = classify(&components, "x", None, None, &ctx());
        let second = classify(&components, "x", None, None, &ctx());
        assert_eq!(first, second);
        assert_eq!(first.entry_points, vec!["x", "z"]);
    }
}
