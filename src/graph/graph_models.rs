use crate::models::{
    AccessPoint, Complexity, Component, ComponentKind, DataType, Interface, SafetyLevel,
    TrustZone, VehicleDomain, INSECURE_INTERFACES,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A component as seen by the path search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub id: String,
    pub name: String,
    pub kind: ComponentKind,
    pub safety_level: Option<SafetyLevel>,
    pub trust_zone: TrustZone,
    pub interfaces: BTreeSet<Interface>,
    pub access_points: BTreeSet<AccessPoint>,
    pub data_types: BTreeSet<DataType>,
    pub domain: Option<VehicleDomain>,
}

impl From<&Component> for ComponentNode {
    fn from(c: &Component) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            kind: c.kind,
            safety_level: c.safety_level,
            trust_zone: c.trust_zone,
            interfaces: c.interfaces.clone(),
            access_points: c.access_points.clone(),
            data_types: c.data_types.clone(),
            domain: c.domain,
        }
    }
}

impl ComponentNode {
    pub fn has_interface_in(&self, set: &[Interface]) -> bool {
        self.interfaces.iter().any(|i| set.contains(i))
    }

    pub fn has_data_in(&self, set: &[DataType]) -> bool {
        self.data_types.iter().any(|d| set.contains(d))
    }
}

/// A directed connection an attacker may traverse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackEdge {
    /// Endpoints sit in different trust zones
    pub trust_boundary: bool,
    pub complexity: Complexity,
    /// Threat scenarios that softened this edge
    #[serde(default)]
    pub threat_ids: Vec<String>,
}

impl AttackEdge {
    /// Derive edge attributes from its endpoints.
    ///
    /// Adjustments apply in order: safety-critical targets harden MEDIUM
    /// edges, low-integrity sources soften HIGH edges, and insecure protocols
    /// on either side degrade one level.
    pub fn between(src: &ComponentNode, dst: &ComponentNode) -> Self {
        let trust_boundary = src.trust_zone != dst.trust_zone;
        let mut complexity = if trust_boundary {
            Complexity::High
        } else {
            Complexity::Medium
        };

        if complexity == Complexity::Medium
            && dst.safety_level.is_some_and(SafetyLevel::is_safety_critical)
        {
            complexity = Complexity::High;
        }

        if complexity == Complexity::High
            && matches!(src.safety_level, Some(SafetyLevel::Qm | SafetyLevel::AsilA))
        {
            complexity = Complexity::Medium;
        }

        if src.has_interface_in(INSECURE_INTERFACES) || dst.has_interface_in(INSECURE_INTERFACES) {
            complexity = complexity.degrade();
        }

        Self {
            trust_boundary,
            complexity,
            threat_ids: Vec::new(),
        }
    }
}
