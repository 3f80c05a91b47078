//! Core data models for attackpath
//!
//! Components come from the external inventory and are read-only. Paths,
//! steps and chains are produced once per analysis run and never mutated
//! afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;

/// Generate a deterministic artifact ID from its owning analysis and content.
///
/// Re-running the same analysis id over the same inventory yields the same
/// path and chain ids, which keeps exported reports diffable.
pub fn deterministic_artifact_id(kind: &str, analysis_id: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update(b"\n");
    hasher.update(analysis_id.as_bytes());
    for part in parts {
        hasher.update(b"\n");
        hasher.update(part.as_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    format!("{}-{}", kind, &digest[..16])
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Lowercase and unify separators so `ASIL-C`, `asil c` and `asil_c` compare equal.
fn normalize_tag(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' | '.' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

// ==================== Classification Enums ====================

/// ISO 26262 automotive safety integrity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum SafetyLevel {
    #[serde(rename = "QM")]
    Qm,
    #[serde(rename = "ASIL_A")]
    AsilA,
    #[serde(rename = "ASIL_B")]
    AsilB,
    #[serde(rename = "ASIL_C")]
    AsilC,
    #[serde(rename = "ASIL_D")]
    AsilD,
}

impl TryFrom<String> for SafetyLevel {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let tag = normalize_tag(&raw);
        let level = tag.strip_prefix("asil_").unwrap_or(&tag);
        match level {
            "qm" => Ok(SafetyLevel::Qm),
            "a" => Ok(SafetyLevel::AsilA),
            "b" => Ok(SafetyLevel::AsilB),
            "c" => Ok(SafetyLevel::AsilC),
            "d" => Ok(SafetyLevel::AsilD),
            _ => Err(format!("unknown safety level '{}'", raw)),
        }
    }
}

impl SafetyLevel {
    /// ASIL C and D components are safety-critical targets
    pub fn is_safety_critical(self) -> bool {
        matches!(self, SafetyLevel::AsilC | SafetyLevel::AsilD)
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyLevel::Qm => write!(f, "QM"),
            SafetyLevel::AsilA => write!(f, "ASIL_A"),
            SafetyLevel::AsilB => write!(f, "ASIL_B"),
            SafetyLevel::AsilC => write!(f, "ASIL_C"),
            SafetyLevel::AsilD => write!(f, "ASIL_D"),
        }
    }
}

/// Ordinal trust classification of a component
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "String", rename_all = "lowercase")]
pub enum TrustZone {
    Untrusted = 0,
    Boundary = 1,
    #[default]
    Standard = 2,
    Trusted = 3,
    Critical = 4,
}

impl TryFrom<String> for TrustZone {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match normalize_tag(&raw).as_str() {
            "untrusted" | "external" => Ok(TrustZone::Untrusted),
            "boundary" | "dmz" => Ok(TrustZone::Boundary),
            "standard" => Ok(TrustZone::Standard),
            "trusted" => Ok(TrustZone::Trusted),
            "critical" => Ok(TrustZone::Critical),
            _ => Err(format!("unknown trust zone '{}'", raw)),
        }
    }
}

impl TrustZone {
    pub fn ordinal(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for TrustZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustZone::Untrusted => write!(f, "untrusted"),
            TrustZone::Boundary => write!(f, "boundary"),
            TrustZone::Standard => write!(f, "standard"),
            TrustZone::Trusted => write!(f, "trusted"),
            TrustZone::Critical => write!(f, "critical"),
        }
    }
}

/// Physical placement relative to the vehicle perimeter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", rename_all = "lowercase")]
pub enum Location {
    #[default]
    Internal,
    External,
}

impl TryFrom<String> for Location {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match normalize_tag(&raw).as_str() {
            "internal" => Ok(Location::Internal),
            "external" => Ok(Location::External),
            _ => Err(format!("unknown location '{}'", raw)),
        }
    }
}

/// Component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "snake_case")]
pub enum ComponentKind {
    Ecu,
    Controller,
    Gateway,
    Proxy,
    Telematics,
    Sensor,
    Camera,
    Lidar,
    Radar,
    Infotainment,
    Network,
    Actuator,
    Other,
}

impl From<String> for ComponentKind {
    fn from(raw: String) -> Self {
        ComponentKind::from(raw.as_str())
    }
}

impl From<&str> for ComponentKind {
    fn from(raw: &str) -> Self {
        match normalize_tag(raw).as_str() {
            "ecu" => ComponentKind::Ecu,
            "controller" | "domain_controller" | "zone_controller" => ComponentKind::Controller,
            "gateway" | "central_gateway" => ComponentKind::Gateway,
            "proxy" => ComponentKind::Proxy,
            "telematics" | "tcu" | "telematics_unit" => ComponentKind::Telematics,
            "sensor" => ComponentKind::Sensor,
            "camera" => ComponentKind::Camera,
            "lidar" => ComponentKind::Lidar,
            "radar" => ComponentKind::Radar,
            "infotainment" | "ivi" | "head_unit" => ComponentKind::Infotainment,
            "network" | "bus" | "can_bus" | "switch" => ComponentKind::Network,
            "actuator" => ComponentKind::Actuator,
            _ => ComponentKind::Other,
        }
    }
}

impl ComponentKind {
    /// ECUs and domain/zone controllers
    pub fn is_control_unit(self) -> bool {
        matches!(self, ComponentKind::Ecu | ComponentKind::Controller)
    }

    /// Components that forward traffic between networks
    pub fn is_relay(self) -> bool {
        matches!(self, ComponentKind::Gateway | ComponentKind::Proxy)
    }

    pub fn is_network_infrastructure(self) -> bool {
        matches!(self, ComponentKind::Gateway | ComponentKind::Telematics)
    }

    pub fn is_perception(self) -> bool {
        matches!(
            self,
            ComponentKind::Sensor | ComponentKind::Camera | ComponentKind::Lidar | ComponentKind::Radar
        )
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentKind::Ecu => "ecu",
            ComponentKind::Controller => "controller",
            ComponentKind::Gateway => "gateway",
            ComponentKind::Proxy => "proxy",
            ComponentKind::Telematics => "telematics",
            ComponentKind::Sensor => "sensor",
            ComponentKind::Camera => "camera",
            ComponentKind::Lidar => "lidar",
            ComponentKind::Radar => "radar",
            ComponentKind::Infotainment => "infotainment",
            ComponentKind::Network => "network",
            ComponentKind::Actuator => "actuator",
            ComponentKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Vehicle function domain a component belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "snake_case")]
pub enum VehicleDomain {
    Braking,
    Steering,
    Powertrain,
    Chassis,
    Body,
    Adas,
    Infotainment,
    Other,
}

impl From<String> for VehicleDomain {
    fn from(raw: String) -> Self {
        match normalize_tag(&raw).as_str() {
            "braking" | "brake" | "brakes" => VehicleDomain::Braking,
            "steering" => VehicleDomain::Steering,
            "powertrain" | "engine" => VehicleDomain::Powertrain,
            "chassis" => VehicleDomain::Chassis,
            "body" => VehicleDomain::Body,
            "adas" => VehicleDomain::Adas,
            "infotainment" => VehicleDomain::Infotainment,
            _ => VehicleDomain::Other,
        }
    }
}

impl VehicleDomain {
    pub fn is_motion_safety(self) -> bool {
        matches!(self, VehicleDomain::Braking | VehicleDomain::Steering)
    }
}

/// Communication interface exposed by a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "snake_case")]
pub enum Interface {
    Can,
    CanFd,
    Lin,
    Flexray,
    Ethernet,
    Http,
    Https,
    Ftp,
    Telnet,
    Mqtt,
    Bluetooth,
    Wifi,
    Wireless,
    Cellular,
    Usb,
    Obd,
    V2x,
    Gps,
    Other,
}

impl From<String> for Interface {
    fn from(raw: String) -> Self {
        match normalize_tag(&raw).as_str() {
            "can" => Interface::Can,
            "can_fd" | "canfd" => Interface::CanFd,
            "lin" => Interface::Lin,
            "flexray" => Interface::Flexray,
            "ethernet" | "automotive_ethernet" | "doip" => Interface::Ethernet,
            "http" => Interface::Http,
            "https" => Interface::Https,
            "ftp" => Interface::Ftp,
            "telnet" => Interface::Telnet,
            "mqtt" => Interface::Mqtt,
            "bluetooth" | "ble" => Interface::Bluetooth,
            "wifi" | "wlan" => Interface::Wifi,
            "wireless" => Interface::Wireless,
            "cellular" | "lte" | "4g" | "5g" => Interface::Cellular,
            "usb" => Interface::Usb,
            "obd" | "obd_ii" | "obd2" => Interface::Obd,
            "v2x" => Interface::V2x,
            "gps" | "gnss" => Interface::Gps,
            _ => Interface::Other,
        }
    }
}

/// Plaintext or weakly authenticated protocols that make an edge easier to traverse
pub const INSECURE_INTERFACES: &[Interface] = &[
    Interface::Http,
    Interface::Ftp,
    Interface::Telnet,
    Interface::Mqtt,
    Interface::Bluetooth,
];

/// Media on which sender identity is trivially forged
pub const SPOOFABLE_INTERFACES: &[Interface] = &[
    Interface::Can,
    Interface::Bluetooth,
    Interface::Wifi,
    Interface::Wireless,
];

/// How an attacker can reach a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "snake_case")]
pub enum AccessPoint {
    Internet,
    Public,
    Wireless,
    Ota,
    Usb,
    Bluetooth,
    Obd,
    Debug,
    Physical,
    Other,
}

impl From<String> for AccessPoint {
    fn from(raw: String) -> Self {
        match normalize_tag(&raw).as_str() {
            "internet" | "cloud" => AccessPoint::Internet,
            "public" => AccessPoint::Public,
            "wireless" | "wifi" | "cellular" => AccessPoint::Wireless,
            "ota" => AccessPoint::Ota,
            "usb" => AccessPoint::Usb,
            "bluetooth" => AccessPoint::Bluetooth,
            "obd" | "obd_ii" | "obd2" => AccessPoint::Obd,
            "debug" | "jtag" | "uart" => AccessPoint::Debug,
            "physical" => AccessPoint::Physical,
            _ => AccessPoint::Other,
        }
    }
}

impl AccessPoint {
    pub fn is_remote(self) -> bool {
        matches!(self, AccessPoint::Internet | AccessPoint::Public | AccessPoint::Ota)
    }

    pub fn is_wireless(self) -> bool {
        matches!(self, AccessPoint::Wireless | AccessPoint::Bluetooth)
    }

    pub fn is_physical(self) -> bool {
        matches!(
            self,
            AccessPoint::Usb | AccessPoint::Obd | AccessPoint::Debug | AccessPoint::Physical
        )
    }
}

impl fmt::Display for AccessPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessPoint::Internet => "internet",
            AccessPoint::Public => "public",
            AccessPoint::Wireless => "wireless",
            AccessPoint::Ota => "ota",
            AccessPoint::Usb => "usb",
            AccessPoint::Bluetooth => "bluetooth",
            AccessPoint::Obd => "obd",
            AccessPoint::Debug => "debug",
            AccessPoint::Physical => "physical",
            AccessPoint::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Access points that make a component an attacker entry point
pub const EXPOSED_ACCESS_POINTS: &[AccessPoint] = &[
    AccessPoint::Internet,
    AccessPoint::Public,
    AccessPoint::Wireless,
    AccessPoint::Ota,
    AccessPoint::Usb,
    AccessPoint::Bluetooth,
];

/// Category of data a component stores or processes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "snake_case")]
pub enum DataType {
    Key,
    Credential,
    Certificate,
    Personal,
    Private,
    User,
    Driver,
    Safety,
    Control,
    Command,
    Telemetry,
    Diagnostic,
    Firmware,
    Other,
}

impl From<String> for DataType {
    fn from(raw: String) -> Self {
        match normalize_tag(&raw).as_str() {
            "key" | "keys" | "crypto_key" => DataType::Key,
            "credential" | "credentials" | "password" => DataType::Credential,
            "certificate" | "certificates" => DataType::Certificate,
            "personal" | "pii" => DataType::Personal,
            "private" => DataType::Private,
            "user" => DataType::User,
            "driver" => DataType::Driver,
            "safety" => DataType::Safety,
            "control" => DataType::Control,
            "command" | "commands" => DataType::Command,
            "telemetry" => DataType::Telemetry,
            "diagnostic" | "diagnostics" => DataType::Diagnostic,
            "firmware" => DataType::Firmware,
            _ => DataType::Other,
        }
    }
}

/// Data that makes a component a high-value target
pub const TARGET_DATA_TYPES: &[DataType] = &[
    DataType::Key,
    DataType::Credential,
    DataType::Personal,
    DataType::Safety,
    DataType::Control,
];

// ==================== Inventory ====================

/// A connected vehicle component (read-only input from the inventory)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: ComponentKind,
    #[serde(default)]
    pub safety_level: Option<SafetyLevel>,
    #[serde(default)]
    pub trust_zone: TrustZone,
    #[serde(default)]
    pub interfaces: BTreeSet<Interface>,
    #[serde(default)]
    pub access_points: BTreeSet<AccessPoint>,
    #[serde(default)]
    pub data_types: BTreeSet<DataType>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub domain: Option<VehicleDomain>,
    /// Outgoing connection ids
    #[serde(default)]
    pub connections: Vec<String>,
}

impl Component {
    pub fn new(id: &str, name: &str, kind: ComponentKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            safety_level: None,
            trust_zone: TrustZone::default(),
            interfaces: BTreeSet::new(),
            access_points: BTreeSet::new(),
            data_types: BTreeSet::new(),
            location: Location::default(),
            domain: None,
            connections: Vec::new(),
        }
    }

    pub fn with_safety_level(mut self, level: SafetyLevel) -> Self {
        self.safety_level = Some(level);
        self
    }

    pub fn with_trust_zone(mut self, zone: TrustZone) -> Self {
        self.trust_zone = zone;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_domain(mut self, domain: VehicleDomain) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn with_interface(mut self, interface: Interface) -> Self {
        self.interfaces.insert(interface);
        self
    }

    pub fn with_access_point(mut self, access: AccessPoint) -> Self {
        self.access_points.insert(access);
        self
    }

    pub fn with_data_type(mut self, data: DataType) -> Self {
        self.data_types.insert(data);
        self
    }

    pub fn connected_to(mut self, id: &str) -> Self {
        self.connections.push(id.to_string());
        self
    }
}

/// Severity levels for vulnerabilities
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// A known vulnerability and the components it affects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub cvss: Option<f64>,
    #[serde(default)]
    pub component_ids: Vec<String>,
}

// ==================== Scoring Primitives ====================

/// Effort needed to traverse an edge or complete a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    /// One level easier (HIGH→MEDIUM→LOW, LOW stays LOW)
    pub fn degrade(self) -> Self {
        match self {
            Complexity::High => Complexity::Medium,
            Complexity::Medium | Complexity::Low => Complexity::Low,
        }
    }

    /// Base success likelihood for a path of this complexity
    pub fn base_likelihood(self) -> f64 {
        match self {
            Complexity::High => 0.3,
            Complexity::Medium => 0.6,
            Complexity::Low => 0.9,
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Low => write!(f, "LOW"),
            Complexity::Medium => write!(f, "MEDIUM"),
            Complexity::High => write!(f, "HIGH"),
        }
    }
}

/// CIA impact ratings on a 1-10 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impact {
    pub confidentiality: u8,
    pub integrity: u8,
    pub availability: u8,
}

impl Impact {
    /// Neutral starting point before target attributes raise it
    pub fn baseline() -> Self {
        Self {
            confidentiality: 5,
            integrity: 5,
            availability: 5,
        }
    }

    pub fn max_value(&self) -> u8 {
        self.confidentiality.max(self.integrity).max(self.availability)
    }

    pub fn raise_confidentiality(&mut self, value: u8) {
        self.confidentiality = self.confidentiality.max(value);
    }

    pub fn raise_integrity(&mut self, value: u8) {
        self.integrity = self.integrity.max(value);
    }

    pub fn raise_availability(&mut self, value: u8) {
        self.availability = self.availability.max(value);
    }

    /// Per-dimension maximum of two ratings
    pub fn merge_max(&self, other: &Impact) -> Impact {
        Impact {
            confidentiality: self.confidentiality.max(other.confidentiality),
            integrity: self.integrity.max(other.integrity),
            availability: self.availability.max(other.availability),
        }
    }
}

/// Risk score shared by paths and chains: likelihood × worst CIA impact, one decimal.
pub fn risk_score(success_likelihood: f64, impact: &Impact) -> f64 {
    round_to(success_likelihood * f64::from(impact.max_value()), 1)
}

// ==================== Analysis Artifacts ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathType {
    Direct,
    MultiStep,
    Lateral,
    PrivilegeEscalation,
}

impl fmt::Display for PathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathType::Direct => write!(f, "direct"),
            PathType::MultiStep => write!(f, "multi-step"),
            PathType::Lateral => write!(f, "lateral"),
            PathType::PrivilegeEscalation => write!(f, "privilege escalation"),
        }
    }
}

/// ATT&CK-style tactic for a single attack step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    InitialAccess,
    Execution,
    Persistence,
    PrivilegeEscalation,
    DefenseEvasion,
    CredentialAccess,
    Discovery,
    LateralMovement,
    Collection,
    Exfiltration,
    Impact,
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepType::InitialAccess => "Initial Access",
            StepType::Execution => "Execution",
            StepType::Persistence => "Persistence",
            StepType::PrivilegeEscalation => "Privilege Escalation",
            StepType::DefenseEvasion => "Defense Evasion",
            StepType::CredentialAccess => "Credential Access",
            StepType::Discovery => "Discovery",
            StepType::LateralMovement => "Lateral Movement",
            StepType::Collection => "Collection",
            StepType::Exfiltration => "Exfiltration",
            StepType::Impact => "Impact",
        };
        write!(f, "{}", name)
    }
}

/// One component visited along an attack path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackStep {
    pub id: String,
    pub path_id: String,
    pub component_id: String,
    pub step_type: StepType,
    pub description: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub vulnerability_ids: Vec<String>,
    #[serde(default)]
    pub threat_ids: Vec<String>,
    pub order: u32,
}

/// A scored attacker route from an entry point to a target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackPath {
    pub id: String,
    pub analysis_id: String,
    #[serde(default)]
    pub scope_id: Option<String>,
    pub name: String,
    pub description: String,
    pub path_type: PathType,
    pub complexity: Complexity,
    pub entry_point_id: String,
    pub target_id: String,
    pub success_likelihood: f64,
    pub impact: Impact,
    pub risk_score: f64,
    pub steps: Vec<AttackStep>,
}

impl AttackPath {
    /// Component ids in traversal order
    pub fn component_ids(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.component_id.as_str())
    }

    pub fn node_count(&self) -> usize {
        self.steps.len()
    }
}

/// Objective attributed to a chain of related paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackGoal {
    #[serde(rename = "Safety System Compromise")]
    SafetySystemCompromise,
    #[serde(rename = "Vehicle Control System Compromise")]
    VehicleControlCompromise,
    #[serde(rename = "Network Infrastructure Compromise")]
    NetworkInfrastructureCompromise,
    #[serde(rename = "Credential Theft")]
    CredentialTheft,
    #[serde(rename = "Personal Data Exfiltration")]
    PersonalDataExfiltration,
    #[serde(rename = "Sensor Tampering")]
    SensorTampering,
    #[serde(rename = "Multiple System Compromise")]
    MultipleSystemCompromise,
}

impl fmt::Display for AttackGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttackGoal::SafetySystemCompromise => "Safety System Compromise",
            AttackGoal::VehicleControlCompromise => "Vehicle Control System Compromise",
            AttackGoal::NetworkInfrastructureCompromise => "Network Infrastructure Compromise",
            AttackGoal::CredentialTheft => "Credential Theft",
            AttackGoal::PersonalDataExfiltration => "Personal Data Exfiltration",
            AttackGoal::SensorTampering => "Sensor Tampering",
            AttackGoal::MultipleSystemCompromise => "Multiple System Compromise",
        };
        write!(f, "{}", name)
    }
}

/// Composite attack scenario made of at least two paths sharing components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackChain {
    pub id: String,
    pub analysis_id: String,
    #[serde(default)]
    pub scope_id: Option<String>,
    pub name: String,
    pub description: String,
    pub entry_points: BTreeSet<String>,
    pub targets: BTreeSet<String>,
    pub attack_goal: AttackGoal,
    pub complexity: Complexity,
    pub success_likelihood: f64,
    pub impact: Impact,
    pub risk_score: f64,
    pub path_ids: Vec<String>,
}

// ==================== Request / Response ====================

/// Attacker capability assumed for the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "snake_case")]
pub enum SkillLevel {
    Novice,
    Intermediate,
    Expert,
    NationState,
}

impl TryFrom<String> for SkillLevel {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match normalize_tag(&raw).as_str() {
            "novice" | "low" | "basic" => Ok(SkillLevel::Novice),
            "intermediate" | "medium" | "proficient" => Ok(SkillLevel::Intermediate),
            "expert" | "high" => Ok(SkillLevel::Expert),
            "nation_state" | "multiple_experts" | "apt" => Ok(SkillLevel::NationState),
            _ => Err(format!("unknown attacker skill level '{}'", raw)),
        }
    }
}

impl SkillLevel {
    /// Multiplier applied to path success likelihood
    pub fn likelihood_factor(self) -> f64 {
        match self {
            SkillLevel::Novice => 0.8,
            SkillLevel::Intermediate => 1.0,
            SkillLevel::Expert => 1.15,
            SkillLevel::NationState => 1.3,
        }
    }
}

/// Attacker assumptions recorded with the analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    #[serde(default)]
    pub physical_access: Option<bool>,
    #[serde(default)]
    pub local_network_access: Option<bool>,
    #[serde(default)]
    pub remote_access: Option<bool>,
    #[serde(default)]
    pub authenticated_user: Option<bool>,
    #[serde(default)]
    pub attacker_skill_level: Option<SkillLevel>,
}

/// STRIDE threat category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "snake_case")]
pub enum ThreatType {
    Spoofing,
    Tampering,
    Repudiation,
    InformationDisclosure,
    DenialOfService,
    ElevationOfPrivilege,
    Other,
}

impl From<String> for ThreatType {
    fn from(raw: String) -> Self {
        match normalize_tag(&raw).as_str() {
            "spoofing" => ThreatType::Spoofing,
            "tampering" => ThreatType::Tampering,
            "repudiation" => ThreatType::Repudiation,
            "information_disclosure" => ThreatType::InformationDisclosure,
            "denial_of_service" | "dos" => ThreatType::DenialOfService,
            "elevation_of_privilege" => ThreatType::ElevationOfPrivilege,
            _ => ThreatType::Other,
        }
    }
}

/// Caller-supplied threat scenario used to reweight edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatScenario {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", alias = "threat_type")]
    pub threat_type: ThreatType,
    pub likelihood: f64,
    #[serde(default)]
    pub description: String,
}

impl ThreatScenario {
    pub fn new(id: &str, threat_type: ThreatType, likelihood: f64) -> Self {
        Self {
            id: id.to_string(),
            threat_type,
            likelihood,
            description: String::new(),
        }
    }
}

/// Input to a single analysis run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Caller-chosen id; generated when absent
    #[serde(default)]
    pub analysis_id: Option<String>,
    #[serde(default)]
    pub scope_id: Option<String>,
    pub primary_component_id: String,
    pub component_ids: Vec<String>,
    #[serde(default)]
    pub entry_point_ids: Option<Vec<String>>,
    #[serde(default)]
    pub target_ids: Option<Vec<String>>,
    #[serde(default)]
    pub assumptions: Assumptions,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub threat_scenarios: Vec<ThreatScenario>,
    #[serde(default)]
    pub vulnerability_ids: Vec<String>,
    #[serde(default)]
    pub include_chains: Option<bool>,
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl AnalysisRequest {
    pub fn new(primary_component_id: &str, component_ids: &[&str]) -> Self {
        Self {
            primary_component_id: primary_component_id.to_string(),
            component_ids: component_ids.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_analysis_id(mut self, id: &str) -> Self {
        self.analysis_id = Some(id.to_string());
        self
    }

    pub fn with_scope(mut self, scope_id: &str) -> Self {
        self.scope_id = Some(scope_id.to_string());
        self
    }

    pub fn with_entry_points(mut self, ids: &[&str]) -> Self {
        self.entry_point_ids = Some(ids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_targets(mut self, ids: &[&str]) -> Self {
        self.target_ids = Some(ids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_assumptions(mut self, assumptions: Assumptions) -> Self {
        self.assumptions = assumptions;
        self
    }

    pub fn with_constraint(mut self, constraint: &str) -> Self {
        self.constraints.push(constraint.to_string());
        self
    }

    pub fn with_threat_scenario(mut self, scenario: ThreatScenario) -> Self {
        self.threat_scenarios.push(scenario);
        self
    }

    pub fn with_vulnerabilities(mut self, ids: &[&str]) -> Self {
        self.vulnerability_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_chains(mut self, include: bool) -> Self {
        self.include_chains = Some(include);
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

/// How an endpoint set was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    /// Caller supplied the ids explicitly
    Override,
    /// Attribute heuristics matched at least one component
    Heuristic,
    /// Heuristics matched nothing; deterministic fallback applied
    Fallback,
}

/// Response returned to the caller after an analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub analysis_id: String,
    #[serde(default)]
    pub scope_id: Option<String>,
    pub component_count: usize,
    pub entry_points: Vec<String>,
    pub critical_targets: Vec<String>,
    pub total_paths: usize,
    pub high_risk_paths: usize,
    pub total_chains: usize,
    pub high_risk_chains: usize,
    pub created_at: DateTime<Utc>,
    pub entry_point_source: SelectionSource,
    pub target_source: SelectionSource,
    /// True when a fallback replaced heuristic endpoint selection
    pub degraded: bool,
    /// False when the artifact store rejected the write
    pub persisted: bool,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Audit copy of the context an analysis ran with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextAudit {
    pub assumptions: Assumptions,
    pub constraints: Vec<String>,
    pub applied_constraints: Vec<String>,
    pub threat_scenarios: Vec<ThreatScenario>,
    pub vulnerability_ids: Vec<String>,
    pub max_depth: usize,
    pub include_chains: bool,
}

/// Persisted analysis metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub summary: AnalysisSummary,
    pub context: ContextAudit,
}
