use serde::{Deserialize, Serialize};

/// Root of a model description file.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModelDto {
    #[serde(default)]
    pub config: ConfigDto,

    #[serde(default)]
    pub nodes: Vec<NodeDto>,

    #[serde(default)]
    pub circuits: Vec<CircuitDto>,

    #[serde(default)]
    pub demands: Vec<DemandDto>,

    #[serde(default)]
    pub rsvp_lsps: Vec<RsvpLspDto>,

    #[serde(default)]
    pub srlgs: Vec<SrlgDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDto {
    /// Defaults to `true`.
    pub parallel_interfaces: Option<bool>,
    pub seed: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NodeDto {
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,

    #[serde(default)]
    pub igp_shortcuts_enabled: bool,

    #[serde(default)]
    pub failed: bool,
}

/// A circuit and its two facing interfaces.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CircuitDto {
    pub circuit_id: String,
    pub side_a: InterfaceDto,
    pub side_b: InterfaceDto,

    #[serde(default)]
    pub failed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDto {
    pub name: String,
    pub node: String,
    pub remote_node: String,
    pub cost: i64,
    pub capacity: f64,

    /// Defaults to `true`.
    pub rsvp_enabled: Option<bool>,

    /// Defaults to 100.
    pub percent_reservable_bandwidth: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DemandDto {
    pub source: String,
    pub dest: String,
    pub name: String,
    pub traffic: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RsvpLspDto {
    pub source: String,
    pub dest: String,
    pub name: String,
    pub configured_setup_bandwidth: Option<f64>,
    pub manual_metric: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SrlgDto {
    pub name: String,

    #[serde(default)]
    pub nodes: Vec<String>,

    #[serde(default)]
    pub interfaces: Vec<InterfaceRefDto>,

    #[serde(default)]
    pub failed: bool,
}

/// Interface addressed by its composite key.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceRefDto {
    pub name: String,
    pub node: String,
}
