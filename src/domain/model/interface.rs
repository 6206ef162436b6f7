use std::collections::BTreeSet;

use crate::domain::utils::id::{CircuitId, InterfaceName, NodeName, SrlgName};
use crate::error::{Error, Result};

/// Absolute tolerance used whenever bandwidth values are compared.
pub const BANDWIDTH_TOLERANCE: f64 = 1e-6;

/// One side of a circuit: an egress port on `node` facing `remote_node`.
///
/// Identified by the composite key (`name`, `node`). Traffic and reserved bandwidth
/// are recomputed from scratch on every simulation run.
#[derive(Debug, Clone)]
pub struct Interface {
    pub name: InterfaceName,
    pub node: NodeName,
    pub remote_node: NodeName,

    /// IGP metric. Always a positive integer.
    pub(crate) cost: i64,
    pub(crate) capacity: f64,
    pub circuit_id: CircuitId,

    pub(crate) rsvp_enabled: bool,
    pub(crate) percent_reservable_bandwidth: f64,

    pub(crate) reserved_bandwidth: f64,
    pub(crate) traffic: f64,

    /// Explicit failed flag. Use `Model::is_interface_failed` for the derived state,
    /// which also accounts for failed endpoint nodes.
    pub(crate) failed: bool,

    pub(crate) srlgs: BTreeSet<SrlgName>,
}

/// Reported load of an interface. A failed interface carries no meaningful value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterfaceLoad {
    Down,
    Up(f64),
}

impl InterfaceLoad {
    pub fn is_down(&self) -> bool {
        matches!(self, InterfaceLoad::Down)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            InterfaceLoad::Down => None,
            InterfaceLoad::Up(v) => Some(*v),
        }
    }
}

impl Interface {
    pub fn new(
        name: impl Into<InterfaceName>,
        node: impl Into<NodeName>,
        remote_node: impl Into<NodeName>,
        cost: i64,
        capacity: f64,
        circuit_id: impl Into<CircuitId>,
    ) -> Result<Self> {
        validate_cost(cost)?;
        validate_capacity(capacity)?;

        let interface = Self {
            name: name.into(),
            node: node.into(),
            remote_node: remote_node.into(),
            cost,
            capacity,
            circuit_id: circuit_id.into(),
            rsvp_enabled: true,
            percent_reservable_bandwidth: 100.0,
            reserved_bandwidth: 0.0,
            traffic: 0.0,
            failed: false,
            srlgs: BTreeSet::new(),
        };

        if interface.node == interface.remote_node {
            return Err(Error::ConfigurationError(format!(
                "Interface {} on node {} cannot face its own node",
                interface.name, interface.node
            )));
        }

        Ok(interface)
    }

    pub fn with_rsvp_enabled(mut self, enabled: bool) -> Self {
        self.rsvp_enabled = enabled;
        self
    }

    pub fn with_failed(mut self, failed: bool) -> Self {
        self.failed = failed;
        self
    }

    pub fn with_percent_reservable_bandwidth(mut self, percent: f64) -> Result<Self> {
        validate_percent_reservable(percent)?;
        self.percent_reservable_bandwidth = percent;
        Ok(self)
    }

    pub fn cost(&self) -> i64 {
        self.cost
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn rsvp_enabled(&self) -> bool {
        self.rsvp_enabled
    }

    pub fn percent_reservable_bandwidth(&self) -> f64 {
        self.percent_reservable_bandwidth
    }

    pub fn reserved_bandwidth(&self) -> f64 {
        self.reserved_bandwidth
    }

    pub fn traffic(&self) -> f64 {
        self.traffic
    }

    pub fn srlgs(&self) -> &BTreeSet<SrlgName> {
        &self.srlgs
    }

    /// Bandwidth an LSP may still reserve here: the reservable share of capacity net of current reservations.
    pub fn reservable_bandwidth(&self) -> f64 {
        self.capacity * self.percent_reservable_bandwidth / 100.0 - self.reserved_bandwidth
    }

    /// Upper bound for `reserved_bandwidth`.
    pub fn max_reservable_bandwidth(&self) -> f64 {
        self.capacity * self.percent_reservable_bandwidth / 100.0
    }

    pub(crate) fn key_name(&self) -> String {
        format!("{}@{}", self.name, self.node)
    }
}

pub(crate) fn validate_cost(cost: i64) -> Result<()> {
    if cost <= 0 {
        return Err(Error::ConfigurationError(format!("Interface cost must be a positive integer, got {}", cost)));
    }
    Ok(())
}

pub(crate) fn validate_capacity(capacity: f64) -> Result<()> {
    if !capacity.is_finite() || capacity <= 0.0 {
        return Err(Error::ConfigurationError(format!("Interface capacity must be a positive number, got {}", capacity)));
    }
    Ok(())
}

pub(crate) fn validate_percent_reservable(percent: f64) -> Result<()> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(Error::ConfigurationError(format!("percent_reservable_bandwidth must be within [0, 100], got {}", percent)));
    }
    Ok(())
}
