use std::collections::BTreeSet;

use crate::domain::utils::id::{NodeName, SrlgName};
use crate::error::{Error, Result};

/// A router in the simulated topology.
///
/// Interfaces reference their node by name; the node owns no interfaces itself.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: NodeName,
    pub lat: f64,
    pub lon: f64,

    /// Failed flag. A failed node takes every interface touching it down with it.
    pub(crate) failed: bool,

    /// Whether routed LSPs sourced here may be used as IGP shortcuts.
    pub igp_shortcuts_enabled: bool,

    /// Names of the SRLGs this node is a member of.
    pub(crate) srlgs: BTreeSet<SrlgName>,
}

impl Node {
    pub fn new(name: impl Into<NodeName>) -> Self {
        Self { name: name.into(), lat: 0.0, lon: 0.0, failed: false, igp_shortcuts_enabled: false, srlgs: BTreeSet::new() }
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Result<Self> {
        validate_coordinates(lat, lon)?;
        self.lat = lat;
        self.lon = lon;
        Ok(self)
    }

    pub fn with_igp_shortcuts(mut self, enabled: bool) -> Self {
        self.igp_shortcuts_enabled = enabled;
        self
    }

    pub fn with_failed(mut self, failed: bool) -> Self {
        self.failed = failed;
        self
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn srlgs(&self) -> &BTreeSet<SrlgName> {
        &self.srlgs
    }
}

pub(crate) fn validate_coordinates(lat: f64, lon: f64) -> Result<()> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(Error::ConfigurationError(format!("Node coordinates must be finite numbers, got ({}, {})", lat, lon)));
    }
    Ok(())
}
