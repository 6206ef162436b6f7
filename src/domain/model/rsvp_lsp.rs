use crate::domain::model::model::InterfaceKey;
use crate::domain::utils::id::{LspName, NodeName};
use crate::error::{Error, Result};

/// The signaled path of a routed LSP.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedLspPath {
    pub interfaces: Vec<InterfaceKey>,

    /// Sum of the interface costs along the path.
    pub path_cost: i64,

    /// Lowest reservable bandwidth along the path before this LSP reserved anything.
    pub baseline_path_reservable_bw: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LspPath {
    #[default]
    Unrouted,
    Routed(RoutedLspPath),
}

impl LspPath {
    pub fn is_unrouted(&self) -> bool {
        matches!(self, LspPath::Unrouted)
    }

    pub fn routed(&self) -> Option<&RoutedLspPath> {
        match self {
            LspPath::Unrouted => None,
            LspPath::Routed(path) => Some(path),
        }
    }
}

/// An RSVP-TE label switched path from `source` to `dest`.
#[derive(Debug, Clone)]
pub struct RsvpLsp {
    pub source: NodeName,
    pub dest: NodeName,
    pub name: LspName,
    pub(crate) path: LspPath,

    /// `None` while unrouted.
    pub(crate) reserved_bandwidth: Option<f64>,

    /// Bandwidth requested on the most recent signaling attempt.
    pub(crate) setup_bandwidth: Option<f64>,

    /// Overrides the bandwidth derived from the demands riding the LSP's parallel group.
    pub(crate) configured_setup_bandwidth: Option<f64>,

    /// Overrides the IGP-derived effective metric.
    pub(crate) manual_metric: Option<i64>,

    /// Total demand traffic riding the LSP. `None` while unrouted.
    pub(crate) traffic: Option<f64>,
}

impl RsvpLsp {
    pub fn new(source: impl Into<NodeName>, dest: impl Into<NodeName>, name: impl Into<LspName>) -> Result<Self> {
        let source = source.into();
        let dest = dest.into();
        let name = name.into();

        if source == dest {
            return Err(Error::ConfigurationError(format!("LSP {} must have different source and destination, got {}", name, source)));
        }

        Ok(Self {
            source,
            dest,
            name,
            path: LspPath::Unrouted,
            reserved_bandwidth: None,
            setup_bandwidth: None,
            configured_setup_bandwidth: None,
            manual_metric: None,
            traffic: None,
        })
    }

    pub fn with_configured_setup_bandwidth(mut self, bandwidth: f64) -> Result<Self> {
        validate_setup_bandwidth(bandwidth)?;
        self.configured_setup_bandwidth = Some(bandwidth);
        Ok(self)
    }

    pub fn with_manual_metric(mut self, metric: i64) -> Result<Self> {
        validate_manual_metric(metric)?;
        self.manual_metric = Some(metric);
        Ok(self)
    }

    pub fn path(&self) -> &LspPath {
        &self.path
    }

    pub fn is_routed(&self) -> bool {
        !self.path.is_unrouted()
    }

    pub fn reserved_bandwidth(&self) -> Option<f64> {
        self.reserved_bandwidth
    }

    pub fn setup_bandwidth(&self) -> Option<f64> {
        self.setup_bandwidth
    }

    pub fn configured_setup_bandwidth(&self) -> Option<f64> {
        self.configured_setup_bandwidth
    }

    pub fn manual_metric(&self) -> Option<i64> {
        self.manual_metric
    }

    pub fn traffic(&self) -> Option<f64> {
        self.traffic
    }

    pub(crate) fn reset(&mut self) {
        self.path = LspPath::Unrouted;
        self.reserved_bandwidth = None;
        self.setup_bandwidth = None;
        self.traffic = None;
    }
}

pub(crate) fn validate_setup_bandwidth(bandwidth: f64) -> Result<()> {
    if !bandwidth.is_finite() || bandwidth < 0.0 {
        return Err(Error::ConfigurationError(format!("Setup bandwidth must be a non-negative number, got {}", bandwidth)));
    }
    Ok(())
}

pub(crate) fn validate_manual_metric(metric: i64) -> Result<()> {
    if metric <= 0 {
        return Err(Error::ConfigurationError(format!("Manual metric must be a positive integer, got {}", metric)));
    }
    Ok(())
}
