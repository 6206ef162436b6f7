use crate::domain::model::model::{InterfaceKey, LspKey};
use crate::domain::utils::id::{DemandName, NodeName};
use crate::error::{Error, Result};

/// One hop of a demand path: a physical interface, or a routed LSP used as a single logical hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Hop {
    Interface(InterfaceKey),
    Lsp(LspKey),
}

/// Where a demand's traffic goes.
///
/// A routed demand always has at least one non-empty alternative; an empty collection
/// is never used to mean "no path".
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DemandPath {
    #[default]
    Unrouted,
    Alternatives(Vec<Vec<Hop>>),
}

impl DemandPath {
    pub fn is_unrouted(&self) -> bool {
        matches!(self, DemandPath::Unrouted)
    }

    pub fn alternatives(&self) -> &[Vec<Hop>] {
        match self {
            DemandPath::Unrouted => &[],
            DemandPath::Alternatives(alternatives) => alternatives,
        }
    }
}

/// Traffic split bookkeeping for one alternative of a routed demand.
#[derive(Debug, Clone, PartialEq)]
pub struct PathDetail {
    pub hops: Vec<Hop>,

    /// Number of branches leaving the node at each hop, in path order.
    pub splits: Vec<usize>,

    /// Product of all branch counts along the path.
    pub cumulative_split: usize,

    /// Share of the demand's traffic carried by this alternative.
    pub path_traffic: f64,
}

/// A traffic matrix entry: `traffic` units offered from `source` to `dest`.
#[derive(Debug, Clone)]
pub struct Demand {
    pub source: NodeName,
    pub dest: NodeName,
    pub name: DemandName,
    pub(crate) traffic: f64,
    pub(crate) path: DemandPath,
    pub(crate) path_detail: Vec<PathDetail>,
}

impl Demand {
    pub fn new(source: impl Into<NodeName>, dest: impl Into<NodeName>, traffic: f64, name: impl Into<DemandName>) -> Result<Self> {
        validate_traffic(traffic)?;
        let source = source.into();
        let dest = dest.into();
        let name = name.into();

        if source == dest {
            return Err(Error::ConfigurationError(format!("Demand {} must have different source and destination, got {}", name, source)));
        }

        Ok(Self { source, dest, name, traffic, path: DemandPath::Unrouted, path_detail: Vec::new() })
    }

    pub fn traffic(&self) -> f64 {
        self.traffic
    }

    pub fn path(&self) -> &DemandPath {
        &self.path
    }

    pub fn path_detail(&self) -> &[PathDetail] {
        &self.path_detail
    }

    pub fn is_routed(&self) -> bool {
        !self.path.is_unrouted()
    }

    pub(crate) fn reset(&mut self) {
        self.path = DemandPath::Unrouted;
        self.path_detail.clear();
    }
}

pub(crate) fn validate_traffic(traffic: f64) -> Result<()> {
    if !traffic.is_finite() || traffic < 0.0 {
        return Err(Error::ConfigurationError(format!("Traffic must be a non-negative number, got {}", traffic)));
    }
    Ok(())
}
