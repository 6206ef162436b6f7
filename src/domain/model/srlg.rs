use std::collections::BTreeSet;

use crate::domain::model::model::InterfaceKey;
use crate::domain::utils::id::{NodeName, SrlgName};

/// Shared Risk Link Group: nodes and interfaces that fail together.
#[derive(Debug, Clone)]
pub struct Srlg {
    pub name: SrlgName,
    pub(crate) nodes: BTreeSet<NodeName>,
    pub(crate) interfaces: BTreeSet<InterfaceKey>,
    pub(crate) failed: bool,
}

impl Srlg {
    pub fn new(name: impl Into<SrlgName>) -> Self {
        Self { name: name.into(), nodes: BTreeSet::new(), interfaces: BTreeSet::new(), failed: false }
    }

    pub fn nodes(&self) -> &BTreeSet<NodeName> {
        &self.nodes
    }

    pub fn interfaces(&self) -> &BTreeSet<InterfaceKey> {
        &self.interfaces
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }
}
