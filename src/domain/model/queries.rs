use std::collections::BTreeMap;

use crate::domain::model::circuit::{Circuit, match_circuits};
use crate::domain::model::demand::Hop;
use crate::domain::model::interface::InterfaceLoad;
use crate::domain::model::model::{DemandKey, InterfaceKey, LspKey, Model, SimulationPhase};
use crate::domain::model::node::Node;
use crate::domain::model::rsvp_lsp::LspPath;
use crate::domain::utils::id::NodeName;
use crate::error::{Error, Result};

/// Parallel group key: (source, dest).
pub type GroupKey = (NodeName, NodeName);

/// Summary of the current simulation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationDiagnostics {
    pub phase: SimulationPhase,
    pub nodes: usize,
    pub failed_nodes: usize,
    pub interfaces: usize,
    pub failed_interfaces: usize,
    pub demands: usize,
    pub routed_demands: usize,
    pub unrouted_demands: usize,
    pub rsvp_lsps: usize,
    pub routed_lsps: usize,
    pub unrouted_lsps: usize,
}

impl Model {
    //-------------------------------
    // --- Per-interface readings ---
    //-------------------------------

    /// Traffic carried by the interface, `Down` when it is failed.
    pub fn interface_traffic(&self, key: InterfaceKey) -> Result<InterfaceLoad> {
        let interface = self.interfaces.get(key).ok_or_else(|| Error::LookupError(format!("Interface {:?} does not exist", key)))?;

        if self.is_interface_failed(key) {
            return Ok(InterfaceLoad::Down);
        }
        Ok(InterfaceLoad::Up(interface.traffic))
    }

    /// Utilization in percent of capacity, `Down` when the interface is failed.
    pub fn interface_utilization(&self, key: InterfaceKey) -> Result<InterfaceLoad> {
        let interface = self.interfaces.get(key).ok_or_else(|| Error::LookupError(format!("Interface {:?} does not exist", key)))?;

        Ok(match self.interface_traffic(key)? {
            InterfaceLoad::Down => InterfaceLoad::Down,
            InterfaceLoad::Up(traffic) => InterfaceLoad::Up(traffic / interface.capacity * 100.0),
        })
    }

    //----------------------------
    // --- Aggregate queries ---
    //----------------------------

    pub fn failed_nodes(&self) -> Vec<&Node> {
        self.nodes.values().filter(|node| node.failed).collect()
    }

    pub fn non_failed_nodes(&self) -> Vec<&Node> {
        self.nodes.values().filter(|node| !node.failed).collect()
    }

    pub fn failed_interfaces(&self) -> Vec<InterfaceKey> {
        self.interfaces.keys().filter(|key| self.is_interface_failed(*key)).collect()
    }

    pub fn non_failed_interfaces(&self) -> Vec<InterfaceKey> {
        self.interfaces.keys().filter(|key| !self.is_interface_failed(*key)).collect()
    }

    pub fn unrouted_demands(&self) -> Vec<DemandKey> {
        self.demands.iter().filter(|(_, demand)| !demand.is_routed()).map(|(key, _)| key).collect()
    }

    pub fn unrouted_lsps(&self) -> Vec<LspKey> {
        self.lsps.iter().filter(|(_, lsp)| !lsp.is_routed()).map(|(key, _)| key).collect()
    }

    /// LSPs sharing source and destination, grouped and sorted by (source, dest).
    pub fn parallel_lsp_groups(&self) -> BTreeMap<GroupKey, Vec<LspKey>> {
        let mut groups: BTreeMap<GroupKey, Vec<LspKey>> = BTreeMap::new();
        for (key, lsp) in self.lsps.iter() {
            groups.entry((lsp.source.clone(), lsp.dest.clone())).or_default().push(key);
        }
        groups
    }

    /// Demands sharing source and destination, grouped and sorted by (source, dest).
    pub fn parallel_demand_groups(&self) -> BTreeMap<GroupKey, Vec<DemandKey>> {
        let mut groups: BTreeMap<GroupKey, Vec<DemandKey>> = BTreeMap::new();
        for (key, demand) in self.demands.iter() {
            groups.entry((demand.source.clone(), demand.dest.clone())).or_default().push(key);
        }
        groups
    }

    pub fn demands_from_node(&self, node: &NodeName) -> Vec<DemandKey> {
        self.demands.iter().filter(|(_, demand)| &demand.source == node).map(|(key, _)| key).collect()
    }

    pub fn demands_to_node(&self, node: &NodeName) -> Vec<DemandKey> {
        self.demands.iter().filter(|(_, demand)| &demand.dest == node).map(|(key, _)| key).collect()
    }

    /// Egress interfaces of a node.
    pub fn node_interfaces(&self, node: &NodeName) -> Result<Vec<InterfaceKey>> {
        self.require_node(node)?;
        Ok(self.interfaces.iter().filter(|(_, interface)| &interface.node == node).map(|(key, _)| key).collect())
    }

    /// A node is an orphan when it has no interfaces at all.
    pub fn is_node_orphan(&self, node: &NodeName) -> Result<bool> {
        self.require_node(node)?;
        Ok(!self.interfaces.values().any(|interface| &interface.node == node || &interface.remote_node == node))
    }

    pub fn orphan_nodes(&self) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|node| !self.interfaces.values().any(|interface| interface.node == node.name || interface.remote_node == node.name))
            .collect()
    }

    pub fn circuits(&self) -> Vec<Circuit> {
        match_circuits(&self.interfaces).circuits
    }

    pub fn circuit_for_interface(&self, key: InterfaceKey) -> Result<Circuit> {
        self.circuits()
            .into_iter()
            .find(|circuit| circuit.contains(key))
            .ok_or_else(|| Error::LookupError(format!("Interface {:?} is not part of a matched circuit", key)))
    }

    //------------------------------------
    // --- Relations between entities ---
    //------------------------------------

    pub(crate) fn lsp_transits(&self, lsp: LspKey, interface: InterfaceKey) -> bool {
        match self.lsps.get(lsp).map(|lsp| &lsp.path) {
            Some(LspPath::Routed(path)) => path.interfaces.contains(&interface),
            _ => false,
        }
    }

    /// Routed LSPs whose path transits the interface.
    pub fn lsps_on_interface(&self, key: InterfaceKey) -> Vec<LspKey> {
        self.lsps.keys().filter(|lsp| self.lsp_transits(*lsp, key)).collect()
    }

    /// Demands whose traffic reaches the interface, directly or through an LSP.
    pub fn demands_on_interface(&self, key: InterfaceKey) -> Vec<DemandKey> {
        self.demands
            .iter()
            .filter(|(_, demand)| {
                demand.path.alternatives().iter().flatten().any(|hop| match hop {
                    Hop::Interface(interface) => *interface == key,
                    Hop::Lsp(lsp) => self.lsp_transits(*lsp, key),
                })
            })
            .map(|(demand_key, _)| demand_key)
            .collect()
    }

    /// Demands riding the LSP, either end to end or as an IGP shortcut.
    pub fn demands_on_lsp(&self, key: LspKey) -> Vec<DemandKey> {
        self.demands
            .iter()
            .filter(|(_, demand)| demand.path.alternatives().iter().flatten().any(|hop| *hop == Hop::Lsp(key)))
            .map(|(demand_key, _)| demand_key)
            .collect()
    }

    pub fn simulation_diagnostics(&self) -> SimulationDiagnostics {
        let routed_demands = self.demands.values().filter(|demand| demand.is_routed()).count();
        let routed_lsps = self.lsps.values().filter(|lsp| lsp.is_routed()).count();

        SimulationDiagnostics {
            phase: self.phase,
            nodes: self.nodes.len(),
            failed_nodes: self.failed_nodes().len(),
            interfaces: self.interfaces.len(),
            failed_interfaces: self.failed_interfaces().len(),
            demands: self.demands.len(),
            routed_demands,
            unrouted_demands: self.demands.len() - routed_demands,
            rsvp_lsps: self.lsps.len(),
            routed_lsps,
            unrouted_lsps: self.lsps.len() - routed_lsps,
        }
    }
}
