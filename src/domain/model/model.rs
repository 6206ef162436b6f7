use std::collections::{BTreeMap, BTreeSet, HashMap};

use rand::Rng;
use slotmap::{SlotMap, new_key_type};

use crate::domain::model::config::SimulationConfig;
use crate::domain::model::demand::{Demand, validate_traffic};
use crate::domain::model::interface::{Interface, validate_capacity, validate_cost, validate_percent_reservable};
use crate::domain::model::node::{Node, validate_coordinates};
use crate::domain::model::rsvp_lsp::{RsvpLsp, validate_manual_metric, validate_setup_bandwidth};
use crate::domain::model::srlg::Srlg;
use crate::domain::utils::id::{DemandName, InterfaceName, LspName, NodeName, SrlgName};
use crate::error::{Error, Result};

new_key_type! {
    pub struct InterfaceKey;
    pub struct DemandKey;
    pub struct LspKey;
}

/// Where the last `update_simulation` call got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPhase {
    NotRun,
    Reset,
    LspsRouted,
    DemandsRouted,
    Validated,
}

/// The network under study: topology, traffic matrix and LSPs.
///
/// The model is single-writer state. Every entity is owned here; interfaces, demands
/// and LSPs are addressed through stable slotmap keys, nodes and SRLGs by name.
/// Collections are kept in deterministic order so that repeated runs reproduce the
/// same routing.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) config: SimulationConfig,

    /// Seed for the LSP tie-break RNG of every run.
    pub(crate) seed: u64,

    pub(crate) nodes: BTreeMap<NodeName, Node>,

    pub(crate) interfaces: SlotMap<InterfaceKey, Interface>,

    /// Index lookup from the composite interface key (name, node) to the slotmap key.
    interface_index: HashMap<(InterfaceName, NodeName), InterfaceKey>,

    pub(crate) demands: SlotMap<DemandKey, Demand>,
    demand_index: HashMap<(NodeName, NodeName, DemandName), DemandKey>,

    pub(crate) lsps: SlotMap<LspKey, RsvpLsp>,
    lsp_index: HashMap<(NodeName, NodeName, LspName), LspKey>,

    pub(crate) srlgs: BTreeMap<SrlgName, Srlg>,

    pub(crate) phase: SimulationPhase,
}

impl Default for Model {
    fn default() -> Self {
        Model::new(SimulationConfig::default())
    }
}

impl Model {
    pub fn new(config: SimulationConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());

        Self {
            config,
            seed,
            nodes: BTreeMap::new(),
            interfaces: SlotMap::with_key(),
            interface_index: HashMap::new(),
            demands: SlotMap::with_key(),
            demand_index: HashMap::new(),
            lsps: SlotMap::with_key(),
            lsp_index: HashMap::new(),
            srlgs: BTreeMap::new(),
            phase: SimulationPhase::NotRun,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn simulation_phase(&self) -> SimulationPhase {
        self.phase
    }

    /// True once the last simulation run passed validation and nothing changed since.
    pub fn is_converged(&self) -> bool {
        self.phase == SimulationPhase::Validated
    }

    /// Any mutation invalidates the results of the previous run.
    pub(super) fn invalidate(&mut self) {
        self.phase = SimulationPhase::NotRun;
    }

    //--------------------------
    // --- Construction API ---
    //--------------------------

    pub fn add_node(&mut self, node: Node) -> Result<()> {
        if self.nodes.contains_key(&node.name) {
            return Err(Error::validation(format!("Node {} already exists in the model", node.name)));
        }

        log::debug!("Adding node {}", node.name);
        self.nodes.insert(node.name.clone(), node);
        self.invalidate();
        Ok(())
    }

    /// Adds one side of a circuit. Both endpoint nodes must already exist; the remote
    /// side is paired later by circuit id.
    pub fn add_interface(&mut self, interface: Interface) -> Result<InterfaceKey> {
        for endpoint in [&interface.node, &interface.remote_node] {
            if !self.nodes.contains_key(endpoint) {
                return Err(Error::validation(format!(
                    "Interface {} references node {} which is not part of the model",
                    interface.key_name(),
                    endpoint
                )));
            }
        }

        let index_key = (interface.name.clone(), interface.node.clone());
        if self.interface_index.contains_key(&index_key) {
            return Err(Error::validation(format!("Interface {} already exists in the model", interface.key_name())));
        }

        let same_circuit = self.interfaces.values().filter(|existing| existing.circuit_id == interface.circuit_id).count();
        if same_circuit >= 2 {
            return Err(Error::validation(format!("circuit_id {} is already used by two interfaces", interface.circuit_id)));
        }

        if !self.config.parallel_interfaces {
            let parallel = self
                .interfaces
                .values()
                .any(|existing| existing.node == interface.node && existing.remote_node == interface.remote_node);
            if parallel {
                return Err(Error::validation(format!(
                    "Model does not allow parallel interfaces, but {} already has an interface facing {}",
                    interface.node, interface.remote_node
                )));
            }
        }

        log::debug!("Adding interface {} facing {} (circuit_id {})", interface.key_name(), interface.remote_node, interface.circuit_id);

        let mut interface = interface;
        if self.nodes.get(&interface.node).is_some_and(|n| n.failed) || self.nodes.get(&interface.remote_node).is_some_and(|n| n.failed) {
            interface.failed = true;
        }

        let key = self.interfaces.insert(interface);
        self.interface_index.insert(index_key, key);
        self.invalidate();
        Ok(key)
    }

    /// Adds both sides of a circuit, creating any endpoint node that does not exist yet.
    pub fn add_circuit(&mut self, side_a: Interface, side_b: Interface) -> Result<(InterfaceKey, InterfaceKey)> {
        if side_a.circuit_id != side_b.circuit_id {
            return Err(Error::validation(format!(
                "Circuit sides {} and {} carry different circuit ids ({} vs {})",
                side_a.key_name(),
                side_b.key_name(),
                side_a.circuit_id,
                side_b.circuit_id
            )));
        }

        if side_a.node != side_b.remote_node || side_b.node != side_a.remote_node {
            return Err(Error::validation(format!("Circuit sides {} and {} do not face each other", side_a.key_name(), side_b.key_name())));
        }

        if side_a.capacity != side_b.capacity {
            return Err(Error::validation(format!(
                "Circuit {} has mismatched capacities: {} vs {}",
                side_a.circuit_id, side_a.capacity, side_b.capacity
            )));
        }

        if self.interfaces.values().any(|existing| existing.circuit_id == side_a.circuit_id) {
            return Err(Error::validation(format!("circuit_id {} is already used in the model", side_a.circuit_id)));
        }

        for endpoint in [side_a.node.clone(), side_b.node.clone()] {
            if !self.nodes.contains_key(&endpoint) {
                self.add_node(Node::new(endpoint))?;
            }
        }

        let key_a = self.add_interface(side_a)?;
        let key_b = match self.add_interface(side_b) {
            Ok(key) => key,
            Err(e) => {
                self.remove_interface_entry(key_a);
                return Err(e);
            }
        };

        Ok((key_a, key_b))
    }

    fn remove_interface_entry(&mut self, key: InterfaceKey) {
        if let Some(interface) = self.interfaces.remove(key) {
            self.interface_index.remove(&(interface.name, interface.node));
        }
    }

    pub fn add_demand(&mut self, demand: Demand) -> Result<DemandKey> {
        self.require_node(&demand.source)?;
        self.require_node(&demand.dest)?;

        let index_key = (demand.source.clone(), demand.dest.clone(), demand.name.clone());
        if self.demand_index.contains_key(&index_key) {
            return Err(Error::validation(format!("Demand {} from {} to {} already exists", demand.name, demand.source, demand.dest)));
        }

        let key = self.demands.insert(demand);
        self.demand_index.insert(index_key, key);
        self.invalidate();
        Ok(key)
    }

    pub fn add_rsvp_lsp(&mut self, lsp: RsvpLsp) -> Result<LspKey> {
        self.require_node(&lsp.source)?;
        self.require_node(&lsp.dest)?;

        let index_key = (lsp.source.clone(), lsp.dest.clone(), lsp.name.clone());
        if self.lsp_index.contains_key(&index_key) {
            return Err(Error::validation(format!("RSVP LSP {} from {} to {} already exists", lsp.name, lsp.source, lsp.dest)));
        }

        let key = self.lsps.insert(lsp);
        self.lsp_index.insert(index_key, key);
        self.invalidate();
        Ok(key)
    }

    /// Creates an SRLG with the given members. Interfaces are addressed by (name, node).
    pub fn add_srlg<N, I>(&mut self, name: impl Into<SrlgName>, nodes: N, interfaces: I) -> Result<()>
    where
        N: IntoIterator<Item = NodeName>,
        I: IntoIterator<Item = (InterfaceName, NodeName)>,
    {
        let name = name.into();
        if self.srlgs.contains_key(&name) {
            return Err(Error::validation(format!("SRLG {} already exists", name)));
        }

        let mut srlg = Srlg::new(name.clone());

        for node_name in nodes {
            self.require_node(&node_name)?;
            srlg.nodes.insert(node_name);
        }

        for (interface_name, node_name) in interfaces {
            let key = self.interface_key(&interface_name, &node_name)?;
            srlg.interfaces.insert(key);
        }

        for node_name in &srlg.nodes {
            if let Some(node) = self.nodes.get_mut(node_name) {
                node.srlgs.insert(name.clone());
            }
        }
        for key in &srlg.interfaces {
            self.interfaces[*key].srlgs.insert(name.clone());
        }

        self.srlgs.insert(name, srlg);
        self.invalidate();
        Ok(())
    }

    pub fn add_node_to_srlg(&mut self, srlg_name: &SrlgName, node_name: &NodeName) -> Result<()> {
        self.require_node(node_name)?;
        let srlg = self.srlgs.get_mut(srlg_name).ok_or_else(|| Error::LookupError(format!("SRLG {} does not exist", srlg_name)))?;
        srlg.nodes.insert(node_name.clone());
        let srlg_failed = srlg.failed;

        if let Some(node) = self.nodes.get_mut(node_name) {
            node.srlgs.insert(srlg_name.clone());
        }
        if srlg_failed {
            self.fail_node(node_name)?;
        }
        self.invalidate();
        Ok(())
    }

    pub fn add_interface_to_srlg(&mut self, srlg_name: &SrlgName, interface_name: &InterfaceName, node_name: &NodeName) -> Result<()> {
        let key = self.interface_key(interface_name, node_name)?;
        let srlg = self.srlgs.get_mut(srlg_name).ok_or_else(|| Error::LookupError(format!("SRLG {} does not exist", srlg_name)))?;
        srlg.interfaces.insert(key);
        let srlg_failed = srlg.failed;

        self.interfaces[key].srlgs.insert(srlg_name.clone());
        if srlg_failed {
            self.fail_circuit_of(key);
        }
        self.invalidate();
        Ok(())
    }

    //-----------------
    // --- Setters ---
    //-----------------

    pub fn set_demand_traffic(&mut self, key: DemandKey, traffic: f64) -> Result<()> {
        validate_traffic(traffic)?;
        self.demand_mut(key)?.traffic = traffic;
        self.invalidate();
        Ok(())
    }

    pub fn set_interface_cost(&mut self, key: InterfaceKey, cost: i64) -> Result<()> {
        validate_cost(cost)?;
        self.interface_mut(key)?.cost = cost;
        self.invalidate();
        Ok(())
    }

    /// Sets the capacity of the interface and of the remote side of its circuit.
    pub fn set_interface_capacity(&mut self, key: InterfaceKey, capacity: f64) -> Result<()> {
        validate_capacity(capacity)?;
        let circuit_id = self.interface_mut(key)?.circuit_id.clone();

        for interface in self.interfaces.values_mut().filter(|i| i.circuit_id == circuit_id) {
            interface.capacity = capacity;
        }
        self.invalidate();
        Ok(())
    }

    pub fn set_interface_percent_reservable_bandwidth(&mut self, key: InterfaceKey, percent: f64) -> Result<()> {
        validate_percent_reservable(percent)?;
        self.interface_mut(key)?.percent_reservable_bandwidth = percent;
        self.invalidate();
        Ok(())
    }

    pub fn set_interface_rsvp_enabled(&mut self, key: InterfaceKey, enabled: bool) -> Result<()> {
        self.interface_mut(key)?.rsvp_enabled = enabled;
        self.invalidate();
        Ok(())
    }

    pub fn set_lsp_manual_metric(&mut self, key: LspKey, metric: Option<i64>) -> Result<()> {
        if let Some(metric) = metric {
            validate_manual_metric(metric)?;
        }
        self.lsp_mut(key)?.manual_metric = metric;
        self.invalidate();
        Ok(())
    }

    pub fn set_lsp_configured_setup_bandwidth(&mut self, key: LspKey, bandwidth: Option<f64>) -> Result<()> {
        if let Some(bandwidth) = bandwidth {
            validate_setup_bandwidth(bandwidth)?;
        }
        self.lsp_mut(key)?.configured_setup_bandwidth = bandwidth;
        self.invalidate();
        Ok(())
    }

    pub fn set_node_igp_shortcuts(&mut self, name: &NodeName, enabled: bool) -> Result<()> {
        self.node_mut(name)?.igp_shortcuts_enabled = enabled;
        self.invalidate();
        Ok(())
    }

    pub fn set_node_coordinates(&mut self, name: &NodeName, lat: f64, lon: f64) -> Result<()> {
        validate_coordinates(lat, lon)?;
        let node = self.node_mut(name)?;
        node.lat = lat;
        node.lon = lon;
        Ok(())
    }

    //----------------
    // --- Lookups ---
    //----------------

    pub(crate) fn require_node(&self, name: &NodeName) -> Result<&Node> {
        self.nodes.get(name).ok_or_else(|| Error::LookupError(format!("Node {} does not exist in the model", name)))
    }

    pub(crate) fn node_mut(&mut self, name: &NodeName) -> Result<&mut Node> {
        self.nodes.get_mut(name).ok_or_else(|| Error::LookupError(format!("Node {} does not exist in the model", name)))
    }

    pub(crate) fn interface_mut(&mut self, key: InterfaceKey) -> Result<&mut Interface> {
        self.interfaces.get_mut(key).ok_or_else(|| Error::LookupError(format!("Interface {:?} does not exist in the model", key)))
    }

    fn demand_mut(&mut self, key: DemandKey) -> Result<&mut Demand> {
        self.demands.get_mut(key).ok_or_else(|| Error::LookupError(format!("Demand {:?} does not exist in the model", key)))
    }

    fn lsp_mut(&mut self, key: LspKey) -> Result<&mut RsvpLsp> {
        self.lsps.get_mut(key).ok_or_else(|| Error::LookupError(format!("RSVP LSP {:?} does not exist in the model", key)))
    }

    pub fn get_node(&self, name: &NodeName) -> Result<&Node> {
        self.require_node(name)
    }

    pub fn interface_key(&self, name: &InterfaceName, node: &NodeName) -> Result<InterfaceKey> {
        self.interface_index
            .get(&(name.clone(), node.clone()))
            .copied()
            .ok_or_else(|| Error::LookupError(format!("Interface {} on node {} does not exist in the model", name, node)))
    }

    pub fn get_interface(&self, name: &InterfaceName, node: &NodeName) -> Result<&Interface> {
        let key = self.interface_key(name, node)?;
        Ok(&self.interfaces[key])
    }

    pub fn interface(&self, key: InterfaceKey) -> Option<&Interface> {
        self.interfaces.get(key)
    }

    pub fn demand_key(&self, source: &NodeName, dest: &NodeName, name: &DemandName) -> Result<DemandKey> {
        self.demand_index
            .get(&(source.clone(), dest.clone(), name.clone()))
            .copied()
            .ok_or_else(|| Error::LookupError(format!("Demand {} from {} to {} does not exist in the model", name, source, dest)))
    }

    pub fn get_demand(&self, source: &NodeName, dest: &NodeName, name: &DemandName) -> Result<&Demand> {
        let key = self.demand_key(source, dest, name)?;
        Ok(&self.demands[key])
    }

    pub fn demand(&self, key: DemandKey) -> Option<&Demand> {
        self.demands.get(key)
    }

    pub fn lsp_key(&self, source: &NodeName, dest: &NodeName, name: &LspName) -> Result<LspKey> {
        self.lsp_index
            .get(&(source.clone(), dest.clone(), name.clone()))
            .copied()
            .ok_or_else(|| Error::LookupError(format!("RSVP LSP {} from {} to {} does not exist in the model", name, source, dest)))
    }

    pub fn get_rsvp_lsp(&self, source: &NodeName, dest: &NodeName, name: &LspName) -> Result<&RsvpLsp> {
        let key = self.lsp_key(source, dest, name)?;
        Ok(&self.lsps[key])
    }

    pub fn lsp(&self, key: LspKey) -> Option<&RsvpLsp> {
        self.lsps.get(key)
    }

    pub fn get_srlg(&self, name: &SrlgName) -> Result<&Srlg> {
        self.srlgs.get(name).ok_or_else(|| Error::LookupError(format!("SRLG {} does not exist in the model", name)))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn interfaces(&self) -> impl Iterator<Item = (InterfaceKey, &Interface)> {
        self.interfaces.iter()
    }

    pub fn demands(&self) -> impl Iterator<Item = (DemandKey, &Demand)> {
        self.demands.iter()
    }

    pub fn rsvp_lsps(&self) -> impl Iterator<Item = (LspKey, &RsvpLsp)> {
        self.lsps.iter()
    }

    pub fn srlgs(&self) -> impl Iterator<Item = &Srlg> {
        self.srlgs.values()
    }

    /// SRLG names of every failed SRLG in `names`.
    pub(crate) fn failed_srlgs_among<'a>(&'a self, names: &'a BTreeSet<SrlgName>) -> impl Iterator<Item = &'a SrlgName> + 'a {
        names.iter().filter(|name| self.srlgs.get(*name).is_some_and(|srlg| srlg.failed))
    }
}
