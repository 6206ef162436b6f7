use std::collections::BTreeSet;

use crate::domain::model::model::{InterfaceKey, Model};
use crate::domain::utils::id::{InterfaceName, NodeName, SrlgName};
use crate::error::{Error, Result};

/// What to do when an unfail request is blocked by a node or SRLG that is still down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnfailMode {
    /// Raise `IllegalStateTransition`.
    Strict,

    /// Leave the target failed and report `false`.
    BestEffort,
}

impl Model {
    /// Derived failure state: explicitly failed, or either endpoint node is failed.
    pub fn is_interface_failed(&self, key: InterfaceKey) -> bool {
        let Some(interface) = self.interfaces.get(key) else {
            return true;
        };

        interface.failed || self.nodes.get(&interface.node).is_none_or(|n| n.failed) || self.nodes.get(&interface.remote_node).is_none_or(|n| n.failed)
    }

    /// Both sides of the circuit `key` belongs to.
    fn circuit_sides(&self, key: InterfaceKey) -> Vec<InterfaceKey> {
        let Some(interface) = self.interfaces.get(key) else {
            return Vec::new();
        };
        self.interfaces.iter().filter(|(_, other)| other.circuit_id == interface.circuit_id).map(|(k, _)| k).collect()
    }

    /// Fails the interface and the remote side of its circuit. Rerouting happens on the next `update_simulation`.
    pub fn fail_interface(&mut self, name: &InterfaceName, node: &NodeName) -> Result<()> {
        let key = self.interface_key(name, node)?;
        self.fail_circuit_of(key);
        log::info!("Interface {} on {} failed", name, node);
        Ok(())
    }

    pub(super) fn fail_circuit_of(&mut self, key: InterfaceKey) {
        for side in self.circuit_sides(key) {
            self.interfaces[side].failed = true;
        }
        self.invalidate();
    }

    /// Reasons why the circuit of `key` may not come back up, empty if nothing blocks it.
    fn interface_unfail_blockers(&self, key: InterfaceKey) -> Vec<String> {
        let mut blockers = Vec::new();

        for side in self.circuit_sides(key) {
            let interface = &self.interfaces[side];

            for endpoint in [&interface.node, &interface.remote_node] {
                if self.nodes.get(endpoint).is_some_and(|n| n.failed) {
                    blockers.push(format!("endpoint node {} is failed", endpoint));
                }
            }

            for srlg in self.failed_srlgs_among(&interface.srlgs) {
                blockers.push(format!("{} is a member of failed SRLG {}", interface.key_name(), srlg));
            }
        }

        blockers.sort();
        blockers.dedup();
        blockers
    }

    /// Brings the interface and the remote side of its circuit back up.
    ///
    /// Returns `Ok(false)` in `BestEffort` mode when a failed node or SRLG still holds it down.
    pub fn unfail_interface(&mut self, name: &InterfaceName, node: &NodeName, mode: UnfailMode) -> Result<bool> {
        let key = self.interface_key(name, node)?;
        let unfailed = self.unfail_circuit_of(key, mode)?;
        if unfailed {
            log::info!("Interface {} on {} unfailed", name, node);
        }
        Ok(unfailed)
    }

    fn unfail_circuit_of(&mut self, key: InterfaceKey, mode: UnfailMode) -> Result<bool> {
        let blockers = self.interface_unfail_blockers(key);

        if !blockers.is_empty() {
            let message = format!("Cannot unfail interface {}: {}", self.interfaces[key].key_name(), blockers.join(", "));
            return match mode {
                UnfailMode::Strict => Err(Error::IllegalStateTransition(message)),
                UnfailMode::BestEffort => {
                    log::debug!("{}; leaving it failed", message);
                    Ok(false)
                }
            };
        }

        for side in self.circuit_sides(key) {
            self.interfaces[side].failed = false;
        }
        self.invalidate();
        Ok(true)
    }

    /// Fails the node and every interface with the node at either end.
    pub fn fail_node(&mut self, name: &NodeName) -> Result<()> {
        self.node_mut(name)?.failed = true;

        for interface in self.interfaces.values_mut() {
            if &interface.node == name || &interface.remote_node == name {
                interface.failed = true;
            }
        }

        self.invalidate();
        log::info!("Node {} failed", name);
        Ok(())
    }

    /// Brings the node back up, together with every attached interface not held down by
    /// its remote node or a failed SRLG.
    pub fn unfail_node(&mut self, name: &NodeName, mode: UnfailMode) -> Result<bool> {
        let node = self.require_node(name)?;
        let blocking: Vec<&SrlgName> = self.failed_srlgs_among(&node.srlgs).collect();

        if !blocking.is_empty() {
            let names: Vec<String> = blocking.iter().map(|s| s.to_string()).collect();
            let message = format!("Cannot unfail node {}: member of failed SRLG(s) {}", name, names.join(", "));
            return match mode {
                UnfailMode::Strict => Err(Error::IllegalStateTransition(message)),
                UnfailMode::BestEffort => {
                    log::debug!("{}; leaving it failed", message);
                    Ok(false)
                }
            };
        }

        self.node_mut(name)?.failed = false;
        self.invalidate();

        let attached: Vec<InterfaceKey> =
            self.interfaces.iter().filter(|(_, i)| &i.node == name || &i.remote_node == name).map(|(key, _)| key).collect();

        for key in attached {
            if self.interfaces[key].failed {
                self.unfail_circuit_of(key, UnfailMode::BestEffort)?;
            }
        }

        log::info!("Node {} unfailed", name);
        Ok(true)
    }

    /// Fails the SRLG and cascades to every member node and interface.
    pub fn fail_srlg(&mut self, name: &SrlgName) -> Result<()> {
        let srlg = self.srlgs.get_mut(name).ok_or_else(|| Error::LookupError(format!("SRLG {} does not exist in the model", name)))?;
        srlg.failed = true;

        let nodes: BTreeSet<NodeName> = srlg.nodes.clone();
        let interfaces: BTreeSet<InterfaceKey> = srlg.interfaces.clone();

        for node in &nodes {
            self.fail_node(node)?;
        }
        for key in interfaces {
            self.fail_circuit_of(key);
        }

        log::info!("SRLG {} failed ({} node(s), {} interface(s))", name, nodes.len(), self.srlgs[name].interfaces.len());
        Ok(())
    }

    /// Unfails the SRLG. Members still held down by another failed SRLG or a failed
    /// endpoint node silently stay failed.
    pub fn unfail_srlg(&mut self, name: &SrlgName) -> Result<()> {
        let srlg = self.srlgs.get_mut(name).ok_or_else(|| Error::LookupError(format!("SRLG {} does not exist in the model", name)))?;
        srlg.failed = false;

        let nodes: BTreeSet<NodeName> = srlg.nodes.clone();
        let interfaces: BTreeSet<InterfaceKey> = srlg.interfaces.clone();

        for node in &nodes {
            if !self.unfail_node(node, UnfailMode::BestEffort)? {
                log::warn!("Node {} stays failed after unfailing SRLG {}", node, name);
            }
        }
        for key in interfaces {
            if !self.unfail_circuit_of(key, UnfailMode::BestEffort)? {
                log::warn!("Interface {} stays failed after unfailing SRLG {}", self.interfaces[key].key_name(), name);
            }
        }

        self.invalidate();
        log::info!("SRLG {} unfailed", name);
        Ok(())
    }
}
