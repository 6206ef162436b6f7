use std::collections::{BTreeMap, HashSet};

use crate::domain::model::circuit::match_circuits;
use crate::domain::model::demand::{DemandPath, Hop};
use crate::domain::model::interface::BANDWIDTH_TOLERANCE;
use crate::domain::model::model::{InterfaceKey, Model};
use crate::domain::model::rsvp_lsp::LspPath;
use crate::domain::utils::id::NodeName;
use crate::error::{Error, Result};

impl Model {
    /// Full structural validation of the model and of the last simulation results.
    ///
    /// Collects every violation before failing, so the error lists all of them.
    pub fn validate_model(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        self.check_topology_references(&mut errors);
        self.check_circuits(&mut errors);
        self.check_duplicate_names(&mut errors);
        self.check_reserved_bandwidth(&mut errors);
        self.check_failure_consistency(&mut errors);
        self.check_srlg_membership(&mut errors);
        self.check_paths(&mut errors);

        if errors.is_empty() {
            log::debug!("Model validation passed");
            return Ok(());
        }

        for error in &errors {
            log::error!("ValidationError: {}", error);
        }
        Err(Error::ValidationError(errors))
    }

    fn check_topology_references(&self, errors: &mut Vec<String>) {
        for interface in self.interfaces.values() {
            for endpoint in [&interface.node, &interface.remote_node] {
                if !self.nodes.contains_key(endpoint) {
                    errors.push(format!("Interface {} references missing node {}", interface.key_name(), endpoint));
                }
            }
        }
    }

    fn check_circuits(&self, errors: &mut Vec<String>) {
        let matched = match_circuits(&self.interfaces);
        errors.extend(matched.errors);

        if !self.config.parallel_interfaces {
            let mut per_pair: BTreeMap<(&NodeName, &NodeName), usize> = BTreeMap::new();
            for interface in self.interfaces.values() {
                *per_pair.entry((&interface.node, &interface.remote_node)).or_default() += 1;
            }
            for ((node, remote), count) in per_pair {
                if count > 1 {
                    errors.push(format!("{} parallel interfaces from {} to {} in a model without parallel interface support", count, node, remote));
                }
            }
        }
    }

    fn check_duplicate_names(&self, errors: &mut Vec<String>) {
        let mut seen = HashSet::new();
        for interface in self.interfaces.values() {
            if !seen.insert((&interface.name, &interface.node)) {
                errors.push(format!("Duplicate interface {}", interface.key_name()));
            }
        }

        let mut seen = HashSet::new();
        for demand in self.demands.values() {
            if !seen.insert((&demand.source, &demand.dest, &demand.name)) {
                errors.push(format!("Duplicate demand {} from {} to {}", demand.name, demand.source, demand.dest));
            }
        }

        let mut seen = HashSet::new();
        for lsp in self.lsps.values() {
            if !seen.insert((&lsp.source, &lsp.dest, &lsp.name)) {
                errors.push(format!("Duplicate RSVP LSP {} from {} to {}", lsp.name, lsp.source, lsp.dest));
            }
        }
    }

    fn check_reserved_bandwidth(&self, errors: &mut Vec<String>) {
        let mut reserved_by_lsps: BTreeMap<InterfaceKey, f64> = BTreeMap::new();

        for lsp in self.lsps.values() {
            if let LspPath::Routed(path) = &lsp.path {
                let reserved = lsp.reserved_bandwidth.unwrap_or(0.0);
                for key in &path.interfaces {
                    *reserved_by_lsps.entry(*key).or_default() += reserved;
                }
            }
        }

        for (key, interface) in self.interfaces.iter() {
            let expected = reserved_by_lsps.get(&key).copied().unwrap_or(0.0);

            if (interface.reserved_bandwidth - expected).abs() > BANDWIDTH_TOLERANCE {
                errors.push(format!(
                    "Interface {} reserved_bandwidth {} does not match the {} reserved by the LSPs transiting it",
                    interface.key_name(),
                    interface.reserved_bandwidth,
                    expected
                ));
            }

            if interface.reserved_bandwidth > interface.max_reservable_bandwidth() + BANDWIDTH_TOLERANCE {
                errors.push(format!(
                    "Interface {} reserved_bandwidth {} exceeds its reservable bandwidth {}",
                    interface.key_name(),
                    interface.reserved_bandwidth,
                    interface.max_reservable_bandwidth()
                ));
            }
        }
    }

    fn check_failure_consistency(&self, errors: &mut Vec<String>) {
        for node in self.nodes.values().filter(|node| node.failed) {
            for interface in self.interfaces.values() {
                if (interface.node == node.name || interface.remote_node == node.name) && !interface.failed {
                    errors.push(format!("Interface {} is up although node {} is failed", interface.key_name(), node.name));
                }
            }
        }

        for srlg in self.srlgs.values().filter(|srlg| srlg.failed) {
            for node_name in &srlg.nodes {
                if self.nodes.get(node_name).is_some_and(|node| !node.failed) {
                    errors.push(format!("Node {} is up although its SRLG {} is failed", node_name, srlg.name));
                }
            }
            for key in &srlg.interfaces {
                if !self.is_interface_failed(*key) {
                    errors.push(format!("Interface {} is up although its SRLG {} is failed", self.interfaces[*key].key_name(), srlg.name));
                }
            }
        }
    }

    fn check_srlg_membership(&self, errors: &mut Vec<String>) {
        for srlg in self.srlgs.values() {
            for node_name in &srlg.nodes {
                match self.nodes.get(node_name) {
                    None => errors.push(format!("SRLG {} contains missing node {}", srlg.name, node_name)),
                    Some(node) if !node.srlgs.contains(&srlg.name) => {
                        errors.push(format!("Node {} is in SRLG {} but does not list it", node_name, srlg.name))
                    }
                    Some(_) => {}
                }
            }
            for key in &srlg.interfaces {
                match self.interfaces.get(*key) {
                    None => errors.push(format!("SRLG {} contains a missing interface", srlg.name)),
                    Some(interface) if !interface.srlgs.contains(&srlg.name) => {
                        errors.push(format!("Interface {} is in SRLG {} but does not list it", interface.key_name(), srlg.name))
                    }
                    Some(_) => {}
                }
            }
        }

        for node in self.nodes.values() {
            for srlg_name in &node.srlgs {
                if !self.srlgs.get(srlg_name).is_some_and(|srlg| srlg.nodes.contains(&node.name)) {
                    errors.push(format!("Node {} lists SRLG {} which does not contain it", node.name, srlg_name));
                }
            }
        }
    }

    fn check_paths(&self, errors: &mut Vec<String>) {
        for lsp in self.lsps.values() {
            let LspPath::Routed(path) = &lsp.path else {
                continue;
            };

            if path.interfaces.is_empty() {
                errors.push(format!("RSVP LSP {} is routed over an empty path", lsp.name));
                continue;
            }

            let mut at = &lsp.source;
            for key in &path.interfaces {
                let Some(interface) = self.interfaces.get(*key) else {
                    errors.push(format!("RSVP LSP {} is routed over a missing interface", lsp.name));
                    break;
                };
                if &interface.node != at {
                    errors.push(format!("RSVP LSP {} path is not contiguous at {}", lsp.name, interface.key_name()));
                    break;
                }
                if self.is_interface_failed(*key) {
                    errors.push(format!("RSVP LSP {} is routed over failed interface {}", lsp.name, interface.key_name()));
                }
                at = &interface.remote_node;
            }
            if at != &lsp.dest {
                errors.push(format!("RSVP LSP {} path ends at {} instead of {}", lsp.name, at, lsp.dest));
            }
        }

        for demand in self.demands.values() {
            if let DemandPath::Alternatives(alternatives) = &demand.path {
                if alternatives.is_empty() || alternatives.iter().any(Vec::is_empty) {
                    errors.push(format!("Demand {} from {} to {} has an empty path alternative", demand.name, demand.source, demand.dest));
                }
                for hop in alternatives.iter().flatten() {
                    let valid = match hop {
                        Hop::Interface(key) => self.interfaces.contains_key(*key),
                        Hop::Lsp(key) => self.lsps.get(*key).is_some_and(|lsp| lsp.is_routed()),
                    };
                    if !valid {
                        errors.push(format!("Demand {} from {} to {} references a missing or unrouted hop", demand.name, demand.source, demand.dest));
                        break;
                    }
                }
            }
        }
    }
}
