use std::collections::{BTreeMap, BTreeSet};

use crate::domain::model::interface::BANDWIDTH_TOLERANCE;
use crate::domain::model::model::{InterfaceKey, Model};
use crate::domain::utils::id::NodeName;

/// Which interfaces qualify as edges of a projected graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphConfig {
    pub include_failed: bool,

    /// Only interfaces with at least this much reservable bandwidth qualify.
    pub min_reservable_bw: Option<f64>,

    pub rsvp_required: bool,
}

impl GraphConfig {
    /// Every non-failed interface, regardless of RSVP state or bandwidth.
    pub fn igp() -> Self {
        Self { include_failed: false, min_reservable_bw: None, rsvp_required: false }
    }

    /// Non-failed, RSVP enabled interfaces able to admit `setup_bandwidth`.
    pub fn rsvp(setup_bandwidth: f64) -> Self {
        Self { include_failed: false, min_reservable_bw: Some(setup_bandwidth), rsvp_required: true }
    }

    pub fn with_failed(mut self, include_failed: bool) -> Self {
        self.include_failed = include_failed;
        self
    }
}

/// A directed edge of the projected graph; the payload is the interface it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub interface: InterfaceKey,
    pub source: NodeName,
    pub target: NodeName,
    pub cost: i64,

    /// Reservable bandwidth of the interface at projection time.
    pub reservable_bw: f64,
}

impl Edge {
    pub fn admits(&self, min_bw: f64) -> bool {
        self.reservable_bw + BANDWIDTH_TOLERANCE >= min_bw
    }
}

/// Directed multigraph projected from the model's interfaces.
///
/// The projection is a snapshot: it owns copies of the values it needs, so the model can
/// be mutated while the graph is in use. Every node of the model is present, even
/// without edges.
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    /// Outgoing edges per node, in interface insertion order.
    adjacency: BTreeMap<NodeName, Vec<Edge>>,
}

impl TopologyGraph {
    pub fn build(model: &Model, config: &GraphConfig) -> Self {
        let mut adjacency: BTreeMap<NodeName, Vec<Edge>> = model.nodes.keys().map(|name| (name.clone(), Vec::new())).collect();

        for (key, interface) in model.interfaces.iter() {
            if !config.include_failed && model.is_interface_failed(key) {
                continue;
            }
            if config.rsvp_required && !interface.rsvp_enabled {
                continue;
            }
            let reservable_bw = interface.reservable_bandwidth();
            if let Some(min_bw) = config.min_reservable_bw {
                if reservable_bw + BANDWIDTH_TOLERANCE < min_bw {
                    continue;
                }
            }

            let edge = Edge {
                interface: key,
                source: interface.node.clone(),
                target: interface.remote_node.clone(),
                cost: interface.cost,
                reservable_bw,
            };

            // Only reachable with `include_failed`: a missing endpoint makes the interface
            // failed, and `validate_model` rejects it in `check_topology_references`.
            match adjacency.get_mut(&interface.node) {
                Some(edges) => edges.push(edge),
                None => log::error!(
                    "InvalidTopology: interface {} references node {} which is not part of the model",
                    interface.key_name(),
                    interface.node
                ),
            }
        }

        Self { adjacency }
    }

    pub fn contains_node(&self, node: &NodeName) -> bool {
        self.adjacency.contains_key(node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeName> {
        self.adjacency.keys()
    }

    pub fn outgoing(&self, node: &NodeName) -> &[Edge] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edges_between(&self, source: &NodeName, target: &NodeName) -> Vec<&Edge> {
        self.outgoing(source).iter().filter(|edge| &edge.target == target).collect()
    }

    /// Distinct downstream neighbours of `node`.
    pub fn neighbours(&self, node: &NodeName) -> BTreeSet<&NodeName> {
        self.outgoing(node).iter().map(|edge| &edge.target).collect()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }
}
