use crate::domain::model::model::InterfaceKey;
use crate::domain::topology::graph::{Edge, TopologyGraph};
use crate::domain::utils::id::NodeName;

/// How a topology turns node-level paths into interface-level paths.
///
/// Chosen once per model from the "parallel interfaces allowed" capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathNormalizer {
    /// At most one interface between any ordered node pair.
    SingleLink,

    /// Any number of parallel interfaces; each hop expands into its ECMP set.
    ParallelLinks,
}

/// Which parallel interfaces of a hop take part in the expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopSelection {
    /// Only the interfaces whose cost equals the hop's minimum (ECMP set).
    LowestCost,

    /// Every interface of the hop.
    Any,
}

impl PathNormalizer {
    /// Candidate interfaces for every hop of `node_path`, in path order.
    ///
    /// Returns `None` if any hop has no interface admitting `min_bw`.
    pub fn hop_choices(&self, graph: &TopologyGraph, node_path: &[NodeName], selection: HopSelection, min_bw: f64) -> Option<Vec<Vec<InterfaceKey>>> {
        let mut choices = Vec::with_capacity(node_path.len().saturating_sub(1));

        for hop in node_path.windows(2) {
            let edges: Vec<&Edge> = graph.edges_between(&hop[0], &hop[1]).into_iter().filter(|edge| edge.admits(min_bw)).collect();
            let min_cost = edges.iter().map(|edge| edge.cost).min()?;

            let selected: Vec<InterfaceKey> = match (self, selection) {
                (PathNormalizer::SingleLink, _) => {
                    if edges.len() > 1 {
                        log::warn!("Single link topology has {} interfaces from {} to {}; using the cheapest", edges.len(), hop[0], hop[1]);
                    }
                    edges.iter().find(|edge| edge.cost == min_cost).map(|edge| edge.interface).into_iter().collect()
                }
                (PathNormalizer::ParallelLinks, HopSelection::LowestCost) => {
                    edges.iter().filter(|edge| edge.cost == min_cost).map(|edge| edge.interface).collect()
                }
                (PathNormalizer::ParallelLinks, HopSelection::Any) => edges.iter().map(|edge| edge.interface).collect(),
            };

            choices.push(selected);
        }

        Some(choices)
    }

    /// Expands a node-level path into the cross product of its concrete interface paths.
    pub fn normalize(&self, graph: &TopologyGraph, node_path: &[NodeName], selection: HopSelection, min_bw: f64) -> Vec<Vec<InterfaceKey>> {
        match self.hop_choices(graph, node_path, selection, min_bw) {
            Some(choices) if !choices.is_empty() => cross_product(&choices),
            _ => Vec::new(),
        }
    }
}

/// Cartesian product of per-position choices: n1 x n2 x ... x nk sequences.
pub fn cross_product<T: Clone>(choices: &[Vec<T>]) -> Vec<Vec<T>> {
    let mut product: Vec<Vec<T>> = vec![Vec::with_capacity(choices.len())];

    for options in choices {
        let mut next = Vec::with_capacity(product.len() * options.len());
        for prefix in &product {
            for option in options {
                let mut extended = prefix.clone();
                extended.push(option.clone());
                next.push(extended);
            }
        }
        product = next;
    }

    product
}
