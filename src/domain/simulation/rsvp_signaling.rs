use std::collections::BTreeMap;

use rand::RngCore;
use rand::prelude::IndexedRandom;

use crate::domain::model::interface::BANDWIDTH_TOLERANCE;
use crate::domain::model::model::{InterfaceKey, LspKey, Model};
use crate::domain::model::rsvp_lsp::{LspPath, RoutedLspPath};
use crate::domain::topology::graph::{GraphConfig, TopologyGraph};
use crate::domain::topology::normalizer::HopSelection;
use crate::domain::topology::path_finder::shortest_paths;
use crate::domain::utils::id::NodeName;

/// Signals every RSVP LSP of a model against the current reservable bandwidth.
///
/// The uniform tie-break between equally short candidate paths draws from `rng`, so a
/// seeded generator pins the outcome of a run.
pub struct SignalingEngine<'a, R: RngCore> {
    model: &'a mut Model,
    rng: &'a mut R,
}

impl<'a, R: RngCore> SignalingEngine<'a, R> {
    pub fn new(model: &'a mut Model, rng: &'a mut R) -> Self {
        Self { model, rng }
    }

    /// Routes all parallel groups in (source, dest) order.
    ///
    /// Expects reservations to be cleared beforehand. An LSP without a feasible path ends
    /// up `Unrouted`, which is not an error.
    pub fn signal_all(&mut self) {
        let demand_traffic = self.group_demand_traffic();

        for ((source, dest), members) in self.model.parallel_lsp_groups() {
            let group_traffic = demand_traffic.get(&(source.clone(), dest.clone())).copied().unwrap_or(0.0);
            self.signal_group(&source, &dest, &members, group_traffic);
        }
    }

    /// Total demand traffic per (source, dest).
    fn group_demand_traffic(&self) -> BTreeMap<(NodeName, NodeName), f64> {
        let mut traffic: BTreeMap<(NodeName, NodeName), f64> = BTreeMap::new();
        for demand in self.model.demands.values() {
            *traffic.entry((demand.source.clone(), demand.dest.clone())).or_default() += demand.traffic;
        }
        traffic
    }

    fn signal_group(&mut self, source: &NodeName, dest: &NodeName, members: &[LspKey], group_traffic: f64) {
        let share = group_traffic / members.len() as f64;

        for lsp in members {
            self.signal_lsp(*lsp, share);
        }

        let routed: Vec<LspKey> = members.iter().copied().filter(|lsp| self.model.lsps[*lsp].is_routed()).collect();

        if routed.is_empty() || routed.len() == members.len() {
            log::debug!("LSP group {} => {}: {}/{} routed", source, dest, routed.len(), members.len());
            return;
        }

        // Partial group: spread the whole group traffic over the members that made it.
        // Members that failed to signal are not retried.
        log::debug!(
            "LSP group {} => {}: only {}/{} routed, rebalancing the routed members",
            source,
            dest,
            routed.len(),
            members.len()
        );

        for lsp in &routed {
            self.release(*lsp);
        }

        let rebalanced_share = group_traffic / routed.len() as f64;
        for lsp in routed {
            self.signal_lsp(lsp, rebalanced_share);
        }
    }

    /// Attempts to signal one LSP, reserving its setup bandwidth on success.
    fn signal_lsp(&mut self, key: LspKey, derived_setup_bandwidth: f64) {
        let lsp = &self.model.lsps[key];
        let setup_bandwidth = lsp.configured_setup_bandwidth.unwrap_or(derived_setup_bandwidth);
        let (source, dest) = (lsp.source.clone(), lsp.dest.clone());

        match self.find_path(&source, &dest, setup_bandwidth) {
            Some(path) => {
                for interface in &path.interfaces {
                    self.model.interfaces[*interface].reserved_bandwidth += setup_bandwidth;
                }

                let lsp = &mut self.model.lsps[key];
                log::debug!(
                    "LSP {} ({} => {}) signaled over {} hop(s), cost {}, reserving {}",
                    lsp.name,
                    lsp.source,
                    lsp.dest,
                    path.interfaces.len(),
                    path.path_cost,
                    setup_bandwidth
                );
                lsp.path = LspPath::Routed(path);
                lsp.reserved_bandwidth = Some(setup_bandwidth);
                lsp.setup_bandwidth = Some(setup_bandwidth);
            }
            None => {
                let lsp = &mut self.model.lsps[key];
                log::warn!("LSP {} ({} => {}) unrouted: no path admits {} of setup bandwidth", lsp.name, lsp.source, lsp.dest, setup_bandwidth);
                lsp.path = LspPath::Unrouted;
                lsp.reserved_bandwidth = None;
                lsp.setup_bandwidth = Some(setup_bandwidth);
            }
        }
    }

    /// Returns the bandwidth reserved by a routed LSP to its interfaces and unroutes it.
    fn release(&mut self, key: LspKey) {
        let lsp = &mut self.model.lsps[key];
        let reserved = lsp.reserved_bandwidth.unwrap_or(0.0);
        let interfaces = match &lsp.path {
            LspPath::Routed(path) => path.interfaces.clone(),
            LspPath::Unrouted => Vec::new(),
        };
        lsp.reset();

        for interface in interfaces {
            self.model.interfaces[interface].reserved_bandwidth -= reserved;
        }
    }

    /// Candidate selection: shortest RSVP eligible paths admitting `setup_bandwidth`,
    /// then fewest hops, then a uniform random pick.
    fn find_path(&mut self, source: &NodeName, dest: &NodeName, setup_bandwidth: f64) -> Option<RoutedLspPath> {
        let graph = TopologyGraph::build(&*self.model, &GraphConfig::rsvp(setup_bandwidth));
        let node_paths = shortest_paths(&graph, source, dest, setup_bandwidth)?;
        let normalizer = self.model.config.normalizer();

        let candidates: Vec<Vec<InterfaceKey>> = node_paths
            .paths
            .iter()
            .flat_map(|path| normalizer.normalize(&graph, path, HopSelection::LowestCost, setup_bandwidth))
            .filter(|candidate| self.min_reservable_bandwidth(candidate) + BANDWIDTH_TOLERANCE >= setup_bandwidth)
            .collect();

        let fewest_hops = candidates.iter().map(Vec::len).min()?;
        let shortest: Vec<&Vec<InterfaceKey>> = candidates.iter().filter(|candidate| candidate.len() == fewest_hops).collect();

        if shortest.len() > 1 {
            log::trace!("{} equally short candidate paths {} => {}, picking one at random", shortest.len(), source, dest);
        }
        let chosen = (*shortest.choose(&mut *self.rng)?).clone();

        Some(RoutedLspPath {
            path_cost: chosen.iter().map(|key| self.model.interfaces[*key].cost).sum(),
            baseline_path_reservable_bw: self.min_reservable_bandwidth(&chosen),
            interfaces: chosen,
        })
    }

    fn min_reservable_bandwidth(&self, path: &[InterfaceKey]) -> f64 {
        path.iter().map(|key| self.model.interfaces[*key].reservable_bandwidth()).fold(f64::INFINITY, f64::min)
    }
}

impl Model {
    /// Metric a demand sees when riding the LSP: the manual metric when configured,
    /// otherwise the IGP cost between the LSP's endpoints over non-failed interfaces.
    ///
    /// `None` when no manual metric is set and the endpoints are not IGP connected.
    pub fn lsp_effective_metric(&self, key: LspKey) -> Option<i64> {
        let graph = TopologyGraph::build(self, &GraphConfig::igp());
        self.lsp_effective_metric_on(&graph, key)
    }

    /// Same as [`Model::lsp_effective_metric`] against an already projected IGP graph.
    pub(crate) fn lsp_effective_metric_on(&self, igp_graph: &TopologyGraph, key: LspKey) -> Option<i64> {
        let lsp = self.lsps.get(key)?;
        if let Some(metric) = lsp.manual_metric {
            return Some(metric);
        }
        shortest_paths(igp_graph, &lsp.source, &lsp.dest, 0.0).map(|paths| paths.cost)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::domain::model::demand::Demand;
    use crate::domain::model::interface::Interface;
    use crate::domain::model::rsvp_lsp::RsvpLsp;

    fn link(model: &mut Model, a: &str, b: &str, cost: i64, capacity: f64, circuit_id: &str) -> InterfaceKey {
        let side_a = Interface::new(format!("{}-{}-{}", a, b, circuit_id).as_str(), a, b, cost, capacity, circuit_id).unwrap();
        let side_b = Interface::new(format!("{}-{}-{}", b, a, circuit_id).as_str(), b, a, cost, capacity, circuit_id).unwrap();
        model.add_circuit(side_a, side_b).unwrap().0
    }

    #[test]
    fn test_group_shares_demand_traffic() {
        let mut model = Model::default();
        link(&mut model, "A", "B", 10, 100.0, "1");
        model.add_demand(Demand::new("A", "B", 60.0, "dmd").unwrap()).unwrap();
        let lsp_1 = model.add_rsvp_lsp(RsvpLsp::new("A", "B", "lsp-1").unwrap()).unwrap();
        let lsp_2 = model.add_rsvp_lsp(RsvpLsp::new("A", "B", "lsp-2").unwrap()).unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        SignalingEngine::new(&mut model, &mut rng).signal_all();

        assert_eq!(model.lsps[lsp_1].reserved_bandwidth, Some(30.0));
        assert_eq!(model.lsps[lsp_2].reserved_bandwidth, Some(30.0));
    }

    #[test]
    fn test_partial_group_rebalances_routed_members_only() {
        let mut model = Model::default();
        let ab = link(&mut model, "A", "B", 10, 100.0, "1");
        model.add_demand(Demand::new("A", "B", 90.0, "dmd").unwrap()).unwrap();
        let big = model.add_rsvp_lsp(RsvpLsp::new("A", "B", "big").unwrap().with_configured_setup_bandwidth(80.0).unwrap()).unwrap();
        let small = model.add_rsvp_lsp(RsvpLsp::new("A", "B", "small").unwrap()).unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        SignalingEngine::new(&mut model, &mut rng).signal_all();

        // "big" takes 80, "small" needs 45 of the remaining 20 and fails. The rebalancing
        // pass re-signals "big" alone with its configured bandwidth; "small" is not retried.
        assert!(model.lsps[big].is_routed());
        assert!(!model.lsps[small].is_routed());
        assert_eq!(model.lsps[small].setup_bandwidth, Some(45.0));
        assert_eq!(model.interfaces[ab].reserved_bandwidth, 80.0);
    }

    #[test]
    fn test_effective_metric_prefers_manual_metric() {
        let mut model = Model::default();
        link(&mut model, "A", "B", 10, 100.0, "1");
        link(&mut model, "B", "C", 15, 100.0, "2");
        let igp = model.add_rsvp_lsp(RsvpLsp::new("A", "C", "igp").unwrap()).unwrap();
        let manual = model.add_rsvp_lsp(RsvpLsp::new("A", "C", "manual").unwrap().with_manual_metric(5).unwrap()).unwrap();

        assert_eq!(model.lsp_effective_metric(igp), Some(25));
        assert_eq!(model.lsp_effective_metric(manual), Some(5));
    }
}
