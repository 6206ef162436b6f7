use std::collections::{BTreeMap, BTreeSet};

use crate::domain::model::demand::{DemandPath, Hop, PathDetail};
use crate::domain::model::model::{DemandKey, LspKey, Model};
use crate::domain::model::queries::GroupKey;
use crate::domain::simulation::igp_shortcuts::{LspMetrics, ShortcutResolver};
use crate::domain::topology::graph::{GraphConfig, TopologyGraph};
use crate::domain::topology::normalizer::{HopSelection, cross_product};
use crate::domain::topology::path_finder::shortest_paths;
use crate::domain::utils::id::NodeName;

/// Routes every demand over LSPs or the IGP and accounts the traffic it puts on
/// interfaces and LSPs.
pub struct DemandRouter<'a> {
    model: &'a mut Model,
}

impl<'a> DemandRouter<'a> {
    pub fn new(model: &'a mut Model) -> Self {
        Self { model }
    }

    /// Expects interface traffic to be cleared and LSPs to be signaled beforehand.
    pub fn route_all(&mut self) {
        let plans = self.plan_routes();

        for lsp in self.model.lsps.values_mut() {
            lsp.traffic = lsp.is_routed().then_some(0.0);
        }

        for (key, alternatives) in plans {
            match alternatives {
                Some(alternatives) => self.apply(key, alternatives),
                None => {
                    let demand = &mut self.model.demands[key];
                    log::warn!("Demand {} ({} => {}) unrouted: no path to destination", demand.name, demand.source, demand.dest);
                    demand.reset();
                }
            }
        }

        self.apply_lsp_traffic();
    }

    fn plan_routes(&self) -> Vec<(DemandKey, Option<Vec<Vec<Hop>>>)> {
        let model: &Model = &*self.model;
        let igp_graph = TopologyGraph::build(model, &GraphConfig::igp());
        let metrics = LspMetrics::compute(model, &igp_graph);
        let resolver = ShortcutResolver::new(model, &metrics);
        let lsp_groups = model.parallel_lsp_groups();

        model
            .demands
            .iter()
            .map(|(key, demand)| {
                let group = (demand.source.clone(), demand.dest.clone());
                let route = route_over_lsps(&lsp_groups, &metrics, &group)
                    .or_else(|| route_over_igp(model, &igp_graph, &resolver, &demand.source, &demand.dest));
                (key, route)
            })
            .collect()
    }

    /// Splits the demand's traffic over its alternatives and adds every share to the
    /// interfaces and LSPs it crosses.
    fn apply(&mut self, key: DemandKey, alternatives: Vec<Vec<Hop>>) {
        let traffic = self.model.demands[key].traffic;
        let details = split_traffic(&alternatives, traffic);

        for detail in &details {
            for hop in &detail.hops {
                match hop {
                    Hop::Interface(interface) => self.model.interfaces[*interface].traffic += detail.path_traffic,
                    Hop::Lsp(lsp) => {
                        let lsp = &mut self.model.lsps[*lsp];
                        lsp.traffic = Some(lsp.traffic.unwrap_or(0.0) + detail.path_traffic);
                    }
                }
            }
        }

        let demand = &mut self.model.demands[key];
        log::debug!("Demand {} ({} => {}) routed over {} alternative(s)", demand.name, demand.source, demand.dest, alternatives.len());
        demand.path = DemandPath::Alternatives(alternatives);
        demand.path_detail = details;
    }

    /// Puts the traffic carried by each routed LSP onto the interfaces it transits.
    fn apply_lsp_traffic(&mut self) {
        let loads: Vec<(Vec<_>, f64)> = self
            .model
            .lsps
            .values()
            .filter_map(|lsp| Some((lsp.path.routed()?.interfaces.clone(), lsp.traffic.unwrap_or(0.0))))
            .collect();

        for (interfaces, traffic) in loads {
            for interface in interfaces {
                self.model.interfaces[interface].traffic += traffic;
            }
        }
    }
}

/// A demand with routed LSPs in its own parallel group rides all of those tied at the
/// lowest effective metric, one alternative per LSP.
fn route_over_lsps(lsp_groups: &BTreeMap<GroupKey, Vec<LspKey>>, metrics: &LspMetrics, group: &GroupKey) -> Option<Vec<Vec<Hop>>> {
    let best = metrics.lowest_metric_members(lsp_groups.get(group)?);
    if best.is_empty() {
        return None;
    }
    Some(best.into_iter().map(|lsp| vec![Hop::Lsp(lsp)]).collect())
}

/// IGP shortest paths with shortcuts spliced in, keeping only the alternatives with the
/// lowest aggregate metric.
fn route_over_igp(model: &Model, igp_graph: &TopologyGraph, resolver: &ShortcutResolver, source: &NodeName, dest: &NodeName) -> Option<Vec<Vec<Hop>>> {
    let node_paths = shortest_paths(igp_graph, source, dest, 0.0)?;
    let normalizer = model.config.normalizer();

    let mut best_metric: Option<i64> = None;
    let mut alternatives: Vec<Vec<Hop>> = Vec::new();

    for node_path in &node_paths.paths {
        let Some(choices) = normalizer.hop_choices(igp_graph, node_path, HopSelection::LowestCost, 0.0) else {
            continue;
        };
        let segments = resolver.resolve(node_path, &choices);

        for alternative in cross_product(&segments) {
            let metric = resolver.aggregate_metric(&alternative);
            match best_metric {
                Some(best) if metric > best => continue,
                Some(best) if metric < best => alternatives.clear(),
                _ => {}
            }
            best_metric = Some(metric);
            // Different node paths can collapse onto the same spliced alternative.
            if !alternatives.contains(&alternative) {
                alternatives.push(alternative);
            }
        }
    }

    (!alternatives.is_empty()).then_some(alternatives)
}

/// ECMP split over the tree the alternatives form: at every branch point the share
/// reaching it divides evenly across the distinct hops taken by the alternatives that
/// share the same prefix, so the path shares always add up to `traffic`.
fn split_traffic(alternatives: &[Vec<Hop>], traffic: f64) -> Vec<PathDetail> {
    alternatives
        .iter()
        .map(|hops| {
            let splits: Vec<usize> = (0..hops.len())
                .map(|depth| {
                    let prefix = &hops[..depth];
                    alternatives
                        .iter()
                        .filter(|other| other.len() > depth && other.starts_with(prefix))
                        .map(|other| other[depth])
                        .collect::<BTreeSet<Hop>>()
                        .len()
                        .max(1)
                })
                .collect();
            let cumulative_split: usize = splits.iter().product();

            PathDetail { hops: hops.clone(), splits, cumulative_split, path_traffic: traffic / cumulative_split as f64 }
        })
        .collect()
}
