use std::collections::HashMap;

use crate::domain::model::demand::Hop;
use crate::domain::model::model::{InterfaceKey, LspKey, Model};
use crate::domain::topology::graph::TopologyGraph;
use crate::domain::utils::id::NodeName;

/// Effective metrics of the routed LSPs, computed once per demand routing pass.
#[derive(Debug, Clone, Default)]
pub struct LspMetrics {
    metrics: HashMap<LspKey, i64>,
}

impl LspMetrics {
    pub fn compute(model: &Model, igp_graph: &TopologyGraph) -> Self {
        let mut metrics = HashMap::new();

        for (key, lsp) in model.lsps.iter() {
            let Some(path) = lsp.path.routed() else {
                continue;
            };
            // A routed LSP always has an IGP path; its own cost is only a fallback.
            let metric = model.lsp_effective_metric_on(igp_graph, key).unwrap_or(path.path_cost);
            metrics.insert(key, metric);
        }

        Self { metrics }
    }

    /// `None` for unrouted LSPs.
    pub fn get(&self, key: LspKey) -> Option<i64> {
        self.metrics.get(&key).copied()
    }

    /// Routed members of `candidates` tied at the lowest effective metric.
    pub fn lowest_metric_members(&self, candidates: &[LspKey]) -> Vec<LspKey> {
        let Some(best) = candidates.iter().filter_map(|key| self.get(*key)).min() else {
            return Vec::new();
        };
        candidates.iter().copied().filter(|key| self.get(*key) == Some(best)).collect()
    }
}

/// Splices routed LSPs into IGP paths at nodes with IGP shortcuts enabled.
pub struct ShortcutResolver<'a> {
    model: &'a Model,
    metrics: &'a LspMetrics,

    /// Routed LSPs per (source, dest), insertion ordered.
    routed_groups: HashMap<(NodeName, NodeName), Vec<LspKey>>,
}

impl<'a> ShortcutResolver<'a> {
    pub fn new(model: &'a Model, metrics: &'a LspMetrics) -> Self {
        let mut routed_groups: HashMap<(NodeName, NodeName), Vec<LspKey>> = HashMap::new();
        for (key, lsp) in model.lsps.iter().filter(|(_, lsp)| lsp.is_routed()) {
            routed_groups.entry((lsp.source.clone(), lsp.dest.clone())).or_default().push(key);
        }

        Self { model, metrics, routed_groups }
    }

    /// Per-segment hop choices for one node-level path.
    ///
    /// `interface_choices[i]` are the interfaces usable from `node_path[i]` to
    /// `node_path[i + 1]`. Walking the path, at every shortcut enabled node the downstream
    /// nodes are scanned from the furthest to the nearest; the first one reachable through
    /// a routed LSP group replaces the whole stretch with that group's best members and the
    /// walk continues from the LSP's destination.
    pub fn resolve(&self, node_path: &[NodeName], interface_choices: &[Vec<InterfaceKey>]) -> Vec<Vec<Hop>> {
        let mut segments: Vec<Vec<Hop>> = Vec::with_capacity(interface_choices.len());
        let last = node_path.len().saturating_sub(1);
        let mut at = 0;

        while at < last {
            if let Some((lsps, resume_at)) = self.shortcut_from(node_path, at) {
                log::trace!("IGP shortcut at {}: {} LSP(s) to {}", node_path[at], lsps.len(), node_path[resume_at]);
                segments.push(lsps.into_iter().map(Hop::Lsp).collect());
                at = resume_at;
                continue;
            }

            segments.push(interface_choices[at].iter().copied().map(Hop::Interface).collect());
            at += 1;
        }

        segments
    }

    fn shortcut_from(&self, node_path: &[NodeName], at: usize) -> Option<(Vec<LspKey>, usize)> {
        let node = &node_path[at];
        if !self.model.nodes.get(node).is_some_and(|n| n.igp_shortcuts_enabled) {
            return None;
        }

        (at + 1..node_path.len()).rev().find_map(|downstream| {
            let group = self.routed_groups.get(&(node.clone(), node_path[downstream].clone()))?;
            let best = self.metrics.lowest_metric_members(group);
            (!best.is_empty()).then_some((best, downstream))
        })
    }

    /// Interface cost plus effective metric of every spliced LSP.
    pub fn aggregate_metric(&self, hops: &[Hop]) -> i64 {
        hops.iter()
            .map(|hop| match hop {
                Hop::Interface(key) => self.model.interfaces.get(*key).map_or(0, |interface| interface.cost),
                Hop::Lsp(key) => self.metrics.get(*key).unwrap_or(0),
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::domain::model::interface::Interface;
    use crate::domain::model::rsvp_lsp::RsvpLsp;
    use crate::domain::simulation::rsvp_signaling::SignalingEngine;
    use crate::domain::topology::graph::GraphConfig;

    fn link(model: &mut Model, a: &str, b: &str, cost: i64, circuit_id: &str) -> InterfaceKey {
        let side_a = Interface::new(format!("{}-{}", a, b).as_str(), a, b, cost, 100.0, circuit_id).unwrap();
        let side_b = Interface::new(format!("{}-{}", b, a).as_str(), b, a, cost, 100.0, circuit_id).unwrap();
        model.add_circuit(side_a, side_b).unwrap().0
    }

    #[test]
    fn test_path_without_shortcut_nodes_is_unchanged() {
        let mut model = Model::default();
        let ab = link(&mut model, "A", "B", 10, "1");
        let bc = link(&mut model, "B", "C", 10, "2");
        model.add_rsvp_lsp(RsvpLsp::new("A", "C", "lsp").unwrap()).unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        SignalingEngine::new(&mut model, &mut rng).signal_all();

        let graph = TopologyGraph::build(&model, &GraphConfig::igp());
        let metrics = LspMetrics::compute(&model, &graph);
        let resolver = ShortcutResolver::new(&model, &metrics);

        let path = vec![NodeName::new("A"), NodeName::new("B"), NodeName::new("C")];
        let segments = resolver.resolve(&path, &[vec![ab], vec![bc]]);

        assert_eq!(segments, vec![vec![Hop::Interface(ab)], vec![Hop::Interface(bc)]]);
    }

    #[test]
    fn test_furthest_downstream_lsp_is_spliced() {
        let mut model = Model::default();
        let ab = link(&mut model, "A", "B", 10, "1");
        let bc = link(&mut model, "B", "C", 10, "2");
        let cd = link(&mut model, "C", "D", 10, "3");
        model.set_node_igp_shortcuts(&NodeName::new("A"), true).unwrap();
        let _near = model.add_rsvp_lsp(RsvpLsp::new("A", "B", "near").unwrap()).unwrap();
        let far = model.add_rsvp_lsp(RsvpLsp::new("A", "C", "far").unwrap()).unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        SignalingEngine::new(&mut model, &mut rng).signal_all();

        let graph = TopologyGraph::build(&model, &GraphConfig::igp());
        let metrics = LspMetrics::compute(&model, &graph);
        let resolver = ShortcutResolver::new(&model, &metrics);

        let path = vec![NodeName::new("A"), NodeName::new("B"), NodeName::new("C"), NodeName::new("D")];
        let segments = resolver.resolve(&path, &[vec![ab], vec![bc], vec![cd]]);

        assert_eq!(segments, vec![vec![Hop::Lsp(far)], vec![Hop::Interface(cd)]]);
        assert_eq!(resolver.aggregate_metric(&[Hop::Lsp(far), Hop::Interface(cd)]), 30);
    }
}
