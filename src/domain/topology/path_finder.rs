use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, VecDeque};

use crate::domain::model::model::{InterfaceKey, Model};
use crate::domain::topology::graph::{GraphConfig, TopologyGraph};
use crate::domain::topology::normalizer::HopSelection;
use crate::domain::utils::id::NodeName;
use crate::error::Result;

/// Every tied minimum-cost node-level path between two nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePaths {
    pub cost: i64,
    pub paths: Vec<Vec<NodeName>>,
}

/// Interface-level paths between two nodes, with the cost they share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfacePaths {
    pub cost: i64,
    pub paths: Vec<Vec<InterfaceKey>>,
}

/// Dijkstra over the node-level view of `graph`, keeping every tied predecessor.
///
/// Between two adjacent nodes the cheapest edge admitting `min_bw` defines the hop cost.
/// Returns `None` when `dst` is unreachable, when either endpoint is missing from the
/// graph, or when `src == dst`.
pub fn shortest_paths(graph: &TopologyGraph, src: &NodeName, dst: &NodeName, min_bw: f64) -> Option<NodePaths> {
    if src == dst || !graph.contains_node(src) || !graph.contains_node(dst) {
        return None;
    }

    let mut distance: BTreeMap<&NodeName, i64> = BTreeMap::new();
    let mut predecessors: BTreeMap<&NodeName, BTreeSet<&NodeName>> = BTreeMap::new();
    let mut queue: BinaryHeap<Reverse<(i64, &NodeName)>> = BinaryHeap::new();

    distance.insert(src, 0);
    queue.push(Reverse((0, src)));

    while let Some(Reverse((cost, node))) = queue.pop() {
        if distance.get(node).is_some_and(|best| cost > *best) {
            continue;
        }

        for edge in graph.outgoing(node).iter().filter(|edge| edge.admits(min_bw)) {
            let candidate = cost + edge.cost;

            match distance.get(&edge.target) {
                Some(best) if candidate > *best => {}
                Some(best) if candidate == *best => {
                    predecessors.entry(&edge.target).or_default().insert(node);
                }
                _ => {
                    distance.insert(&edge.target, candidate);
                    predecessors.insert(&edge.target, BTreeSet::from([node]));
                    queue.push(Reverse((candidate, &edge.target)));
                }
            }
        }
    }

    let cost = *distance.get(dst)?;

    let mut paths = Vec::new();
    let mut suffix = vec![dst];
    collect_paths(src, &predecessors, &mut suffix, &mut paths);

    log::trace!("Shortest paths {} => {}: {} path(s) with cost {}", src, dst, paths.len(), cost);

    Some(NodePaths { cost, paths })
}

/// Walks the predecessor DAG back from the last node of `suffix` to `src`.
fn collect_paths<'a>(
    src: &NodeName,
    predecessors: &BTreeMap<&'a NodeName, BTreeSet<&'a NodeName>>,
    suffix: &mut Vec<&'a NodeName>,
    paths: &mut Vec<Vec<NodeName>>,
) {
    let Some(current) = suffix.last().copied() else {
        return;
    };

    if current == src {
        paths.push(suffix.iter().rev().map(|node| (*node).clone()).collect());
        return;
    }

    if let Some(previous) = predecessors.get(current) {
        for node in previous.iter().copied() {
            suffix.push(node);
            collect_paths(src, predecessors, suffix, paths);
            suffix.pop();
        }
    }
}

/// All loop-free node-level paths from `src` to `dst` with at most `max_hops` hops.
///
/// Breadth first, so shorter paths (in hops) come first.
pub fn all_simple_paths(graph: &TopologyGraph, src: &NodeName, dst: &NodeName, max_hops: Option<usize>, min_bw: f64) -> Vec<Vec<NodeName>> {
    let mut found_solutions = Vec::new();

    if src == dst || !graph.contains_node(src) || !graph.contains_node(dst) {
        return found_solutions;
    }

    let mut queue: VecDeque<Vec<&NodeName>> = VecDeque::new();
    queue.push_back(vec![src]);

    while let Some(current_path) = queue.pop_front() {
        let Some(last) = current_path.last().copied() else {
            continue;
        };

        if last == dst {
            found_solutions.push(current_path.iter().map(|node| (*node).clone()).collect());
            continue;
        }

        let hops = current_path.len() - 1;
        if max_hops.is_some_and(|limit| hops >= limit) {
            continue;
        }

        let next_hops: BTreeSet<&NodeName> = graph.outgoing(last).iter().filter(|edge| edge.admits(min_bw)).map(|edge| &edge.target).collect();

        for next in next_hops {
            if current_path.contains(&next) {
                continue;
            }
            let mut new_path = current_path.clone();
            new_path.push(next);
            queue.push_back(new_path);
        }
    }

    found_solutions
}

impl Model {
    /// Interface-level ECMP shortest paths over non-failed interfaces with at least
    /// `needed_bw` of reservable bandwidth. `Ok(None)` means no path exists.
    pub fn get_shortest_path(&self, src: &NodeName, dst: &NodeName, needed_bw: f64) -> Result<Option<InterfacePaths>> {
        self.require_node(src)?;
        self.require_node(dst)?;

        let config = GraphConfig { min_reservable_bw: Some(needed_bw), ..GraphConfig::igp() };
        let graph = TopologyGraph::build(self, &config);
        let normalizer = self.config.normalizer();

        let Some(node_paths) = shortest_paths(&graph, src, dst, needed_bw) else {
            return Ok(None);
        };

        let paths: Vec<Vec<InterfaceKey>> = node_paths
            .paths
            .iter()
            .flat_map(|path| normalizer.normalize(&graph, path, HopSelection::LowestCost, needed_bw))
            .collect();

        if paths.is_empty() {
            return Ok(None);
        }

        Ok(Some(InterfacePaths { cost: node_paths.cost, paths }))
    }

    /// Every loop-free interface-level path from `src` to `dst` using interfaces with at
    /// least `reservable_bw` of reservable bandwidth. Parallel interfaces are all expanded.
    pub fn get_all_paths_reservable_bw(
        &self,
        src: &NodeName,
        dst: &NodeName,
        include_failed: bool,
        max_hops: Option<usize>,
        reservable_bw: f64,
    ) -> Result<Vec<Vec<InterfaceKey>>> {
        self.require_node(src)?;
        self.require_node(dst)?;

        let config = GraphConfig { min_reservable_bw: Some(reservable_bw), ..GraphConfig::igp() }.with_failed(include_failed);
        let graph = TopologyGraph::build(self, &config);
        let normalizer = self.config.normalizer();

        let paths = all_simple_paths(&graph, src, dst, max_hops, reservable_bw)
            .iter()
            .flat_map(|path| normalizer.normalize(&graph, path, HopSelection::Any, reservable_bw))
            .collect();

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::interface::Interface;

    fn add_link(model: &mut Model, a: &str, b: &str, cost: i64, circuit_id: &str) {
        let side_a = Interface::new(format!("{}-to-{}-{}", a, b, circuit_id).as_str(), a, b, cost, 100.0, circuit_id).unwrap();
        let side_b = Interface::new(format!("{}-to-{}-{}", b, a, circuit_id).as_str(), b, a, cost, 100.0, circuit_id).unwrap();
        model.add_circuit(side_a, side_b).unwrap();
    }

    fn names(path: &[&str]) -> Vec<NodeName> {
        path.iter().map(|n| NodeName::new(*n)).collect()
    }

    #[test]
    fn test_shortest_paths_returns_all_ties() {
        let mut model = Model::default();
        add_link(&mut model, "A", "B", 10, "1");
        add_link(&mut model, "B", "D", 10, "2");
        add_link(&mut model, "A", "C", 10, "3");
        add_link(&mut model, "C", "D", 10, "4");
        add_link(&mut model, "A", "D", 30, "5");

        let graph = TopologyGraph::build(&model, &GraphConfig::igp());
        let result = shortest_paths(&graph, &"A".into(), &"D".into(), 0.0).unwrap();

        assert_eq!(result.cost, 20);
        assert_eq!(result.paths, vec![names(&["A", "B", "D"]), names(&["A", "C", "D"])]);
    }

    #[test]
    fn test_no_path_for_same_node_or_disconnected_node() {
        let mut model = Model::default();
        add_link(&mut model, "A", "B", 10, "1");
        model.add_node(crate::domain::model::node::Node::new("Z")).unwrap();

        let graph = TopologyGraph::build(&model, &GraphConfig::igp());

        assert!(shortest_paths(&graph, &"A".into(), &"A".into(), 0.0).is_none());
        assert!(shortest_paths(&graph, &"A".into(), &"Z".into(), 0.0).is_none());
        assert!(graph.contains_node(&"Z".into()));
    }

    #[test]
    fn test_all_simple_paths_respects_hop_limit() {
        let mut model = Model::default();
        add_link(&mut model, "A", "B", 10, "1");
        add_link(&mut model, "B", "C", 10, "2");
        add_link(&mut model, "C", "D", 10, "3");
        add_link(&mut model, "A", "D", 100, "4");

        let graph = TopologyGraph::build(&model, &GraphConfig::igp());

        let all = all_simple_paths(&graph, &"A".into(), &"D".into(), None, 0.0);
        assert_eq!(all, vec![names(&["A", "D"]), names(&["A", "B", "C", "D"])]);

        let limited = all_simple_paths(&graph, &"A".into(), &"D".into(), Some(2), 0.0);
        assert_eq!(limited, vec![names(&["A", "D"])]);
    }
}
