use ip_te_simulator::domain::topology::graph::{GraphConfig, TopologyGraph};
use ip_te_simulator::domain::topology::path_finder::shortest_paths;
use ip_te_simulator::{Error, Interface, InterfaceKey, Model, Node, NodeName, SimulationConfig};

fn link(model: &mut Model, a: &str, b: &str, cost: i64, capacity: f64, circuit_id: &str) -> InterfaceKey {
    let side_a = Interface::new(format!("{}-{}-{}", a, b, circuit_id).as_str(), a, b, cost, capacity, circuit_id).unwrap();
    let side_b = Interface::new(format!("{}-{}-{}", b, a, circuit_id).as_str(), b, a, cost, capacity, circuit_id).unwrap();
    model.add_circuit(side_a, side_b).unwrap().0
}

fn node(name: &str) -> NodeName {
    NodeName::new(name)
}

#[test]
fn test_graph_contains_isolated_nodes() {
    let mut model = Model::default();
    link(&mut model, "A", "B", 10, 100.0, "1");
    model.add_node(Node::new("Lonely")).unwrap();

    let graph = TopologyGraph::build(&model, &GraphConfig::igp());

    assert!(graph.contains_node(&node("Lonely")));
    assert!(graph.outgoing(&node("Lonely")).is_empty());
    assert!(shortest_paths(&graph, &node("A"), &node("Lonely"), 0.0).is_none());
    assert_eq!(graph.edge_count(), 2);

    assert!(model.is_node_orphan(&node("Lonely")).unwrap());
    assert!(!model.is_node_orphan(&node("A")).unwrap());
    assert_eq!(model.orphan_nodes().len(), 1);
}

#[test]
fn test_shortest_path_expands_parallel_links() {
    let mut model = Model::default();
    let ab_1 = link(&mut model, "A", "B", 10, 100.0, "1");
    let ab_2 = link(&mut model, "A", "B", 10, 100.0, "2");
    let bc = link(&mut model, "B", "C", 10, 100.0, "3");

    let paths = model.get_shortest_path(&node("A"), &node("C"), 0.0).unwrap().unwrap();

    assert_eq!(paths.cost, 20);
    assert_eq!(paths.paths, vec![vec![ab_1, bc], vec![ab_2, bc]]);
}

#[test]
fn test_shortest_path_honours_needed_bandwidth() {
    let mut model = Model::default();
    link(&mut model, "A", "B", 10, 50.0, "1");
    let ac = link(&mut model, "A", "C", 40, 500.0, "2");
    link(&mut model, "B", "C", 10, 50.0, "3");

    let cheap = model.get_shortest_path(&node("A"), &node("C"), 10.0).unwrap().unwrap();
    assert_eq!(cheap.cost, 20);

    let fat = model.get_shortest_path(&node("A"), &node("C"), 200.0).unwrap().unwrap();
    assert_eq!(fat.cost, 40);
    assert_eq!(fat.paths, vec![vec![ac]]);

    assert!(model.get_shortest_path(&node("A"), &node("C"), 1000.0).unwrap().is_none());
    assert!(matches!(model.get_shortest_path(&node("A"), &node("Z"), 0.0), Err(Error::LookupError(_))));
}

#[test]
fn test_all_paths_respect_hop_limit_and_failures() {
    let mut model = Model::default();
    link(&mut model, "A", "B", 10, 100.0, "1");
    link(&mut model, "B", "D", 10, 100.0, "2");
    link(&mut model, "A", "C", 10, 100.0, "3");
    link(&mut model, "C", "D", 10, 100.0, "4");
    link(&mut model, "B", "C", 10, 100.0, "5");

    let all = model.get_all_paths_reservable_bw(&node("A"), &node("D"), false, None, 0.0).unwrap();
    // A-B-D, A-C-D, A-B-C-D, A-C-B-D
    assert_eq!(all.len(), 4);

    let short = model.get_all_paths_reservable_bw(&node("A"), &node("D"), false, Some(2), 0.0).unwrap();
    assert_eq!(short.len(), 2);

    model.fail_node(&node("B")).unwrap();
    let surviving = model.get_all_paths_reservable_bw(&node("A"), &node("D"), false, None, 0.0).unwrap();
    assert_eq!(surviving.len(), 1);

    let including_failed = model.get_all_paths_reservable_bw(&node("A"), &node("D"), true, None, 0.0).unwrap();
    assert_eq!(including_failed.len(), 4);
}

#[test]
fn test_single_link_normalizer_yields_one_interface_per_hop() {
    let mut model = Model::new(SimulationConfig::single_link());
    let ab = link(&mut model, "A", "B", 10, 100.0, "1");
    let bc = link(&mut model, "B", "C", 10, 100.0, "2");

    let paths = model.get_shortest_path(&node("A"), &node("C"), 0.0).unwrap().unwrap();

    assert_eq!(paths.paths, vec![vec![ab, bc]]);
}

#[test]
fn test_circuit_and_node_interface_queries() {
    let mut model = Model::default();
    let ab = link(&mut model, "A", "B", 10, 100.0, "1");
    let ac = link(&mut model, "A", "C", 10, 100.0, "2");
    let ba = model.interface_key(&"B-A-1".into(), &node("B")).unwrap();

    let circuit = model.circuit_for_interface(ab).unwrap();
    assert_eq!(circuit.remote_of(ab), Some(ba));

    let mut egress = model.node_interfaces(&node("A")).unwrap();
    egress.sort();
    let mut expected = vec![ab, ac];
    expected.sort();
    assert_eq!(egress, expected);
    assert!(matches!(model.node_interfaces(&node("Z")), Err(Error::LookupError(_))));
}

#[test]
fn test_diagnostics_count_failures_and_routing() {
    let mut model = Model::new(SimulationConfig::default().with_seed(4));
    link(&mut model, "A", "B", 10, 100.0, "1");
    link(&mut model, "B", "C", 10, 100.0, "2");
    model.add_demand(ip_te_simulator::Demand::new("A", "C", 10.0, "dmd").unwrap()).unwrap();
    model.add_demand(ip_te_simulator::Demand::new("B", "C", 10.0, "dmd").unwrap()).unwrap();
    model.fail_node(&node("A")).unwrap();

    model.update_simulation().unwrap();
    let diagnostics = model.simulation_diagnostics();

    assert_eq!(diagnostics.nodes, 3);
    assert_eq!(diagnostics.failed_nodes, 1);
    assert_eq!(diagnostics.failed_interfaces, 2);
    assert_eq!(diagnostics.routed_demands, 1);
    assert_eq!(diagnostics.unrouted_demands, 1);
    assert_eq!(model.demands_from_node(&node("A")).len(), 1);
    assert_eq!(model.demands_to_node(&node("C")).len(), 2);
}
