use approx::assert_abs_diff_eq;

use ip_te_simulator::{Demand, DemandPath, Hop, Interface, InterfaceKey, InterfaceName, Model, NodeName, RsvpLsp, SimulationConfig};

fn link(model: &mut Model, a: &str, b: &str, cost: i64, capacity: f64) -> (InterfaceKey, InterfaceKey) {
    let circuit_id = format!("{}-{}", a, b);
    let side_a = Interface::new(format!("to-{}", b).as_str(), a, b, cost, capacity, circuit_id.as_str()).unwrap();
    let side_b = Interface::new(format!("to-{}", a).as_str(), b, a, cost, capacity, circuit_id.as_str()).unwrap();
    model.add_circuit(side_a, side_b).unwrap()
}

fn traffic(model: &Model, key: InterfaceKey) -> f64 {
    model.interface(key).unwrap().traffic()
}

/// A-B-D costs 40, A-C-D costs 60.
fn create_scenario_a() -> (Model, [InterfaceKey; 4]) {
    let mut model = Model::new(SimulationConfig::default().with_seed(11));
    let (ab, _) = link(&mut model, "A", "B", 20, 100.0);
    let (bd, _) = link(&mut model, "B", "D", 20, 100.0);
    let (ac, _) = link(&mut model, "A", "C", 30, 100.0);
    let (cd, _) = link(&mut model, "C", "D", 30, 100.0);
    model.add_demand(Demand::new("A", "D", 40.0, "dmd_a_d").unwrap()).unwrap();
    (model, [ab, bd, ac, cd])
}

#[test]
fn test_demand_takes_lowest_cost_path() {
    let (mut model, [ab, bd, ac, cd]) = create_scenario_a();

    model.update_simulation().unwrap();

    assert_abs_diff_eq!(traffic(&model, ab), 40.0, epsilon = 1e-9);
    assert_abs_diff_eq!(traffic(&model, bd), 40.0, epsilon = 1e-9);
    assert_abs_diff_eq!(traffic(&model, ac), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(traffic(&model, cd), 0.0, epsilon = 1e-9);

    let demand = model.get_demand(&NodeName::new("A"), &NodeName::new("D"), &"dmd_a_d".into()).unwrap();
    assert_eq!(demand.path(), &DemandPath::Alternatives(vec![vec![Hop::Interface(ab), Hop::Interface(bd)]]));
}

#[test]
fn test_ecmp_split_sums_to_demand_traffic() {
    let mut model = Model::new(SimulationConfig::default().with_seed(11));
    let (ab, _) = link(&mut model, "A", "B", 10, 100.0);
    let (bd, _) = link(&mut model, "B", "D", 10, 100.0);
    let (ac, _) = link(&mut model, "A", "C", 10, 100.0);
    let (cd, _) = link(&mut model, "C", "D", 10, 100.0);
    let demand = model.add_demand(Demand::new("A", "D", 50.0, "dmd").unwrap()).unwrap();

    model.update_simulation().unwrap();

    let details = model.demand(demand).unwrap().path_detail();
    assert_eq!(details.len(), 2);
    let total: f64 = details.iter().map(|detail| detail.path_traffic).sum();
    assert_abs_diff_eq!(total, 50.0, epsilon = 0.1);

    for key in [ab, bd, ac, cd] {
        assert_abs_diff_eq!(traffic(&model, key), 25.0, epsilon = 1e-9);
    }
}

#[test]
fn test_shared_interfaces_accumulate_every_alternative() {
    // Two equal cost branches reconverge at B before the single B-D hop.
    let mut model = Model::new(SimulationConfig::default().with_seed(11));
    link(&mut model, "A", "X", 10, 100.0);
    link(&mut model, "X", "B", 10, 100.0);
    link(&mut model, "A", "Y", 10, 100.0);
    link(&mut model, "Y", "B", 10, 100.0);
    let (bd, _) = link(&mut model, "B", "D", 10, 100.0);
    model.add_demand(Demand::new("A", "D", 30.0, "dmd").unwrap()).unwrap();

    model.update_simulation().unwrap();

    assert_abs_diff_eq!(traffic(&model, bd), 30.0, epsilon = 1e-9);
}

#[test]
fn test_repeated_runs_are_identical() {
    let mut model = Model::new(SimulationConfig::default().with_seed(5));
    link(&mut model, "A", "B", 10, 200.0);
    link(&mut model, "B", "D", 10, 200.0);
    link(&mut model, "A", "C", 10, 200.0);
    link(&mut model, "C", "D", 10, 200.0);
    model.add_demand(Demand::new("A", "D", 90.0, "dmd").unwrap()).unwrap();
    model.add_demand(Demand::new("B", "C", 20.0, "dmd").unwrap()).unwrap();
    for name in ["lsp-1", "lsp-2", "lsp-3"] {
        model.add_rsvp_lsp(RsvpLsp::new("A", "D", name).unwrap()).unwrap();
    }

    model.update_simulation().unwrap();
    let first_traffic: Vec<f64> = model.interfaces().map(|(_, interface)| interface.traffic()).collect();
    let first_lsps: Vec<_> = model.rsvp_lsps().map(|(_, lsp)| lsp.path().clone()).collect();
    let first_demands: Vec<_> = model.demands().map(|(_, demand)| demand.path().clone()).collect();

    model.update_simulation().unwrap();
    let second_traffic: Vec<f64> = model.interfaces().map(|(_, interface)| interface.traffic()).collect();
    let second_lsps: Vec<_> = model.rsvp_lsps().map(|(_, lsp)| lsp.path().clone()).collect();
    let second_demands: Vec<_> = model.demands().map(|(_, demand)| demand.path().clone()).collect();

    assert_eq!(first_traffic, second_traffic);
    assert_eq!(first_lsps, second_lsps);
    assert_eq!(first_demands, second_demands);
}

#[test]
fn test_lsp_reports_riding_demands_and_traffic() {
    let mut model = Model::new(SimulationConfig::default().with_seed(1));
    let (ab, _) = link(&mut model, "A", "B", 10, 100.0);
    let (bc, _) = link(&mut model, "B", "C", 10, 100.0);
    let lsp = model.add_rsvp_lsp(RsvpLsp::new("A", "C", "lsp").unwrap()).unwrap();
    let first = model.add_demand(Demand::new("A", "C", 15.0, "first").unwrap()).unwrap();
    let second = model.add_demand(Demand::new("A", "C", 5.0, "second").unwrap()).unwrap();
    let local = model.add_demand(Demand::new("A", "B", 7.0, "local").unwrap()).unwrap();

    model.update_simulation().unwrap();

    assert_eq!(model.demands_on_lsp(lsp), vec![first, second]);
    assert_eq!(model.lsp(lsp).unwrap().traffic(), Some(20.0));
    assert_eq!(model.lsp(lsp).unwrap().reserved_bandwidth(), Some(20.0));

    assert_abs_diff_eq!(traffic(&model, ab), 27.0, epsilon = 1e-9);
    assert_abs_diff_eq!(traffic(&model, bc), 20.0, epsilon = 1e-9);

    let mut on_ab = model.demands_on_interface(ab);
    on_ab.sort();
    let mut expected = vec![first, second, local];
    expected.sort();
    assert_eq!(on_ab, expected);
    assert_eq!(model.lsps_on_interface(bc), vec![lsp]);
}

#[test]
fn test_utilization_is_percent_of_capacity() {
    let (mut model, [ab, ..]) = create_scenario_a();
    model.update_simulation().unwrap();

    let utilization = model.interface_utilization(ab).unwrap();
    assert_abs_diff_eq!(utilization.value().unwrap(), 40.0, epsilon = 1e-9);

    let key = model.interface_key(&InterfaceName::new("to-B"), &NodeName::new("A")).unwrap();
    assert_eq!(key, ab);
}
