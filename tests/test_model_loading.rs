use std::fs;

use approx::assert_abs_diff_eq;
use tempfile::tempdir;

use ip_te_simulator::{Error, InterfaceName, Model, NodeName, load_model};

const MODEL_JSON: &str = r#"{
    "config": { "parallelInterfaces": true, "seed": 1234 },
    "nodes": [
        { "name": "A", "lat": 48.1, "lon": 11.6, "igpShortcutsEnabled": true },
        { "name": "B" },
        { "name": "C" }
    ],
    "circuits": [
        {
            "circuitId": "1",
            "sideA": { "name": "to-B", "node": "A", "remoteNode": "B", "cost": 10, "capacity": 100.0 },
            "sideB": { "name": "to-A", "node": "B", "remoteNode": "A", "cost": 10, "capacity": 100.0 }
        },
        {
            "circuitId": "2",
            "sideA": { "name": "to-C", "node": "B", "remoteNode": "C", "cost": 10, "capacity": 100.0, "percentReservableBandwidth": 50.0 },
            "sideB": { "name": "to-B", "node": "C", "remoteNode": "B", "cost": 10, "capacity": 100.0, "rsvpEnabled": false }
        },
        {
            "circuitId": "3",
            "sideA": { "name": "to-C", "node": "A", "remoteNode": "C", "cost": 50, "capacity": 100.0 },
            "sideB": { "name": "to-A", "node": "C", "remoteNode": "A", "cost": 50, "capacity": 100.0 }
        }
    ],
    "demands": [
        { "source": "A", "dest": "C", "name": "dmd_a_c", "traffic": 30.0 },
        { "source": "C", "dest": "A", "name": "dmd_c_a", "traffic": 5.0 }
    ],
    "rsvpLsps": [
        { "source": "A", "dest": "C", "name": "lsp_a_c" },
        { "source": "A", "dest": "B", "name": "lsp_a_b", "manualMetric": 3 }
    ],
    "srlgs": [
        { "name": "conduit", "interfaces": [ { "name": "to-C", "node": "A" } ] }
    ]
}"#;

fn write_model(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_load_and_simulate_model_file() {
    let (_dir, path) = write_model(MODEL_JSON);

    let mut model: Model = load_model(&path).unwrap();

    assert_eq!(model.seed(), 1234);
    assert_eq!(model.nodes().count(), 3);
    assert_eq!(model.interfaces().count(), 6);
    assert_eq!(model.circuits().len(), 3);
    assert!(model.get_node(&NodeName::new("A")).unwrap().igp_shortcuts_enabled);

    let b_to_c = model.get_interface(&InterfaceName::new("to-C"), &NodeName::new("B")).unwrap();
    assert_abs_diff_eq!(b_to_c.max_reservable_bandwidth(), 50.0, epsilon = 1e-9);
    assert!(!model.get_interface(&InterfaceName::new("to-B"), &NodeName::new("C")).unwrap().rsvp_enabled());

    let srlg = model.get_srlg(&"conduit".into()).unwrap();
    assert_eq!(srlg.interfaces().len(), 1);

    model.update_simulation().unwrap();

    let lsp = model.get_rsvp_lsp(&NodeName::new("A"), &NodeName::new("C"), &"lsp_a_c".into()).unwrap();
    assert_eq!(lsp.reserved_bandwidth(), Some(30.0));
    assert_eq!(lsp.path().routed().unwrap().path_cost, 20);

    let b_to_c_key = model.interface_key(&InterfaceName::new("to-C"), &NodeName::new("B")).unwrap();
    assert_abs_diff_eq!(model.interface(b_to_c_key).unwrap().traffic(), 30.0, epsilon = 1e-9);
    assert!(model.is_converged());
}

#[test]
fn test_failed_flags_are_applied_on_load() {
    let json = r#"{
        "nodes": [ { "name": "A" }, { "name": "B", "failed": true } ],
        "circuits": [
            {
                "circuitId": "1",
                "sideA": { "name": "to-B", "node": "A", "remoteNode": "B", "cost": 10, "capacity": 10.0 },
                "sideB": { "name": "to-A", "node": "B", "remoteNode": "A", "cost": 10, "capacity": 10.0 }
            }
        ],
        "demands": [ { "source": "A", "dest": "B", "name": "dmd", "traffic": 1.0 } ]
    }"#;
    let (_dir, path) = write_model(json);

    let mut model = load_model(&path).unwrap();
    model.update_simulation().unwrap();

    assert_eq!(model.failed_interfaces().len(), 2);
    assert_eq!(model.unrouted_demands().len(), 1);
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let result = load_model(dir.path().join("does-not-exist.json"));
    assert!(matches!(result, Err(Error::IoError(_))));
}

#[test]
fn test_malformed_json_is_a_deserialization_error() {
    let (_dir, path) = write_model(r#"{ "nodes": [ { "lat": 1.0 } ] }"#);
    assert!(matches!(load_model(&path), Err(Error::DeserializationError(_))));
}

#[test]
fn test_invalid_entity_in_file_is_a_configuration_error() {
    let json = r#"{
        "circuits": [
            {
                "circuitId": "1",
                "sideA": { "name": "to-B", "node": "A", "remoteNode": "B", "cost": 0, "capacity": 10.0 },
                "sideB": { "name": "to-A", "node": "B", "remoteNode": "A", "cost": 10, "capacity": 10.0 }
            }
        ]
    }"#;
    let (_dir, path) = write_model(json);
    assert!(matches!(load_model(&path), Err(Error::ConfigurationError(_))));
}
