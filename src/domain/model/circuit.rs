use std::collections::BTreeMap;

use slotmap::SlotMap;

use crate::domain::model::interface::{BANDWIDTH_TOLERANCE, Interface};
use crate::domain::model::model::InterfaceKey;
use crate::domain::utils::id::CircuitId;

/// Two interfaces facing each other and sharing a circuit id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Circuit {
    pub interface_a: InterfaceKey,
    pub interface_b: InterfaceKey,
}

impl Circuit {
    pub fn contains(&self, key: InterfaceKey) -> bool {
        self.interface_a == key || self.interface_b == key
    }

    /// The interface at the other end of the circuit.
    pub fn remote_of(&self, key: InterfaceKey) -> Option<InterfaceKey> {
        if self.interface_a == key {
            Some(self.interface_b)
        } else if self.interface_b == key {
            Some(self.interface_a)
        } else {
            None
        }
    }
}

/// Outcome of pairing interfaces by circuit id.
#[derive(Debug, Default)]
pub struct CircuitMatch {
    pub circuits: Vec<Circuit>,

    /// Interfaces that could not be paired with a remote side.
    pub unmatched: Vec<InterfaceKey>,

    /// Human readable description of every pairing defect found.
    pub errors: Vec<String>,
}

/// Pairs interfaces sharing a circuit id into circuits.
///
/// A circuit id must appear on exactly two interfaces, and those two must face each
/// other (each one's node is the other's remote node) with identical capacity.
pub fn match_circuits(interfaces: &SlotMap<InterfaceKey, Interface>) -> CircuitMatch {
    let mut by_circuit_id: BTreeMap<&CircuitId, Vec<InterfaceKey>> = BTreeMap::new();
    for (key, interface) in interfaces.iter() {
        by_circuit_id.entry(&interface.circuit_id).or_default().push(key);
    }

    let mut result = CircuitMatch::default();

    for (circuit_id, keys) in by_circuit_id {
        if keys.len() != 2 {
            let names: Vec<String> = keys.iter().map(|k| interfaces[*k].key_name()).collect();
            result.errors.push(format!("circuit_id {} appears on {} interface(s) instead of 2: [{}]", circuit_id, keys.len(), names.join(", ")));
            result.unmatched.extend(keys);
            continue;
        }

        let (a, b) = (&interfaces[keys[0]], &interfaces[keys[1]]);

        if a.node != b.remote_node || b.node != a.remote_node {
            result.errors.push(format!(
                "circuit_id {} pairs {} (facing {}) with {} (facing {}), which do not face each other",
                circuit_id,
                a.key_name(),
                a.remote_node,
                b.key_name(),
                b.remote_node
            ));
            result.unmatched.extend(keys);
            continue;
        }

        if (a.capacity - b.capacity).abs() > BANDWIDTH_TOLERANCE {
            result.errors.push(format!(
                "circuit_id {} has mismatched capacities: {} has {}, {} has {}",
                circuit_id,
                a.key_name(),
                a.capacity,
                b.key_name(),
                b.capacity
            ));
        }

        result.circuits.push(Circuit { interface_a: keys[0], interface_b: keys[1] });
    }

    result
}
