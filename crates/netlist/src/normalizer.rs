use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use schematics::Circuit;
use serde_json::Value;

use crate::document::{Cell, NetlistDocument};

/// `_<n>_` appended to a type name when a template is instantiated.
static INSTANCE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_\d+_$").unwrap());

/// Rewrites the keys and type names of a raw netlist into their display
/// form.
pub trait Normalizer {
    /// The display key for connection key `key` on cell `reference`, or
    /// `None` to keep the key as it is.
    fn normalize_pin_key(&self, reference: &str, key: &str) -> Option<String>;
    fn normalize_type_name(&self, type_name: &str) -> String;

    /// True when `key`'s display name also belongs to another pin of the
    /// cell, wired or not. Such cells keep their numeric keys.
    fn is_shared_pin_name(&self, _reference: &str, _key: &str) -> bool {
        false
    }
}

/// Translates pin numbers to pin names using the templates the circuit's
/// components were instantiated from.
#[derive(Debug, Default, Clone)]
pub struct PinNameNormalizer {
    /// reference → pin number → pin name
    pin_names: HashMap<String, HashMap<String, String>>,
}

impl PinNameNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_circuit(circuit: &Circuit) -> Self {
        let mut normalizer = Self::new();
        for component in circuit.components_iter() {
            for (number, name) in component.part.pin_names() {
                normalizer.insert(&component.reference, number, name);
            }
        }
        normalizer
    }

    pub fn insert(&mut self, reference: &str, number: &str, name: &str) {
        self.pin_names
            .entry(reference.to_string())
            .or_default()
            .insert(number.to_string(), name.to_string());
    }
}

impl Normalizer for PinNameNormalizer {
    fn normalize_pin_key(&self, reference: &str, key: &str) -> Option<String> {
        self.pin_names.get(reference)?.get(key).cloned()
    }

    fn normalize_type_name(&self, type_name: &str) -> String {
        strip_instance_suffix(type_name).to_string()
    }

    fn is_shared_pin_name(&self, reference: &str, key: &str) -> bool {
        let Some(pins) = self.pin_names.get(reference) else {
            return false;
        };
        let Some(name) = pins.get(key) else {
            return false;
        };
        pins.iter().any(|(number, other)| number != key && other == name)
    }
}

pub fn strip_instance_suffix(type_name: &str) -> &str {
    match INSTANCE_SUFFIX.find(type_name) {
        Some(m) => &type_name[..m.start()],
        None => type_name,
    }
}

/// Rename every key of `map` through `rename`, all or nothing.
///
/// Returns `None` when two keys would land on the same new key (both
/// terminals of a resistor are named "~"); the caller then keeps the
/// original keys so no connection is merged or lost.
pub fn rename_keys<V: Clone>(
    map: &BTreeMap<String, V>,
    rename: impl Fn(&str) -> Option<String>,
) -> Option<BTreeMap<String, V>> {
    let proposed: Vec<String> = map
        .keys()
        .map(|k| rename(k).unwrap_or_else(|| k.clone()))
        .collect();

    let unique: HashSet<&String> = proposed.iter().collect();
    if unique.len() != proposed.len() {
        return None;
    }

    Some(proposed.into_iter().zip(map.values().cloned()).collect())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NormalizeSummary {
    pub cells: usize,
    /// References whose keys stayed numeric because renaming collided.
    pub kept_numeric: Vec<String>,
}

/// Normalize one cell in place. Returns false if a renaming collision, or a
/// pin name shared across the template, left any of its key maps untouched.
pub fn normalize_cell(reference: &str, cell: &mut Cell, normalizer: &impl Normalizer) -> bool {
    let rename = |key: &str| normalizer.normalize_pin_key(reference, key);
    let shared = cell
        .connections
        .keys()
        .chain(cell.port_directions.keys())
        .any(|key| normalizer.is_shared_pin_name(reference, key));
    let mut renamed = !shared;

    if !shared {
        match rename_keys(&cell.connections, rename) {
            Some(connections) => cell.connections = connections,
            None => renamed = false,
        }
        match rename_keys(&cell.port_directions, rename) {
            Some(port_directions) => cell.port_directions = port_directions,
            None => renamed = false,
        }
    }

    cell.attributes
        .insert("ref".to_string(), Value::String(reference.to_string()));
    cell.cell_type = normalizer.normalize_type_name(&cell.cell_type);

    renamed
}

/// Normalize every cell of every module. Cells are independent and the
/// transform is idempotent.
pub fn normalize_document(
    document: &mut NetlistDocument,
    normalizer: &impl Normalizer,
) -> NormalizeSummary {
    let mut summary = NormalizeSummary::default();

    for module in document.modules.values_mut() {
        for (reference, cell) in module.cells.iter_mut() {
            summary.cells += 1;
            if !normalize_cell(reference, cell, normalizer) {
                debug!(
                    "Keeping numeric pin keys for {}: pin names collide ({})",
                    reference,
                    cell.connections.keys().cloned().collect::<Vec<_>>().join(", ")
                );
                summary.kept_numeric.push(reference.clone());
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Bit, PortDirection};

    #[test]
    fn strips_only_trailing_instance_suffix() {
        assert_eq!(strip_instance_suffix("GFCI_RCD_1_"), "GFCI_RCD");
        assert_eq!(strip_instance_suffix("R_12_"), "R");
        assert_eq!(strip_instance_suffix("D_Zener"), "D_Zener");
        assert_eq!(strip_instance_suffix("PSU_5V3A"), "PSU_5V3A");
        assert_eq!(strip_instance_suffix("_1_X"), "_1_X");
    }

    #[test]
    fn half_wired_resistor_keeps_its_number() {
        let mut normalizer = PinNameNormalizer::new();
        normalizer.insert("R_SDA", "1", "~");
        normalizer.insert("R_SDA", "2", "~");
        let mut cell = Cell {
            cell_type: "R_1_".to_string(),
            hide_name: None,
            parameters: BTreeMap::new(),
            attributes: BTreeMap::new(),
            port_directions: BTreeMap::from([("1".to_string(), PortDirection::Input)]),
            connections: BTreeMap::from([("1".to_string(), vec![Bit::Net(2)])]),
            extra: BTreeMap::new(),
        };

        assert!(normalizer.is_shared_pin_name("R_SDA", "1"));
        assert!(!normalize_cell("R_SDA", &mut cell, &normalizer));
        assert_eq!(cell.connections.keys().collect::<Vec<_>>(), vec!["1"]);
        assert_eq!(cell.port_directions.keys().collect::<Vec<_>>(), vec!["1"]);
        assert_eq!(cell.cell_type, "R");
    }

    #[test]
    fn rename_detects_collision_with_untouched_key() {
        let map = BTreeMap::from([("1".to_string(), 10), ("B".to_string(), 20)]);
        // "1" would become "B", which is already taken.
        let renamed = rename_keys(&map, |k| (k == "1").then(|| "B".to_string()));
        assert_eq!(renamed, None);
    }

    #[test]
    fn rename_keeps_unmapped_keys() {
        let map = BTreeMap::from([("1".to_string(), 10), ("x".to_string(), 20)]);
        let renamed = rename_keys(&map, |k| (k == "1").then(|| "L_IN".to_string())).unwrap();
        assert_eq!(
            renamed,
            BTreeMap::from([("L_IN".to_string(), 10), ("x".to_string(), 20)])
        );
    }
}
