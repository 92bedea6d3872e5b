use std::collections::{BTreeMap, HashMap};

use log::debug;
use schematics::{Circuit, PinFunction};
use serde_json::Value;

use crate::document::{Bit, Cell, Module, NetName, NetlistDocument, PortDirection};

pub const CREATOR: &str = "schemgen";

/// Decoration appended to every raw cell type, as template instantiation
/// does in the layout engine. The normalizer strips it again.
pub const INSTANCE_SUFFIX: &str = "_1_";

/// yosys reserves bits 0 and 1 for constant drivers.
const FIRST_NET_BIT: u64 = 2;

/// Raw netlist exactly as the layout engine expects it: connection and port
/// direction keys are pin numbers, cell types carry the instance suffix.
///
/// Net-bits follow net creation order. Nets with no member pins, unwired
/// pins and no-connect pins are left out.
pub fn export_netlist(circuit: &Circuit, module_name: &str) -> NetlistDocument {
    let mut bits: HashMap<String, u64> = HashMap::new();
    let mut netnames = BTreeMap::new();
    let mut next_bit = FIRST_NET_BIT;

    for net in circuit.nets_iter() {
        let net = net.as_deref();
        if net.connections.is_empty() {
            continue;
        }
        bits.insert(net.name.clone(), next_bit);
        netnames.insert(
            net.name.clone(),
            NetName {
                bits: vec![Bit::Net(next_bit)],
                hide_name: 0,
                attributes: BTreeMap::new(),
            },
        );
        next_bit += 1;
    }

    let mut cells = BTreeMap::new();
    for component in circuit.components_iter() {
        let cell_type = format!("{}{}", component.part.name, INSTANCE_SUFFIX);

        let mut attributes = BTreeMap::new();
        attributes.insert("ref".to_string(), Value::String(cell_type.clone()));
        if let Some(value) = &component.value {
            attributes.insert("value".to_string(), Value::String(value.clone()));
        }

        let mut port_directions = BTreeMap::new();
        let mut connections = BTreeMap::new();
        for pin in component.part.pins.iter() {
            let Some(&bit) = circuit
                .net_of(&component.reference, &pin.number)
                .and_then(|net_name| bits.get(net_name))
            else {
                continue;
            };
            port_directions.insert(pin.number.clone(), port_direction(pin.function));
            connections.insert(pin.number.clone(), vec![Bit::Net(bit)]);
        }

        debug!(
            "Exported {} ({}) with {} connections",
            component.reference,
            cell_type,
            connections.len()
        );

        cells.insert(
            component.reference.clone(),
            Cell {
                cell_type,
                hide_name: None,
                parameters: BTreeMap::new(),
                attributes,
                port_directions,
                connections,
                extra: BTreeMap::new(),
            },
        );
    }

    let module = Module {
        ports: BTreeMap::new(),
        cells,
        netnames,
        extra: BTreeMap::new(),
    };

    NetlistDocument {
        creator: Some(CREATOR.to_string()),
        modules: BTreeMap::from([(module_name.to_string(), module)]),
        extra: BTreeMap::new(),
    }
}

/// netlistsvg only places `input` and `output` ports on generic symbols, so
/// every pin function folds into one of the two.
fn port_direction(function: PinFunction) -> PortDirection {
    match function {
        PinFunction::PowerIn | PinFunction::Input | PinFunction::Passive | PinFunction::NoConnect => {
            PortDirection::Input
        }
        PinFunction::PowerOut | PinFunction::Output | PinFunction::Bidirectional => {
            PortDirection::Output
        }
    }
}
