use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::document::{ModulePort, NetlistDocument, PortDirection};

/// One internal pin to expose as a module port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    /// Connection key in the clean netlist (pin name, or pin number for
    /// parts whose names collide).
    pub pin: String,
    /// External port name drawn next to the arrow.
    pub name: String,
    pub direction: PortDirection,
}

/// Which pins form the circuit's external interface, keyed by reference.
///
/// Being a boundary is a design decision (mains entry, fused load outputs),
/// so this table is authored per design rather than inferred.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundaryPortTable(pub BTreeMap<String, Vec<PortMapping>>);

impl BoundaryPortTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: &str, pin: &str, name: &str, direction: PortDirection) {
        self.0
            .entry(reference.to_string())
            .or_default()
            .push(PortMapping {
                pin: pin.to_string(),
                name: name.to_string(),
                direction,
            });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Add a module port for every mapping whose cell and connection exist.
///
/// Absent references, absent keys and connections without bits are skipped:
/// not every design variant instantiates every boundary part. A port that
/// already exists under the same name is replaced. Returns the number of
/// ports written.
pub fn promote_ports(document: &mut NetlistDocument, table: &BoundaryPortTable) -> usize {
    let mut promoted = 0;

    for (module_name, module) in document.modules.iter_mut() {
        for (reference, mappings) in table.0.iter() {
            let Some(cell) = module.cells.get(reference) else {
                debug!("No {} in module {}, skipping its ports", reference, module_name);
                continue;
            };

            for mapping in mappings {
                let bits = match cell.connections.get(&mapping.pin) {
                    Some(bits) if !bits.is_empty() => bits.clone(),
                    _ => {
                        debug!("No connection {}.{}, skipping", reference, mapping.pin);
                        continue;
                    }
                };

                module.ports.insert(
                    mapping.name.clone(),
                    ModulePort {
                        direction: mapping.direction,
                        bits,
                    },
                );
                promoted += 1;
            }
        }
    }

    promoted
}
