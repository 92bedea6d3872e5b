//! The netlist document exchanged with the layout engine.
//!
//! This is the yosys JSON shape that netlistsvg consumes: modules hold cells
//! keyed by reference, each cell maps connection keys (pin numbers or pin
//! names) to lists of net-bits. Fields this crate does not interpret are
//! kept in the `extra` maps so a document survives a read/write cycle.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::NetlistError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetlistDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default)]
    pub modules: BTreeMap<String, Module>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub ports: BTreeMap<String, ModulePort>,
    #[serde(default)]
    pub cells: BTreeMap<String, Cell>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub netnames: BTreeMap<String, NetName>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A module-level port. netlistsvg draws these as `inputExt`/`outputExt`
/// arrows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulePort {
    pub direction: PortDirection,
    pub bits: Vec<Bit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
    Inout,
}

/// One element of a connection's bit list: a net-bit, or a yosys constant
/// such as `"0"`, `"1"` or `"x"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bit {
    Net(u64),
    Constant(String),
}

impl Bit {
    pub fn net(&self) -> Option<u64> {
        match self {
            Bit::Net(bit) => Some(*bit),
            Bit::Constant(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(rename = "type")]
    pub cell_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_name: Option<u8>,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub port_directions: BTreeMap<String, PortDirection>,
    #[serde(default)]
    pub connections: BTreeMap<String, Vec<Bit>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetName {
    pub bits: Vec<Bit>,
    #[serde(default)]
    pub hide_name: u8,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl NetlistDocument {
    pub fn from_json(json: &str) -> Result<Self, NetlistError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, NetlistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, NetlistError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<(), NetlistError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Iterate every `(reference, cell)` across all modules.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.modules
            .values()
            .flat_map(|m| m.cells.iter().map(|(r, c)| (r.as_str(), c)))
    }
}
