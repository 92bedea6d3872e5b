//! Netlist documents for the schematic renderer.
//!
//! A [`Circuit`](schematics::Circuit) is exported to the raw yosys-style
//! JSON the layout engine consumes ([`export`]), then rewritten into the
//! clean form ([`normalizer`]) and given module-level boundary ports
//! ([`ports`]). The clean document is what both the second render pass and
//! the net colorizer read.

pub mod document;
pub mod export;
mod normalizer;
pub mod ports;

use thiserror::Error;

pub use document::{Bit, Cell, Module, ModulePort, NetName, NetlistDocument, PortDirection};
pub use export::export_netlist;
pub use normalizer::{
    normalize_cell, normalize_document, rename_keys, strip_instance_suffix, NormalizeSummary,
    Normalizer, PinNameNormalizer,
};
pub use ports::{promote_ports, BoundaryPortTable, PortMapping};

#[derive(Error, Debug)]
pub enum NetlistError {
    #[error("FS error: {0}")]
    FsError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
