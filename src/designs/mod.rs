//! Built-in circuit designs.

mod controller;
mod sample;

use schematics::{Circuit, ComponentRef, SchematicError};

use crate::config::DesignConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Design {
    /// The full tent controller: power entry, MCU and relays, sensor bus,
    /// loads and water-level ADC.
    Controller,
    /// A reduced slice of the controller built from ad-hoc parts.
    Sample,
}

impl Design {
    /// Module name in the netlist, also the default output file name.
    pub fn name(&self) -> &'static str {
        match self {
            Design::Controller => controller::NAME,
            Design::Sample => sample::NAME,
        }
    }

    /// Populate `circuit`, which must be empty.
    pub fn build(&self, circuit: &mut Circuit) -> Result<(), SchematicError> {
        match self {
            Design::Controller => controller::build(circuit),
            Design::Sample => sample::build(circuit),
        }
    }

    pub fn default_config(&self) -> Result<DesignConfig, toml::de::Error> {
        DesignConfig::from_toml(match self {
            Design::Controller => include_str!("controller.toml"),
            Design::Sample => include_str!("sample.toml"),
        })
    }
}

/// Connect each `(pin, net)` pair of `component`.
fn wire(
    circuit: &mut Circuit,
    component: &ComponentRef,
    pins: &[(&str, &str)],
) -> Result<(), SchematicError> {
    for (pin, net) in pins {
        circuit.connect(component, pin, net)?;
    }
    Ok(())
}
