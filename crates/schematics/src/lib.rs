#[macro_use]
extern crate derive_builder;

use std::collections::{HashMap, HashSet};

use component::ComponentBuilder;
use derive_builder::UninitializedFieldError;
use log::debug;
use net::NetBuilder;
use thiserror::Error;

pub mod catalog;
pub mod component;
pub mod ics;
pub mod modules;
pub mod net;
pub mod part;
pub mod standard_library;

pub use catalog::Catalog;
pub use component::{Component, ComponentRef};
pub use net::{Net, NetRef};
pub use part::{Part, PartBuilder, PartRef, Pin, PinFunction};

/// `Circuit` is the build scope for one schematic: every component
/// instantiated and every net declared while describing a design. It is
/// passed explicitly to each construction call and can be [`reset`] between
/// builds so repeated runs never see stale parts or nets.
///
/// The circuit holds logical connectivity only; coordinates and drawing
/// belong to the external renderer.
///
/// [`reset`]: Circuit::reset
#[derive(Debug, Default)]
pub struct Circuit {
    /// Components keyed by reference designator, plus creation order.
    components_by_reference: HashMap<String, ComponentRef>,
    components: Vec<ComponentRef>,

    /// Nets keyed by name, plus creation order. Net-bit numbering downstream
    /// follows creation order, so it must be kept.
    nets_by_name: HashMap<String, NetRef>,
    nets: Vec<NetRef>,

    /// Last auto-assigned index per reference prefix.
    counters: HashMap<String, usize>,

    /// `(reference, pin number)` → net name.
    pin_nets: HashMap<(String, String), String>,

    /// `(reference, pin number)` pins marked intentionally unconnected.
    no_connects: HashSet<(String, String)>,
}

#[derive(Error, Debug)]
pub enum SchematicError {
    #[error("Name already exists: {0}")]
    NameAlreadyExists(String),
    #[error("Name not found: {0}")]
    NameNotFound(String),
    #[error("Duplicate reference: {0}")]
    DuplicateReference(String),
    #[error("Duplicate pin number {number} on part {part}")]
    DuplicatePinNumber { part: String, number: String },
    #[error("Unknown pin {pin} on {owner}")]
    UnknownPin { owner: String, pin: String },
    #[error("Pin {reference}.{pin} is already connected to {net}")]
    PinAlreadyConnected {
        reference: String,
        pin: String,
        net: String,
    },
    #[error("Uninitialized field: {0}")]
    UninitializedField(String),
}

impl From<UninitializedFieldError> for SchematicError {
    fn from(e: UninitializedFieldError) -> Self {
        Self::UninitializedField(e.field_name().to_string())
    }
}

const NO_CONNECT: &str = "<no-connect>";

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every component, net and reference counter.
    pub fn reset(&mut self) {
        self.components_by_reference.clear();
        self.components.clear();
        self.nets_by_name.clear();
        self.nets.clear();
        self.counters.clear();
        self.pin_nets.clear();
        self.no_connects.clear();
    }

    /// Instantiate `template`, assigning the next free `prefix + n`
    /// reference unless `explicit_ref` names one.
    pub fn create_part(
        &mut self,
        template: &PartRef,
        explicit_ref: Option<&str>,
    ) -> Result<ComponentRef, SchematicError> {
        self.instantiate(template, explicit_ref, None)
    }

    /// Like [`Circuit::create_part`], also recording a displayed value
    /// ("4.7k", "5A").
    pub fn create_part_with_value(
        &mut self,
        template: &PartRef,
        explicit_ref: Option<&str>,
        value: &str,
    ) -> Result<ComponentRef, SchematicError> {
        self.instantiate(template, explicit_ref, Some(value))
    }

    fn instantiate(
        &mut self,
        template: &PartRef,
        explicit_ref: Option<&str>,
        value: Option<&str>,
    ) -> Result<ComponentRef, SchematicError> {
        let reference = match explicit_ref {
            Some(reference) => {
                if self.components_by_reference.contains_key(reference) {
                    return Err(SchematicError::DuplicateReference(reference.to_string()));
                }
                reference.to_string()
            }
            None => self.next_reference(&template.reference_prefix),
        };

        let mut builder = ComponentBuilder::default();
        builder.reference(reference.clone()).part(template.clone());
        if let Some(value) = value {
            builder.value(value);
        }

        let component = ComponentRef::new(builder.build()?);
        self.components_by_reference
            .insert(reference, component.clone());
        self.components.push(component.clone());
        Ok(component)
    }

    fn next_reference(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{}{}", prefix, counter);
            // Explicit references may already occupy an auto slot.
            if !self.components_by_reference.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Look up a net by name, creating it on first reference.
    ///
    /// Two declarations with the same name are the same net. Keeping names
    /// distinct is the caller's job.
    pub fn get_or_create_net(&mut self, name: &str) -> Result<NetRef, SchematicError> {
        if let Some(net) = self.nets_by_name.get(name) {
            debug!("Reusing net {}", name);
            return Ok(net.clone());
        }

        let net = NetRef::new(NetBuilder::default().name(name).build()?);
        self.nets_by_name.insert(name.to_string(), net.clone());
        self.nets.push(net.clone());
        Ok(net)
    }

    /// Wire `pin_identifier` (pin name, or number) of `component` to the net
    /// called `net_name`.
    ///
    /// A pin joins at most one net; connecting it again to the same net is a
    /// no-op, to a different net is an error.
    pub fn connect(
        &mut self,
        component: &ComponentRef,
        pin_identifier: &str,
        net_name: &str,
    ) -> Result<NetRef, SchematicError> {
        self.ensure_member(component)?;
        let pin = component.get_pin(pin_identifier)?.clone();
        let key = (component.reference.clone(), pin.number.clone());

        if self.no_connects.contains(&key) {
            return Err(SchematicError::PinAlreadyConnected {
                reference: key.0,
                pin: pin_identifier.to_string(),
                net: NO_CONNECT.to_string(),
            });
        }
        if let Some(existing) = self.pin_nets.get(&key) {
            if existing != net_name {
                return Err(SchematicError::PinAlreadyConnected {
                    reference: key.0,
                    pin: pin_identifier.to_string(),
                    net: existing.clone(),
                });
            }
        }

        let net = self.get_or_create_net(net_name)?;
        net.as_deref_mut().connect(component.clone(), pin);
        self.pin_nets.insert(key, net_name.to_string());
        Ok(net)
    }

    /// Mark a pin as intentionally left unconnected.
    pub fn no_connect(
        &mut self,
        component: &ComponentRef,
        pin_identifier: &str,
    ) -> Result<(), SchematicError> {
        self.ensure_member(component)?;
        let pin = component.get_pin(pin_identifier)?;
        let key = (component.reference.clone(), pin.number.clone());

        if let Some(existing) = self.pin_nets.get(&key) {
            return Err(SchematicError::PinAlreadyConnected {
                reference: key.0,
                pin: pin_identifier.to_string(),
                net: existing.clone(),
            });
        }
        self.no_connects.insert(key);
        Ok(())
    }

    fn ensure_member(&self, component: &ComponentRef) -> Result<(), SchematicError> {
        match self.components_by_reference.get(&component.reference) {
            Some(c) if c == component => Ok(()),
            _ => Err(SchematicError::NameNotFound(component.reference.clone())),
        }
    }

    pub fn get_component(&self, reference: &str) -> Option<ComponentRef> {
        self.components_by_reference.get(reference).cloned()
    }

    pub fn get_net(&self, name: &str) -> Option<NetRef> {
        self.nets_by_name.get(name).cloned()
    }

    /// Components in creation order.
    pub fn components_iter(&self) -> impl Iterator<Item = &ComponentRef> {
        self.components.iter()
    }

    /// Nets in creation order.
    pub fn nets_iter(&self) -> impl Iterator<Item = &NetRef> {
        self.nets.iter()
    }

    /// Name of the net a pin (given by number) is wired to, if any.
    pub fn net_of(&self, reference: &str, pin_number: &str) -> Option<&str> {
        self.pin_nets
            .get(&(reference.to_string(), pin_number.to_string()))
            .map(|s| s.as_str())
    }

    pub fn is_no_connect(&self, reference: &str, pin_number: &str) -> bool {
        self.no_connects
            .contains(&(reference.to_string(), pin_number.to_string()))
    }
}
