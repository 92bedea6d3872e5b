use crate::SchematicError;
use derive_builder::Builder;
use std::{collections::HashSet, hash::Hash, ops::Deref, rc::Rc};

/// Electrical function of a pin, as declared by the part template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinFunction {
    PowerIn,
    PowerOut,
    Input,
    Output,
    Bidirectional,
    Passive,
    NoConnect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    /// Unique within the part. Stable across renames.
    pub number: String,
    /// Semantic label. Several pins on one part may share it (e.g. "~" on
    /// both terminals of a resistor).
    pub name: String,
    pub function: PinFunction,
}

impl Pin {
    pub fn new(number: &str, name: &str, function: PinFunction) -> Self {
        Self {
            number: number.to_string(),
            name: name.to_string(),
            function,
        }
    }
}

/// Shared handle to an immutable part template.
#[derive(Debug, Clone)]
pub struct PartRef(pub Rc<Part>);

impl PartRef {
    pub fn new(part: Part) -> Self {
        Self(Rc::new(part))
    }
}

impl Deref for PartRef {
    type Target = Part;

    fn deref(&self) -> &Part {
        &self.0
    }
}

impl Hash for PartRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Hash by address of the inner Rc
        std::ptr::hash(Rc::as_ptr(&self.0), state);
    }
}

impl PartialEq for PartRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::as_ptr(&self.0) == Rc::as_ptr(&other.0)
    }
}

impl Eq for PartRef {}

/// `Part` is a catalog template for an electronic part, e.g. a resistor, a
/// DIN-rail PSU or an IC. Templates are immutable once built; components are
/// instantiated from them by [`crate::Circuit::create_part`].
#[derive(Debug, Builder)]
#[builder(build_fn(validate = "Self::validate", error = "SchematicError"))]
pub struct Part {
    /// Catalog identifier. Also the symbol type the renderer looks up.
    #[builder(setter(into))]
    pub name: String,
    /// Category letters used for auto-assigned references ("U", "R", "#PWR").
    #[builder(setter(into))]
    pub reference_prefix: String,
    #[builder(setter(into), default = "String::new()")]
    pub description: String,
    #[builder(setter(custom), default = "Vec::new()")]
    pub pins: Vec<Pin>,
}

impl Part {
    /// Build a template from ordered pin name lists, numbering pins from 1.
    ///
    /// Left-side pins are power inputs, right-side pins are power outputs and
    /// the `unconnected` list is marked no-connect. Handy for illustrative
    /// parts that have no datasheet pinout.
    pub fn from_sides(
        reference_prefix: &str,
        name: &str,
        description: &str,
        left: &[&str],
        right: &[&str],
        unconnected: &[&str],
    ) -> Result<Part, SchematicError> {
        let mut builder = PartBuilder::default();
        builder
            .name(name)
            .reference_prefix(reference_prefix)
            .description(description);

        let sides = [
            (left, PinFunction::PowerIn),
            (right, PinFunction::PowerOut),
            (unconnected, PinFunction::NoConnect),
        ];
        let mut number = 1;
        for (names, function) in sides {
            for pin_name in names {
                builder.pin(&number.to_string(), pin_name, function);
                number += 1;
            }
        }

        builder.build()
    }

    /// Resolve a pin by name first, then by number.
    pub fn get_pin(&self, identifier: &str) -> Result<&Pin, SchematicError> {
        self.pins
            .iter()
            .find(|p| p.name == identifier)
            .or_else(|| self.pins.iter().find(|p| p.number == identifier))
            .ok_or_else(|| SchematicError::UnknownPin {
                owner: self.name.clone(),
                pin: identifier.to_string(),
            })
    }

    /// Iterate `(number, name)` pairs in declaration order.
    pub fn pin_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pins.iter().map(|p| (p.number.as_str(), p.name.as_str()))
    }
}

impl PartBuilder {
    pub fn pin(&mut self, number: &str, name: &str, function: PinFunction) -> &mut Self {
        let pins = self.pins.get_or_insert_with(Vec::new);
        pins.push(Pin::new(number, name, function));
        self
    }

    fn validate(&self) -> Result<(), SchematicError> {
        let mut seen = HashSet::new();
        for pin in self.pins.iter().flatten() {
            if !seen.insert(pin.number.as_str()) {
                return Err(SchematicError::DuplicatePinNumber {
                    part: self.name.clone().unwrap_or_default(),
                    number: pin.number.clone(),
                });
            }
        }
        Ok(())
    }
}
