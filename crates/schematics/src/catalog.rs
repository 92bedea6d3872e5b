use std::collections::HashMap;

use crate::{
    part::{Part, PartRef},
    SchematicError,
};

/// A library of part templates keyed by name.
///
/// Templates are registered once while the catalog is assembled and are
/// shared (never copied) by every component instantiated from them.
#[derive(Debug, Default)]
pub struct Catalog {
    parts_by_name: HashMap<String, PartRef>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog with every built-in template registered.
    pub fn with_builtin_parts() -> Result<Self, SchematicError> {
        let mut catalog = Self::new();
        catalog.register_standard_library()?;
        catalog.register_modules()?;
        catalog.register_ics()?;
        Ok(catalog)
    }

    pub fn add_part(&mut self, part: Part) -> Result<PartRef, SchematicError> {
        let name = part.name.clone();
        if self.parts_by_name.contains_key(&name) {
            return Err(SchematicError::NameAlreadyExists(name));
        }
        let part_ref = PartRef::new(part);
        self.parts_by_name.insert(name, part_ref.clone());
        Ok(part_ref)
    }

    pub fn get_part(&self, name: &str) -> Option<PartRef> {
        self.parts_by_name.get(name).cloned()
    }

    /// Like [`Catalog::get_part`], but a missing template is an error.
    pub fn template(&self, name: &str) -> Result<PartRef, SchematicError> {
        self.get_part(name)
            .ok_or_else(|| SchematicError::NameNotFound(name.to_string()))
    }

    pub fn parts_iter(&self) -> impl Iterator<Item = &PartRef> {
        self.parts_by_name.values()
    }
}
