use std::{hash::Hash, ops::Deref, rc::Rc};

use crate::{
    part::{PartRef, Pin},
    SchematicError,
};

#[derive(Debug, Clone)]
pub struct ComponentRef(pub Rc<Component>);

impl ComponentRef {
    pub fn new(component: Component) -> ComponentRef {
        ComponentRef(Rc::new(component))
    }

    pub fn reference(&self) -> &str {
        &self.0.reference
    }
}

impl Deref for ComponentRef {
    type Target = Component;

    fn deref(&self) -> &Component {
        &self.0
    }
}

impl Hash for ComponentRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.0), state);
    }
}

impl PartialEq for ComponentRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::as_ptr(&self.0) == Rc::as_ptr(&other.0)
    }
}

impl Eq for ComponentRef {}

/// An instance of a part template placed in a circuit, e.g. `R_SDA` or `U5`.
#[derive(Debug, Builder)]
#[builder(build_fn(error = "SchematicError"))]
pub struct Component {
    #[builder(setter(into))]
    pub reference: String,
    pub part: PartRef,
    #[builder(setter(into, strip_option), default = "None")]
    pub value: Option<String>,
}

impl Component {
    /// Resolve a pin on this instance; errors name the instance reference.
    pub fn get_pin(&self, identifier: &str) -> Result<&Pin, SchematicError> {
        self.part
            .get_pin(identifier)
            .map_err(|_| SchematicError::UnknownPin {
                owner: self.reference.clone(),
                pin: identifier.to_string(),
            })
    }
}
