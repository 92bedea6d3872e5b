use std::{
    cell::RefCell,
    hash::Hash,
    ops::{Deref, DerefMut},
    rc::Rc,
};

use crate::{component::ComponentRef, part::Pin, SchematicError};

#[derive(Debug, Clone)]
pub struct NetRef(pub Rc<RefCell<Net>>);

impl NetRef {
    pub fn new(net: Net) -> NetRef {
        NetRef(Rc::new(RefCell::new(net)))
    }

    pub fn as_deref(&self) -> impl Deref<Target = Net> + '_ {
        self.0.borrow()
    }

    pub fn as_deref_mut(&self) -> impl DerefMut<Target = Net> + '_ {
        self.0.borrow_mut()
    }

    pub fn name(&self) -> String {
        self.as_deref().name.clone()
    }
}

impl Hash for NetRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.0), state);
    }
}

impl PartialEq for NetRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::as_ptr(&self.0) == Rc::as_ptr(&other.0)
    }
}

impl Eq for NetRef {}

/// A named set of pins that are electrically one node.
#[derive(Debug, Builder)]
#[builder(build_fn(error = "SchematicError"))]
pub struct Net {
    #[builder(setter(into))]
    pub name: String,
    /// Member pins in connection order.
    #[builder(default = "Vec::new()")]
    pub connections: Vec<(ComponentRef, Pin)>,
}

impl Net {
    /// Add a member pin. Returns false if it was already a member.
    pub fn connect(&mut self, component: ComponentRef, pin: Pin) -> bool {
        let present = self
            .connections
            .iter()
            .any(|(c, p)| *c == component && p.number == pin.number);
        if !present {
            self.connections.push((component, pin));
        }
        !present
    }
}
