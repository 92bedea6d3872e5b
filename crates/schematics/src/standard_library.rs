use crate::{Catalog, SchematicError};

// Generic devices. Both terminals of the symmetric passives are named "~",
// so their netlist keys stay numeric after normalization.
mod device {
    use crate::{part::PartBuilder, Catalog, PinFunction, SchematicError};

    fn two_terminal(
        catalog: &mut Catalog,
        name: &str,
        prefix: &str,
        description: &str,
    ) -> Result<(), SchematicError> {
        let part = PartBuilder::default()
            .name(name)
            .reference_prefix(prefix)
            .description(description)
            .pin("1", "~", PinFunction::Passive)
            .pin("2", "~", PinFunction::Passive)
            .build()?;

        catalog.add_part(part)?;
        Ok(())
    }

    pub fn register(catalog: &mut Catalog) -> Result<(), SchematicError> {
        two_terminal(catalog, "R", "R", "Resistor")?;
        two_terminal(catalog, "C", "C", "Unpolarized capacitor")?;
        two_terminal(catalog, "Fuse", "F", "Fuse")?;

        let zener = PartBuilder::default()
            .name("D_Zener")
            .reference_prefix("D")
            .description("Zener diode")
            .pin("1", "K", PinFunction::Passive)
            .pin("2", "A", PinFunction::Passive)
            .build()?;
        catalog.add_part(zener)?;

        Ok(())
    }
}

// Power flags: a single "~" pin that names the rail it sits on.
mod power {
    use crate::{part::PartBuilder, Catalog, PinFunction, SchematicError};

    pub const PREFIX: &str = "#PWR";

    pub fn register(catalog: &mut Catalog) -> Result<(), SchematicError> {
        for (name, description) in [
            ("+5V", "Power symbol creates a global label with name \"+5V\""),
            ("+12V", "Power symbol creates a global label with name \"+12V\""),
            ("GND", "Power symbol creates a global label with name \"GND\", ground"),
        ] {
            let part = PartBuilder::default()
                .name(name)
                .reference_prefix(PREFIX)
                .description(description)
                .pin("1", "~", PinFunction::PowerIn)
                .build()?;
            catalog.add_part(part)?;
        }
        Ok(())
    }
}

pub use power::PREFIX as POWER_PREFIX;

impl Catalog {
    pub fn register_standard_library(&mut self) -> Result<(), SchematicError> {
        device::register(self)?;
        power::register(self)?;
        Ok(())
    }
}

#[test]
fn test_stl() {
    let mut catalog = Catalog::new();
    catalog.register_standard_library().unwrap();

    let resistor = catalog.get_part("R").unwrap();
    assert_eq!(resistor.reference_prefix, "R");
    assert_eq!(
        resistor.pin_names().collect::<Vec<_>>(),
        vec![("1", "~"), ("2", "~")]
    );
    assert_eq!(catalog.get_part("GND").unwrap().reference_prefix, "#PWR");

    // Registering twice collides on the first name.
    assert!(matches!(
        catalog.register_standard_library(),
        Err(SchematicError::NameAlreadyExists(_))
    ));
}
