//! A slice of the controller for eyeballing the renderer: mains through a
//! GFCI and fuse into both PSUs, the MCU driving two relay channels, an SCD30
//! on I2C and the fogger on relay 1.
//!
//! Parts are ad-hoc boxes with power-in pins on the left and power-out pins
//! on the right, not catalog parts.

use schematics::{Catalog, Circuit, Part, SchematicError};

use super::wire;

pub const NAME: &str = "sample";

fn catalog() -> Result<Catalog, SchematicError> {
    let mut catalog = Catalog::new();
    let parts = [
        Part::from_sides(
            "U",
            "GFCI_RCD",
            "GFCI/RCD 30mA",
            &["L_IN", "N_IN", "PE_IN"],
            &["L_OUT", "N_OUT", "PE_OUT"],
            &[],
        )?,
        Part::from_sides("F", "FUSE_5A", "5A panel fuse", &["IN"], &["OUT"], &[])?,
        Part::from_sides(
            "U",
            "PSU_5V3A",
            "5V/3A DIN PSU (HDR-15-5)",
            &["L", "N", "PE"],
            &["+5V_OUT", "GND_OUT"],
            &[],
        )?,
        Part::from_sides(
            "U",
            "PSU_12V1A",
            "12V/1A DIN PSU",
            &["L", "N", "PE"],
            &["+12V_OUT", "GND_OUT"],
            &[],
        )?,
        Part::from_sides(
            "U",
            "ESP32S3",
            "ESP32-S3-DevKitC-1 (38-pin)",
            &["3V3_IN", "GND", "GPIO21_SDA", "GPIO9_SCL", "GPIO38_REL1", "GPIO39_REL2"],
            &[],
            &[],
        )?,
        Part::from_sides(
            "U",
            "RELAY_8CH",
            "8-ch opto-isolated relay module",
            &["VCC", "GND", "JD_VCC", "IN1", "IN2"],
            &["COM1", "NO1", "NC1", "COM2", "NO2", "NC2"],
            &[],
        )?,
        Part::from_sides(
            "U",
            "SCD30",
            "Sensirion SCD30 CO2/RH/T sensor (I2C 0x61)",
            &["VDD", "GND", "SCL", "SDA", "SEL"],
            &["TX", "RX"],
            &[],
        )?,
        Part::from_sides(
            "J",
            "FOGGER",
            "Ultrasonic fogger (120VAC)",
            &["L_IN", "N_IN"],
            &[],
            &[],
        )?,
    ];
    for part in parts {
        catalog.add_part(part)?;
    }
    Ok(catalog)
}

pub fn build(circuit: &mut Circuit) -> Result<(), SchematicError> {
    let catalog = catalog()?;

    for name in [
        "AC_L", "AC_N", "AC_PE", "L_FUSED", "+5V", "+12V", "GND", "I2C_SDA", "I2C_SCL",
        "REL1_SIG", "REL2_SIG", "FOGGER_L", "FOGGER_N",
    ] {
        circuit.get_or_create_net(name)?;
    }

    let gfci = circuit.create_part(&catalog.template("GFCI_RCD")?, None)?;
    let fuse = circuit.create_part(&catalog.template("FUSE_5A")?, None)?;
    let psu5 = circuit.create_part(&catalog.template("PSU_5V3A")?, None)?;
    let psu12 = circuit.create_part(&catalog.template("PSU_12V1A")?, None)?;
    let mcu = circuit.create_part(&catalog.template("ESP32S3")?, None)?;
    let relay = circuit.create_part(&catalog.template("RELAY_8CH")?, None)?;
    let scd30 = circuit.create_part(&catalog.template("SCD30")?, None)?;
    let fogger = circuit.create_part(&catalog.template("FOGGER")?, None)?;

    wire(
        circuit,
        &gfci,
        &[
            ("L_IN", "AC_L"),
            ("N_IN", "AC_N"),
            ("PE_IN", "AC_PE"),
            ("L_OUT", "L_GFCI"),
            ("N_OUT", "N_GFCI"),
            ("PE_OUT", "PE_GFCI"),
        ],
    )?;
    wire(circuit, &fuse, &[("IN", "L_GFCI"), ("OUT", "L_FUSED")])?;

    for (psu, rail, net) in [(&psu5, "+5V_OUT", "+5V"), (&psu12, "+12V_OUT", "+12V")] {
        wire(
            circuit,
            psu,
            &[
                ("L", "L_FUSED"),
                ("N", "N_GFCI"),
                ("PE", "PE_GFCI"),
                (rail, net),
                ("GND_OUT", "GND"),
            ],
        )?;
    }

    // The DevKitC regulates 3.3V from its 5V pin.
    wire(
        circuit,
        &mcu,
        &[
            ("3V3_IN", "+5V"),
            ("GND", "GND"),
            ("GPIO21_SDA", "I2C_SDA"),
            ("GPIO9_SCL", "I2C_SCL"),
            ("GPIO38_REL1", "REL1_SIG"),
            ("GPIO39_REL2", "REL2_SIG"),
        ],
    )?;

    // JD_VCC jumper shown closed.
    wire(
        circuit,
        &relay,
        &[
            ("VCC", "+5V"),
            ("GND", "GND"),
            ("JD_VCC", "+5V"),
            ("IN1", "REL1_SIG"),
            ("IN2", "REL2_SIG"),
            ("COM1", "L_FUSED"),
            ("NO1", "FOGGER_L"),
        ],
    )?;

    // SEL low selects I2C.
    wire(
        circuit,
        &scd30,
        &[
            ("VDD", "+5V"),
            ("GND", "GND"),
            ("SDA", "I2C_SDA"),
            ("SCL", "I2C_SCL"),
            ("SEL", "GND"),
        ],
    )?;

    wire(circuit, &fogger, &[("L_IN", "FOGGER_L"), ("N_IN", "N_GFCI")])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use netlist::{export_netlist, normalize_document, promote_ports, PinNameNormalizer};

    use super::*;
    use crate::designs::Design;

    fn circuit() -> Circuit {
        let mut circuit = Circuit::new();
        build(&mut circuit).unwrap();
        circuit
    }

    #[test]
    fn references_follow_prefixes() {
        let circuit = circuit();
        let references: Vec<_> = circuit
            .components_iter()
            .map(|c| (c.reference.clone(), c.part.name.clone()))
            .collect();
        let expected = [
            ("U1", "GFCI_RCD"),
            ("F1", "FUSE_5A"),
            ("U2", "PSU_5V3A"),
            ("U3", "PSU_12V1A"),
            ("U4", "ESP32S3"),
            ("U5", "RELAY_8CH"),
            ("U6", "SCD30"),
            ("J1", "FOGGER"),
        ];
        for (reference, part) in expected {
            assert!(
                references.contains(&(reference.to_string(), part.to_string())),
                "{reference} {part}"
            );
        }
        assert_eq!(references.len(), expected.len());
    }

    #[test]
    fn neutral_reaches_the_load_unswitched() {
        let circuit = circuit();
        assert_eq!(circuit.net_of("J1", "2"), Some("N_GFCI"));
        assert_eq!(circuit.net_of("U2", "2"), Some("N_GFCI"));
        assert_eq!(circuit.net_of("U5", "7"), Some("FOGGER_L"));
    }

    #[test]
    fn export_skips_unused_net_and_pins() {
        let document = export_netlist(&circuit(), NAME);
        let module = &document.modules[NAME];

        assert!(!module.netnames.contains_key("FOGGER_N"));
        assert!(module.netnames.contains_key("L_GFCI"));
        // RELAY_8CH: NC1, COM2, NO2, NC2 are unwired.
        let relay = &module.cells["U5"];
        assert_eq!(relay.connections.len(), 7);
        assert!(!relay.connections.contains_key("8"));
        // SCD30: TX and RX are unwired.
        assert_eq!(module.cells["U6"].connections.len(), 5);
    }

    #[test]
    fn clean_netlist_uses_pin_names() {
        let circuit = circuit();
        let mut document = export_netlist(&circuit, NAME);
        let summary = normalize_document(&mut document, &PinNameNormalizer::from_circuit(&circuit));
        assert!(summary.kept_numeric.is_empty());

        let module = &document.modules[NAME];
        assert_eq!(
            module.cells["F1"].connections.keys().collect::<Vec<_>>(),
            vec!["IN", "OUT"]
        );
        assert_eq!(module.cells["U4"].cell_type, "ESP32S3");

        let config = Design::Sample.default_config().unwrap();
        assert_eq!(promote_ports(&mut document, &config.ports), 3);
        let module = &document.modules[NAME];
        assert_eq!(module.ports["AC_L"].bits, module.cells["U1"].connections["L_IN"]);
    }
}
