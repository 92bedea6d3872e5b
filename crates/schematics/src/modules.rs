//! Templates for end-product modules: breakout boards, relay boards, DIN-rail
//! PSUs and the manual failsafe panel. None of these have an entry in a
//! standard symbol library, so every pin is declared here.

use crate::{
    part::PartBuilder,
    Catalog, Part,
    PinFunction::{self, *},
    SchematicError,
};

type PinSpec<'a> = (&'a str, &'a str, PinFunction);

fn module(
    name: &str,
    prefix: &str,
    description: &str,
    pins: &[PinSpec<'_>],
) -> Result<Part, SchematicError> {
    let mut builder = PartBuilder::default();
    builder
        .name(name)
        .reference_prefix(prefix)
        .description(description);
    for (number, pin_name, function) in pins {
        builder.pin(number, pin_name, *function);
    }
    builder.build()
}

/// GFCI/RCD: the AC mains entry point.
pub fn gfci_rcd() -> Result<Part, SchematicError> {
    module(
        "GFCI_RCD",
        "U",
        "GFCI/RCD 30mA residual current device",
        &[
            ("1", "L_IN", PowerIn),
            ("2", "N_IN", PowerIn),
            ("3", "PE_IN", PowerIn),
            ("4", "L_OUT", PowerOut),
            ("5", "N_OUT", PowerOut),
            ("6", "PE_OUT", PowerOut),
        ],
    )
}

fn din_psu(name: &str, description: &str, rail: &str) -> Result<Part, SchematicError> {
    module(
        name,
        "U",
        description,
        &[
            ("1", "L", PowerIn),
            ("2", "N", PowerIn),
            ("3", "PE", PowerIn),
            ("4", rail, PowerOut),
            // Common ground reference, shared between supplies.
            ("5", "GND_OUT", Passive),
        ],
    )
}

pub fn psu_5v3a() -> Result<Part, SchematicError> {
    din_psu(
        "PSU_5V3A",
        "5V 3A DIN-rail PSU (Meanwell HDR-30-5 or Mornsun equiv)",
        "+5V_OUT",
    )
}

pub fn psu_12v1a() -> Result<Part, SchematicError> {
    din_psu(
        "PSU_12V1A",
        "12V 1A DIN-rail PSU (Meanwell HDR-15-12 or equiv)",
        "+12V_OUT",
    )
}

/// 8-channel opto-isolated relay board, active-low inputs.
///
/// Pins 1-3 are the logic and coil supplies, 4-11 the `IN1`..`IN8` signal
/// inputs, then one `COMn`/`NOn`/`NCn` contact triple per channel from 12.
pub fn relay_8ch() -> Result<Part, SchematicError> {
    let mut builder = PartBuilder::default();
    builder
        .name("Relay_8ch")
        .reference_prefix("U")
        .description("8-channel 5V opto-isolated relay module (PC817, active LOW)")
        .pin("1", "VCC", PowerIn)
        .pin("2", "GND", PowerIn)
        .pin("3", "JD_VCC", PowerIn);

    for ch in 1..=8 {
        builder.pin(&(3 + ch).to_string(), &format!("IN{ch}"), Input);
    }
    for ch in 1..=8 {
        let base = 12 + (ch - 1) * 3;
        builder
            .pin(&base.to_string(), &format!("COM{ch}"), Passive)
            .pin(&(base + 1).to_string(), &format!("NO{ch}"), Passive)
            .pin(&(base + 2).to_string(), &format!("NC{ch}"), Passive);
    }

    builder.build()
}

/// AUTO/MANUAL failsafe panel, drawn as one block. In AUTO the `ESP_CHn`
/// inputs pass straight through to `OUT_CHn`; in MANUAL the group switches
/// drive the outputs instead.
pub fn failsafe_panel() -> Result<Part, SchematicError> {
    let mut builder = PartBuilder::default();
    builder
        .name("FailsafePanel")
        .reference_prefix("SW")
        .description("Manual failsafe panel: DPDT AUTO/MANUAL master + 4x SPST group switches");

    for ch in 1..=8 {
        builder.pin(&ch.to_string(), &format!("ESP_CH{ch}"), Input);
    }
    for ch in 1..=8 {
        builder.pin(&(8 + ch).to_string(), &format!("OUT_CH{ch}"), Output);
    }
    builder.pin("17", "VCC", PowerIn).pin("18", "GND", PowerIn);

    builder.build()
}

/// Adafruit SCD-30 breakout. `SEL` low selects I2C.
pub fn scd30_breakout() -> Result<Part, SchematicError> {
    module(
        "SCD30_Breakout",
        "U",
        "Adafruit SCD-30 CO2/RH/T breakout (I2C 0x61, NDIR)",
        &[
            ("1", "VIN", PowerIn),
            ("2", "3Vo", PowerOut),
            ("3", "GND", PowerIn),
            ("4", "SCL", Input),
            ("5", "SDA", Bidirectional),
            ("6", "SEL", Input),
        ],
    )
}

pub fn scd40_breakout() -> Result<Part, SchematicError> {
    module(
        "SCD40_Breakout",
        "U",
        "Adafruit SCD-40 CO2/RH/T breakout (I2C 0x62, photoacoustic)",
        &[
            ("1", "VIN", PowerIn),
            ("2", "3Vo", PowerOut),
            ("3", "GND", PowerIn),
            ("4", "SCL", Input),
            ("5", "SDA", Bidirectional),
        ],
    )
}

/// Submersible 4-20 mA hydrostatic level sensor, 12-24 VDC loop supply.
pub fn water_level_sensor() -> Result<Part, SchematicError> {
    module(
        "Water_Level_Sensor",
        "U",
        "Submersible hydrostatic 4-20mA pressure sensor (0-0.5m, 12V)",
        &[("1", "VIN", PowerIn), ("2", "IOUT", Output)],
    )
}

impl Catalog {
    pub fn register_modules(&mut self) -> Result<(), SchematicError> {
        self.add_part(gfci_rcd()?)?;
        self.add_part(psu_5v3a()?)?;
        self.add_part(psu_12v1a()?)?;
        self.add_part(relay_8ch()?)?;
        self.add_part(failsafe_panel()?)?;
        self.add_part(scd30_breakout()?)?;
        self.add_part(scd40_breakout()?)?;
        self.add_part(water_level_sensor()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_board_numbering() {
        let relay = relay_8ch().unwrap();
        assert_eq!(relay.pins.len(), 35);
        assert_eq!(relay.get_pin("IN1").unwrap().number, "4");
        assert_eq!(relay.get_pin("IN8").unwrap().number, "11");
        assert_eq!(relay.get_pin("COM1").unwrap().number, "12");
        assert_eq!(relay.get_pin("NC8").unwrap().number, "35");
    }

    #[test]
    fn failsafe_panel_numbering() {
        let panel = failsafe_panel().unwrap();
        assert_eq!(panel.get_pin("OUT_CH1").unwrap().number, "9");
        assert_eq!(panel.get_pin("GND").unwrap().number, "18");
    }
}
