//! IC templates for the controller designs.
//!
//! Pin names follow the KiCad symbol library so wiring reads the same as the
//! datasheet. Only the ESP32-S3 is trimmed: it carries the supply pins and
//! the GPIOs a design can route, not the full QFN56 pinout.

use crate::{
    part::PartBuilder,
    Catalog, Part,
    PinFunction::{self, *},
    SchematicError,
};

fn ic(
    name: &str,
    description: &str,
    pins: &[(&str, &str, PinFunction)],
) -> Result<Part, SchematicError> {
    let mut builder = PartBuilder::default();
    builder.name(name).reference_prefix("U").description(description);
    for (number, pin_name, function) in pins {
        builder.pin(number, pin_name, *function);
    }
    builder.build()
}

pub fn esp32_s3() -> Result<Part, SchematicError> {
    ic(
        "ESP32-S3",
        "Microcontroller, Wi-Fi 802.11b/g/n, Bluetooth LE 5, QFN-56",
        &[
            ("2", "VDD3P3", PowerIn),
            ("5", "GPIO0", Bidirectional),
            ("9", "GPIO4", Bidirectional),
            ("12", "GPIO7", Bidirectional),
            ("14", "GPIO9", Bidirectional),
            ("20", "VDD3P3_RTC", PowerIn),
            ("23", "GPIO18", Bidirectional),
            ("24", "GPIO19/USB_D-", Bidirectional),
            ("25", "GPIO20/USB_D+", Bidirectional),
            ("27", "GPIO21", Bidirectional),
            ("29", "VDD_SPI", PowerOut),
            ("38", "GPIO38", Bidirectional),
            ("39", "MTCK", Bidirectional),
            ("40", "MTDO", Bidirectional),
            ("41", "VDD3P3_CPU", PowerIn),
            ("42", "MTDI", Bidirectional),
            ("43", "MTMS", Bidirectional),
            ("44", "U0TXD", Output),
            ("45", "U0RXD", Input),
            ("52", "GPIO46", Bidirectional),
            ("55", "VDDA", PowerIn),
            ("57", "GND", PowerIn),
        ],
    )
}

/// TI TCA9548A 1-to-8 I2C switch, TSSOP-24.
pub fn tca9548apwr() -> Result<Part, SchematicError> {
    let mut pins = vec![
        ("1".to_string(), "A0".to_string(), Input),
        ("2".to_string(), "A1".to_string(), Input),
        ("3".to_string(), "~{RESET}".to_string(), Input),
    ];
    // Channel pairs occupy 4-11 and 13-20, split around GND on 12.
    for ch in 0..8 {
        let base = if ch < 4 { 4 + ch * 2 } else { 5 + ch * 2 };
        pins.push((base.to_string(), format!("SD{ch}"), Bidirectional));
        pins.push(((base + 1).to_string(), format!("SC{ch}"), Bidirectional));
    }
    pins.extend([
        ("12".to_string(), "GND".to_string(), PowerIn),
        ("21".to_string(), "A2".to_string(), Input),
        ("22".to_string(), "SCL".to_string(), Bidirectional),
        ("23".to_string(), "SDA".to_string(), Bidirectional),
        ("24".to_string(), "VCC".to_string(), PowerIn),
    ]);

    let mut builder = PartBuilder::default();
    builder
        .name("TCA9548APWR")
        .reference_prefix("U")
        .description("Low voltage 8-channel I2C switch with reset, TSSOP-24");
    for (number, pin_name, function) in &pins {
        builder.pin(number, pin_name, *function);
    }
    builder.build()
}

pub fn sht4x() -> Result<Part, SchematicError> {
    ic(
        "SHT4x",
        "Digital humidity and temperature sensor, I2C, DFN-4",
        &[
            ("1", "SDA", Bidirectional),
            ("2", "SCL", Input),
            ("3", "VDD", PowerIn),
            ("4", "VSS", PowerIn),
        ],
    )
}

pub fn as7341dlg() -> Result<Part, SchematicError> {
    ic(
        "AS7341DLG",
        "11-channel multi-spectral digital sensor, I2C, OLGA-8",
        &[
            ("1", "VDD", PowerIn),
            ("2", "SCL", Input),
            ("3", "GND", PowerIn),
            ("4", "LDR", Output),
            ("5", "PGND", PowerIn),
            ("6", "GPIO", Bidirectional),
            ("7", "INT", Output),
            ("8", "SDA", Bidirectional),
        ],
    )
}

/// DS18B20 in uSOP-8. The unused package pins all carry the name "NC".
pub fn ds18b20u() -> Result<Part, SchematicError> {
    ic(
        "DS18B20U",
        "Programmable resolution 1-Wire digital thermometer, uSOP-8",
        &[
            ("1", "DQ", Bidirectional),
            ("2", "NC", NoConnect),
            ("3", "NC", NoConnect),
            ("4", "GND", PowerIn),
            ("5", "NC", NoConnect),
            ("6", "NC", NoConnect),
            ("7", "NC", NoConnect),
            ("8", "V_{DD}", PowerIn),
        ],
    )
}

impl Catalog {
    pub fn register_ics(&mut self) -> Result<(), SchematicError> {
        self.add_part(esp32_s3()?)?;
        self.add_part(tca9548apwr()?)?;
        self.add_part(sht4x()?)?;
        self.add_part(as7341dlg()?)?;
        self.add_part(ds18b20u()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tca9548a_pinout() {
        let mux = tca9548apwr().unwrap();
        assert_eq!(mux.pins.len(), 24);
        assert_eq!(mux.get_pin("SD0").unwrap().number, "4");
        assert_eq!(mux.get_pin("SC3").unwrap().number, "11");
        assert_eq!(mux.get_pin("SD4").unwrap().number, "13");
        assert_eq!(mux.get_pin("SC7").unwrap().number, "20");
    }
}
