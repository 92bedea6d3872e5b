//! ESP32-S3 tent controller, in four sheets:
//!
//! 1. Power: AC mains → GFCI/RCD → 5A fuse → 5V/3A and 12V/1A PSUs.
//! 2. Controller: ESP32-S3, manual failsafe panel, 8-channel relay board
//!    driven through 470Ω resistors.
//! 3. Sensor bus: TCA9548A I2C mux with three SHT4x, SCD30 and AS7341 on the
//!    main bus, five DS18B20 on 1-Wire.
//! 4. Loads: relay contacts to fused load outputs, and the 4-20 mA water
//!    level sensor with its ADC protection.

use schematics::{Catalog, Circuit, ComponentRef, SchematicError};

use super::wire;

pub const NAME: &str = "controller";

/// MCU pin driving each relay channel. GPIO39-42 are named after their JTAG
/// function in the pinout.
const RELAY_GPIOS: [&str; 8] = [
    "GPIO38",
    "MTCK",
    "GPIO18",
    "GPIO19/USB_D-",
    "MTDO",
    "MTDI",
    "MTMS",
    "GPIO46",
];

/// Mains loads on relay channels 1-6 with their fuse ratings.
const AC_LOADS: [(&str, &str); 6] = [
    ("FOGGER", "2A"),
    ("TUB_FAN", "2A"),
    ("EXHAUST", "1A"),
    ("INTAKE", "1A"),
    ("UVC", "1A"),
    ("LIGHTS", "3A"),
];

/// Mux channels with an SHT4x attached.
const SHT_CHANNELS: usize = 3;
const DS18B20_PROBES: usize = 5;

pub fn build(circuit: &mut Circuit) -> Result<(), SchematicError> {
    let catalog = Catalog::with_builtin_parts()?;

    declare_nets(circuit)?;
    power(circuit, &catalog)?;
    let relay = controller(circuit, &catalog)?;
    sensor_bus(circuit, &catalog)?;
    loads(circuit, &catalog, &relay)?;
    power_flags(circuit, &catalog)?;

    Ok(())
}

/// Nets are declared up front so their net-bits come out in a stable,
/// readable order.
fn declare_nets(circuit: &mut Circuit) -> Result<(), SchematicError> {
    let mut names: Vec<String> = ["AC_L", "AC_N", "AC_PE", "L_FUSED", "+5V", "+12V", "GND"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for prefix in ["REL_CH", "FS_CH", "REL_IN"] {
        names.extend((1..=8).map(|n| format!("{}{}", prefix, n)));
    }
    names.push("I2C_SDA".to_string());
    names.push("I2C_SCL".to_string());
    names.extend((0..SHT_CHANNELS).map(|i| format!("CH{}_SDA", i)));
    names.extend((0..SHT_CHANNELS).map(|i| format!("CH{}_SCL", i)));
    names.push("ONE_WIRE".to_string());
    names.push("WATER_V".to_string());
    names.push("WATER_ADC".to_string());
    names.extend((1..=AC_LOADS.len()).map(|n| format!("SW_L_CH{}", n)));
    names.push("SW_PUMP_12V".to_string());

    for name in names {
        circuit.get_or_create_net(&name)?;
    }
    Ok(())
}

fn power(circuit: &mut Circuit, catalog: &Catalog) -> Result<(), SchematicError> {
    let gfci = circuit.create_part(&catalog.template("GFCI_RCD")?, None)?;
    let f_main = circuit.create_part_with_value(&catalog.template("Fuse")?, Some("F_MAIN"), "5A")?;
    let psu5 = circuit.create_part(&catalog.template("PSU_5V3A")?, None)?;
    let psu12 = circuit.create_part(&catalog.template("PSU_12V1A")?, None)?;

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
    wire(circuit, &f_main, &[("1", "L_GFCI"), ("2", "L_FUSED")])?;

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

    power_flags(circuit, catalog)
}

/// Returns the relay board, whose contacts are wired on the loads sheet.
fn controller(circuit: &mut Circuit, catalog: &Catalog) -> Result<ComponentRef, SchematicError> {
    let mcu = circuit.create_part(&catalog.template("ESP32-S3")?, None)?;
    let panel = circuit.create_part(&catalog.template("FailsafePanel")?, None)?;
    let relay = circuit.create_part(&catalog.template("Relay_8ch")?, None)?;

    // The devkit regulates 3.3V from its 5V pin.
    for supply in ["VDD3P3", "VDD3P3_CPU", "VDD3P3_RTC", "VDD_SPI", "VDDA"] {
        circuit.connect(&mcu, supply, "+5V")?;
    }
    wire(
        circuit,
        &mcu,
        &[
            ("GND", "GND"),
            ("GPIO21", "I2C_SDA"),
            ("GPIO9", "I2C_SCL"),
            ("GPIO4", "ONE_WIRE"),
            ("GPIO7", "WATER_ADC"),
        ],
    )?;
    for (channel, gpio) in RELAY_GPIOS.iter().enumerate() {
        circuit.connect(&mcu, gpio, &format!("REL_CH{}", channel + 1))?;
    }

    let resistor = catalog.template("R")?;
    for (reference, net) in [("R_SDA", "I2C_SDA"), ("R_SCL", "I2C_SCL")] {
        let pullup = circuit.create_part_with_value(&resistor, Some(reference), "4.7k")?;
        wire(circuit, &pullup, &[("1", "+5V"), ("2", net)])?;
    }

    for n in 1..=8 {
        circuit.connect(&panel, &format!("ESP_CH{}", n), &format!("REL_CH{}", n))?;
    }
    wire(circuit, &panel, &[("VCC", "+5V"), ("GND", "GND")])?;
    for n in 1..=8 {
        circuit.connect(&panel, &format!("OUT_CH{}", n), &format!("FS_CH{}", n))?;
    }

    // 470Ω drive resistors into the PC817 inputs.
    for n in 1..=8 {
        let reference = format!("R_DR{}", n);
        let drive = circuit.create_part_with_value(&resistor, Some(&reference), "470R")?;
        circuit.connect(&drive, "1", &format!("FS_CH{}", n))?;
        circuit.connect(&drive, "2", &format!("REL_IN{}", n))?;
        circuit.connect(&relay, &format!("IN{}", n), &format!("REL_IN{}", n))?;
    }

    wire(
        circuit,
        &relay,
        &[("VCC", "+5V"), ("JD_VCC", "+5V"), ("GND", "GND")],
    )?;
    for n in 1..=8 {
        circuit.no_connect(&relay, &format!("NC{}", n))?;
    }

    Ok(relay)
}

fn sensor_bus(circuit: &mut Circuit, catalog: &Catalog) -> Result<(), SchematicError> {
    let mux = circuit.create_part(&catalog.template("TCA9548APWR")?, None)?;
    let co2 = circuit.create_part(&catalog.template("SCD30_Breakout")?, None)?;
    let light = circuit.create_part(&catalog.template("AS7341DLG")?, None)?;

    // Address 0x70, reset held high.
    wire(
        circuit,
        &mux,
        &[
            ("SDA", "I2C_SDA"),
            ("SCL", "I2C_SCL"),
            ("VCC", "+5V"),
            ("GND", "GND"),
            ("A0", "GND"),
            ("A1", "GND"),
            ("A2", "GND"),
            ("~{RESET}", "+5V"),
        ],
    )?;

    let c_mux =
        circuit.create_part_with_value(&catalog.template("C")?, Some("C_MUX"), "100nF")?;
    wire(circuit, &c_mux, &[("1", "+5V"), ("2", "GND")])?;

    // Every SHT4x is at 0x44: one per mux channel.
    let sht4x = catalog.template("SHT4x")?;
    for channel in 0..SHT_CHANNELS {
        let sda = format!("CH{}_SDA", channel);
        let scl = format!("CH{}_SCL", channel);
        let sht = circuit.create_part(&sht4x, None)?;
        circuit.connect(&mux, &format!("SD{}", channel), &sda)?;
        circuit.connect(&mux, &format!("SC{}", channel), &scl)?;
        wire(
            circuit,
            &sht,
            &[
                ("SDA", sda.as_str()),
                ("SCL", scl.as_str()),
                ("VDD", "+5V"),
                ("VSS", "GND"),
            ],
        )?;
    }
    for channel in SHT_CHANNELS..8 {
        circuit.no_connect(&mux, &format!("SD{}", channel))?;
        circuit.no_connect(&mux, &format!("SC{}", channel))?;
    }

    // SEL low selects I2C.
    wire(
        circuit,
        &co2,
        &[
            ("VIN", "+5V"),
            ("GND", "GND"),
            ("SCL", "I2C_SCL"),
            ("SDA", "I2C_SDA"),
            ("SEL", "GND"),
        ],
    )?;
    circuit.no_connect(&co2, "3Vo")?;

    wire(
        circuit,
        &light,
        &[
            ("VDD", "+5V"),
            ("GND", "GND"),
            ("PGND", "GND"),
            ("SCL", "I2C_SCL"),
            ("SDA", "I2C_SDA"),
        ],
    )?;
    for pin in ["LDR", "INT", "GPIO"] {
        circuit.no_connect(&light, pin)?;
    }

    let r_ow = circuit.create_part_with_value(&catalog.template("R")?, Some("R_OW"), "4.7k")?;
    wire(circuit, &r_ow, &[("1", "+5V"), ("2", "ONE_WIRE")])?;

    let ds18b20 = catalog.template("DS18B20U")?;
    let unused: Vec<&str> = ds18b20
        .pins
        .iter()
        .filter(|p| p.name == "NC")
        .map(|p| p.number.as_str())
        .collect();
    for _ in 0..DS18B20_PROBES {
        let probe = circuit.create_part(&ds18b20, None)?;
        wire(
            circuit,
            &probe,
            &[("DQ", "ONE_WIRE"), ("V_{DD}", "+5V"), ("GND", "GND")],
        )?;
        for number in &unused {
            circuit.no_connect(&probe, number)?;
        }
    }

    Ok(())
}

fn loads(
    circuit: &mut Circuit,
    catalog: &Catalog,
    relay: &ComponentRef,
) -> Result<(), SchematicError> {
    let fuse = catalog.template("Fuse")?;

    for (index, (load, rating)) in AC_LOADS.iter().enumerate() {
        let channel = index + 1;
        let switched = format!("SW_L_CH{}", channel);
        let reference = format!("F_{}", load);
        let hot = format!("{}_HOT", load);

        circuit.connect(relay, &format!("COM{}", channel), "L_FUSED")?;
        circuit.connect(relay, &format!("NO{}", channel), &switched)?;
        let load_fuse = circuit.create_part_with_value(&fuse, Some(&reference), rating)?;
        wire(
            circuit,
            &load_fuse,
            &[("1", switched.as_str()), ("2", hot.as_str())],
        )?;
    }

    // Channel 7 switches the 12V pump, channel 8 is an unfused spare.
    wire(
        circuit,
        relay,
        &[
            ("COM7", "+12V"),
            ("NO7", "SW_PUMP_12V"),
            ("COM8", "L_FUSED"),
            ("NO8", "SPARE_HOT"),
        ],
    )?;
    let f_pump = circuit.create_part_with_value(&fuse, Some("F_PUMP"), "1A")?;
    wire(circuit, &f_pump, &[("1", "SW_PUMP_12V"), ("2", "PUMP_HOT")])?;

    // 4-20 mA loop into a 150Ω shunt gives 0.6-3.0V on WATER_V. The ADC sees
    // it through 1k with a 3.3V zener clamp.
    let sensor = circuit.create_part(&catalog.template("Water_Level_Sensor")?, None)?;
    wire(circuit, &sensor, &[("VIN", "+12V"), ("IOUT", "WATER_V")])?;

    let resistor = catalog.template("R")?;
    let r_shunt = circuit.create_part_with_value(&resistor, Some("R_SHUNT"), "150R")?;
    wire(circuit, &r_shunt, &[("1", "WATER_V"), ("2", "GND")])?;
    let r_adc = circuit.create_part_with_value(&resistor, Some("R_ADC"), "1k")?;
    wire(circuit, &r_adc, &[("1", "WATER_V"), ("2", "WATER_ADC")])?;

    let clamp = circuit.create_part_with_value(&catalog.template("D_Zener")?, None, "3.3V BZX84")?;
    wire(circuit, &clamp, &[("K", "WATER_ADC"), ("A", "GND")])?;

    Ok(())
}

/// One flag per rail. Placed on the power sheet and again on the loads
/// sheet.
fn power_flags(circuit: &mut Circuit, catalog: &Catalog) -> Result<(), SchematicError> {
    for rail in ["+5V", "+12V", "GND"] {
        let flag = circuit.create_part(&catalog.template(rail)?, None)?;
        circuit.connect(&flag, "~", rail)?;
    }
    Ok(())
}
