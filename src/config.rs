use std::path::Path;

use netlist::BoundaryPortTable;
use netlistsvg::ColorRule;
use serde::{Deserialize, Serialize};

/// Per-design data that is authored rather than derived: which pins are the
/// schematic's external ports and how wires are colored.
///
/// ```toml
/// [ports]
/// U1 = [{ pin = "L_IN", name = "AC_L", direction = "input" }]
///
/// [[colors]]
/// name = "AC live"
/// color = "#CC0000"
/// pins = [["U1", "L_IN"], ["F_MAIN", "*"]]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignConfig {
    #[serde(default)]
    pub ports: BoundaryPortTable,
    /// Tried in order; the first rule matching a net colors it.
    #[serde(default)]
    pub colors: Vec<ColorRule>,
}

impl DesignConfig {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Ok(Self::from_toml(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use netlist::PortDirection;
    use netlistsvg::PinMatcher;

    #[test]
    fn parses_ports_and_colors() {
        let config = DesignConfig::from_toml(indoc! {r##"
            [ports]
            U1 = [
                { pin = "L_IN", name = "AC_L", direction = "input" },
                { pin = "N_IN", name = "AC_N", direction = "input" },
            ]
            U5 = [{ pin = "NO8", name = "SPARE_HOT", direction = "output" }]

            [[colors]]
            color = "#CC0000"
            pins = [["U1", "L_IN"], ["F_MAIN", "*"]]

            [[colors]]
            name = "neutral"
            color = "#0055DD"
            pins = [["U1", "N_IN"]]
        "##})
        .unwrap();

        assert_eq!(config.ports.0["U1"].len(), 2);
        assert_eq!(config.ports.0["U5"][0].direction, PortDirection::Output);
        assert_eq!(config.colors.len(), 2);
        assert_eq!(config.colors[0].name, None);
        assert_eq!(config.colors[0].pins[1], PinMatcher::any_pin("F_MAIN"));
    }

    #[test]
    fn empty_config_is_valid() {
        assert_eq!(DesignConfig::from_toml("").unwrap(), DesignConfig::default());
    }

    #[test]
    fn unknown_direction_is_rejected() {
        let result = DesignConfig::from_toml(indoc! {r#"
            [ports]
            U1 = [{ pin = "L_IN", name = "AC_L", direction = "sideways" }]
        "#});
        assert!(result.is_err());
    }
}
