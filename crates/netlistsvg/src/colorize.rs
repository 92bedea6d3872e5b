//! Wire coloring by net function.
//!
//! Every net-bit is identified by the `(reference, pin)` pairs it connects
//! in the clean netlist. Rules are tried in order and the first rule that
//! claims a bit decides its color; later rules only color what is still
//! free. netlistsvg tags each wire segment with a `net_<bit>` class, so the
//! result is a plain stylesheet injected into the rendered SVG.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use log::{debug, info};
use natord::compare;
use netlist::{NetlistDocument, NetlistError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifact_path;

/// Pin pattern matching every pin of a reference.
pub const WILDCARD: &str = "*";

const STYLE_CLOSE: &str = "</style>";
const ROOT_CLOSE: &str = "</svg>";

#[derive(Error, Debug)]
pub enum ColorizeError {
    #[error("Netlist error: {0}")]
    NetlistError(#[from] NetlistError),

    #[error("FS error: {0}")]
    FsError(#[from] std::io::Error),

    #[error("No </style> or </svg> to inject styles before")]
    NoInsertionPoint,
}

/// Matches pins of one reference whose name contains `pin`, or every pin of
/// it when `pin` is `None`.
///
/// Written as a `["REF", "PIN"]` pair in configuration, `"*"` standing for
/// any pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct PinMatcher {
    pub reference: String,
    pub pin: Option<String>,
}

impl PinMatcher {
    pub fn new(reference: &str, pin: &str) -> Self {
        (reference.to_string(), pin.to_string()).into()
    }

    pub fn any_pin(reference: &str) -> Self {
        PinMatcher {
            reference: reference.to_string(),
            pin: None,
        }
    }

    pub fn matches(&self, reference: &str, pin: &str) -> bool {
        self.reference == reference
            && self.pin.as_deref().map_or(true, |p| pin.contains(p))
    }
}

impl From<(String, String)> for PinMatcher {
    fn from((reference, pin): (String, String)) -> Self {
        PinMatcher {
            reference,
            pin: (pin != WILDCARD).then_some(pin),
        }
    }
}

impl From<PinMatcher> for (String, String) {
    fn from(matcher: PinMatcher) -> Self {
        (
            matcher.reference,
            matcher.pin.unwrap_or_else(|| WILDCARD.to_string()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRule {
    /// Label for logs, e.g. "AC live".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Any CSS color.
    pub color: String,
    pub pins: Vec<PinMatcher>,
}

impl ColorRule {
    pub fn new(color: &str, pins: Vec<PinMatcher>) -> Self {
        ColorRule {
            name: None,
            color: color.to_string(),
            pins,
        }
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.color)
    }
}

/// `(reference, connection key)` → net-bits on that pin. Constant bits are
/// ignored.
pub fn pin_bits(document: &NetlistDocument) -> BTreeMap<(String, String), BTreeSet<u64>> {
    let mut pins: BTreeMap<(String, String), BTreeSet<u64>> = BTreeMap::new();
    for (reference, cell) in document.cells() {
        for (pin, bits) in cell.connections.iter() {
            pins.entry((reference.to_string(), pin.clone()))
                .or_default()
                .extend(bits.iter().filter_map(|b| b.net()));
        }
    }
    pins
}

/// Net-bit → color, first matching rule wins.
pub fn build_net_color_map(
    document: &NetlistDocument,
    rules: &[ColorRule],
) -> BTreeMap<u64, String> {
    let pins = pin_bits(document);
    let mut colors = BTreeMap::new();

    for rule in rules {
        let matched: BTreeSet<u64> = pins
            .iter()
            .filter(|((reference, pin), _)| rule.pins.iter().any(|m| m.matches(reference, pin)))
            .flat_map(|(_, bits)| bits.iter().copied())
            .collect();

        let mut claimed = 0;
        for bit in matched {
            if !colors.contains_key(&bit) {
                colors.insert(bit, rule.color.clone());
                claimed += 1;
            }
        }
        debug!("Rule {} colored {} nets", rule.label(), claimed);
    }

    colors
}

/// One CSS rule per color, selecting the wires of all its nets.
pub fn stylesheet(colors: &BTreeMap<u64, String>) -> String {
    let mut nets_by_color: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (bit, color) in colors.iter() {
        nets_by_color
            .entry(color.as_str())
            .or_default()
            .push(format!("net_{}", bit));
    }

    nets_by_color
        .into_iter()
        .map(|(color, mut classes)| {
            classes.sort_by(|a, b| compare(a, b));
            let selectors = classes
                .iter()
                .map(|c| format!("line.{c}, path.{c}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("  {} {{ stroke: {}; stroke-width: 2px; }}", selectors, color)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Add `css` as a `<style id='net-colors'>` block after the document's
/// first style block, or before the closing root tag if it has none.
pub fn inject_styles(svg: &str, css: &str) -> Result<String, ColorizeError> {
    let block = format!("<style id='net-colors'>\n{}\n  </style>", css);

    if let Some(start) = svg.find(STYLE_CLOSE) {
        let end = start + STYLE_CLOSE.len();
        return Ok(format!("{}\n  {}{}", &svg[..end], block, &svg[end..]));
    }

    let start = svg.rfind(ROOT_CLOSE).ok_or(ColorizeError::NoInsertionPoint)?;
    Ok(format!("{}  {}\n{}", &svg[..start], block, &svg[start..]))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Colorized {
    pub path: PathBuf,
    pub nets: usize,
}

/// Read `<base>_clean.json` and `<base>.svg`, write `<base>_color.svg`.
pub fn colorize(base: &Path, rules: &[ColorRule]) -> Result<Colorized, ColorizeError> {
    let document = NetlistDocument::load(&artifact_path(base, "_clean.json"))?;
    let svg = std::fs::read_to_string(artifact_path(base, ".svg"))?;

    let colors = build_net_color_map(&document, rules);
    let colored = inject_styles(&svg, &stylesheet(&colors))?;

    let path = artifact_path(base, "_color.svg");
    std::fs::write(&path, colored)?;
    info!("Colored {} nets into {}", colors.len(), path.display());

    Ok(Colorized {
        path,
        nets: colors.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matcher_substring_and_wildcard() {
        let gpio = PinMatcher::new("U4", "GPIO19");
        assert!(gpio.matches("U4", "GPIO19/USB_D-"));
        assert!(!gpio.matches("U5", "GPIO19"));
        assert!(!gpio.matches("U4", "GPIO1"));

        let any = PinMatcher::new("R_SDA", WILDCARD);
        assert_eq!(any, PinMatcher::any_pin("R_SDA"));
        assert!(any.matches("R_SDA", "1"));
        assert!(any.matches("R_SDA", "2"));
    }

    #[test]
    fn injects_before_root_without_style() {
        let svg = "<svg>\n</svg>\n";
        let injected = inject_styles(svg, "  x").unwrap();
        assert_eq!(
            injected,
            "<svg>\n  <style id='net-colors'>\n  x\n  </style>\n</svg>\n"
        );
        assert!(inject_styles("<g/>", "").is_err());
    }
}
