//! Custom symbols for the netlistsvg skin.
//!
//! netlistsvg picks a symbol for a cell by matching the cell type against
//! the skin's `s:type`/`s:alias` entries, then attaches each connection to
//! the anchor whose `s:pid` equals the connection key. The pids declared
//! here therefore have to be exactly the keys the netlist normalizer leaves
//! on those cells: `"~"` on single-pin power flags, `"1"`/`"2"` on the
//! symmetric passives whose pin names collide, and the pin names otherwise.
//! An unknown pid is not an error in netlistsvg; the wire is just dropped.

use std::collections::HashSet;
use std::fmt;

use log::debug;
use thiserror::Error;

use crate::writer::MarkupWriter;

/// Stock skin with the module port arrows and the generic box symbol, used
/// when no skin from a previous render is available.
pub const BASE_SKIN: &str = include_str!("base_skin.svg");

const ROOT_CLOSE: &str = "</svg>";
const TYPE_ATTRIBUTE: &str = "s:type=\"";

#[derive(Error, Debug)]
pub enum SkinError {
    #[error("Skin has no closing </svg> tag")]
    MissingRootClose,

    #[error("Format error: {0}")]
    FormatError(#[from] fmt::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinPosition {
    Top,
    Bottom,
    Left,
    Right,
}

impl PinPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            PinPosition::Top => "top",
            PinPosition::Bottom => "bottom",
            PinPosition::Left => "left",
            PinPosition::Right => "right",
        }
    }
}

/// A wire anchor on a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolPin {
    pub pid: String,
    pub x: i32,
    pub y: i32,
    pub position: PinPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomSymbol {
    pub type_name: String,
    pub width: u32,
    pub height: u32,
    /// Drawing elements, one per line. `$cell_id` is substituted by
    /// netlistsvg.
    pub body: Vec<String>,
    pub pins: Vec<SymbolPin>,
}

impl CustomSymbol {
    pub fn new(type_name: &str, width: u32, height: u32) -> Self {
        CustomSymbol {
            type_name: type_name.to_string(),
            width,
            height,
            body: vec![],
            pins: vec![],
        }
    }

    pub fn draw(mut self, element: &str) -> Self {
        self.body.push(element.to_string());
        self
    }

    pub fn pin(mut self, pid: &str, x: i32, y: i32, position: PinPosition) -> Self {
        self.pins.push(SymbolPin {
            pid: pid.to_string(),
            x,
            y,
            position,
        });
        self
    }

    pub fn pids(&self) -> impl Iterator<Item = &str> {
        self.pins.iter().map(|p| p.pid.as_str())
    }

    pub fn write_markup<W: fmt::Write>(&self, writer: &mut MarkupWriter<W>) -> fmt::Result {
        writer.start_element(&format!(
            r#"<g s:type="{}" s:width="{}" s:height="{}" transform="translate(0,0)">"#,
            self.type_name, self.width, self.height
        ))?;
        writer.write_line(&format!(r#"<s:alias val="{}"/>"#, self.type_name))?;
        for element in &self.body {
            writer.write_line(element)?;
        }
        for pin in &self.pins {
            writer.write_line(&format!(
                r#"<g s:x="{}" s:y="{}" s:pid="{}" s:position="{}"/>"#,
                pin.x,
                pin.y,
                pin.pid,
                pin.position.as_str()
            ))?;
        }
        writer.end_element("</g>")
    }

    pub fn to_markup(&self) -> Result<String, SkinError> {
        let mut writer = MarkupWriter::new(String::new());
        self.write_markup(&mut writer)?;
        Ok(writer.into_inner())
    }
}

/// Symbols for the custom part types of the built-in catalog: power flags,
/// generic passives, the fuse and the zener.
pub fn custom_symbols() -> Vec<CustomSymbol> {
    use PinPosition::*;

    let gnd = CustomSymbol::new("GND", 20, 20)
        .draw(r#"<text x="22" y="12" class="$cell_id net_name_text" s:attribute="value">GND</text>"#)
        .draw(r#"<path d="M10,0 V5 M0,5 H20 M3,10 H17 M6,15 H14" class="$cell_id symbol"/>"#)
        .pin("~", 10, 0, Top);

    let plus_5v = CustomSymbol::new("+5V", 20, 25)
        .draw(r#"<text x="10" y="1" text-anchor="middle" class="$cell_id net_name_text" s:attribute="value">+5V</text>"#)
        .draw(r#"<path d="M10,25 V8 M0,8 H20" class="$cell_id symbol"/>"#)
        .pin("~", 10, 25, Bottom);

    let plus_12v = CustomSymbol::new("+12V", 24, 25)
        .draw(r#"<text x="12" y="1" text-anchor="middle" class="$cell_id net_name_text" s:attribute="value">+12V</text>"#)
        .draw(r#"<path d="M12,25 V8 M0,8 H24" class="$cell_id symbol"/>"#)
        .pin("~", 12, 25, Bottom);

    let resistor = CustomSymbol::new("R", 16, 50)
        .draw(r#"<text x="18" y="20" class="$cell_id part_ref_text" s:attribute="ref">R</text>"#)
        .draw(r#"<text x="18" y="33" class="$cell_id" s:attribute="value">Xk</text>"#)
        .draw(r#"<rect x="3" y="10" width="10" height="30" class="$cell_id symbol"/>"#)
        .draw(r#"<path d="M8,0 V10 M8,40 V50" class="$cell_id"/>"#)
        .pin("1", 8, 0, Top)
        .pin("2", 8, 50, Bottom);

    let capacitor = CustomSymbol::new("C", 30, 50)
        .draw(r#"<text x="32" y="20" class="$cell_id part_ref_text" s:attribute="ref">C</text>"#)
        .draw(r#"<text x="32" y="33" class="$cell_id" s:attribute="value">Xu</text>"#)
        .draw(r#"<path d="M0,20 H30 M0,30 H30" class="$cell_id symbol"/>"#)
        .draw(r#"<path d="M15,0 V20 M15,30 V50" class="$cell_id"/>"#)
        .pin("1", 15, 0, Top)
        .pin("2", 15, 50, Bottom);

    let fuse = CustomSymbol::new("Fuse", 16, 50)
        .draw(r#"<text x="18" y="20" class="$cell_id part_ref_text" s:attribute="ref">F</text>"#)
        .draw(r#"<text x="18" y="33" class="$cell_id" s:attribute="value">Xv</text>"#)
        .draw(r#"<rect x="3" y="12" width="10" height="26" class="$cell_id symbol"/>"#)
        .draw(r#"<path d="M8,0 V12 M8,38 V50" class="$cell_id"/>"#)
        .pin("1", 8, 0, Top)
        .pin("2", 8, 50, Bottom);

    // Cathode on top, anode towards ground.
    let zener = CustomSymbol::new("D_Zener", 20, 50)
        .draw(r#"<text x="22" y="20" class="$cell_id part_ref_text" s:attribute="ref">D</text>"#)
        .draw(r#"<text x="22" y="33" class="$cell_id" s:attribute="value">Xv</text>"#)
        .draw(r#"<path d="M0,15 H20 L10,35 Z" class="$cell_id symbol"/>"#)
        .draw(r#"<path d="M0,15 V10 M20,15 V20" class="$cell_id"/>"#)
        .draw(r#"<path d="M10,0 V15 M10,35 V50" class="$cell_id"/>"#)
        .pin("K", 10, 0, Top)
        .pin("A", 10, 50, Bottom);

    vec![gnd, plus_5v, plus_12v, resistor, capacitor, fuse, zener]
}

/// Every `s:type` declared in `skin`.
pub fn declared_types(skin: &str) -> HashSet<&str> {
    skin.match_indices(TYPE_ATTRIBUTE)
        .filter_map(|(start, _)| {
            let rest = &skin[start + TYPE_ATTRIBUTE.len()..];
            rest.find('"').map(|end| &rest[..end])
        })
        .collect()
}

/// Insert `symbols` into `skin` just before its closing root tag.
///
/// Types the skin already declares are left alone, so augmenting an
/// augmented skin returns it unchanged.
pub fn augment_skin(skin: &str, symbols: &[CustomSymbol]) -> Result<String, SkinError> {
    let insert_at = skin.rfind(ROOT_CLOSE).ok_or(SkinError::MissingRootClose)?;
    let existing = declared_types(skin);

    let mut writer = MarkupWriter::new(String::new());
    let mut added = 0;
    for symbol in symbols {
        if existing.contains(symbol.type_name.as_str()) {
            debug!("Skin already declares {}, skipping", symbol.type_name);
            continue;
        }
        writer.write_line("")?;
        symbol.write_markup(&mut writer)?;
        added += 1;
    }

    if added == 0 {
        return Ok(skin.to_string());
    }
    debug!("Added {} symbols to skin", added);

    let markup = writer.into_inner();
    let mut augmented = String::with_capacity(skin.len() + markup.len());
    augmented.push_str(&skin[..insert_at]);
    augmented.push_str(&markup);
    augmented.push_str(&skin[insert_at..]);
    Ok(augmented)
}
