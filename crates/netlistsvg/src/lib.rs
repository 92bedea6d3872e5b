//! Everything that touches the netlistsvg renderer: the symbol skin it draws
//! with, the subprocess that runs it, and the wire colors applied to its
//! output.

pub mod colorize;
pub mod renderer;
pub mod skin;
mod writer;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub use colorize::{
    build_net_color_map, colorize, inject_styles, pin_bits, stylesheet, ColorRule, ColorizeError,
    Colorized, PinMatcher,
};
pub use renderer::{Netlistsvg, RenderError, RenderOutcome, SchematicRenderer};
pub use skin::{augment_skin, custom_symbols, CustomSymbol, PinPosition, SkinError, SymbolPin, BASE_SKIN};

/// `<base><suffix>`, e.g. `out/controller` + `_clean.json`.
pub fn artifact_path(base: &Path, suffix: &str) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(suffix);
    PathBuf::from(path)
}
