//! Project export formats

mod json;
mod svg;

pub use json::{export_json, import_json};
pub use svg::{escape_xml, generate_thumbnail, render_svg};
