//! Utility functions shared across the crate

mod ids;
mod markdown;

pub use ids::{generate_id, generate_prefixed_id, to_base36};
pub use markdown::strip_markdown;
