//! Link discovery and HTML→structured-document conversion (spec §4.5).
//!
//! Kept deliberately free of any fetch or pipeline dependency: this crate
//! only ever sees a response body plus the descriptor fragments that govern
//! how to read it, so it can be unit-tested against fixture HTML without
//! spinning up an engine.

pub mod content;
pub mod links;
pub mod normalize;

pub use content::{extract_content, ExtractedContent};
pub use links::extract_links;
pub use normalize::{normalize, normalize_with, NormalizeOptions};
