//! Config model and loader for the scrapcore scraping engine (spec §4.1).
//!
//! Parses a JSON or YAML document into one or more typed [`Descriptor`]s,
//! migrating legacy job-scraper shapes and expanding `${ENV_VAR}`
//! references along the way, then validates every hard invariant before a
//! run is allowed to start.

pub mod env;
pub mod loader;
pub mod migrate;
pub mod validate;

pub use loader::{load, load_value, LoadError, LoadedConfig};
pub use scrapcore_types::Descriptor;
pub use validate::ConfigError;
