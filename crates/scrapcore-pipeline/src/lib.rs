//! Fixed nine-stage pipeline orchestrator driving one source descriptor end
//! to end, plus the multi-source run driver (spec §4.6, §5).

pub mod context;
pub mod dedupe;
pub mod engine;
pub mod entrypoints;
pub mod orchestrator;
pub mod runner;

pub use context::{deadline_token, SourceContext};
pub use dedupe::{ContentDedupe, UrlDedupe};
pub use engine::build_engine;
pub use entrypoints::expand_entrypoints;
pub use orchestrator::run_source;
pub use runner::run_many;
