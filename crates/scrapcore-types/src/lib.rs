//! Shared descriptor, runtime, and error types for the scrapcore scraping
//! engine. Every other crate in the workspace depends on this one; it
//! depends on nothing in the workspace itself (spec §9: a run context
//! threaded through the pipeline, not process-wide singletons).

pub mod action;
pub mod descriptor;
pub mod error;
pub mod fetch;
pub mod item;
pub mod link;
pub mod report;

pub use action::{Action, ActionOutcome, ActionRunReport, SleepPreset};
pub use descriptor::{
    effective_concurrency, BackoffMode, ConfigWarning, DedupeConfig, Descriptor, DescriptorDoc,
    DiscoveryConfig, EngineConfig, EngineType, Entrypoint, GlobalConfig, ItemsFormat,
    LinkExtractConfig, LinkExtractMethod, Paging, PagingMode, ParseConfig, QualityConfig,
    ScheduleConfig, StorageConfig, ValidationConfig,
};
pub use error::{ErrorKind, Result};
pub use fetch::{BlockSignal, EngineKind, FetchResponse, TraceEntry};
pub use item::{DropReason, Item};
pub use link::ExtractedLink;
pub use report::{LatencyStats, RunReport, RunStatus, SourceReport, StageCounts};
