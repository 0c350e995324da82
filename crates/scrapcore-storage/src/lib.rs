//! On-disk run layout, artifact writers, and run/source reporting
//! (spec §4.7).

pub mod layout;
pub mod report;
pub mod run;
pub mod writer;

pub use layout::RunLayout;
pub use run::{RunWriter, SourceWriter};
pub use writer::{CsvItemWriter, ItemsWriter, JsonlWriter, LineLogWriter, ParquetItemWriter};
