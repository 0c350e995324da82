//! HTTP, headless-browser, and hybrid fetch engines sharing one
//! `FetchResponse` contract (spec §4.3).
//!
//! The three engines are expressed as one capability trait
//! (`get`/`get_rendered`/`close`) rather than a class hierarchy, matching
//! the tagged-variant style the rest of the workspace uses for the Action
//! DSL (spec §9 Design Notes).

pub mod block;
pub mod browser;
pub mod contract;
pub mod http;
pub mod hybrid;

pub use block::classify_block;
pub use browser::BrowserEngine;
pub use contract::FetchEngine;
pub use http::HttpEngine;
pub use hybrid::HybridEngine;
