//! Discovered detail-page links (spec §3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedLink {
    pub url_raw: String,
    pub url_normalized: String,
    pub source_page_url: String,
    pub discovered_at: chrono::DateTime<chrono::Utc>,
}
