use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageRecordStatus {
    Rendered,
    Failed,
    Pending,
}

/// One line of the crawl report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub href: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub status: PageRecordStatus,
}
