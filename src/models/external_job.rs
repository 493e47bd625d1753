use serde::{Deserialize, Serialize};

/// A listing scraped from a public job board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExternalJob {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub url: Option<String>,
    pub posted_at: Option<String>,
    pub source: String,
}
