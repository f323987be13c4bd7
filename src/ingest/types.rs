// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: String,     // e.g. "te:123456", "rss:ft-home:<digest>"
    pub title: String,
    pub url: String,
    pub source: String, // display label, e.g. "TradingEconomics", "FT Home"
    pub published_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

/// A single news source. Implementations return items newest-first.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Item>>;
    fn name(&self) -> &str;
}
