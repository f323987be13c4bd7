pub mod discord;

use anyhow::Result;

use crate::ingest::types::Item;

/// Delivery target for one new item.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, item: &Item) -> Result<()>;
}
