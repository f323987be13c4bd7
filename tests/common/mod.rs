// Shared doubles for integration tests.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use news_notifier::{Item, Notifier, SourceProvider};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn item(id: &str) -> Item {
    Item {
        id: id.to_string(),
        title: format!("headline {id}"),
        url: format!("https://news.test/{id}"),
        source: "Test".to_string(),
        published_at: None,
        description: None,
    }
}

/// Returns the same items (newest-first) on every fetch.
pub struct StaticProvider {
    pub name: &'static str,
    pub items: Vec<Item>,
    pub fetches: AtomicUsize,
}

impl StaticProvider {
    pub fn new(name: &'static str, ids: &[&str]) -> Self {
        Self {
            name,
            items: ids.iter().map(|id| item(id)).collect(),
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl SourceProvider for StaticProvider {
    async fn fetch_latest(&self) -> Result<Vec<Item>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.clone())
    }

    fn name(&self) -> &str {
        self.name
    }
}

pub struct FailingProvider;

#[async_trait::async_trait]
impl SourceProvider for FailingProvider {
    async fn fetch_latest(&self) -> Result<Vec<Item>> {
        Err(anyhow!("connection refused"))
    }

    fn name(&self) -> &str {
        "Failing"
    }
}

/// Records every id it is asked to send; optionally fails every send.
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, item: &Item) -> Result<()> {
        self.sent.lock().unwrap().push(item.id.clone());
        if self.fail {
            return Err(anyhow!("webhook returned 500"));
        }
        Ok(())
    }
}
