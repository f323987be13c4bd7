//! store.rs — bounded, insertion-ordered record of item ids that were already notified.
//!
//! Persisted as `{"ids": [...]}` (oldest first). Loading never fails: a missing
//! or unreadable file starts an empty store.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_STATE_PATH: &str = "state/seen_ids.json";
pub const DEFAULT_MAX_SEEN_IDS: usize = 1000;

#[derive(Debug, Serialize)]
struct StateFileOut<'a> {
    ids: Vec<&'a str>,
}

// Tolerant read side: `{"ids": [...]}` or a bare array, entries may be numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StateFileIn {
    Wrapped { ids: Vec<serde_json::Value> },
    Bare(Vec<serde_json::Value>),
}

#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
    cap: usize,
    order: VecDeque<String>,
    index: HashSet<String>,
}

impl SeenStore {
    /// Empty store bound to `path`. A cap of 0 is treated as 1.
    pub fn new(path: impl Into<PathBuf>, cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            path: path.into(),
            cap,
            order: VecDeque::with_capacity(cap.min(10_000)),
            index: HashSet::with_capacity(cap.min(10_000)),
        }
    }

    /// Load the store from `path`, falling back to an empty store on any error.
    pub fn load(path: impl Into<PathBuf>, cap: usize) -> Self {
        let mut store = Self::new(path, cap);
        let raw = match fs::read_to_string(&store.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return store,
            Err(e) => {
                tracing::warn!(path = %store.path.display(), error = %e, "could not read state file");
                return store;
            }
        };

        let parsed: StateFileIn = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(path = %store.path.display(), error = %e, "state file is corrupt, starting empty");
                return store;
            }
        };

        let ids = match parsed {
            StateFileIn::Wrapped { ids } | StateFileIn::Bare(ids) => ids,
        };
        for v in ids {
            if let Some(id) = migrate_id(v) {
                store.mark_seen(id);
            }
        }
        tracing::debug!(path = %store.path.display(), ids = store.len(), "state loaded");
        store
    }

    pub fn is_seen(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Record `id` as seen. Returns `false` if it was already present.
    /// Evicts the oldest ids once the cap is exceeded.
    pub fn mark_seen(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.index.contains(&id) {
            return false;
        }
        self.index.insert(id.clone());
        self.order.push_back(id);
        while self.order.len() > self.cap {
            if let Some(old) = self.order.pop_front() {
                self.index.remove(&old);
            }
        }
        true
    }

    /// Persist the ids (oldest first) via temp file + rename.
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating state dir {}", dir.display()))?;
        }

        // Cap is enforced on insert; skip is a no-op unless the cap invariant broke.
        let skip = self.order.len().saturating_sub(self.cap);
        let out = StateFileOut {
            ids: self.order.iter().skip(skip).map(String::as_str).collect(),
        };
        let body = serde_json::to_vec_pretty(&out).context("serializing seen ids")?;

        let tmp = tmp_path(&self.path);
        fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing state file {}", self.path.display()))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ids in insertion order, oldest first.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "seen_ids.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

// Bare numeric ids predate source prefixes and always came from TradingEconomics.
fn migrate_id(v: serde_json::Value) -> Option<String> {
    let s = match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let s = s.trim().to_string();
    if s.is_empty() {
        return None;
    }
    if !s.contains(':') && s.bytes().all(|b| b.is_ascii_digit()) {
        return Some(format!("te:{s}"));
    }
    Some(s)
}
