// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod ingest;
pub mod notify;
pub mod pipeline;
pub mod scheduler;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::config::AppConfig;
pub use crate::ingest::types::{Item, SourceProvider};
pub use crate::notify::Notifier;
pub use crate::pipeline::{run_cycle, CycleReport};
pub use crate::scheduler::{RunMode, SchedulerConfig};
pub use crate::store::SeenStore;
