//! pipeline.rs — one fetch → filter → notify pass over all sources.

use metrics::{counter, gauge};
use std::time::Duration;

use crate::ingest::{self, types::SourceProvider};
use crate::notify::Notifier;
use crate::store::SeenStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub posted: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Fetch every provider, post unseen items oldest-first, mark them seen.
///
/// Ids are marked seen whether or not the webhook accepted the post, so a
/// failing webhook never causes a flood of repeats on the next cycle.
/// `post_delay` is slept between consecutive posts. The store is not saved here.
pub async fn run_cycle(
    providers: &[Box<dyn SourceProvider>],
    notifier: &dyn Notifier,
    store: &mut SeenStore,
    post_delay: Duration,
) -> CycleReport {
    let batches = ingest::collect(providers).await;

    // Providers hand back newest-first; flip each so the chat reads chronologically.
    let items: Vec<_> = batches
        .into_iter()
        .flat_map(|b| b.into_iter().rev())
        .collect();

    let mut report = CycleReport {
        fetched: items.len(),
        ..CycleReport::default()
    };

    for item in &items {
        if item.id.is_empty() || store.is_seen(&item.id) {
            report.skipped += 1;
            continue;
        }

        if report.posted + report.failed > 0 && !post_delay.is_zero() {
            tokio::time::sleep(post_delay).await;
        }

        match notifier.send(item).await {
            Ok(()) => {
                tracing::info!(id = %item.id, source = %item.source, title = %item.title, "notified");
                counter!("notifier_posted_total").increment(1);
                report.posted += 1;
            }
            Err(e) => {
                tracing::warn!(error = ?e, id = %item.id, source = %item.source, "webhook post failed");
                counter!("notifier_post_errors_total").increment(1);
                report.failed += 1;
            }
        }
        store.mark_seen(item.id.clone());
    }

    let now = chrono::Utc::now().timestamp().max(0);
    gauge!("notifier_last_cycle_ts").set(now as f64);
    tracing::info!(
        fetched = report.fetched,
        posted = report.posted,
        failed = report.failed,
        skipped = report.skipped,
        "cycle finished"
    );
    report
}
