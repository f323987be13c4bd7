// src/scheduler.rs
use anyhow::Result;
use metrics::counter;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

use crate::ingest::types::SourceProvider;
use crate::notify::Notifier;
use crate::pipeline::run_cycle;
use crate::store::SeenStore;

/// Floor for the loop interval; the news API rate-limits guest keys hard.
pub const MIN_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_INTERVAL_SECS: u64 = 900;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    OneShot,
    Loop,
}

#[derive(Clone, Copy, Debug)]
pub struct SchedulerConfig {
    pub mode: RunMode,
    pub interval: Duration,
    pub post_delay: Duration,
}

impl SchedulerConfig {
    /// In loop mode the interval is clamped to `MIN_INTERVAL_SECS`. A one-shot
    /// run never sleeps, so its interval is kept as given and nothing is logged.
    pub fn new(mode: RunMode, interval_secs: u64, post_delay: Duration) -> Self {
        let secs = match mode {
            RunMode::Loop => clamp_interval(interval_secs),
            RunMode::OneShot => interval_secs,
        };
        Self {
            mode,
            interval: Duration::from_secs(secs),
            post_delay,
        }
    }
}

pub fn clamp_interval(secs: u64) -> u64 {
    if secs < MIN_INTERVAL_SECS {
        tracing::warn!(
            requested = secs,
            using = MIN_INTERVAL_SECS,
            "interval below floor; clamping to respect rate limits"
        );
        MIN_INTERVAL_SECS
    } else {
        secs
    }
}

/// Run cycles per `cfg.mode`, saving the store after each one.
///
/// In loop mode a `true` on `shutdown` ends the loop: immediately when it
/// arrives during the sleep, after the save when it arrives mid-cycle.
/// Returns the number of completed cycles.
pub async fn run(
    cfg: SchedulerConfig,
    providers: &[Box<dyn SourceProvider>],
    notifier: &dyn Notifier,
    store: &mut SeenStore,
    mut shutdown: watch::Receiver<bool>,
) -> Result<usize> {
    if cfg.mode == RunMode::Loop {
        tracing::info!(
            interval_secs = cfg.interval.as_secs(),
            "running in loop (Ctrl+C to stop)"
        );
    }

    let mut cycles = 0usize;
    loop {
        run_cycle(providers, notifier, store, cfg.post_delay).await;
        persist(store);
        cycles += 1;

        if cfg.mode == RunMode::OneShot || *shutdown.borrow() {
            break;
        }

        tokio::select! {
            changed = shutdown.changed() => {
                // A dropped sender means nobody can stop us any more; treat as a stop too.
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = tokio::time::sleep(cfg.interval) => {}
        }
    }

    tracing::info!(cycles, "scheduler stopped");
    Ok(cycles)
}

fn persist(store: &SeenStore) {
    match store.save() {
        Ok(()) => tracing::debug!(ids = store.len(), path = %store.path().display(), "state saved"),
        Err(e) => {
            tracing::warn!(error = ?e, "state save failed; will retry next cycle");
            counter!("notifier_state_save_errors_total").increment(1);
        }
    }
}

/// Turns interrupts from `signals` into a graceful stop on `stop`.
///
/// The first interrupt asks the scheduler to finish its cycle and stop. A second
/// one returns `true`: the caller should exit without waiting. Returns `false`
/// once `signals` closes.
pub async fn relay_signals(stop: watch::Sender<bool>, mut signals: mpsc::Receiver<()>) -> bool {
    if signals.recv().await.is_none() {
        return false;
    }
    tracing::info!("interrupt received, stopping after the current cycle (interrupt again to force)");
    let _ = stop.send(true);

    if signals.recv().await.is_none() {
        return false;
    }
    tracing::warn!("second interrupt, exiting without waiting for the cycle");
    true
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let term = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let term = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = term => {},
    }
}
