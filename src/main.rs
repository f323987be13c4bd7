//! news-notifier — binary entrypoint.
//! Loads `.env`, builds the providers and webhook notifier, then runs once or loops.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_notifier::ingest::{config::load_feeds_default, providers::build_providers};
use news_notifier::notify::discord::DiscordNotifier;
use news_notifier::scheduler::{self, RunMode, SchedulerConfig};
use news_notifier::{AppConfig, SeenStore};

/// TradingEconomics + RSS news → Discord notifier.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run in a loop: fetch + notify, then sleep for INTERVAL seconds, repeat.
    #[arg(long = "loop")]
    run_loop: bool,

    /// Loop interval in seconds (min 60). Env: NOTIFIER_INTERVAL_SECONDS, default 900.
    #[arg(long, value_name = "SECONDS")]
    interval: Option<u64>,
}

impl Args {
    fn run_mode(&self) -> RunMode {
        if self.run_loop {
            RunMode::Loop
        } else {
            RunMode::OneShot
        }
    }

    /// `--interval` wins over the environment value.
    fn interval_secs(&self, env_secs: u64) -> u64 {
        self.interval.unwrap_or(env_secs)
    }
}

/// Logs go to stderr. `RUST_LOG` picks levels (default `info`), `LOG_FORMAT=json`
/// switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env if present; real env vars win.
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Args::parse();
    let cfg = AppConfig::from_env()?;

    let feeds = if cfg.rss_enabled {
        load_feeds_default().context("loading rss feed list")?
    } else {
        Vec::new()
    };
    let providers = build_providers(&cfg, &feeds)?;
    let notifier = DiscordNotifier::new(cfg.webhook_url.clone());
    let mut store = SeenStore::load(cfg.state_path.clone(), cfg.max_seen_ids);

    let mode = args.run_mode();
    let sched = SchedulerConfig::new(mode, args.interval_secs(cfg.interval_secs), cfg.post_delay);

    tracing::info!(
        providers = providers.len(),
        seen = store.len(),
        state = %store.path().display(),
        mode = ?mode,
        "starting news notifier"
    );

    let (tx, rx) = watch::channel(false);
    let (sig_tx, sig_rx) = mpsc::channel(4);
    tokio::spawn(async move {
        loop {
            scheduler::shutdown_signal().await;
            if sig_tx.send(()).await.is_err() {
                break;
            }
        }
    });
    tokio::spawn(async move {
        if scheduler::relay_signals(tx, sig_rx).await {
            std::process::exit(130);
        }
    });

    scheduler::run(sched, &providers, &notifier, &mut store, rx).await?;
    Ok(())
}
