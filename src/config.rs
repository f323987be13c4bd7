// src/config.rs
use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::ingest::providers::{rss, trading_economics};
use crate::scheduler::DEFAULT_INTERVAL_SECS;
use crate::store::{DEFAULT_MAX_SEEN_IDS, DEFAULT_STATE_PATH};

pub const ENV_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";
pub const ENV_TE_API_KEY: &str = "TRADING_ECONOMICS_API_KEY";
pub const ENV_INTERVAL: &str = "NOTIFIER_INTERVAL_SECONDS";
pub const ENV_RSS_ENABLED: &str = "RSS_ENABLED";
pub const ENV_STATE_PATH: &str = "NOTIFIER_STATE_PATH";
pub const ENV_MAX_SEEN_IDS: &str = "MAX_SEEN_IDS";
pub const ENV_TE_LIMIT: &str = "TE_NEWS_LIMIT";
pub const ENV_RSS_LIMIT: &str = "RSS_LIMIT_PER_FEED";
pub const ENV_POST_DELAY_MS: &str = "NOTIFIER_POST_DELAY_MS";

const DEFAULT_POST_DELAY_MS: u64 = 1_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub webhook_url: String,
    /// Empty means guest access.
    pub te_api_key: String,
    pub interval_secs: u64,
    pub rss_enabled: bool,
    pub state_path: PathBuf,
    pub max_seen_ids: usize,
    pub te_limit: usize,
    pub rss_limit_per_feed: usize,
    pub post_delay: Duration,
}

impl AppConfig {
    /// Read config from the process environment (call `dotenvy::dotenv()` first).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Read config through an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| {
            lookup(k)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let Some(webhook_url) = get(ENV_WEBHOOK_URL) else {
            bail!("{ENV_WEBHOOK_URL} is not set. Set it in .env or the environment.");
        };

        let rss_enabled = get(ENV_RSS_ENABLED)
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        Ok(Self {
            webhook_url,
            te_api_key: get(ENV_TE_API_KEY).unwrap_or_default(),
            interval_secs: parse_or(get(ENV_INTERVAL), ENV_INTERVAL, DEFAULT_INTERVAL_SECS)?,
            rss_enabled,
            state_path: get(ENV_STATE_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH)),
            max_seen_ids: parse_or(get(ENV_MAX_SEEN_IDS), ENV_MAX_SEEN_IDS, DEFAULT_MAX_SEEN_IDS)?,
            te_limit: parse_or(get(ENV_TE_LIMIT), ENV_TE_LIMIT, trading_economics::DEFAULT_LIMIT)?,
            rss_limit_per_feed: parse_or(
                get(ENV_RSS_LIMIT),
                ENV_RSS_LIMIT,
                rss::DEFAULT_LIMIT_PER_FEED,
            )?,
            post_delay: Duration::from_millis(parse_or(
                get(ENV_POST_DELAY_MS),
                ENV_POST_DELAY_MS,
                DEFAULT_POST_DELAY_MS,
            )?),
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|e| anyhow!("{key} must be a non-negative integer, got {v:?}: {e}")),
    }
}
