// src/ingest/providers/mod.rs
pub mod rss;
pub mod trading_economics;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::config::AppConfig;
use crate::ingest::config::FeedSpec;
use crate::ingest::types::SourceProvider;
use self::rss::RssProvider;
use self::trading_economics::TradingEconomicsProvider;

/// TradingEconomics first, then one provider per RSS feed (when enabled).
pub fn build_providers(
    cfg: &AppConfig,
    feeds: &[FeedSpec],
) -> Result<Vec<Box<dyn SourceProvider>>> {
    let mut out: Vec<Box<dyn SourceProvider>> = Vec::with_capacity(feeds.len() + 1);
    out.push(Box::new(TradingEconomicsProvider::new(
        &cfg.te_api_key,
        cfg.te_limit,
    )?));
    if cfg.rss_enabled {
        for f in feeds {
            out.push(Box::new(RssProvider::from_url(f, cfg.rss_limit_per_feed)?));
        }
    }
    Ok(out)
}

/// GET `url` and return the body; non-2xx statuses are errors.
/// `label` names the request in error context (URLs may carry credentials).
pub(crate) async fn get_text(
    client: &reqwest::Client,
    url: reqwest::Url,
    label: &str,
) -> Result<String> {
    client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {label}"))?
        .error_for_status()
        .with_context(|| format!("GET {label} returned non-2xx"))?
        .text()
        .await
        .with_context(|| format!("reading body of {label}"))
}

/// RFC 2822 `pubDate`; chrono covers the obsolete zone names (`GMT`, `EST`) some feeds still emit.
pub(crate) fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .and_then(|dt| DateTime::<Utc>::from_timestamp(dt.unix_timestamp(), 0))
        .or_else(|| {
            DateTime::parse_from_rfc2822(ts)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}
