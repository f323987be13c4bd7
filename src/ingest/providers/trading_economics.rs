// src/ingest/providers/trading_economics.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use metrics::histogram;
use serde_json::Value;
use std::time::Duration;

use super::get_text;
use crate::ingest::normalize_text;
use crate::ingest::types::{Item, SourceProvider};

pub const TE_BASE_URL: &str = "https://tradingeconomics.com";
pub const TE_API_URL: &str = "https://api.tradingeconomics.com/news";
pub const GUEST_API_KEY: &str = "guest:guest";
pub const DEFAULT_LIMIT: usize = 20;
const SOURCE: &str = "TradingEconomics";
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// TradingEconomics `/news` JSON endpoint.
pub struct TradingEconomicsProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        endpoint: String,
        api_key: String,
        limit: usize,
        client: reqwest::Client,
    },
}

impl TradingEconomicsProvider {
    pub fn new(api_key: &str, limit: usize) -> Result<Self> {
        Self::with_endpoint(TE_API_URL, api_key, limit)
    }

    pub fn with_endpoint(endpoint: &str, api_key: &str, limit: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("building tradingeconomics http client")?;
        let api_key = match api_key.trim() {
            "" => GUEST_API_KEY.to_string(),
            k => k.to_string(),
        };
        Ok(Self {
            mode: Mode::Http {
                endpoint: endpoint.to_string(),
                api_key,
                limit,
                client,
            },
        })
    }

    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    fn parse_items_from_str(s: &str) -> Result<Vec<Item>> {
        let t0 = std::time::Instant::now();
        let data: Value = serde_json::from_str(s).context("parsing tradingeconomics json")?;
        let Value::Array(entries) = data else {
            tracing::warn!(provider = SOURCE, "response is not a JSON array, ignoring");
            return Ok(Vec::new());
        };

        let mut out = Vec::with_capacity(entries.len());
        for e in entries {
            let Some(id) = e.get("id").and_then(id_string) else {
                continue;
            };
            let title = e
                .get("title")
                .and_then(Value::as_str)
                .map(normalize_text)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "No title".to_string());
            let rel = e.get("url").and_then(Value::as_str).unwrap_or_default();
            let description = e
                .get("description")
                .and_then(Value::as_str)
                .map(normalize_text)
                .filter(|d| !d.is_empty());
            let published_at = e.get("date").and_then(Value::as_str).and_then(parse_te_date);

            out.push(Item {
                id: format!("te:{id}"),
                title,
                url: article_full_url(rel),
                source: SOURCE.to_string(),
                published_at,
                description,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("notifier_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for TradingEconomicsProvider {
    async fn fetch_latest(&self) -> Result<Vec<Item>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(s),
            Mode::Http {
                endpoint,
                api_key,
                limit,
                client,
            } => {
                let limit = limit.to_string();
                let url = reqwest::Url::parse_with_params(
                    endpoint,
                    &[("c", api_key.as_str()), ("f", "json"), ("limit", limit.as_str())],
                )
                .context("building tradingeconomics url")?;
                let body = get_text(client, url, "tradingeconomics news").await?;
                Self::parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        SOURCE
    }
}

/// Absolute article link from the API's relative `url` field.
pub fn article_full_url(relative: &str) -> String {
    let path = relative.trim();
    let base = TE_BASE_URL.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

fn id_string(v: &Value) -> Option<String> {
    match v {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

// API dates come without an offset ("2026-10-14T08:30:00.47"); they are UTC.
fn parse_te_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
}
