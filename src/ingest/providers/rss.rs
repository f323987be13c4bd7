// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use once_cell::sync::OnceCell;
use regex::{Captures, Regex};
use std::time::Duration;

use super::{get_text, parse_rfc2822};
use crate::ingest::config::FeedSpec;
use crate::ingest::types::{Item, SourceProvider};
use crate::ingest::{normalize_text, rss_item_id};

pub const DEFAULT_LIMIT_PER_FEED: usize = 15;
const USER_AGENT: &str = "NewsNotifier/1.0";
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// RSS 2.0 feed, either fetched over HTTP or parsed from an in-memory body.
pub struct RssProvider {
    name: String,
    limit: usize,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RssProvider {
    pub fn from_url(feed: &FeedSpec, limit: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("building rss http client")?;
        Ok(Self {
            name: feed.name.clone(),
            limit,
            mode: Mode::Http {
                url: feed.url.clone(),
                client,
            },
        })
    }

    pub fn from_fixture(name: &str, body: &str) -> Self {
        Self {
            name: name.to_string(),
            limit: DEFAULT_LIMIT_PER_FEED,
            mode: Mode::Fixture(body.to_string()),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<Item>> {
        let t0 = std::time::Instant::now();
        let xml_clean = resolve_html_entities(s);
        let channel = ::rss::Channel::read_from(xml_clean.as_bytes())
            .with_context(|| format!("parsing rss xml for {}", self.name))?;

        let mut out = Vec::with_capacity(channel.items().len().min(self.limit));
        // Entries without a link still count toward the limit.
        for it in channel.items().iter().take(self.limit) {
            let link = it.link().map(str::trim).unwrap_or_default();
            if link.is_empty() {
                continue;
            }
            let title = it
                .title()
                .map(normalize_text)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "No title".to_string());
            let description = it
                .description()
                .map(normalize_text)
                .filter(|d| !d.is_empty());

            out.push(Item {
                id: rss_item_id(&self.name, link),
                title,
                url: link.to_string(),
                source: self.name.clone(),
                published_at: it.pub_date().and_then(parse_rfc2822),
                description,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("notifier_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<Item>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http { url, client } => {
                let url = reqwest::Url::parse(url)
                    .with_context(|| format!("invalid feed url for {}", self.name))?;
                let label = url.to_string();
                let body = get_text(client, url, &label).await?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Feeds carry HTML named entities (`&eacute;`, `&pound;`) that XML does not
/// define. Rewrite them as their characters, re-escaped for XML; names HTML
/// does not know either become literal text. The five XML entities pass through.
fn resolve_html_entities(s: &str) -> String {
    static RE_ENTITY: OnceCell<Regex> = OnceCell::new();
    let re = RE_ENTITY.get_or_init(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]*);").unwrap());
    re.replace_all(s, |caps: &Captures| {
        let whole = &caps[0];
        match &caps[1] {
            "amp" | "lt" | "gt" | "quot" | "apos" => whole.to_string(),
            name => {
                let decoded = html_escape::decode_html_entities(whole);
                if decoded == whole {
                    format!("&amp;{name};")
                } else {
                    html_escape::encode_text(&decoded).into_owned()
                }
            }
        }
    })
    .into_owned()
}
