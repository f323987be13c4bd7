// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "NOTIFIER_FEEDS_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedSpec {
    pub name: String,
    pub url: String,
}

impl FeedSpec {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Built-in feeds used when no feed file is configured.
pub fn default_feeds() -> Vec<FeedSpec> {
    [
        ("WSJ Markets", "https://feeds.content.dowjones.io/public/rss/RSSMarketsMain"),
        ("WSJ Economy", "https://feeds.content.dowjones.io/public/rss/socialeconomyfeed"),
        ("WSJ US Business", "https://feeds.content.dowjones.io/public/rss/WSJcomUSBusiness"),
        ("NYT Business", "https://rss.nytimes.com/services/xml/rss/nyt/Business.xml"),
        ("NYT World", "https://rss.nytimes.com/services/xml/rss/nyt/World.xml"),
        ("NYT Technology", "https://rss.nytimes.com/services/xml/rss/nyt/Technology.xml"),
        ("FT Home", "https://www.ft.com/rss/home"),
        ("FT World", "https://www.ft.com/world?format=rss"),
        ("FT Global Economy", "https://www.ft.com/global-economy?format=rss"),
    ]
    .into_iter()
    .map(|(name, url)| FeedSpec::new(name, url))
    .collect()
}

/// Load a feed list from an explicit path. Supports TOML or JSON formats.
pub fn load_feeds_from(path: &Path) -> Result<Vec<FeedSpec>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed list from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_feeds(&content, ext.as_str())
        .with_context(|| format!("parsing feed list {}", path.display()))
}

/// Load the feed list using env var + fallbacks:
/// 1) $NOTIFIER_FEEDS_PATH
/// 2) config/feeds.toml
/// 3) config/feeds.json
/// 4) built-in defaults
pub fn load_feeds_default() -> Result<Vec<FeedSpec>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feeds_from(&pb);
        } else {
            return Err(anyhow!("{ENV_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/feeds.toml");
    if toml_p.exists() {
        return load_feeds_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feeds.json");
    if json_p.exists() {
        return load_feeds_from(&json_p);
    }
    Ok(default_feeds())
}

fn parse_feeds(s: &str, hint_ext: &str) -> Result<Vec<FeedSpec>> {
    let try_toml = hint_ext == "toml" || s.contains("[[feeds]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feed list format"))
}

fn parse_toml(s: &str) -> Result<Vec<FeedSpec>> {
    #[derive(Deserialize)]
    struct TomlFeeds {
        feeds: Vec<FeedSpec>,
    }
    let v: TomlFeeds = toml::from_str(s)?;
    Ok(clean_list(v.feeds))
}

fn parse_json(s: &str) -> Result<Vec<FeedSpec>> {
    let v: Vec<FeedSpec> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

// Trim, drop blanks, first entry wins on duplicate names.
fn clean_list(items: Vec<FeedSpec>) -> Vec<FeedSpec> {
    let mut out: Vec<FeedSpec> = Vec::with_capacity(items.len());
    for it in items {
        let name = it.name.trim();
        let url = it.url.trim();
        if name.is_empty() || url.is_empty() {
            continue;
        }
        if out.iter().any(|f| f.name == name) {
            continue;
        }
        out.push(FeedSpec::new(name, url));
    }
    out
}
