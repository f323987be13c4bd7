use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::Notifier;
use crate::ingest::types::Item;

const EMBED_COLOR: u32 = 3_447_003;
const SNIPPET_CHARS: usize = 200;

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
}

impl DiscordNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, item: &Item) -> Result<()> {
        let payload = DiscordWebhookPayload::for_item(item);

        let rsp = self
            .client
            .post(&self.webhook)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .context("Discord webhook request failed")?;

        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            let body: String = body.chars().take(200).collect();
            return Err(anyhow!("Discord webhook returned {status}: {body}"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DiscordEmbed {
    pub title: String,
    pub url: String,
    pub description: String,
    pub color: u32,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DiscordWebhookPayload {
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    /// `[source] title\nlink`, plus an embed when the item has a description.
    pub fn for_item(item: &Item) -> Self {
        let headline = if item.source.is_empty() {
            item.title.clone()
        } else {
            format!("[{}] {}", item.source, item.title)
        };
        let content = format!("{headline}\n{}", item.url);

        let embeds = match item.description.as_deref() {
            Some(desc) if !desc.is_empty() => vec![DiscordEmbed {
                title: headline,
                url: item.url.clone(),
                description: snippet(desc),
                color: EMBED_COLOR,
            }],
            _ => Vec::new(),
        };

        Self { content, embeds }
    }
}

fn snippet(desc: &str) -> String {
    if desc.chars().count() > SNIPPET_CHARS {
        let mut s: String = desc.chars().take(SNIPPET_CHARS).collect();
        s.push('…');
        s
    } else {
        desc.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(description: Option<&str>) -> Item {
        Item {
            id: "te:1".into(),
            title: "Dow closes higher".into(),
            url: "https://tradingeconomics.com/united-states/stock-market".into(),
            source: "TradingEconomics".into(),
            published_at: None,
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn content_has_source_title_and_link() {
        let p = DiscordWebhookPayload::for_item(&item(None));
        assert_eq!(
            p.content,
            "[TradingEconomics] Dow closes higher\nhttps://tradingeconomics.com/united-states/stock-market"
        );
        assert!(p.embeds.is_empty());
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("embeds").is_none());
    }

    #[test]
    fn embed_snippet_is_truncated() {
        let long = "x".repeat(250);
        let p = DiscordWebhookPayload::for_item(&item(Some(&long)));
        let e = &p.embeds[0];
        assert_eq!(e.title, "[TradingEconomics] Dow closes higher");
        assert_eq!(e.color, 3447003);
        assert_eq!(e.description.chars().count(), 201);
        assert!(e.description.ends_with('…'));

        let p = DiscordWebhookPayload::for_item(&item(Some("short")));
        assert_eq!(p.embeds[0].description, "short");
    }
}
