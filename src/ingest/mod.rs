// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use crate::ingest::types::{Item, SourceProvider};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up once a recorder is installed).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "notifier_items_fetched_total",
            "Items parsed from providers."
        );
        describe_counter!(
            "notifier_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_counter!("notifier_posted_total", "Webhook notifications delivered.");
        describe_counter!(
            "notifier_post_errors_total",
            "Webhook notifications that failed."
        );
        describe_counter!(
            "notifier_state_save_errors_total",
            "Failed writes of the seen-id state file."
        );
        describe_histogram!("notifier_parse_ms", "Provider parse time in milliseconds.");
        describe_gauge!(
            "notifier_last_cycle_ts",
            "Unix ts when the notify cycle last completed."
        );
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// "WSJ Markets" -> "wsj-markets"
pub fn source_slug(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

/// Stable id for an RSS entry: `rss:<slug>:<md5 hex of link>`.
/// Existing state files hold ids in this form, so the digest must not change.
pub fn rss_item_id(source: &str, link: &str) -> String {
    format!("rss:{}:{:x}", source_slug(source), md5::compute(link.as_bytes()))
}

/// Fetch from every provider in order. A failing provider is logged and
/// contributes nothing; the rest still run.
///
/// Returns one list per provider, each in the provider's own order.
pub async fn collect(providers: &[Box<dyn SourceProvider>]) -> Vec<Vec<Item>> {
    ensure_metrics_described();

    let mut out = Vec::with_capacity(providers.len());
    for p in providers {
        match p.fetch_latest().await {
            Ok(v) => {
                tracing::debug!(provider = p.name(), items = v.len(), "provider fetched");
                counter!("notifier_items_fetched_total").increment(v.len() as u64);
                out.push(v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "provider error");
                counter!("notifier_provider_errors_total").increment(1);
                out.push(Vec::new());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_strips_tags_and_ws() {
        let s = "  <p>Stocks&nbsp;&nbsp;rally</p>\n<b>again</b>  ";
        assert_eq!(normalize_text(s), "Stocks rally again");
    }

    #[test]
    fn slug_lowercases_and_dashes() {
        assert_eq!(source_slug("WSJ Markets"), "wsj-markets");
        assert_eq!(source_slug("FT Global Economy"), "ft-global-economy");
    }

    #[test]
    fn rss_id_is_stable_and_scoped_by_source() {
        let a = rss_item_id("FT Home", "https://ft.com/a");
        assert_eq!(a, rss_item_id("FT Home", "https://ft.com/a"));
        assert!(a.starts_with("rss:ft-home:"));
        assert_eq!(a.len(), "rss:ft-home:".len() + 32);
        assert_ne!(a, rss_item_id("FT World", "https://ft.com/a"));
        assert_ne!(a, rss_item_id("FT Home", "https://ft.com/b"));
    }

    #[test]
    fn rss_id_matches_ids_already_on_disk() {
        assert_eq!(
            rss_item_id("FT Home", "https://www.ft.com/content/0001"),
            "rss:ft-home:83a0b5fa6276e7ee91ebcda99bdea902"
        );
    }
}
