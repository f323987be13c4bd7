// tests/providers_rss.rs
use axum::{http::HeaderMap, http::StatusCode, routing::get, Router};
use news_notifier::ingest::config::FeedSpec;
use news_notifier::ingest::providers::rss::RssProvider;
use news_notifier::ingest::rss_item_id;
use news_notifier::SourceProvider;

const FT_XML: &str = include_str!("fixtures/ft_home_rss.xml");
const NYT_XML: &str = include_str!("fixtures/nyt_business_rss.xml");

#[tokio::test]
async fn fixture_parses_newest_first() {
    let provider = RssProvider::from_fixture("FT Home", FT_XML);
    let items = provider.fetch_latest().await.expect("ft parse ok");

    assert_eq!(items.len(), 3, "linkless entry should be dropped");
    assert!(items.iter().all(|i| i.source == "FT Home"));
    assert!(items.iter().all(|i| i.id.starts_with("rss:ft-home:")));

    assert_eq!(items[0].title, "Central banks signal slower pace of cuts");
    assert_eq!(
        items[0].description.as_deref(),
        Some("Policymakers in Frankfurt & Washington strike a cautious tone.")
    );
    assert_eq!(items[1].title, "Oil steadies after OPEC\u{2019}s output decision");
    assert_eq!(items[1].description.as_deref(), Some("Brent crude holds near $80."));
    assert_eq!(items[2].id, rss_item_id("FT Home", "https://www.ft.com/content/0003"));

    let ts: Vec<_> = items.iter().map(|i| i.published_at.unwrap()).collect();
    assert!(ts[0] > ts[1] && ts[1] > ts[2]);
}

#[tokio::test]
async fn item_level_atom_links_and_html_entities_parse() {
    let provider = RssProvider::from_fixture("NYT Business", NYT_XML);
    let items = provider.fetch_latest().await.expect("nyt parse ok");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Café Chains Bet on £2 Coffee as Prices Climb");
    assert_eq!(
        items[0].url,
        "https://www.nytimes.com/2026/10/15/business/cafe-prices.html"
    );
    assert!(items[0].id.starts_with("rss:nyt-business:"));
    assert_eq!(items[1].title, "Regulators Weigh New Rules for Bank Capital");
    assert_eq!(
        items[1].published_at.map(|t| t.timestamp()),
        Some(1_792_015_800)
    );
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn http_fetch_sends_user_agent_and_parses() {
    let app = Router::new()
        .route(
            "/feed.xml",
            get(|headers: HeaderMap| async move {
                let ua = headers
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                if ua == "NewsNotifier/1.0" {
                    (StatusCode::OK, FT_XML.to_string())
                } else {
                    (StatusCode::FORBIDDEN, format!("bad agent {ua}"))
                }
            }),
        )
        .route("/gone.xml", get(|| async { StatusCode::NOT_FOUND }));
    let base = serve(app).await;

    let ok = RssProvider::from_url(&FeedSpec::new("FT Home", &format!("{base}/feed.xml")), 2)
        .unwrap();
    let items = ok.fetch_latest().await.unwrap();
    assert_eq!(items.len(), 2);

    let gone = RssProvider::from_url(&FeedSpec::new("Gone", &format!("{base}/gone.xml")), 15)
        .unwrap();
    assert!(gone.fetch_latest().await.is_err());
}
