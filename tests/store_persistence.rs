// tests/store_persistence.rs
use news_notifier::SeenStore;
use std::fs;

#[test]
fn missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = SeenStore::load(dir.path().join("nope/seen_ids.json"), 1000);
    assert!(store.is_empty());
}

#[test]
fn malformed_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    for (i, junk) in ["{not json", "", r#"{"other": 1}"#, "42"].iter().enumerate() {
        let p = dir.path().join(format!("bad{i}.json"));
        fs::write(&p, junk).unwrap();
        let store = SeenStore::load(&p, 1000);
        assert!(store.is_empty(), "{junk:?} should load as empty");
    }
}

#[test]
fn save_then_load_keeps_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("state/seen_ids.json");

    let mut store = SeenStore::load(&p, 1000);
    for id in ["te:1", "rss:ft-home:aa", "te:2"] {
        store.mark_seen(id);
    }
    store.save().unwrap();

    // parent dir created, no temp file left behind
    assert!(p.exists());
    assert!(!dir.path().join("state/seen_ids.json.tmp").exists());

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&p).unwrap()).unwrap();
    assert_eq!(raw, serde_json::json!({"ids": ["te:1", "rss:ft-home:aa", "te:2"]}));

    let again = SeenStore::load(&p, 1000);
    assert_eq!(
        again.ids().collect::<Vec<_>>(),
        vec!["te:1", "rss:ft-home:aa", "te:2"]
    );
    assert!(again.is_seen("te:2"));
}

#[test]
fn cap_holds_after_many_insertions_and_keeps_newest() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("seen_ids.json");

    let mut store = SeenStore::load(&p, 100);
    for i in 0..1_000 {
        store.mark_seen(format!("te:{i}"));
        assert!(store.len() <= 100);
    }
    store.save().unwrap();

    let again = SeenStore::load(&p, 100);
    assert_eq!(again.len(), 100);
    assert!(again.is_seen("te:999"));
    assert!(again.is_seen("te:900"));
    assert!(!again.is_seen("te:899"));
    assert_eq!(again.ids().next(), Some("te:900"));
}

#[test]
fn oversized_file_is_truncated_to_newest_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("seen_ids.json");
    fs::write(&p, r#"{"ids": ["a:1", "a:2", "a:3", "a:4", "a:5"]}"#).unwrap();

    let store = SeenStore::load(&p, 3);
    assert_eq!(store.ids().collect::<Vec<_>>(), vec!["a:3", "a:4", "a:5"]);
}

#[test]
fn legacy_bare_array_is_migrated() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("seen_ids.json");
    fs::write(&p, r#"["12345", 678, "rss:nyt-world:ff", "12345", ""]"#).unwrap();

    let store = SeenStore::load(&p, 1000);
    assert_eq!(
        store.ids().collect::<Vec<_>>(),
        vec!["te:12345", "te:678", "rss:nyt-world:ff"]
    );
}

#[test]
fn save_into_unwritable_location_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the parent directory should be.
    let blocker = dir.path().join("state");
    fs::write(&blocker, "file, not dir").unwrap();

    let mut store = SeenStore::new(blocker.join("seen_ids.json"), 10);
    store.mark_seen("te:1");
    assert!(store.save().is_err());
}
