use std::time::{SystemTime, UNIX_EPOCH};

use quickglyph_core::index_store::{self, SqliteUsagePersistence};
use quickglyph_core::usage_store::{UsageMap, UsagePersistence, UsageRecord, UsageStore};

fn unique_db_path(label: &str) -> std::path::PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir()
        .join("quickglyph")
        .join(format!("{label}-{unique}.sqlite3"))
}

#[test]
fn saves_and_reads_usage_records() {
    let db = index_store::open_memory().unwrap();
    let mut records = UsageMap::new();
    records.insert(
        "rocket".to_string(),
        UsageRecord {
            count: 3,
            last_used_epoch_secs: 1_700_000_000.25,
        },
    );

    index_store::save_usages(&db, &records).unwrap();
    let got = index_store::get_usage(&db, "rocket").unwrap().unwrap();

    assert_eq!(got.count, 3);
    assert_eq!(got.last_used_epoch_secs, 1_700_000_000.25);
    assert!(index_store::get_usage(&db, "missing").unwrap().is_none());
}

#[test]
fn save_replaces_previous_contents() {
    let db = index_store::open_memory().unwrap();
    let mut records = UsageMap::new();
    records.insert(
        "old".to_string(),
        UsageRecord {
            count: 1,
            last_used_epoch_secs: 1.0,
        },
    );
    index_store::save_usages(&db, &records).unwrap();

    records.clear();
    records.insert(
        "new".to_string(),
        UsageRecord {
            count: 2,
            last_used_epoch_secs: 2.0,
        },
    );
    index_store::save_usages(&db, &records).unwrap();

    let loaded = index_store::load_usages(&db).unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded.contains_key("new"));
}

#[test]
fn skips_rows_with_non_positive_count() {
    let db = index_store::open_memory().unwrap();
    db.execute(
        "INSERT INTO usage (id, count, last_used_epoch_secs) VALUES ('bad', 0, 1.0), ('good', 4, 2.0)",
        [],
    )
    .unwrap();

    let loaded = index_store::load_usages(&db).unwrap();

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded["good"].count, 4);
}

#[test]
fn persists_usage_across_reopen() {
    let db_path = unique_db_path("persist-test");

    {
        let persistence = SqliteUsagePersistence::open(&db_path).unwrap();
        let mut store = UsageStore::load(Box::new(persistence));
        store.record_use_at("sparkles", 1_800_000_000.0);
        store.record_use_at("sparkles", 1_800_000_050.0);
    }

    let reopened = SqliteUsagePersistence::open(&db_path).unwrap();
    let loaded = reopened.load().unwrap();

    assert_eq!(loaded["sparkles"].count, 2);
    assert_eq!(loaded["sparkles"].last_used_epoch_secs, 1_800_000_050.0);

    drop(reopened);
    std::fs::remove_file(&db_path).unwrap();
}

#[test]
fn opens_store_from_config_path() {
    let mut cfg = quickglyph_core::config::Config::default();
    cfg.usage_path = unique_db_path("cfg-open");

    let db = index_store::open_from_config(&cfg).unwrap();
    assert!(index_store::load_usages(&db).unwrap().is_empty());

    drop(db);
    std::fs::remove_file(&cfg.usage_path).unwrap();
}
