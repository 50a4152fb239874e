use quickglyph_core::usage_store::{
    MemoryUsagePersistence, UsageMap, UsagePersistence, UsageRecord, UsageStore,
    MAX_USAGE_RECORDS,
};

fn record(count: u32, last_used_epoch_secs: f64) -> UsageRecord {
    UsageRecord {
        count,
        last_used_epoch_secs,
    }
}

#[test]
fn size_never_exceeds_cap_with_distinct_ids() {
    let mut store = UsageStore::new();
    for i in 0..100 {
        store.record_use_at(&format!("item-{i}"), i as f64);
        assert!(store.len() <= MAX_USAGE_RECORDS);
    }
    assert_eq!(store.len(), MAX_USAGE_RECORDS);
}

#[test]
fn repeated_use_increments_count_and_refreshes_timestamp() {
    let mut store = UsageStore::new();
    store.record_use_at("heart", 10.0);
    store.record_use_at("heart", 25.0);

    assert_eq!(store.get("heart"), Some(&record(2, 25.0)));
    assert_eq!(store.len(), 1);
}

#[test]
fn eviction_removes_lowest_count_then_oldest() {
    let mut store = UsageStore::new();
    for i in 0..MAX_USAGE_RECORDS {
        let id = format!("item-{i}");
        store.record_use_at(&id, 100.0 + i as f64);
        store.record_use_at(&id, 200.0 + i as f64);
    }
    // Two single-use records; the older one must go.
    store.record_use_at("item-0", 300.0);
    store.remove("item-1");
    store.remove("item-2");
    store.record_use_at("single-old", 400.0);
    store.record_use_at("single-new", 500.0);
    assert_eq!(store.len(), MAX_USAGE_RECORDS);

    let evicted = store.record_use_at("newcomer", 600.0);

    assert_eq!(evicted, vec!["single-old".to_string()]);
    assert!(store.contains("single-new"));
    assert!(store.contains("newcomer"));
    assert_eq!(store.len(), MAX_USAGE_RECORDS);
}

#[test]
fn existing_id_never_triggers_eviction() {
    let mut store = UsageStore::new();
    for i in 0..MAX_USAGE_RECORDS {
        store.record_use_at(&format!("item-{i}"), i as f64);
    }
    let evicted = store.record_use_at("item-0", 99.0);
    assert!(evicted.is_empty());
    assert_eq!(store.len(), MAX_USAGE_RECORDS);
}

#[test]
fn ordered_sorts_by_count_then_recency() {
    let mut store = UsageStore::new();
    store.record_use_at("rare", 50.0);
    store.record_use_at("often", 1.0);
    store.record_use_at("often", 2.0);
    store.record_use_at("often", 3.0);
    store.record_use_at("recent", 40.0);
    store.record_use_at("recent", 60.0);
    store.record_use_at("stale", 10.0);
    store.record_use_at("stale", 20.0);

    assert_eq!(store.ordered(), vec!["often", "recent", "stale", "rare"]);
}

#[test]
fn remove_of_absent_id_is_noop() {
    let persistence = MemoryUsagePersistence::default();
    let mut store = UsageStore::load(Box::new(persistence.clone()));
    assert!(!store.remove("ghost"));
    assert_eq!(persistence.save_count(), 0);
}

#[test]
fn every_mutation_writes_through() {
    let persistence = MemoryUsagePersistence::default();
    let mut store = UsageStore::load(Box::new(persistence.clone()));

    store.record_use_at("a", 1.0);
    store.record_use_at("a", 2.0);
    store.record_use_at("b", 3.0);
    store.remove("a");

    assert_eq!(persistence.save_count(), 4);
    let saved = persistence.snapshot();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved.get("b"), Some(&record(1, 3.0)));
}

#[test]
fn failed_save_keeps_in_memory_mutation() {
    let persistence = MemoryUsagePersistence::default();
    let mut store = UsageStore::load(Box::new(persistence.clone()));
    persistence.set_failing(true);

    store.record_use_at("kept", 5.0);

    assert_eq!(store.get("kept"), Some(&record(1, 5.0)));
    assert!(persistence.snapshot().is_empty());
}

#[test]
fn failed_load_starts_empty_and_still_saves() {
    let persistence = MemoryUsagePersistence::default();
    persistence.set_failing(true);
    let mut store = UsageStore::load(Box::new(persistence.clone()));
    assert!(store.is_empty());

    persistence.set_failing(false);
    store.record_use_at("later", 1.0);
    assert_eq!(persistence.save_count(), 1);
}

#[test]
fn load_trims_oversized_persisted_history() {
    let mut records = UsageMap::new();
    for i in 0..30u32 {
        records.insert(format!("item-{i}"), record(i + 1, f64::from(i)));
    }
    let persistence = MemoryUsagePersistence::with_records(records);

    let store = UsageStore::load(Box::new(persistence.clone()));

    assert_eq!(store.len(), MAX_USAGE_RECORDS);
    assert!(!store.contains("item-9"));
    assert!(store.contains("item-10"));
    assert_eq!(persistence.load().unwrap().len(), 30);
}
