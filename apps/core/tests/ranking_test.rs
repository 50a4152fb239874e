use quickglyph_core::model::Item;
use quickglyph_core::ranking::rank;
use quickglyph_core::usage_store::UsageStore;

fn ids(ranked: &[&Item]) -> Vec<String> {
    ranked.iter().map(|item| item.id.clone()).collect()
}

#[test]
fn empty_query_puts_used_items_first_by_usage() {
    let items = vec![
        Item::new("c", "©", &[]),
        Item::new("a", "🅰", &[]),
        Item::new("b", "🅱", &[]),
    ];
    let mut usages = UsageStore::new();
    usages.record_use_at("b", 50.0);
    usages.record_use_at("a", 1.0);
    usages.record_use_at("a", 2.0);
    usages.record_use_at("a", 3.0);

    assert_eq!(ids(&rank(&items, "", &usages)), vec!["a", "b", "c"]);
}

#[test]
fn empty_query_breaks_count_ties_by_recency_and_keeps_unused_in_library_order() {
    let items = vec![
        Item::new("z", "z", &[]),
        Item::new("old", "o", &[]),
        Item::new("y", "y", &[]),
        Item::new("new", "n", &[]),
        Item::new("x", "x", &[]),
    ];
    let mut usages = UsageStore::new();
    usages.record_use_at("old", 10.0);
    usages.record_use_at("new", 20.0);

    assert_eq!(
        ids(&rank(&items, "", &usages)),
        vec!["new", "old", "z", "y", "x"]
    );
}

#[test]
fn query_partitions_used_first_but_keeps_match_order_inside_groups() {
    let items = vec![
        Item::new("heart", "❤️", &[]),
        Item::new("heart_eyes", "😍", &[]),
        Item::new("broken_heart", "💔", &[]),
        Item::new("hearth", "🔥", &[]),
    ];
    let mut usages = UsageStore::new();
    // broken_heart is used far more often, but within the used group match
    // quality still decides.
    for t in 0..5 {
        usages.record_use_at("broken_heart", f64::from(t));
    }
    usages.record_use_at("heart_eyes", 100.0);

    assert_eq!(
        ids(&rank(&items, "heart", &usages)),
        vec!["heart_eyes", "broken_heart", "heart", "hearth"]
    );
}

#[test]
fn equal_scores_keep_library_order() {
    let items = vec![
        Item::new("dog", "🐶", &["pet"]),
        Item::new("cat", "🐱", &["pet"]),
        Item::new("fish", "🐟", &["pet"]),
    ];
    assert_eq!(
        ids(&rank(&items, "pet", &UsageStore::new())),
        vec!["dog", "cat", "fish"]
    );
}

#[test]
fn rank_is_idempotent_and_does_not_mutate_inputs() {
    let items = vec![
        Item::new("sun", "☀️", &["weather"]),
        Item::new("rainbow", "🌈", &["weather"]),
        Item::new("umbrella", "☂️", &["rain"]),
    ];
    let mut usages = UsageStore::new();
    usages.record_use_at("umbrella", 3.0);
    let version = usages.version();

    let first = ids(&rank(&items, "rain", &usages));
    let second = ids(&rank(&items, "rain", &usages));

    assert_eq!(first, second);
    assert_eq!(first, vec!["umbrella", "rainbow"]);
    assert_eq!(usages.version(), version);
}

#[test]
fn query_without_matches_yields_empty_list() {
    let items = vec![Item::new("sun", "☀️", &["weather"])];
    assert!(rank(&items, "qqq", &UsageStore::new()).is_empty());
}
