use std::time::Instant;

use crate::model::Item;
use crate::ranking::rank;
use crate::usage_store::UsageStore;

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

#[test]
fn warm_rank_p95_under_150ms() {
    let mut items: Vec<Item> = (0..2_000)
        .map(|i| {
            Item::from_owned(
                format!("symbol_{i:04}"),
                "•".to_string(),
                vec![format!("keyword{i}"), "shape".to_string(), "misc".to_string()],
            )
        })
        .collect();
    items.push(Item::new("smiling_face", "☺", &["face", "smile", "happy"]));

    let mut usages = UsageStore::new();
    for i in 0..20 {
        usages.record_use_at(&format!("symbol_{i:04}"), i as f64);
    }

    for _ in 0..10 {
        let _ = rank(&items, "smlfc", &usages);
    }

    let mut batch_p95 = Vec::with_capacity(5);
    for _ in 0..5 {
        let mut samples = Vec::with_capacity(30);
        for _ in 0..30 {
            let start = Instant::now();
            let ranked = rank(&items, "smlfc", &usages);
            samples.push(start.elapsed().as_secs_f64() * 1000.0);
            assert_eq!(ranked[0].id, "smiling_face");
        }
        batch_p95.push(p95_ms(&mut samples));
    }

    batch_p95.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median_p95 = batch_p95[batch_p95.len() / 2];

    assert!(
        median_p95 <= 150.0,
        "median batch p95 too high: {median_p95:.3}ms (budget 150.0ms); batches={batch_p95:?}",
    );
}
