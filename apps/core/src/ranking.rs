use crate::model::{normalize_for_search, Item};
use crate::search::{best_match, MatchScore, DEFAULT_EXACT_WEIGHT};
use crate::usage_store::{compare_usage, UsageStore};

pub fn rank<'a>(library: &'a [Item], query: &str, usages: &UsageStore) -> Vec<&'a Item> {
    rank_indices(library, query, usages, DEFAULT_EXACT_WEIGHT)
        .into_iter()
        .map(|index| &library[index])
        .collect()
}

/// Orders library positions for `query`.
///
/// A blank query lists used items by usage, then unused items in library order.
/// Otherwise non-matching items are dropped, the rest are sorted by match score
/// and then stably split into used items followed by unused ones. Usage does
/// not reorder items inside the used group for a non-blank query.
pub fn rank_indices(
    library: &[Item],
    query: &str,
    usages: &UsageStore,
    exact_weight: i64,
) -> Vec<usize> {
    let needle = normalize_for_search(query);
    if needle.is_empty() {
        return usage_order(library, usages);
    }

    let mut scored: Vec<(MatchScore, usize)> = library
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            best_match(item, &needle, exact_weight).map(|score| (score, index))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let (used, unused): (Vec<usize>, Vec<usize>) = scored
        .into_iter()
        .map(|(_, index)| index)
        .partition(|index| usages.contains(&library[*index].id));
    used.into_iter().chain(unused).collect()
}

fn usage_order(library: &[Item], usages: &UsageStore) -> Vec<usize> {
    let (mut used, unused): (Vec<usize>, Vec<usize>) =
        (0..library.len()).partition(|index| usages.contains(&library[*index].id));

    used.sort_by(|a, b| {
        match (usages.get(&library[*a].id), usages.get(&library[*b].id)) {
            (Some(left), Some(right)) => compare_usage(left, right),
            _ => std::cmp::Ordering::Equal,
        }
    });
    used.into_iter().chain(unused).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheEntry {
    query: String,
    usage_version: u64,
    indices: Vec<usize>,
}

/// Memoized ranking keyed by the query text and the usage store version.
#[derive(Debug, Default)]
pub struct RankedListCache {
    entry: Option<CacheEntry>,
}

impl RankedListCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fresh(&self, query: &str, usage_version: u64) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|entry| entry.query == query && entry.usage_version == usage_version)
    }

    pub fn get_or_compute(
        &mut self,
        library: &[Item],
        query: &str,
        usages: &UsageStore,
        exact_weight: i64,
    ) -> &[usize] {
        if !self.is_fresh(query, usages.version()) {
            self.entry = Some(CacheEntry {
                query: query.to_string(),
                usage_version: usages.version(),
                indices: rank_indices(library, query, usages, exact_weight),
            });
        }

        self.entry
            .as_ref()
            .map(|entry| entry.indices.as_slice())
            .unwrap_or(&[])
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
