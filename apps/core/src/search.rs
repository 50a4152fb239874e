use crate::model::Item;

pub const DEFAULT_EXACT_WEIGHT: i64 = 1_000;

const SUBSTRING_BASE: i64 = 10_000;
const SUBSEQUENCE_BASE: i64 = 5_000;

/// Result of matching one query against one term.
///
/// Ordering compares the `exact` flag first, so an exact match outranks every
/// partial match no matter how large the partial value grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchScore {
    exact: bool,
    value: i64,
}

impl MatchScore {
    pub fn is_exact(&self) -> bool {
        self.exact
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

/// Scores `query` against `term`, ignoring case. `None` means the query is not a
/// subsequence of the term.
pub fn score(query: &str, term: &str, exact_weight: i64) -> Option<MatchScore> {
    score_normalized(&query.to_lowercase(), &term.to_lowercase(), exact_weight)
}

/// Best score of an already-normalized needle over the item's id and keywords.
pub fn best_match(item: &Item, needle: &str, exact_weight: i64) -> Option<MatchScore> {
    item.normalized_terms()
        .iter()
        .filter_map(|term| score_normalized(needle, term, exact_weight))
        .max()
}

fn score_normalized(query: &str, term: &str, exact_weight: i64) -> Option<MatchScore> {
    if query.is_empty() {
        return Some(MatchScore {
            exact: false,
            value: 0,
        });
    }
    if term.is_empty() {
        return None;
    }

    let query_len = query.chars().count() as i64;
    let term_len = term.chars().count() as i64;
    if query_len > term_len {
        return None;
    }

    if query == term {
        return Some(MatchScore {
            exact: true,
            value: exact_weight.saturating_add(SUBSTRING_BASE + 400 + query_len * 40),
        });
    }

    if let Some(value) = score_substring(term, query, query_len, term_len) {
        return Some(MatchScore {
            exact: false,
            value,
        });
    }

    score_subsequence(term, query, query_len, term_len).map(|value| MatchScore {
        exact: false,
        value,
    })
}

fn score_substring(term: &str, query: &str, query_len: i64, term_len: i64) -> Option<i64> {
    term.match_indices(query)
        .map(|(byte_offset, _)| {
            let position = term[..byte_offset].chars().count() as i64;
            let start_bonus = start_bonus(term[..byte_offset].chars().next_back(), 400, 200);
            SUBSTRING_BASE + start_bonus + query_len * 40 - position - (term_len - query_len)
        })
        .max()
}

fn score_subsequence(term: &str, query: &str, query_len: i64, term_len: i64) -> Option<i64> {
    let haystack: Vec<char> = term.chars().collect();
    let needle: Vec<char> = query.chars().collect();
    let first = needle[0];

    let mut best = None;
    for start in 0..haystack.len() {
        if haystack[start] != first {
            continue;
        }

        // A greedy walk that fails from this start fails from every later start.
        let Some(positions) = subsequence_positions(&haystack[start..], &needle) else {
            break;
        };
        let gap_penalty: i64 = positions
            .windows(2)
            .map(|pair| (pair[1] - pair[0] - 1) as i64)
            .sum();
        let previous = start.checked_sub(1).map(|index| haystack[index]);
        let value = SUBSEQUENCE_BASE + start_bonus(previous, 200, 100) + query_len * 30
            - gap_penalty * 6
            - start as i64
            - (term_len - query_len);

        best = Some(best.map_or(value, |current: i64| current.max(value)));
    }

    best
}

fn start_bonus(previous: Option<char>, prefix: i64, boundary: i64) -> i64 {
    match previous {
        None => prefix,
        Some(c) if !c.is_alphanumeric() => boundary,
        Some(_) => 0,
    }
}

fn subsequence_positions(haystack: &[char], needle: &[char]) -> Option<Vec<usize>> {
    let mut positions = Vec::with_capacity(needle.len());
    let mut next_start = 0;

    for needle_char in needle {
        let offset = haystack[next_start..]
            .iter()
            .position(|hay_char| hay_char == needle_char)?;
        let absolute = next_start + offset;
        positions.push(absolute);
        next_start = absolute + 1;
    }

    Some(positions)
}
