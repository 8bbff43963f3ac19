use std::collections::HashMap;

use crate::model::{normalize_for_match, Entry, ScoredEntry};

/// Ranks `entries` against `query` using the frequency snapshot in `ranking`.
///
/// An entry matches when the query is a case-insensitive substring of its
/// title or URL; the empty query matches everything (the launcher's default
/// list). Score is the raw activation count. Ties order by most recent visit,
/// then by merge-time insertion order, so results are fully deterministic.
///
/// Pure over its inputs: called once per keystroke, never mutates state.
pub fn search(
    entries: &[Entry],
    ranking: &HashMap<String, u64>,
    query: &str,
    limit: usize,
) -> Vec<ScoredEntry> {
    if limit == 0 || entries.is_empty() {
        return Vec::new();
    }

    let needle = normalize_for_match(query);

    let mut scored: Vec<(u64, Option<i64>, usize, &Entry)> = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| needle.is_empty() || entry.matches(&needle))
        .map(|(index, entry)| {
            let score = ranking.get(&entry.id).copied().unwrap_or(0);
            (score, entry.last_visited_epoch_secs, index, entry)
        })
        .collect();

    scored.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| b.1.cmp(&a.1))
            .then_with(|| a.2.cmp(&b.2))
    });

    scored
        .into_iter()
        .take(limit)
        .map(|(score, _, _, entry)| ScoredEntry {
            entry: entry.clone(),
            score,
        })
        .collect()
}
