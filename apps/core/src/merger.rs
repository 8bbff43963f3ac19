use std::collections::HashMap;

use crate::extractor::{BookmarkRow, HistoryRow};
use crate::model::{entry_id, Entry};

/// Resolves a places-side page hash to an opaque icon reference. The favicon
/// cache itself lives outside the core; hosts install their own resolver.
pub trait IconResolver: Send + Sync {
    fn icon_for(&self, url_hash: i64) -> Option<String>;
}

/// Default resolver: no icons. The presenter substitutes kind defaults.
pub struct NoIcons;

impl IconResolver for NoIcons {
    fn icon_for(&self, _url_hash: i64) -> Option<String> {
        None
    }
}

/// Collapses bookmark and history rows into one URL-deduplicated collection.
///
/// Bookmarks insert first and win kind, icon, and title on conflict. History
/// rows for an already-bookmarked URL add nothing observable (the URL-derived
/// id already pools activation counts across origins). Output order is
/// insertion order: all bookmarks, then first-seen history, stable within
/// each; the query engine relies on this for deterministic tie-breaking.
pub fn merge(
    bookmarks: &[BookmarkRow],
    history: &[HistoryRow],
    icons: &dyn IconResolver,
) -> Vec<Entry> {
    let mut entries: Vec<Entry> = Vec::with_capacity(bookmarks.len() + history.len());
    let mut by_id: HashMap<String, usize> = HashMap::new();
    // Timestamp of the title currently held by a history entry, so a later
    // visit's non-empty title wins over an earlier one.
    let mut title_seen_at: HashMap<String, i64> = HashMap::new();

    for row in bookmarks {
        let id = entry_id(&row.url);
        match by_id.get(&id) {
            Some(&index) => {
                let existing = &mut entries[index];
                if existing.title_is_fallback() {
                    if let Some(title) = non_empty(&row.title) {
                        existing.retitle(title);
                    }
                }
                if row.last_visited_epoch_secs > existing.last_visited_epoch_secs {
                    existing.last_visited_epoch_secs = row.last_visited_epoch_secs;
                }
            }
            None => {
                by_id.insert(id, entries.len());
                entries.push(Entry::bookmark(
                    row.url.clone(),
                    row.title.clone(),
                    icons.icon_for(row.url_hash),
                    row.last_visited_epoch_secs,
                ));
            }
        }
    }

    for row in history {
        let id = entry_id(&row.url);
        match by_id.get(&id) {
            Some(&index) => {
                let existing = &mut entries[index];
                if existing.kind == crate::model::EntryKind::Bookmark {
                    // Bookmark wins everything; the shared id already covers
                    // frequency accumulation from either origin.
                    continue;
                }
                let stamp = row.last_visited_epoch_secs.unwrap_or(0);
                if let Some(title) = non_empty(&row.title) {
                    let held = title_seen_at.get(&id).copied().unwrap_or(i64::MIN);
                    if existing.title_is_fallback() || stamp >= held {
                        existing.retitle(title);
                        title_seen_at.insert(id.clone(), stamp);
                    }
                }
                if row.last_visited_epoch_secs > existing.last_visited_epoch_secs {
                    existing.last_visited_epoch_secs = row.last_visited_epoch_secs;
                }
            }
            None => {
                if non_empty(&row.title).is_some() {
                    title_seen_at.insert(id.clone(), row.last_visited_epoch_secs.unwrap_or(0));
                }
                by_id.insert(id, entries.len());
                entries.push(Entry::history(
                    row.url.clone(),
                    row.title.clone(),
                    row.last_visited_epoch_secs,
                ));
            }
        }
    }

    entries
}

fn non_empty(title: &Option<String>) -> Option<String> {
    title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{merge, NoIcons};
    use crate::extractor::{BookmarkRow, HistoryRow};
    use crate::model::EntryKind;

    fn bookmark(url: &str, title: Option<&str>) -> BookmarkRow {
        BookmarkRow {
            url: url.to_string(),
            title: title.map(str::to_string),
            url_hash: 0,
            last_visited_epoch_secs: None,
        }
    }

    fn visit(url: &str, title: Option<&str>, at: Option<i64>) -> HistoryRow {
        HistoryRow {
            url: url.to_string(),
            title: title.map(str::to_string),
            last_visited_epoch_secs: at,
        }
    }

    #[test]
    fn same_url_in_both_sources_yields_one_bookmark_entry() {
        let bookmarks = vec![bookmark("https://a.com", Some("Alpha"))];
        let history = vec![visit("https://a.com", Some("Alpha later"), Some(10))];

        let merged = merge(&bookmarks, &history, &NoIcons);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].kind, EntryKind::Bookmark);
        assert_eq!(merged[0].title, "Alpha");
    }

    #[test]
    fn ids_are_unique_after_merge() {
        let bookmarks = vec![
            bookmark("https://a.com", Some("Alpha")),
            bookmark("https://a.com", Some("Alpha duplicate")),
        ];
        let history = vec![
            visit("https://a.com", None, Some(1)),
            visit("https://b.com", Some("Beta"), Some(2)),
            visit("https://b.com", Some("Beta again"), Some(3)),
        ];

        let merged = merge(&bookmarks, &history, &NoIcons);

        let mut ids: Vec<&str> = merged.iter().map(|e| e.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), merged.len());
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn bookmarks_precede_history_in_insertion_order() {
        let bookmarks = vec![bookmark("https://a.com", Some("Alpha"))];
        let history = vec![visit("https://b.com", Some("Beta"), None)];

        let merged = merge(&bookmarks, &history, &NoIcons);

        assert_eq!(merged[0].url, "https://a.com");
        assert_eq!(merged[1].url, "https://b.com");
    }

    #[test]
    fn most_recent_non_empty_history_title_wins() {
        let history = vec![
            visit("https://b.com", Some("Old name"), Some(100)),
            visit("https://b.com", Some("New name"), Some(200)),
            visit("https://b.com", None, Some(300)),
            visit("https://b.com", Some("Stale name"), Some(150)),
        ];

        let merged = merge(&[], &history, &NoIcons);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "New name");
        assert_eq!(merged[0].last_visited_epoch_secs, Some(300));
    }

    #[test]
    fn untitled_bookmark_displays_url() {
        let merged = merge(&[bookmark("https://a.com", None)], &[], &NoIcons);
        assert_eq!(merged[0].title, "https://a.com");
    }

    #[test]
    fn duplicate_bookmark_fills_missing_title() {
        let bookmarks = vec![
            bookmark("https://a.com", None),
            bookmark("https://a.com", Some("Named")),
        ];
        let merged = merge(&bookmarks, &[], &NoIcons);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "Named");
    }
}
