use crate::model::{EntryKind, ScoredEntry};

/// Icon references handed out when a bookmark has no cached favicon, or for
/// history entries (which never carry one). Opaque to the core; the launcher
/// host maps them to real artwork.
pub const DEFAULT_BOOKMARK_ICON: &str = "builtin:bookmark";
pub const DEFAULT_HISTORY_ICON: &str = "builtin:history";

/// Result shape consumed by the launcher host. `action_id` is the entry id;
/// handing it back through `activate` resolves the entry against whatever
/// index context is current at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub title: String,
    pub subtitle: String,
    pub icon_ref: String,
    pub action_id: String,
}

pub fn present(scored: &ScoredEntry) -> ResultRow {
    let entry = &scored.entry;
    let icon_ref = entry.icon_ref.clone().unwrap_or_else(|| {
        match entry.kind {
            EntryKind::Bookmark => DEFAULT_BOOKMARK_ICON,
            EntryKind::History => DEFAULT_HISTORY_ICON,
        }
        .to_string()
    });

    ResultRow {
        title: entry.title.clone(),
        subtitle: entry.url.clone(),
        icon_ref,
        action_id: entry.id.clone(),
    }
}

pub fn present_all(scored: &[ScoredEntry]) -> Vec<ResultRow> {
    scored.iter().map(present).collect()
}
