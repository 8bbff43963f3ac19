/// Origin of a merged entry. An entry present in both sources is a Bookmark;
/// frequency accumulates for it either way because the id is URL-derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Bookmark,
    History,
}

/// Unified searchable unit built by the merger and served by the query engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    pub title: String,
    pub url: String,
    pub kind: EntryKind,
    pub icon_ref: Option<String>,
    pub last_visited_epoch_secs: Option<i64>,
    normalized_title: String,
    normalized_url: String,
}

impl Entry {
    pub fn bookmark(
        url: String,
        title: Option<String>,
        icon_ref: Option<String>,
        last_visited_epoch_secs: Option<i64>,
    ) -> Self {
        Self::build(EntryKind::Bookmark, url, title, icon_ref, last_visited_epoch_secs)
    }

    pub fn history(
        url: String,
        title: Option<String>,
        last_visited_epoch_secs: Option<i64>,
    ) -> Self {
        Self::build(EntryKind::History, url, title, None, last_visited_epoch_secs)
    }

    fn build(
        kind: EntryKind,
        url: String,
        title: Option<String>,
        icon_ref: Option<String>,
        last_visited_epoch_secs: Option<i64>,
    ) -> Self {
        let id = entry_id(&url);
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| url.clone());
        let normalized_title = normalize_for_match(&title);
        let normalized_url = normalize_for_match(&url);
        Self {
            id,
            title,
            url,
            kind,
            icon_ref,
            last_visited_epoch_secs,
            normalized_title,
            normalized_url,
        }
    }

    /// True when the source gave no usable title and the URL stands in.
    pub fn title_is_fallback(&self) -> bool {
        self.title == self.url
    }

    pub fn retitle(&mut self, title: String) {
        self.normalized_title = normalize_for_match(&title);
        self.title = title;
    }

    pub fn matches(&self, normalized_query: &str) -> bool {
        self.normalized_title.contains(normalized_query)
            || self.normalized_url.contains(normalized_query)
    }

    pub fn normalized_title(&self) -> &str {
        &self.normalized_title
    }
}

/// An entry paired with the frequency score the query engine ranked it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredEntry {
    pub entry: Entry,
    pub score: u64,
}

/// Stable identifier for an entry. Derived from the URL so bookmark and
/// history rows for the same address collapse to one id, and so activation
/// counts survive index rebuilds.
pub fn entry_id(url: &str) -> String {
    url.trim().to_string()
}

pub fn normalize_for_match(input: &str) -> String {
    input.to_lowercase()
}
