use std::fmt::{Display, Formatter};
use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::logging;

#[derive(Debug)]
pub enum ExtractError {
    SourceUnavailable(String),
}

impl Display for ExtractError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceUnavailable(detail) => write!(f, "source unavailable: {detail}"),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<rusqlite::Error> for ExtractError {
    fn from(value: rusqlite::Error) -> Self {
        Self::SourceUnavailable(value.to_string())
    }
}

/// One bookmark row from the places database, normalized at the extraction
/// boundary. `url_hash` is the places-side page hash the favicon cache is
/// keyed by; it never reaches the query engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkRow {
    pub url: String,
    pub title: Option<String>,
    pub url_hash: i64,
    pub last_visited_epoch_secs: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub url: String,
    pub title: Option<String>,
    pub last_visited_epoch_secs: Option<i64>,
}

/// Opens the places database read-only. The `immutable=1` URI flag lets us
/// read a file the browser still holds open without taking any lock.
pub fn open_places(path: &Path) -> Result<Connection, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::SourceUnavailable(format!(
            "places database not found at {}",
            path.display()
        )));
    }

    let uri = format!("file:{}?immutable=1", path.display());
    let conn = Connection::open_with_flags(
        uri,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
    )?;
    Ok(conn)
}

pub fn read_bookmarks(conn: &Connection) -> Result<Vec<BookmarkRow>, ExtractError> {
    let mut stmt = conn.prepare(
        "SELECT place.url, bookmark.title, place.url_hash,
                COALESCE(place.last_visit_date, bookmark.dateAdded)
         FROM moz_bookmarks bookmark
           JOIN moz_places place ON place.id = bookmark.fk
         WHERE bookmark.type = 1
           AND place.hidden = 0
           AND place.url IS NOT NULL
         ORDER BY bookmark.id",
    )?;

    let mut out = Vec::new();
    let mut skipped = 0_usize;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let url: Option<String> = row.get(0).ok().flatten();
        let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
            skipped += 1;
            continue;
        };
        out.push(BookmarkRow {
            url,
            title: row.get(1).ok().flatten(),
            url_hash: row.get(2).ok().flatten().unwrap_or(0),
            last_visited_epoch_secs: micros_to_secs(row.get(3).ok().flatten()),
        });
    }

    if skipped > 0 {
        logging::warn(&format!("skipped {skipped} malformed bookmark rows"));
    }
    Ok(out)
}

/// History rows exclude places already referenced by a bookmark; the merger
/// still dedupes by URL since places rows are not unique per address.
pub fn read_history(conn: &Connection) -> Result<Vec<HistoryRow>, ExtractError> {
    let mut stmt = conn.prepare(
        "SELECT place.url, place.title, place.last_visit_date
         FROM moz_places place
           LEFT JOIN moz_bookmarks bookmark ON place.id = bookmark.fk
         WHERE place.hidden = 0
           AND place.url IS NOT NULL
           AND bookmark.id IS NULL
         ORDER BY place.id",
    )?;

    let mut out = Vec::new();
    let mut skipped = 0_usize;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let url: Option<String> = row.get(0).ok().flatten();
        let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
            skipped += 1;
            continue;
        };
        out.push(HistoryRow {
            url,
            title: row.get(1).ok().flatten(),
            last_visited_epoch_secs: micros_to_secs(row.get(2).ok().flatten()),
        });
    }

    if skipped > 0 {
        logging::warn(&format!("skipped {skipped} malformed history rows"));
    }
    Ok(out)
}

// Firefox stores PRTime: microseconds since the epoch.
fn micros_to_secs(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v > 0).map(|v| v / 1_000_000)
}

#[cfg(test)]
mod tests {
    use super::micros_to_secs;

    #[test]
    fn prtime_converts_to_seconds() {
        assert_eq!(micros_to_secs(Some(1_700_000_000_000_000)), Some(1_700_000_000));
        assert_eq!(micros_to_secs(Some(0)), None);
        assert_eq!(micros_to_secs(None), None);
    }
}
