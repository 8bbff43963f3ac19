use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use foxfind_core::extractor::{open_places, read_bookmarks, read_history, ExtractError};

fn temp_db_path(label: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir()
        .join("foxfind")
        .join(format!("{label}-{unique}.sqlite"))
}

fn build_places_fixture(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let conn = rusqlite::Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE moz_places (
             id INTEGER PRIMARY KEY,
             url TEXT,
             title TEXT,
             url_hash INTEGER NOT NULL DEFAULT 0,
             hidden INTEGER NOT NULL DEFAULT 0,
             last_visit_date INTEGER
         );
         CREATE TABLE moz_bookmarks (
             id INTEGER PRIMARY KEY,
             type INTEGER NOT NULL,
             fk INTEGER,
             title TEXT,
             dateAdded INTEGER
         );",
    )
    .unwrap();

    conn.execute_batch(
        "INSERT INTO moz_places (id, url, title, url_hash, hidden, last_visit_date) VALUES
             (1, 'https://a.com', 'Alpha', 11, 0, 1700000000000000),
             (2, 'https://b.com', 'Banana', 22, 0, 1700000100000000),
             (3, 'https://hidden.com', 'Hidden', 33, 1, 1700000200000000),
             (4, '', 'No address', 44, 0, 1700000300000000),
             (5, 'https://untitled.com', NULL, 55, 0, NULL);
         INSERT INTO moz_bookmarks (id, type, fk, title, dateAdded) VALUES
             (1, 1, 1, 'Alpha Bookmark', 1690000000000000),
             (2, 3, NULL, 'Toolbar Folder', 1690000000000000);",
    )
    .unwrap();
}

#[test]
fn bookmarks_join_places_and_normalize_timestamps() {
    let path = temp_db_path("bookmarks");
    build_places_fixture(&path);

    let conn = open_places(&path).unwrap();
    let bookmarks = read_bookmarks(&conn).unwrap();

    assert_eq!(bookmarks.len(), 1);
    assert_eq!(bookmarks[0].url, "https://a.com");
    assert_eq!(bookmarks[0].title.as_deref(), Some("Alpha Bookmark"));
    assert_eq!(bookmarks[0].url_hash, 11);
    assert_eq!(bookmarks[0].last_visited_epoch_secs, Some(1_700_000_000));

    drop(conn);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn history_excludes_bookmarked_hidden_and_malformed_rows() {
    let path = temp_db_path("history");
    build_places_fixture(&path);

    let conn = open_places(&path).unwrap();
    let history = read_history(&conn).unwrap();

    let urls: Vec<&str> = history.iter().map(|row| row.url.as_str()).collect();
    assert_eq!(urls, vec!["https://b.com", "https://untitled.com"]);
    assert_eq!(history[0].title.as_deref(), Some("Banana"));
    assert_eq!(history[0].last_visited_epoch_secs, Some(1_700_000_100));
    assert_eq!(history[1].title, None);
    assert_eq!(history[1].last_visited_epoch_secs, None);

    drop(conn);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn missing_database_is_source_unavailable() {
    let path = temp_db_path("missing");
    let result = open_places(&path);
    match result {
        Err(ExtractError::SourceUnavailable(detail)) => {
            assert!(detail.contains("not found"), "unexpected detail: {detail}");
        }
        Ok(_) => panic!("open should fail for a missing database"),
    }
}
