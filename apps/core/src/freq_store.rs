use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::logging;

/// Durable activation counter, keyed by the URL-derived entry id.
///
/// Counts live in a JSON map on disk. Every increment rewrites the file so an
/// interrupted process loses at most the increment in flight. When the file
/// cannot be written the store degrades to in-memory counts for the session;
/// search keeps working either way.
pub struct FrequencyStore {
    path: Option<PathBuf>,
    inner: Mutex<Inner>,
}

struct Inner {
    counts: HashMap<String, u64>,
    degraded: bool,
}

impl FrequencyStore {
    /// Opens the store backed by `path`, loading any existing counts. A file
    /// that is missing or unparseable starts the store empty.
    pub fn open(path: PathBuf) -> Self {
        let counts = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, u64>>(&raw) {
                Ok(counts) => counts,
                Err(error) => {
                    logging::warn(&format!(
                        "frequency file {} unreadable, starting empty: {error}",
                        path.display()
                    ));
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self {
            path: Some(path),
            inner: Mutex::new(Inner {
                counts,
                degraded: false,
            }),
        }
    }

    /// Store with no backing file; counts last for the process lifetime.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            inner: Mutex::new(Inner {
                counts: HashMap::new(),
                degraded: false,
            }),
        }
    }

    pub fn get(&self, id: &str) -> u64 {
        let inner = self.lock();
        inner.counts.get(id).copied().unwrap_or(0)
    }

    /// Bumps the count for `id` and persists the map. Returns the new count.
    pub fn increment(&self, id: &str) -> u64 {
        let mut inner = self.lock();
        let count = inner.counts.entry(id.to_string()).or_insert(0);
        *count += 1;
        let updated = *count;

        if let Some(path) = &self.path {
            if !inner.degraded {
                if let Err(error) = persist(path, &inner.counts) {
                    inner.degraded = true;
                    logging::warn(&format!(
                        "frequency persistence unavailable ({error}); counts are in-memory for this session"
                    ));
                }
            }
        }

        updated
    }

    /// Full copy of the mapping, used by the query engine to score a whole
    /// result set without per-entry lookups.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.lock().counts.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn persist(path: &std::path::Path, counts: &HashMap<String, u64>) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create frequency dir: {e}"))?;
    }
    let encoded =
        serde_json::to_string(counts).map_err(|e| format!("failed to encode frequency map: {e}"))?;
    std::fs::write(path, encoded).map_err(|e| format!("failed to write frequency file: {e}"))
}
