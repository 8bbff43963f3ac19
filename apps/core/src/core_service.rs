use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::config::{self, Config};
use crate::contract::{ActivateResponse, CoreRequest, CoreResponse, RefreshResponse, SearchResponse};
use crate::extractor;
use crate::freq_store::FrequencyStore;
use crate::logging;
use crate::merger::{self, IconResolver, NoIcons};
use crate::model::Entry;
use crate::open_url::{OpenError, SystemOpener, UrlOpener};
use crate::presenter::{self, ResultRow};

#[derive(Debug)]
pub enum ServiceError {
    Config(String),
    EntryNotFound(String),
    Open(OpenError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::EntryNotFound(id) => write!(f, "entry not found: {id}"),
            Self::Open(error) => write!(f, "open error: {error}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<OpenError> for ServiceError {
    fn from(value: OpenError) -> Self {
        Self::Open(value)
    }
}

/// One immutable generation of the merged index. Refresh builds a complete
/// replacement and swaps the Arc; queries in flight keep whatever generation
/// they started with.
pub struct IndexContext {
    pub entries: Vec<Entry>,
    pub generation: u64,
}

impl IndexContext {
    fn empty(generation: u64) -> Self {
        Self {
            entries: Vec::new(),
            generation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed {
        bookmarks: usize,
        history: usize,
        entries: usize,
    },
    /// Places database missing or unreadable; an empty index was swapped in.
    Unavailable,
    /// Another refresh was already in flight; this request was dropped.
    Coalesced,
}

pub struct CoreService {
    config: Config,
    freq: FrequencyStore,
    opener: Box<dyn UrlOpener>,
    icons: Box<dyn IconResolver>,
    context: RwLock<Arc<IndexContext>>,
    ranking: RwLock<Arc<HashMap<String, u64>>>,
    ranking_stale: AtomicBool,
    refresh_in_flight: AtomicBool,
    generation: AtomicU64,
}

impl CoreService {
    pub fn new(config: Config) -> Result<Self, ServiceError> {
        let freq = FrequencyStore::open(config.frequency_path.clone());
        Self::with_parts(config, freq, Box::new(SystemOpener), Box::new(NoIcons))
    }

    /// Fully-injected constructor; tests use it with an in-memory frequency
    /// store and a recording opener.
    pub fn with_parts(
        config: Config,
        freq: FrequencyStore,
        opener: Box<dyn UrlOpener>,
        icons: Box<dyn IconResolver>,
    ) -> Result<Self, ServiceError> {
        config::validate(&config).map_err(ServiceError::Config)?;
        let ranking = Arc::new(freq.snapshot());
        Ok(Self {
            config,
            freq,
            opener,
            icons,
            context: RwLock::new(Arc::new(IndexContext::empty(0))),
            ranking: RwLock::new(ranking),
            ranking_stale: AtomicBool::new(false),
            refresh_in_flight: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        })
    }

    /// Re-reads the places database and swaps in a fresh index. Never fails:
    /// an unavailable source degrades to an empty index and the condition is
    /// only visible in the logs. Concurrent requests coalesce.
    pub fn refresh(&self) -> RefreshOutcome {
        if self
            .refresh_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return RefreshOutcome::Coalesced;
        }

        let outcome = self.rebuild();
        self.refresh_in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    fn rebuild(&self) -> RefreshOutcome {
        let extracted = extractor::open_places(&self.config.places_db_path).and_then(|conn| {
            let bookmarks = extractor::read_bookmarks(&conn)?;
            let history = if self.config.include_history {
                extractor::read_history(&conn)?
            } else {
                Vec::new()
            };
            Ok((bookmarks, history))
        });

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        match extracted {
            Ok((bookmarks, history)) => {
                let entries = merger::merge(&bookmarks, &history, self.icons.as_ref());
                logging::info(&format!(
                    "index refreshed: {} bookmarks, {} history rows, {} entries",
                    bookmarks.len(),
                    history.len(),
                    entries.len()
                ));
                let outcome = RefreshOutcome::Refreshed {
                    bookmarks: bookmarks.len(),
                    history: history.len(),
                    entries: entries.len(),
                };
                self.swap_context(IndexContext {
                    entries,
                    generation,
                });
                self.refresh_ranking();
                outcome
            }
            Err(error) => {
                logging::warn(&format!("index refresh failed, serving empty index: {error}"));
                self.swap_context(IndexContext::empty(generation));
                RefreshOutcome::Unavailable
            }
        }
    }

    /// Ranked results for one keystroke. Read-only over the current context;
    /// a zero `limit` falls back to the configured maximum.
    pub fn search(&self, query: &str, limit: usize) -> Vec<ResultRow> {
        let max = self.config.max_results as usize;
        let effective = if limit == 0 { max } else { limit.min(max) };

        if self.ranking_stale.swap(false, Ordering::SeqCst) {
            self.refresh_ranking();
        }

        let context = self.current_context();
        let ranking = self.current_ranking();
        let scored = crate::search::search(&context.entries, &ranking, query, effective);
        presenter::present_all(&scored)
    }

    /// The only mutation path: records the activation, then hands the URL to
    /// the host opener. The id is resolved against the current context, not
    /// against whatever context produced the result row.
    pub fn activate(&self, action_id: &str) -> Result<(), ServiceError> {
        let context = self.current_context();
        let entry = context
            .entries
            .iter()
            .find(|entry| entry.id == action_id)
            .ok_or_else(|| ServiceError::EntryNotFound(action_id.to_string()))?;

        let count = self.freq.increment(&entry.id);
        self.ranking_stale.store(true, Ordering::SeqCst);
        logging::info(&format!("activated {} (count {count})", entry.id));

        self.opener.open_url(&entry.url)?;
        Ok(())
    }

    pub fn handle_command(&self, request: CoreRequest) -> Result<CoreResponse, ServiceError> {
        match request {
            CoreRequest::Search(req) => {
                let results = self.search(&req.query, req.limit.unwrap_or(0));
                Ok(CoreResponse::Search(SearchResponse {
                    results: results.into_iter().map(Into::into).collect(),
                }))
            }
            CoreRequest::Activate(req) => {
                self.activate(&req.action_id)?;
                Ok(CoreResponse::Activate(ActivateResponse { activated: true }))
            }
            CoreRequest::Refresh => {
                let outcome = self.refresh();
                let (entries, coalesced) = match outcome {
                    RefreshOutcome::Refreshed { entries, .. } => (entries, false),
                    RefreshOutcome::Unavailable => (0, false),
                    RefreshOutcome::Coalesced => (self.indexed_entries(), true),
                };
                Ok(CoreResponse::Refresh(RefreshResponse { entries, coalesced }))
            }
        }
    }

    pub fn indexed_entries(&self) -> usize {
        self.current_context().entries.len()
    }

    pub fn generation(&self) -> u64 {
        self.current_context().generation
    }

    pub fn usage_count(&self, id: &str) -> u64 {
        self.freq.get(id)
    }

    fn refresh_ranking(&self) {
        let snapshot = Arc::new(self.freq.snapshot());
        match self.ranking.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }

    fn swap_context(&self, context: IndexContext) {
        let context = Arc::new(context);
        match self.context.write() {
            Ok(mut guard) => *guard = context,
            Err(poisoned) => *poisoned.into_inner() = context,
        }
    }

    fn current_context(&self) -> Arc<IndexContext> {
        match self.context.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    fn current_ranking(&self) -> Arc<HashMap<String, u64>> {
        match self.ranking.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }
}
