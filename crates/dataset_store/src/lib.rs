use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use futures::future::{BoxFuture, FutureExt, Shared};
use shared::{DatasetKey, LoadError, LOAD_ERROR_MESSAGE};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub mod fetch;

pub use fetch::{decode_records, DatasetFetcher, FileFetcher, HttpFetcher, SourceFetcher};
pub use shared::Records;

type SharedLoad = Shared<BoxFuture<'static, Result<Records, LoadError>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Empty,
    Loading,
    Ready,
    Failed,
}

enum Phase {
    Empty,
    Loading(SharedLoad),
    Ready(Records),
    Failed,
}

impl Phase {
    fn state(&self) -> LoadState {
        match self {
            Self::Empty => LoadState::Empty,
            Self::Loading(_) => LoadState::Loading,
            Self::Ready(_) => LoadState::Ready,
            Self::Failed => LoadState::Failed,
        }
    }
}

struct DatasetEntry {
    key: DatasetKey,
    location: String,
    phase: Mutex<Phase>,
    records: watch::Sender<Records>,
    loading: watch::Sender<bool>,
    error: watch::Sender<Option<String>>,
}

impl DatasetEntry {
    fn new(key: DatasetKey, location: String) -> Self {
        Self {
            key,
            location,
            phase: Mutex::new(Phase::Empty),
            records: watch::Sender::new(empty_records()),
            loading: watch::Sender::new(false),
            error: watch::Sender::new(None),
        }
    }

    fn phase(&self) -> MutexGuard<'_, Phase> {
        lock(&self.phase)
    }

    fn finish(&self, result: &Result<Records, LoadError>) {
        let mut phase = self.phase();
        match result {
            Ok(records) => {
                info!(
                    key = %self.key,
                    location = %self.location,
                    records = records.len(),
                    "dataset loaded"
                );
                self.records.send_replace(Arc::clone(records));
                *phase = Phase::Ready(Arc::clone(records));
            }
            Err(error) => {
                warn!(
                    key = %self.key,
                    location = %self.location,
                    %error,
                    "dataset load failed"
                );
                self.records.send_replace(empty_records());
                self.error.send_replace(Some(LOAD_ERROR_MESSAGE.to_string()));
                *phase = Phase::Failed;
            }
        }
        self.loading.send_replace(false);
    }
}

/// Keyed, memoizing dataset loader.
///
/// Each key owns exactly one entry for the lifetime of the cache. Loads are
/// single-flight: while a key is loading every caller awaits the same shared
/// future, and once a key is ready its records are served without touching
/// the fetcher again. A failed load leaves the key retryable.
#[derive(Clone)]
pub struct DatasetCache {
    fetcher: Arc<dyn DatasetFetcher>,
    entries: Arc<Mutex<HashMap<DatasetKey, Arc<DatasetEntry>>>>,
}

impl DatasetCache {
    pub fn new(fetcher: Arc<dyn DatasetFetcher>) -> Self {
        Self {
            fetcher,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the handle for `key`, registering it on first use.
    ///
    /// The location given on first use is the one the key is loaded from.
    pub fn dataset(&self, key: &DatasetKey, location: &str) -> DatasetHandle {
        let entry = {
            let mut entries = lock(&self.entries);
            Arc::clone(entries.entry(key.clone()).or_insert_with(|| {
                debug!(%key, location, "registered dataset");
                Arc::new(DatasetEntry::new(key.clone(), location.to_string()))
            }))
        };
        if entry.location != location {
            warn!(
                %key,
                registered = %entry.location,
                requested = location,
                "dataset key already bound to another location; keeping the registered one"
            );
        }
        DatasetHandle {
            entry,
            fetcher: Arc::clone(&self.fetcher),
        }
    }

    pub async fn ensure_loaded(
        &self,
        key: &DatasetKey,
        location: &str,
    ) -> Result<Records, LoadError> {
        self.dataset(key, location).ensure_loaded().await
    }

    pub fn state(&self, key: &DatasetKey) -> LoadState {
        lock(&self.entries)
            .get(key)
            .map(|entry| entry.phase().state())
            .unwrap_or(LoadState::Empty)
    }

    pub fn keys(&self) -> Vec<DatasetKey> {
        let mut keys: Vec<_> = lock(&self.entries).keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// A consumer's view of one dataset entry.
///
/// Handles for the same key share state; the `records`, `loading` and
/// `error` receivers observe every transition of the entry.
#[derive(Clone)]
pub struct DatasetHandle {
    entry: Arc<DatasetEntry>,
    fetcher: Arc<dyn DatasetFetcher>,
}

impl DatasetHandle {
    pub fn key(&self) -> &DatasetKey {
        &self.entry.key
    }

    pub fn location(&self) -> &str {
        &self.entry.location
    }

    pub fn state(&self) -> LoadState {
        self.entry.phase().state()
    }

    pub fn records(&self) -> watch::Receiver<Records> {
        self.entry.records.subscribe()
    }

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.entry.loading.subscribe()
    }

    pub fn error(&self) -> watch::Receiver<Option<String>> {
        self.entry.error.subscribe()
    }

    pub async fn ensure_loaded(&self) -> Result<Records, LoadError> {
        let load = {
            let mut phase = self.entry.phase();
            match &*phase {
                Phase::Ready(records) => return Ok(Arc::clone(records)),
                Phase::Loading(load) => {
                    debug!(key = %self.entry.key, "joining in-flight dataset load");
                    load.clone()
                }
                Phase::Empty | Phase::Failed => {
                    let load = self.start_load();
                    *phase = Phase::Loading(load.clone());
                    load
                }
            }
        };
        load.await
    }

    // Runs the fetch on its own task so it completes even if every caller
    // stops waiting; callers share the task's result through `Shared`.
    fn start_load(&self) -> SharedLoad {
        let entry = Arc::clone(&self.entry);
        let fetcher = Arc::clone(&self.fetcher);
        entry.error.send_replace(None);
        entry.loading.send_replace(true);
        info!(key = %entry.key, location = %entry.location, "loading dataset");

        let task_entry = Arc::clone(&entry);
        let task = tokio::spawn(async move {
            let result = fetcher
                .fetch(&task_entry.location)
                .await
                .map(Records::from);
            task_entry.finish(&result);
            result
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(join_error) => {
                    let error = LoadError::Interrupted {
                        location: entry.location.clone(),
                        message: join_error.to_string(),
                    };
                    entry.finish(&Err(error.clone()));
                    Err(error)
                }
            }
        }
        .boxed()
        .shared()
    }
}

fn empty_records() -> Records {
    Arc::from(Vec::new())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
