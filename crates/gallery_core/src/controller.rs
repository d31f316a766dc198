use std::sync::Arc;

use shared::{GalleryOptions, PipelineOptions, Record, Records};
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use crate::{options_store::GalleryOptionsStore, pipeline};

/// Number of records revealed per page.
pub const PAGE_SIZE: usize = 200;

/// Tab-specific test selecting which records are in scope.
pub type RecordPredicate = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("gallery options store has been dropped")]
pub struct OptionsClosed;

/// One view's gallery session.
///
/// Nothing is shown until a predicate has been applied. After that the
/// controller keeps its match list consistent with the shared options: every
/// read and `load_more` first picks up pending option changes, and a change
/// to the sort or filter options re-applies the stored predicate and starts
/// the page window over. `options_changed` lets a host react as soon as a
/// change is published instead of on the next read.
pub struct GalleryController {
    source: watch::Receiver<Records>,
    options: watch::Receiver<GalleryOptions>,
    applied: PipelineOptions,
    predicate: Option<RecordPredicate>,
    matches: Vec<Record>,
    window: usize,
    page_size: usize,
    activated: bool,
}

impl GalleryController {
    pub fn new(source: watch::Receiver<Records>, options: &GalleryOptionsStore) -> Self {
        let mut options = options.subscribe();
        let applied = options.borrow_and_update().pipeline();
        Self {
            source,
            options,
            applied,
            predicate: None,
            matches: Vec::new(),
            window: PAGE_SIZE,
            page_size: PAGE_SIZE,
            activated: false,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self.window = self.page_size;
        self
    }

    pub fn apply_filter<F>(&mut self, predicate: F)
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.apply_predicate(Arc::new(predicate));
    }

    /// Filters the current records with `predicate`, runs the shared
    /// pipeline over the survivors and restarts pagination.
    ///
    /// The new match list is built before any session state is touched, so a
    /// panicking predicate leaves the previous results in place.
    pub fn apply_predicate(&mut self, predicate: RecordPredicate) {
        let options = self.options.borrow_and_update().pipeline();
        let records = Arc::clone(&*self.source.borrow());
        let in_scope = records.iter().filter(|record| predicate(*record)).cloned();
        let matches = pipeline::apply(in_scope, &options);

        debug!(
            candidates = records.len(),
            matches = matches.len(),
            sort_field = %options.sort_field,
            "applied gallery filter"
        );

        self.matches = matches;
        self.window = self.page_size;
        self.applied = options;
        self.predicate = Some(predicate);
        self.activated = true;
    }

    /// Re-runs the stored predicate against the current records, e.g. after
    /// the dataset finished loading. Returns `false` when nothing was applied
    /// yet.
    pub fn reapply(&mut self) -> bool {
        match self.predicate.clone() {
            Some(predicate) if self.activated => {
                self.apply_predicate(predicate);
                true
            }
            _ => false,
        }
    }

    pub fn load_more(&mut self) {
        self.sync_options();
        self.window = self.window.saturating_add(self.page_size);
    }

    pub fn visible_items(&mut self) -> &[Record] {
        self.sync_options();
        &self.matches[..self.window.min(self.matches.len())]
    }

    pub fn has_more(&mut self) -> bool {
        self.sync_options();
        self.window < self.matches.len()
    }

    pub fn matches(&mut self) -> &[Record] {
        self.sync_options();
        &self.matches
    }

    pub fn window(&mut self) -> usize {
        self.sync_options();
        self.window
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Picks up any option change published since the last look. Returns
    /// whether the gallery was recomputed.
    pub fn sync_options(&mut self) -> bool {
        if !self.options.has_changed().unwrap_or(false) {
            return false;
        }
        let latest = self.options.borrow_and_update().pipeline();
        self.on_options(latest)
    }

    /// Waits for the next option change and reacts to it.
    pub async fn options_changed(&mut self) -> Result<bool, OptionsClosed> {
        self.options.changed().await.map_err(|_| OptionsClosed)?;
        let latest = self.options.borrow_and_update().pipeline();
        Ok(self.on_options(latest))
    }

    fn on_options(&mut self, latest: PipelineOptions) -> bool {
        if latest == self.applied {
            return false;
        }
        match self.predicate.clone() {
            Some(predicate) if self.activated => {
                debug!(?latest, "gallery options changed; re-applying filter");
                self.apply_predicate(predicate);
                true
            }
            _ => {
                self.applied = latest;
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
