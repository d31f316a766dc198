use std::sync::Arc;

use shared::{ColumnLayout, GalleryOptions, Side, SortDirection, SortField};
use tokio::sync::watch;
use tracing::debug;

/// The gallery options shared by every view of a session.
///
/// Cloning the store yields another handle to the same options; a write
/// through any handle is seen by all subscribers.
#[derive(Clone)]
pub struct GalleryOptionsStore {
    tx: Arc<watch::Sender<GalleryOptions>>,
}

impl Default for GalleryOptionsStore {
    fn default() -> Self {
        Self::new(GalleryOptions::default())
    }
}

impl GalleryOptionsStore {
    pub fn new(initial: GalleryOptions) -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(initial)),
        }
    }

    pub fn snapshot(&self) -> GalleryOptions {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GalleryOptions> {
        self.tx.subscribe()
    }

    /// Applies `change` and notifies subscribers when it actually altered a
    /// value. Returns whether anything changed.
    pub fn update(&self, change: impl FnOnce(&mut GalleryOptions)) -> bool {
        let changed = self.tx.send_if_modified(|options| {
            let before = options.clone();
            change(options);
            *options != before
        });
        if changed {
            debug!(options = ?self.snapshot(), "gallery options changed");
        }
        changed
    }

    pub fn set_sort_field(&self, field: SortField) -> bool {
        self.update(|o| o.sort_field = field)
    }

    pub fn set_sort_direction(&self, direction: SortDirection) -> bool {
        self.update(|o| o.sort_direction = direction)
    }

    pub fn set_side(&self, side: Side) -> bool {
        self.update(|o| o.side = side)
    }

    pub fn set_columns(&self, columns: ColumnLayout) -> bool {
        self.update(|o| o.columns = columns)
    }

    pub fn set_only_photos(&self, only_photos: bool) -> bool {
        self.update(|o| o.only_photos = only_photos)
    }

    pub fn set_one_per_subspecies(&self, one_per_subspecies: bool) -> bool {
        self.update(|o| o.one_per_subspecies = one_per_subspecies)
    }
}

#[cfg(test)]
#[path = "tests/options_store_tests.rs"]
mod tests;
