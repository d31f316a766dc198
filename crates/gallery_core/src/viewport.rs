//! Synchronised zoom across every mounted image viewer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

pub const ZOOM_IN_FACTOR: f64 = 1.1;
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomOptions {
    pub animate: bool,
}

impl Default for ZoomOptions {
    fn default() -> Self {
        Self { animate: true }
    }
}

/// A viewer that can be zoomed and reset. Each viewer keeps its own scale.
pub trait ZoomableViewport: Send + Sync {
    fn scale(&self) -> f64;
    fn zoom(&self, scale: f64, options: ZoomOptions);
    fn reset(&self, options: ZoomOptions);
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelEvent {
    pub delta_x: f64,
    pub delta_y: f64,
    pub shift_key: bool,
    pub default_prevented: bool,
}

impl WheelEvent {
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Vertical delta, or the horizontal one for pure sideways scrolls
    /// (shift+wheel is reported that way on some platforms).
    pub fn scroll_delta(&self) -> f64 {
        if self.delta_y == 0.0 && self.delta_x != 0.0 {
            self.delta_x
        } else {
            self.delta_y
        }
    }

    pub fn zoom_factor(&self) -> f64 {
        if self.scroll_delta() < 0.0 {
            ZOOM_IN_FACTOR
        } else {
            ZOOM_OUT_FACTOR
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

pub type WheelListener = Box<dyn Fn(&mut WheelEvent) + Send + Sync>;

/// Page-level source of wheel events.
pub trait WheelEventSource: Send + Sync {
    fn add_wheel_listener(&self, listener: WheelListener) -> ListenerId;
    fn remove_wheel_listener(&self, id: ListenerId);
}

/// Installed page-level wheel listener; removed when dropped.
#[must_use = "the wheel listener is removed as soon as the binding is dropped"]
pub struct WheelBinding {
    source: Arc<dyn WheelEventSource>,
    id: ListenerId,
}

impl WheelBinding {
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for WheelBinding {
    fn drop(&mut self) {
        debug!(listener = self.id.0, "removing viewport wheel listener");
        self.source.remove_wheel_listener(self.id);
    }
}

/// The set of currently mounted viewers.
#[derive(Clone, Default)]
pub struct ViewportRegistry {
    viewports: Arc<Mutex<Vec<Arc<dyn ZoomableViewport>>>>,
}

impl ViewportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `viewport`; registering the same handle twice is a no-op.
    pub fn register(&self, viewport: Arc<dyn ZoomableViewport>) -> bool {
        let mut viewports = self.lock();
        if viewports.iter().any(|known| same_viewport(known, &viewport)) {
            return false;
        }
        viewports.push(viewport);
        debug!(viewports = viewports.len(), "viewport registered");
        true
    }

    pub fn unregister(&self, viewport: &Arc<dyn ZoomableViewport>) -> bool {
        let mut viewports = self.lock();
        let before = viewports.len();
        viewports.retain(|known| !same_viewport(known, viewport));
        let removed = viewports.len() != before;
        if removed {
            debug!(viewports = viewports.len(), "viewport unregistered");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Scales every viewer by the factor the event's scroll direction maps
    /// to. Scroll up zooms in.
    pub fn zoom_all(&self, event: &WheelEvent) {
        let factor = event.zoom_factor();
        let viewports = self.snapshot();
        trace!(factor, viewports = viewports.len(), "zooming all viewports");
        for viewport in viewports {
            let scale = viewport.scale() * factor;
            viewport.zoom(scale, ZoomOptions::default());
        }
    }

    pub fn reset_all(&self) {
        for viewport in self.snapshot() {
            viewport.reset(ZoomOptions::default());
        }
    }

    /// Shift+wheel zooms every viewer and suppresses page scrolling. Other
    /// wheel events are left alone. Returns whether the event was consumed.
    pub fn handle_wheel(&self, event: &mut WheelEvent) -> bool {
        if !event.shift_key {
            return false;
        }
        event.prevent_default();
        self.zoom_all(event);
        true
    }

    /// Installs the shift+wheel handler on `source` for as long as the
    /// returned binding lives.
    pub fn bind_wheel(&self, source: &Arc<dyn WheelEventSource>) -> WheelBinding {
        let registry = self.clone();
        let id = source.add_wheel_listener(Box::new(move |event: &mut WheelEvent| {
            registry.handle_wheel(event);
        }));
        debug!(listener = id.0, "installed viewport wheel listener");
        WheelBinding {
            source: Arc::clone(source),
            id,
        }
    }

    // Viewers are called without the registry lock so they may register or
    // unregister from inside zoom/reset.
    fn snapshot(&self) -> Vec<Arc<dyn ZoomableViewport>> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn ZoomableViewport>>> {
        self.viewports.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn same_viewport(a: &Arc<dyn ZoomableViewport>, b: &Arc<dyn ZoomableViewport>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
#[path = "tests/viewport_tests.rs"]
mod tests;
