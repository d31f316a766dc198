use super::*;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, AtomicUsize, Ordering},
};

#[derive(Default)]
struct FakeViewer {
    scale: Mutex<f64>,
    resets: AtomicUsize,
    last_options: Mutex<Option<ZoomOptions>>,
}

impl FakeViewer {
    fn at(scale: f64) -> Arc<Self> {
        Arc::new(Self {
            scale: Mutex::new(scale),
            ..Self::default()
        })
    }
}

impl ZoomableViewport for FakeViewer {
    fn scale(&self) -> f64 {
        *self.scale.lock().unwrap()
    }

    fn zoom(&self, scale: f64, options: ZoomOptions) {
        *self.scale.lock().unwrap() = scale;
        *self.last_options.lock().unwrap() = Some(options);
    }

    fn reset(&self, options: ZoomOptions) {
        *self.scale.lock().unwrap() = 1.0;
        *self.last_options.lock().unwrap() = Some(options);
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct FakePage {
    next: AtomicU64,
    listeners: Mutex<HashMap<u64, WheelListener>>,
}

impl FakePage {
    fn dispatch(&self, mut event: WheelEvent) -> WheelEvent {
        for listener in self.listeners.lock().unwrap().values() {
            listener(&mut event);
        }
        event
    }

    fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}

impl WheelEventSource for FakePage {
    fn add_wheel_listener(&self, listener: WheelListener) -> ListenerId {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().unwrap().insert(id, listener);
        ListenerId(id)
    }

    fn remove_wheel_listener(&self, id: ListenerId) {
        self.listeners.lock().unwrap().remove(&id.0);
    }
}

fn wheel(delta_x: f64, delta_y: f64, shift_key: bool) -> WheelEvent {
    WheelEvent {
        delta_x,
        delta_y,
        shift_key,
        default_prevented: false,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn register_has_set_semantics() {
    let registry = ViewportRegistry::new();
    let viewer: Arc<dyn ZoomableViewport> = FakeViewer::at(1.0);

    assert!(registry.register(Arc::clone(&viewer)));
    assert!(!registry.register(Arc::clone(&viewer)));
    assert_eq!(registry.len(), 1);

    assert!(registry.unregister(&viewer));
    assert!(!registry.unregister(&viewer));
    assert!(registry.is_empty());
}

#[test]
fn scroll_delta_falls_back_to_horizontal() {
    assert_eq!(wheel(-3.0, 0.0, true).scroll_delta(), -3.0);
    assert_eq!(wheel(-3.0, 5.0, true).scroll_delta(), 5.0);
    assert_eq!(wheel(0.0, 0.0, true).scroll_delta(), 0.0);
    assert_eq!(wheel(0.0, 0.0, true).zoom_factor(), ZOOM_OUT_FACTOR);
    assert_eq!(wheel(0.0, -1.0, true).zoom_factor(), ZOOM_IN_FACTOR);
}

#[test]
fn zoom_all_scales_each_viewer_from_its_own_scale() {
    let registry = ViewportRegistry::new();
    let small = FakeViewer::at(1.0);
    let large = FakeViewer::at(2.0);
    registry.register(small.clone());
    registry.register(large.clone());

    registry.zoom_all(&wheel(0.0, -120.0, true));
    assert!(close(small.scale(), 1.1));
    assert!(close(large.scale(), 2.2));

    registry.zoom_all(&wheel(0.0, 120.0, true));
    assert!(close(small.scale(), 0.99));
    assert!(close(large.scale(), 1.98));
    assert_eq!(
        *small.last_options.lock().unwrap(),
        Some(ZoomOptions { animate: true })
    );
}

#[test]
fn reset_all_resets_every_viewer() {
    let registry = ViewportRegistry::new();
    let a = FakeViewer::at(3.0);
    let b = FakeViewer::at(0.5);
    registry.register(a.clone());
    registry.register(b.clone());

    registry.reset_all();

    assert_eq!(a.resets.load(Ordering::SeqCst), 1);
    assert_eq!(b.resets.load(Ordering::SeqCst), 1);
    assert!(close(a.scale(), 1.0));
}

#[test]
fn plain_wheel_scrolls_the_page() {
    let registry = ViewportRegistry::new();
    let viewer = FakeViewer::at(1.0);
    registry.register(viewer.clone());

    let mut event = wheel(0.0, -120.0, false);
    assert!(!registry.handle_wheel(&mut event));
    assert!(!event.default_prevented);
    assert!(close(viewer.scale(), 1.0));
}

#[test]
fn binding_intercepts_shift_wheel_until_dropped() {
    let registry = ViewportRegistry::new();
    let viewer = FakeViewer::at(1.0);
    registry.register(viewer.clone());
    let page = Arc::new(FakePage::default());
    let source: Arc<dyn WheelEventSource> = page.clone();

    let binding = registry.bind_wheel(&source);
    assert_eq!(page.listener_count(), 1);

    let event = page.dispatch(wheel(-40.0, 0.0, true));
    assert!(event.default_prevented);
    assert!(close(viewer.scale(), 1.1));

    let event = page.dispatch(wheel(0.0, -40.0, false));
    assert!(!event.default_prevented);

    drop(binding);
    assert_eq!(page.listener_count(), 0);
    page.dispatch(wheel(0.0, -40.0, true));
    assert!(close(viewer.scale(), 1.1));
}

#[test]
fn remounting_does_not_leak_listeners() {
    let registry = ViewportRegistry::new();
    let page = Arc::new(FakePage::default());
    let source: Arc<dyn WheelEventSource> = page.clone();

    for _ in 0..3 {
        let binding = registry.bind_wheel(&source);
        assert_eq!(page.listener_count(), 1);
        drop(binding);
    }
    assert_eq!(page.listener_count(), 0);
}
