pub mod controller;
pub mod options_store;
pub mod pipeline;
pub mod query;
pub mod viewport;

pub use controller::{GalleryController, OptionsClosed, RecordPredicate, PAGE_SIZE};
pub use options_store::GalleryOptionsStore;
pub use query::{FieldFilter, MatchMode, QueryParseError, RecordQuery};
pub use viewport::{
    ListenerId, ViewportRegistry, WheelBinding, WheelEvent, WheelEventSource, WheelListener,
    ZoomOptions, ZoomableViewport, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR,
};
