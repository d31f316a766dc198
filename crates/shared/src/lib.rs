pub mod domain;
pub mod error;
pub mod options;

pub use domain::{DatasetKey, PhotoRef, PhotoSide, Record, Records};
pub use error::{LoadError, LoadErrorKind, LOAD_ERROR_MESSAGE};
pub use options::{
    ColumnLayout, GalleryOptions, PipelineOptions, Side, SortDirection, SortField,
};
