//! Common types shared by the geo-viewer crates.

pub mod bbox;
pub mod error;
pub mod file;
pub mod style;

pub use bbox::BoundingBox;
pub use error::{ViewerError, ViewerResult};
pub use file::{CategorizedFiles, FileCategory, FileName, LayerSlot};
pub use style::{Color, ContourStyle, MarkerStyle, OverlayStyles, RasterOptions};
