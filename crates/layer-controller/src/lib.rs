//! Overlay layer bookkeeping for the geo-viewer.
//!
//! The [`LayerController`] keeps at most one active layer per [`LayerSlot`]
//! (raster, point, contour), swapping occupants as selections change. Files
//! come from a [`DataSource`], are decoded by the [`decode`] module, and are
//! handed to a [`MapRenderer`] for display.
//!
//! [`LayerSlot`]: map_common::LayerSlot

pub mod controller;
pub mod decode;
pub mod map;
pub mod metrics;
pub mod selection;
pub mod source;

pub use controller::{AutoLoadSummary, LayerController, LoadOutcome, Occupant, SlotPolicy};
pub use decode::{Overlay, OverlayContent};
pub use map::{LayerId, MapRenderer, MapView, SceneMap};
pub use selection::{SelectionPanel, SelectionState};
pub use source::{DataSource, FsDataSource, HttpDataSource, MemoryDataSource};
