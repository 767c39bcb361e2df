//! File names from the data listing and the layer slots they map to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ViewerError;

const RASTER_SUFFIX: &str = ".tiff";
const POINT_SUFFIX: &str = "_point.geojson";
const CONTOUR_SUFFIX: &str = "_contour.geojson";

/// One of the three independently tracked overlay categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerSlot {
    Raster,
    Point,
    Contour,
}

impl LayerSlot {
    /// All slots in display order.
    pub const ALL: [LayerSlot; 3] = [LayerSlot::Raster, LayerSlot::Point, LayerSlot::Contour];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerSlot::Raster => "raster",
            LayerSlot::Point => "point",
            LayerSlot::Contour => "contour",
        }
    }

    /// Position of the slot in [`LayerSlot::ALL`].
    pub fn index(&self) -> usize {
        match self {
            LayerSlot::Raster => 0,
            LayerSlot::Point => 1,
            LayerSlot::Contour => 2,
        }
    }
}

impl fmt::Display for LayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerSlot {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raster" | "tiff" => Ok(LayerSlot::Raster),
            "point" => Ok(LayerSlot::Point),
            "contour" => Ok(LayerSlot::Contour),
            _ => Err(ViewerError::InvalidSlot(s.to_string())),
        }
    }
}

/// Category derived from a file name's suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Raster,
    Point,
    Contour,
    Ignored,
}

impl FileCategory {
    /// The slot this category renders into, if any.
    pub fn slot(&self) -> Option<LayerSlot> {
        match self {
            FileCategory::Raster => Some(LayerSlot::Raster),
            FileCategory::Point => Some(LayerSlot::Point),
            FileCategory::Contour => Some(LayerSlot::Contour),
            FileCategory::Ignored => None,
        }
    }
}

/// A file name exactly as returned by the data listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileName(pub String);

impl FileName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Categorize by suffix. Matching is case-sensitive.
    pub fn category(&self) -> FileCategory {
        if self.0.ends_with(RASTER_SUFFIX) {
            FileCategory::Raster
        } else if self.0.ends_with(POINT_SUFFIX) {
            FileCategory::Point
        } else if self.0.ends_with(CONTOUR_SUFFIX) {
            FileCategory::Contour
        } else {
            FileCategory::Ignored
        }
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FileName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A listing partitioned by category, each list in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedFiles {
    pub raster: Vec<FileName>,
    pub point: Vec<FileName>,
    pub contour: Vec<FileName>,
    #[serde(default)]
    pub ignored: Vec<FileName>,
}

impl CategorizedFiles {
    /// Partition `names` by suffix. Duplicates are kept.
    pub fn from_names<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<FileName>,
    {
        let mut files = Self::default();
        for name in names {
            let name = name.into();
            match name.category() {
                FileCategory::Raster => files.raster.push(name),
                FileCategory::Point => files.point.push(name),
                FileCategory::Contour => files.contour.push(name),
                FileCategory::Ignored => files.ignored.push(name),
            }
        }
        files
    }

    /// Files that belong to `slot`.
    pub fn for_slot(&self, slot: LayerSlot) -> &[FileName] {
        match slot {
            LayerSlot::Raster => &self.raster,
            LayerSlot::Point => &self.point,
            LayerSlot::Contour => &self.contour,
        }
    }

    /// Number of files that map to a slot.
    pub fn selectable_count(&self) -> usize {
        self.raster.len() + self.point.len() + self.contour.len()
    }
}
