//! Map render collaborator.
//!
//! The controller owns every overlay; a [`MapRenderer`] only displays what it
//! is told to add or remove. [`SceneMap`] is a headless renderer that records
//! the resulting scene, used by the viewer service and in tests.

use map_common::{BoundingBox, LayerSlot};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decode::{Overlay, OverlayContent, OverlaySummary};

/// Handle of a layer installed on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// Operations the controller needs from a map.
///
/// Calls arrive in program order per slot: a replaced layer is always
/// removed before its successor is added.
pub trait MapRenderer: Send {
    fn add_layer(&mut self, id: LayerId, overlay: &Overlay);

    fn remove_layer(&mut self, id: LayerId);

    /// Set the viewport to exactly enclose `bounds`.
    fn fit_bounds(&mut self, bounds: BoundingBox);
}

/// Static basemap and initial viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapView {
    /// Tile URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders
    pub tile_url: String,
    pub attribution: String,
    /// `(lat, lon)`
    pub center: (f64, f64),
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap contributors".to_string(),
            center: (-6.2, 106.8),
            zoom: 10,
        }
    }
}

/// Current viewport of a [`SceneMap`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Viewport {
    CenterZoom { center: (f64, f64), zoom: u8 },
    Bounds { bounds: BoundingBox },
}

/// Presentation of a recorded layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneStyle {
    Raster { opacity: f64, resolution: u32 },
    Markers { popups: Vec<String> },
    Lines { color: String, weight: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneLayer {
    pub id: LayerId,
    #[serde(flatten)]
    pub summary: OverlaySummary,
    pub style: SceneStyle,
}

/// Headless map that records layers in draw order and the viewport.
#[derive(Debug, Clone, Serialize)]
pub struct SceneMap {
    view: MapView,
    layers: Vec<SceneLayer>,
    viewport: Viewport,
}

impl SceneMap {
    pub fn new(view: MapView) -> Self {
        let viewport = Viewport::CenterZoom {
            center: view.center,
            zoom: view.zoom,
        };
        Self {
            view,
            layers: Vec::new(),
            viewport,
        }
    }

    /// Layers in draw order, oldest first.
    pub fn layers(&self) -> &[SceneLayer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&SceneLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layers_for_slot(&self, slot: LayerSlot) -> Vec<&SceneLayer> {
        self.layers
            .iter()
            .filter(|l| l.summary.slot == slot)
            .collect()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}

impl Default for SceneMap {
    fn default() -> Self {
        Self::new(MapView::default())
    }
}

fn scene_style(overlay: &Overlay) -> SceneStyle {
    match &overlay.content {
        OverlayContent::Raster(layer) => SceneStyle::Raster {
            opacity: layer.options.opacity,
            resolution: layer.options.resolution,
        },
        OverlayContent::Points(layer) => SceneStyle::Markers {
            popups: layer.markers.iter().map(|m| m.popup.clone()).collect(),
        },
        OverlayContent::Contours(layer) => SceneStyle::Lines {
            color: layer.style.color.to_css(),
            weight: layer.style.weight,
        },
    }
}

impl MapRenderer for SceneMap {
    fn add_layer(&mut self, id: LayerId, overlay: &Overlay) {
        let layer = SceneLayer {
            id,
            summary: overlay.summary(),
            style: scene_style(overlay),
        };

        match self.layers.iter_mut().find(|l| l.id == id) {
            Some(existing) => *existing = layer,
            None => self.layers.push(layer),
        }
        debug!(%id, file = %overlay.file, "Added layer to scene");
    }

    fn remove_layer(&mut self, id: LayerId) {
        let before = self.layers.len();
        self.layers.retain(|l| l.id != id);
        if self.layers.len() == before {
            debug!(%id, "Remove requested for a layer not in the scene");
        }
    }

    fn fit_bounds(&mut self, bounds: BoundingBox) {
        self.viewport = Viewport::Bounds { bounds };
    }
}
