//! Turning fetched file bodies into renderable overlays.
//!
//! - `raster`: GeoTIFF bytes to a georeferenced grid
//! - `vector`: GeoJSON bodies to point markers or contour paths

pub mod raster;
pub mod vector;

use map_common::{BoundingBox, FileName, LayerSlot, OverlayStyles, ViewerResult};
use serde::Serialize;

pub use raster::{decode_geotiff, DecodedRaster, RasterLayer};
pub use vector::{
    build_contour_layer, build_point_layer, parse_geojson, ContourLayer, ContourPath, Marker,
    PointLayer,
};

/// A decoded, styled layer ready to be handed to a map renderer.
#[derive(Debug, Clone)]
pub struct Overlay {
    /// File the overlay was built from
    pub file: FileName,
    pub content: OverlayContent,
}

#[derive(Debug, Clone)]
pub enum OverlayContent {
    Raster(RasterLayer),
    Points(PointLayer),
    Contours(ContourLayer),
}

/// Compact description of an overlay, without pixel or geometry data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlaySummary {
    pub file: FileName,
    pub slot: LayerSlot,
    pub bounds: Option<BoundingBox>,
    /// Pixels for rasters, markers for points, paths for contours
    pub element_count: usize,
}

impl Overlay {
    pub fn slot(&self) -> LayerSlot {
        match self.content {
            OverlayContent::Raster(_) => LayerSlot::Raster,
            OverlayContent::Points(_) => LayerSlot::Point,
            OverlayContent::Contours(_) => LayerSlot::Contour,
        }
    }

    /// Geographic extent, or `None` when the overlay has nothing to show.
    pub fn bounds(&self) -> Option<BoundingBox> {
        match &self.content {
            OverlayContent::Raster(layer) => Some(layer.raster.bounds),
            OverlayContent::Points(layer) => layer.bounds,
            OverlayContent::Contours(layer) => layer.bounds,
        }
    }

    pub fn element_count(&self) -> usize {
        match &self.content {
            OverlayContent::Raster(layer) => layer.raster.values.len(),
            OverlayContent::Points(layer) => layer.markers.len(),
            OverlayContent::Contours(layer) => layer.paths.len(),
        }
    }

    pub fn summary(&self) -> OverlaySummary {
        OverlaySummary {
            file: self.file.clone(),
            slot: self.slot(),
            bounds: self.bounds(),
            element_count: self.element_count(),
        }
    }
}

/// Decode `body` as the file type `slot` expects and apply its style.
pub fn build_overlay(
    slot: LayerSlot,
    file: &FileName,
    body: &[u8],
    styles: &OverlayStyles,
) -> ViewerResult<Overlay> {
    let content = match slot {
        LayerSlot::Raster => OverlayContent::Raster(RasterLayer {
            raster: decode_geotiff(body)?,
            options: styles.raster.clone(),
        }),
        LayerSlot::Point => {
            let geojson = parse_geojson(body)?;
            OverlayContent::Points(build_point_layer(&geojson, &styles.marker))
        }
        LayerSlot::Contour => {
            let geojson = parse_geojson(body)?;
            OverlayContent::Contours(build_contour_layer(&geojson, &styles.contour))
        }
    };

    Ok(Overlay {
        file: file.clone(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_overlay_point() {
        let body = br#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"z":42},"geometry":{"type":"Point","coordinates":[106.8,-6.2]}}
        ]}"#;
        let overlay = build_overlay(
            LayerSlot::Point,
            &FileName::from("b_point.geojson"),
            body,
            &OverlayStyles::default(),
        )
        .unwrap();

        assert_eq!(overlay.slot(), LayerSlot::Point);
        assert_eq!(overlay.element_count(), 1);
        assert_eq!(overlay.bounds(), Some(BoundingBox::from_point(106.8, -6.2)));
    }

    #[test]
    fn test_build_overlay_rejects_garbage_raster() {
        let result = build_overlay(
            LayerSlot::Raster,
            &FileName::from("a.tiff"),
            b"definitely not a tiff",
            &OverlayStyles::default(),
        );
        assert!(matches!(result, Err(map_common::ViewerError::Decode(_))));
    }
}
