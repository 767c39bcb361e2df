//! Decoding of generated GeoTIFF and GeoJSON bodies.

use layer_controller::decode::{
    build_contour_layer, build_point_layer, decode_geotiff, parse_geojson,
};
use map_common::{BoundingBox, ContourStyle, MarkerStyle, ViewerError};
use test_utils::{
    assert_approx_eq, assert_extent_approx_eq, contour_feature_collection, create_test_grid,
    encode_geotiff, encode_plain_tiff, point_feature_collection, JAKARTA,
    SCENARIO_CONTOUR_GEOJSON, SCENARIO_POINT_GEOJSON,
};

fn extent(bbox: BoundingBox) -> (f64, f64, f64, f64) {
    (bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y)
}

// ============================================================================
// GeoTIFF
// ============================================================================

#[test]
fn test_decode_geotiff_grid_and_bounds() {
    let bytes = encode_geotiff(8, 4, &create_test_grid(8, 4), JAKARTA, None);
    let raster = decode_geotiff(&bytes).unwrap();

    assert_eq!((raster.width, raster.height), (8, 4));
    assert_extent_approx_eq!(extent(raster.bounds), JAKARTA, 1e-9);
    assert_eq!(raster.values[1], 1000.0);
    assert_eq!(raster.values[8], 1.0);
    assert_eq!(raster.values.len(), 32);
    assert_eq!(raster.value_range, Some((0.0, 7003.0)));
}

#[test]
fn test_decode_geotiff_nodata() {
    let values = [1.0, -9999.0, 3.0, 4.0];
    let bytes = encode_geotiff(2, 2, &values, JAKARTA, Some(-9999.0));
    let raster = decode_geotiff(&bytes).unwrap();

    assert_eq!(raster.nodata, Some(-9999.0));
    assert_eq!(raster.values[1], -9999.0);
    assert_eq!(raster.value_range, Some((1.0, 4.0)));
}

#[test]
fn test_decode_requires_georeferencing() {
    let bytes = encode_plain_tiff(2, 2, &[0.0; 4]);
    assert!(matches!(decode_geotiff(&bytes), Err(ViewerError::Decode(_))));
}

#[test]
fn test_decode_truncated_tiff() {
    let bytes = encode_geotiff(4, 4, &create_test_grid(4, 4), JAKARTA, None);
    assert!(decode_geotiff(&bytes[..bytes.len() / 3]).is_err());
}

// ============================================================================
// GeoJSON
// ============================================================================

#[test]
fn test_point_layer_scenario() {
    let geojson = parse_geojson(SCENARIO_POINT_GEOJSON.as_bytes()).unwrap();
    let layer = build_point_layer(&geojson, &MarkerStyle::default());

    assert_eq!(layer.markers.len(), 1);
    assert_eq!(layer.markers[0].popup, "Value: 42");
    assert_eq!(layer.markers[0].position, (106.8, -6.2));
}

#[test]
fn test_point_layer_bounds_and_fractional_values() {
    let body = point_feature_collection(&[(106.6, -6.4, 12.5), (106.9, -6.1, 7.0)]);
    let geojson = parse_geojson(body.as_bytes()).unwrap();
    let layer = build_point_layer(&geojson, &MarkerStyle::default());

    let popups: Vec<_> = layer.markers.iter().map(|m| m.popup.as_str()).collect();
    assert_eq!(popups, vec!["Value: 12.5", "Value: 7"]);

    let bounds = layer.bounds.unwrap();
    assert_approx_eq!(bounds.min_x, 106.6, 1e-12);
    assert_approx_eq!(bounds.max_y, -6.1, 1e-12);
}

#[test]
fn test_point_layer_missing_value() {
    let geojson = parse_geojson(
        br#"{"type":"Feature","properties":{},"geometry":{"type":"MultiPoint","coordinates":[[1,2],[3,4]]}}"#,
    )
    .unwrap();
    let layer = build_point_layer(&geojson, &MarkerStyle::default());

    assert_eq!(layer.markers.len(), 2);
    assert!(layer.markers.iter().all(|m| m.popup == "Value: undefined"));
}

#[test]
fn test_point_layer_ignores_lines() {
    let geojson = parse_geojson(SCENARIO_CONTOUR_GEOJSON.as_bytes()).unwrap();
    let layer = build_point_layer(&geojson, &MarkerStyle::default());
    assert!(layer.markers.is_empty());
    assert!(layer.bounds.is_none());
}

#[test]
fn test_contour_layer_levels() {
    let geojson = parse_geojson(SCENARIO_CONTOUR_GEOJSON.as_bytes()).unwrap();
    let layer = build_contour_layer(&geojson, &ContourStyle::default());

    let levels: Vec<_> = layer.paths.iter().map(|p| p.level).collect();
    assert_eq!(levels, vec![Some(10.0), Some(20.0)]);
    assert!(layer.paths.iter().all(|p| !p.closed));
    assert_eq!(layer.bounds, Some(BoundingBox::new(106.6, -6.45, 106.9, -6.1)));
}

#[test]
fn test_contour_layer_drops_degenerate_lines() {
    let body = contour_feature_collection(&[vec![(0.0, 0.0)], vec![(0.0, 0.0), (1.0, 1.0)]]);
    let geojson = parse_geojson(body.as_bytes()).unwrap();
    let layer = build_contour_layer(&geojson, &ContourStyle::default());
    assert_eq!(layer.paths.len(), 1);
}

#[test]
fn test_malformed_geojson() {
    assert!(parse_geojson(b"{\"type\": \"FeatureCollection\"").is_err());
    assert!(parse_geojson(b"[1, 2, 3]").is_err());
}
