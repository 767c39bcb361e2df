//! Common test fixtures for geo-viewer tests.

/// Extent around Jakarta, `(min_lon, min_lat, max_lon, max_lat)`.
pub const JAKARTA: (f64, f64, f64, f64) = (106.5, -6.5, 107.0, -6.0);

/// Extent around Bandung, disjoint from [`JAKARTA`].
pub const BANDUNG: (f64, f64, f64, f64) = (107.5, -7.0, 107.75, -6.75);

/// A listing with one file per category plus one to ignore.
pub const SCENARIO_LISTING: [&str; 4] = [
    "a.tiff",
    "b_point.geojson",
    "c_contour.geojson",
    "readme.txt",
];

/// One point feature at (106.8, -6.2) with `z = 42`.
pub const SCENARIO_POINT_GEOJSON: &str = r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"z":42},"geometry":{"type":"Point","coordinates":[106.8,-6.2]}}]}"#;

/// Two contour lines at levels 10 and 20.
pub const SCENARIO_CONTOUR_GEOJSON: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": {"level": 10},
            "geometry": {"type": "LineString", "coordinates": [[106.6, -6.4], [106.7, -6.3], [106.8, -6.35]]}
        },
        {
            "type": "Feature",
            "properties": {"level": 20},
            "geometry": {"type": "MultiLineString", "coordinates": [[[106.65, -6.45], [106.9, -6.1]]]}
        }
    ]
}"#;

/// Feature collection with no features.
pub const EMPTY_FEATURE_COLLECTION: &str = r#"{"type":"FeatureCollection","features":[]}"#;
