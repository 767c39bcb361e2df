//! GeoJSON point and contour layers.

use geojson::{Feature, GeoJson, Geometry, Value};
use map_common::{BoundingBox, ContourStyle, MarkerStyle, ViewerError, ViewerResult};
use serde_json::Value as JsonValue;
use tracing::debug;

/// One marker per point position.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// `(lon, lat)`
    pub position: (f64, f64),
    pub popup: String,
}

#[derive(Debug, Clone, Default)]
pub struct PointLayer {
    pub markers: Vec<Marker>,
    pub bounds: Option<BoundingBox>,
}

/// A single polyline or polygon ring.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourPath {
    pub coordinates: Vec<(f64, f64)>,
    /// Polygon rings are closed, line strings are not
    pub closed: bool,
    /// Contour level from the `level` or `z` property, when present
    pub level: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ContourLayer {
    pub paths: Vec<ContourPath>,
    pub style: ContourStyle,
    pub bounds: Option<BoundingBox>,
}

/// Parse a GeoJSON body (FeatureCollection, Feature or bare Geometry).
pub fn parse_geojson(body: &[u8]) -> ViewerResult<GeoJson> {
    let text = std::str::from_utf8(body)
        .map_err(|e| ViewerError::Decode(format!("GeoJSON is not UTF-8: {}", e)))?;
    text.parse::<GeoJson>()
        .map_err(|e| ViewerError::Decode(format!("invalid GeoJSON: {}", e)))
}

/// Visit each feature with its geometry. Bare geometries have no properties.
fn for_each_geometry<'a>(
    geojson: &'a GeoJson,
    mut visit: impl FnMut(Option<&'a Feature>, &'a Geometry),
) {
    match geojson {
        GeoJson::FeatureCollection(collection) => {
            for feature in &collection.features {
                if let Some(geometry) = &feature.geometry {
                    visit(Some(feature), geometry);
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geometry) = &feature.geometry {
                visit(Some(feature), geometry);
            }
        }
        GeoJson::Geometry(geometry) => visit(None, geometry),
    }
}

fn to_xy(position: &[f64]) -> Option<(f64, f64)> {
    match position {
        [x, y, ..] if x.is_finite() && y.is_finite() => Some((*x, *y)),
        _ => None,
    }
}

/// Render a property value the way a template literal would.
fn display_property(value: Option<&JsonValue>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(value) => js_string(value),
    }
}

fn js_string(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => js_number(n),
        JsonValue::String(s) => s.clone(),
        // Array elements join with commas; null elements render empty
        JsonValue::Array(items) => items
            .iter()
            .map(|item| match item {
                JsonValue::Null => String::new(),
                other => js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        JsonValue::Object(_) => "[object Object]".to_string(),
    }
}

fn js_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    let Some(f) = n.as_f64() else {
        return n.to_string();
    };
    if f == 0.0 {
        "0".to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e21 {
        // f64 Display never uses an exponent and drops the fraction of integral values
        format!("{}", f)
    } else {
        let text = n.to_string();
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => text,
        }
    }
}

fn collect_points(value: &Value, out: &mut Vec<(f64, f64)>) {
    match value {
        Value::Point(position) => out.extend(to_xy(position)),
        Value::MultiPoint(positions) => out.extend(positions.iter().filter_map(|p| to_xy(p))),
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                collect_points(&geometry.value, out);
            }
        }
        _ => {}
    }
}

/// Build one marker per point, each with a `"<label>: <value>"` popup.
pub fn build_point_layer(geojson: &GeoJson, style: &MarkerStyle) -> PointLayer {
    let mut markers = Vec::new();
    let mut skipped = 0usize;

    for_each_geometry(geojson, |feature, geometry| {
        let mut positions = Vec::new();
        collect_points(&geometry.value, &mut positions);
        if positions.is_empty() {
            skipped += 1;
            return;
        }

        let value = feature.and_then(|f| f.property(&style.value_property));
        let popup = style.popup_text(&display_property(value));
        markers.extend(positions.into_iter().map(|position| Marker {
            position,
            popup: popup.clone(),
        }));
    });

    if skipped > 0 {
        debug!(skipped, "Ignored non-point geometries in point layer");
    }

    let bounds = BoundingBox::from_points(markers.iter().map(|m| m.position));
    PointLayer { markers, bounds }
}

fn line(positions: &[Vec<f64>], closed: bool, level: Option<f64>) -> Option<ContourPath> {
    let coordinates: Vec<(f64, f64)> = positions.iter().filter_map(|p| to_xy(p)).collect();
    if coordinates.len() < 2 {
        return None;
    }
    Some(ContourPath {
        coordinates,
        closed,
        level,
    })
}

fn collect_paths(value: &Value, level: Option<f64>, out: &mut Vec<ContourPath>) {
    match value {
        Value::LineString(positions) => out.extend(line(positions, false, level)),
        Value::MultiLineString(lines) => {
            out.extend(lines.iter().filter_map(|l| line(l, false, level)));
        }
        Value::Polygon(rings) => out.extend(rings.iter().filter_map(|r| line(r, true, level))),
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                out.extend(rings.iter().filter_map(|r| line(r, true, level)));
            }
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                collect_paths(&geometry.value, level, out);
            }
        }
        Value::Point(_) | Value::MultiPoint(_) => {}
    }
}

/// Build styled line/polygon paths from every non-point geometry.
pub fn build_contour_layer(geojson: &GeoJson, style: &ContourStyle) -> ContourLayer {
    let mut paths = Vec::new();

    for_each_geometry(geojson, |feature, geometry| {
        let level = feature.and_then(|f| {
            f.property("level")
                .or_else(|| f.property("z"))
                .and_then(JsonValue::as_f64)
        });
        collect_paths(&geometry.value, level, &mut paths);
    });

    let bounds = BoundingBox::from_points(paths.iter().flat_map(|p| p.coordinates.iter().copied()));
    ContourLayer {
        paths,
        style: style.clone(),
        bounds,
    }
}
