//! Generators for synthetic raster and vector file bodies.

use std::io::Cursor;

use serde_json::json;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`, in row-major order.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Encodes a single-band float GeoTIFF covering `extent`
/// (`(min_lon, min_lat, max_lon, max_lat)`), georeferenced with a tiepoint
/// at the top-left corner and a pixel scale.
///
/// # Panics
///
/// Panics if `values` does not hold `width * height` cells.
pub fn encode_geotiff(
    width: u32,
    height: u32,
    values: &[f32],
    extent: (f64, f64, f64, f64),
    nodata: Option<f64>,
) -> Vec<u8> {
    let (min_x, min_y, max_x, max_y) = extent;
    let scale = [
        (max_x - min_x) / width as f64,
        (max_y - min_y) / height as f64,
        0.0,
    ];
    let tiepoint = [0.0, 0.0, 0.0, min_x, max_y, 0.0];

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut cursor).expect("create TIFF encoder");
        let mut image = encoder
            .new_image::<colortype::Gray32Float>(width, height)
            .expect("create TIFF image");
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &scale[..])
            .expect("write pixel scale");
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
            .expect("write tiepoint");
        if let Some(nodata) = nodata {
            image
                .encoder()
                .write_tag(Tag::GdalNodata, nodata.to_string().as_str())
                .expect("write nodata");
        }
        image.write_data(values).expect("write TIFF data");
    }
    cursor.into_inner()
}

/// Encodes a TIFF without any georeferencing tags.
pub fn encode_plain_tiff(width: u32, height: u32, values: &[f32]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut cursor).expect("create TIFF encoder");
        encoder
            .write_image::<colortype::Gray32Float>(width, height, values)
            .expect("write TIFF image");
    }
    cursor.into_inner()
}

/// A 4x4 GeoTIFF over `extent` filled with [`create_test_grid`] values.
pub fn sample_geotiff(extent: (f64, f64, f64, f64)) -> Vec<u8> {
    encode_geotiff(4, 4, &create_test_grid(4, 4), extent, None)
}

/// Point FeatureCollection, one feature per `(lon, lat, z)`.
pub fn point_feature_collection(points: &[(f64, f64, f64)]) -> String {
    let features: Vec<_> = points
        .iter()
        .map(|(lon, lat, z)| {
            json!({
                "type": "Feature",
                "properties": { "z": z },
                "geometry": { "type": "Point", "coordinates": [lon, lat] }
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features }).to_string()
}

/// Contour FeatureCollection, one LineString feature per line.
pub fn contour_feature_collection(lines: &[Vec<(f64, f64)>]) -> String {
    let features: Vec<_> = lines
        .iter()
        .map(|line| {
            let coordinates: Vec<[f64; 2]> = line.iter().map(|(x, y)| [*x, *y]).collect();
            json!({
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "LineString", "coordinates": coordinates }
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features }).to_string()
}
