//! GeoTIFF decoding.
//!
//! Only the first band is kept. Georeferencing comes from either the
//! ModelTransformation tag or the ModelTiepoint + ModelPixelScale pair; a
//! TIFF with neither cannot be placed on a map and is rejected.

use std::io::Cursor;

use map_common::{BoundingBox, RasterOptions, ViewerError, ViewerResult};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::TiffError;
use tracing::debug;

/// A raster overlay: decoded grid plus display options.
#[derive(Debug, Clone)]
pub struct RasterLayer {
    pub raster: DecodedRaster,
    pub options: RasterOptions,
}

/// Single-band grid with its geographic placement.
#[derive(Debug, Clone)]
pub struct DecodedRaster {
    pub width: u32,
    pub height: u32,
    pub bounds: BoundingBox,
    /// Row-major values, row 0 at the top
    pub values: Vec<f32>,
    pub nodata: Option<f64>,
    /// Min and max over valid (non-nodata, non-NaN) cells
    pub value_range: Option<(f32, f32)>,
}

/// Affine pixel-to-model transform.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GeoTransform {
    origin_x: f64,
    origin_y: f64,
    pixel_width: f64,
    pixel_height: f64,
    rotation_x: f64,
    rotation_y: f64,
}

impl GeoTransform {
    fn from_tiepoint(tiepoint: &[f64], scale: &[f64]) -> ViewerResult<Self> {
        if tiepoint.len() < 6 || scale.len() < 2 {
            return Err(ViewerError::Decode(format!(
                "malformed georeferencing: {} tiepoint values, {} scale values",
                tiepoint.len(),
                scale.len()
            )));
        }
        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        let (sx, sy) = (scale[0], scale[1]);

        Ok(Self {
            origin_x: x - i * sx,
            origin_y: y + j * sy,
            pixel_width: sx,
            pixel_height: -sy,
            rotation_x: 0.0,
            rotation_y: 0.0,
        })
    }

    fn from_matrix(matrix: &[f64]) -> ViewerResult<Self> {
        if matrix.len() < 16 {
            return Err(ViewerError::Decode(format!(
                "model transformation needs 16 values, got {}",
                matrix.len()
            )));
        }
        Ok(Self {
            origin_x: matrix[3],
            origin_y: matrix[7],
            pixel_width: matrix[0],
            pixel_height: matrix[5],
            rotation_x: matrix[1],
            rotation_y: matrix[4],
        })
    }

    fn pixel_to_geo(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.origin_x + col * self.pixel_width + row * self.rotation_x;
        let y = self.origin_y + col * self.rotation_y + row * self.pixel_height;
        (x, y)
    }

    fn bounds(&self, width: u32, height: u32) -> Option<BoundingBox> {
        let (w, h) = (width as f64, height as f64);
        BoundingBox::from_points([
            self.pixel_to_geo(0.0, 0.0),
            self.pixel_to_geo(w, 0.0),
            self.pixel_to_geo(0.0, h),
            self.pixel_to_geo(w, h),
        ])
    }
}

fn tiff_error(err: TiffError) -> ViewerError {
    ViewerError::Decode(format!("TIFF: {}", err))
}

/// Decode GeoTIFF bytes into a single-band raster.
pub fn decode_geotiff(bytes: &[u8]) -> ViewerResult<DecodedRaster> {
    let mut decoder = Decoder::new(Cursor::new(bytes)).map_err(tiff_error)?;
    let (width, height) = decoder.dimensions().map_err(tiff_error)?;
    if width == 0 || height == 0 {
        return Err(ViewerError::Decode("raster has no pixels".to_string()));
    }

    let transform = read_geotransform(&mut decoder)?;
    let nodata = read_nodata(&mut decoder)?;
    let samples = to_f32(decoder.read_image().map_err(tiff_error)?);

    let pixel_count = width as usize * height as usize;
    if samples.len() < pixel_count {
        return Err(ViewerError::Decode(format!(
            "expected {} pixels, decoded {}",
            pixel_count,
            samples.len()
        )));
    }
    let bands = samples.len() / pixel_count;
    let values: Vec<f32> = if bands > 1 {
        samples.into_iter().step_by(bands).take(pixel_count).collect()
    } else {
        samples
    };

    let bounds = transform
        .bounds(width, height)
        .filter(BoundingBox::is_valid)
        .ok_or_else(|| ViewerError::Decode("georeferencing yields no finite bounds".to_string()))?;
    let value_range = value_range(&values, nodata);

    debug!(width, height, bands, ?bounds, "Decoded GeoTIFF");

    Ok(DecodedRaster {
        width,
        height,
        bounds,
        values,
        nodata,
        value_range,
    })
}

fn read_f64_tag(decoder: &mut Decoder<Cursor<&[u8]>>, tag: Tag) -> ViewerResult<Option<Vec<f64>>> {
    match decoder.find_tag(tag).map_err(tiff_error)? {
        Some(value) => value.into_f64_vec().map(Some).map_err(tiff_error),
        None => Ok(None),
    }
}

fn read_geotransform(decoder: &mut Decoder<Cursor<&[u8]>>) -> ViewerResult<GeoTransform> {
    if let Some(matrix) = read_f64_tag(decoder, Tag::ModelTransformationTag)? {
        return GeoTransform::from_matrix(&matrix);
    }

    let tiepoint = read_f64_tag(decoder, Tag::ModelTiepointTag)?;
    let scale = read_f64_tag(decoder, Tag::ModelPixelScaleTag)?;
    match (tiepoint, scale) {
        (Some(tiepoint), Some(scale)) => GeoTransform::from_tiepoint(&tiepoint, &scale),
        _ => Err(ViewerError::Decode(
            "TIFF carries no georeferencing tags".to_string(),
        )),
    }
}

/// GDAL stores nodata as an ASCII tag.
fn read_nodata(decoder: &mut Decoder<Cursor<&[u8]>>) -> ViewerResult<Option<f64>> {
    let Some(value) = decoder.find_tag(Tag::GdalNodata).map_err(tiff_error)? else {
        return Ok(None);
    };
    let text = value.into_string().map_err(tiff_error)?;
    Ok(text.trim_matches(char::from(0)).trim().parse::<f64>().ok())
}

fn to_f32(data: DecodingResult) -> Vec<f32> {
    match data {
        DecodingResult::U8(values) => values.into_iter().map(f32::from).collect(),
        DecodingResult::U16(values) => values.into_iter().map(f32::from).collect(),
        DecodingResult::U32(values) => values.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(values) => values.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(values) => values.into_iter().map(f32::from).collect(),
        DecodingResult::I16(values) => values.into_iter().map(f32::from).collect(),
        DecodingResult::I32(values) => values.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(values) => values.into_iter().map(|v| v as f32).collect(),
        DecodingResult::F32(values) => values,
        DecodingResult::F64(values) => values.into_iter().map(|v| v as f32).collect(),
    }
}

fn is_valid_value(value: f32, nodata: Option<f64>) -> bool {
    !value.is_nan() && nodata.map_or(true, |nd| (value as f64 - nd).abs() > f64::EPSILON)
}

fn value_range(values: &[f32], nodata: Option<f64>) -> Option<(f32, f32)> {
    values
        .iter()
        .copied()
        .filter(|v| is_valid_value(*v, nodata))
        .fold(None, |acc, v| match acc {
            Some((min, max)) => Some((f32::min(min, v), f32::max(max, v))),
            None => Some((v, v)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiepoint_transform_bounds() {
        let transform = GeoTransform::from_tiepoint(
            &[0.0, 0.0, 0.0, 106.0, -6.0, 0.0],
            &[0.5, 0.25, 0.0],
        )
        .unwrap();
        let bounds = transform.bounds(4, 4).unwrap();
        assert_eq!(bounds, BoundingBox::new(106.0, -7.0, 108.0, -6.0));
    }

    #[test]
    fn test_tiepoint_with_pixel_offset() {
        let transform =
            GeoTransform::from_tiepoint(&[2.0, 1.0, 0.0, 10.0, 20.0, 0.0], &[1.0, 1.0, 0.0]).unwrap();
        assert_eq!(transform.pixel_to_geo(0.0, 0.0), (8.0, 21.0));
    }

    #[test]
    fn test_matrix_transform() {
        let mut matrix = [0.0; 16];
        matrix[0] = 0.1;
        matrix[3] = 100.0;
        matrix[5] = -0.1;
        matrix[7] = 0.0;
        matrix[15] = 1.0;
        let transform = GeoTransform::from_matrix(&matrix).unwrap();
        assert_eq!(transform.bounds(10, 10).unwrap(), BoundingBox::new(100.0, -1.0, 101.0, 0.0));
    }

    #[test]
    fn test_value_range_skips_nodata() {
        let values = [1.0, -9999.0, f32::NAN, 5.0];
        assert_eq!(value_range(&values, Some(-9999.0)), Some((1.0, 5.0)));
        assert_eq!(value_range(&[-9999.0], Some(-9999.0)), None);
    }
}
