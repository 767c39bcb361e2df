//! Display styles for the overlay layers.
//!
//! Defaults match the viewer's fixed presentation: rasters at 70% opacity
//! tiled at 256px, point markers labelled with their `z` value, and contours
//! drawn as 2px red lines. The service config may override them.

use serde::{Deserialize, Serialize};

/// Color given either as a CSS string ("red", "#ff0000") or explicit RGBA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Rgba { r: u8, g: u8, b: u8, a: u8 },
    Css(String),
}

impl Color {
    pub fn named(name: impl Into<String>) -> Self {
        Color::Css(name.into())
    }

    /// Convert to RGBA tuple.
    pub fn to_rgba(&self) -> (u8, u8, u8, u8) {
        match self {
            Color::Rgba { r, g, b, a } => (*r, *g, *b, *a),
            Color::Css(s) if s.starts_with('#') => parse_hex_color(s),
            Color::Css(s) => named_color(s),
        }
    }

    /// CSS representation handed to the renderer.
    pub fn to_css(&self) -> String {
        match self {
            Color::Css(s) => s.clone(),
            Color::Rgba { r, g, b, a } if *a == 255 => format!("#{:02x}{:02x}{:02x}", r, g, b),
            Color::Rgba { r, g, b, a } => format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a),
        }
    }
}

fn parse_hex_color(s: &str) -> (u8, u8, u8, u8) {
    let s = s.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>, default: u8| {
        s.get(range)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(default)
    };

    match s.len() {
        6 => (channel(0..2, 0), channel(2..4, 0), channel(4..6, 0), 255),
        8 => (
            channel(0..2, 0),
            channel(2..4, 0),
            channel(4..6, 0),
            channel(6..8, 255),
        ),
        _ => (0, 0, 0, 255),
    }
}

fn named_color(name: &str) -> (u8, u8, u8, u8) {
    match name.to_lowercase().as_str() {
        "transparent" => (0, 0, 0, 0),
        "black" => (0, 0, 0, 255),
        "white" => (255, 255, 255, 255),
        "red" => (255, 0, 0, 255),
        "green" => (0, 128, 0, 255),
        "blue" => (0, 0, 255, 255),
        "yellow" => (255, 255, 0, 255),
        "orange" => (255, 165, 0, 255),
        "purple" => (128, 0, 128, 255),
        "gray" | "grey" => (128, 128, 128, 255),
        _ => (0, 0, 0, 255),
    }
}

/// Raster overlay display options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterOptions {
    /// Layer opacity in [0, 1]
    pub opacity: f64,
    /// Tile resolution in pixels
    pub resolution: u32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            opacity: 0.7,
            resolution: 256,
        }
    }
}

/// Point marker popup configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    /// Feature property shown in the popup
    pub value_property: String,
    /// Popup text before the value
    pub popup_label: String,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            value_property: "z".to_string(),
            popup_label: "Value".to_string(),
        }
    }
}

impl MarkerStyle {
    pub fn popup_text(&self, value: &str) -> String {
        format!("{}: {}", self.popup_label, value)
    }
}

/// Contour line style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourStyle {
    pub color: Color,
    /// Stroke weight in pixels
    pub weight: f64,
}

impl Default for ContourStyle {
    fn default() -> Self {
        Self {
            color: Color::named("red"),
            weight: 2.0,
        }
    }
}

/// Styles for all three overlay kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyles {
    pub raster: RasterOptions,
    pub marker: MarkerStyle,
    pub contour: ContourStyle,
}

impl OverlayStyles {
    /// Reject values a renderer cannot honor.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.raster.opacity) {
            return Err(format!(
                "raster opacity must be within [0, 1], got {}",
                self.raster.opacity
            ));
        }
        if self.raster.resolution == 0 {
            return Err("raster resolution must be positive".to_string());
        }
        if !(self.contour.weight > 0.0) {
            return Err(format!(
                "contour weight must be positive, got {}",
                self.contour.weight
            ));
        }
        Ok(())
    }
}
