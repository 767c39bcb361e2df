//! Shared test utilities for the geo-viewer workspace.
//!
//! This crate provides common testing infrastructure including:
//! - GeoTIFF and GeoJSON body generators
//! - Common listings and extents
//! - Temporary data directories
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod data_dir;
pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use data_dir::*;
pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(106.80001_f64, 106.8_f64, 0.001_f64); // passes
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Approximate equality of two `(min_x, min_y, max_x, max_y)` extents.
///
/// ```ignore
/// use test_utils::assert_extent_approx_eq;
///
/// assert_extent_approx_eq!((bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y), JAKARTA, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_extent_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (l0, l1, l2, l3): (f64, f64, f64, f64) = $left;
        let (r0, r1, r2, r3): (f64, f64, f64, f64) = $right;
        $crate::assert_approx_eq!(l0, r0, $epsilon);
        $crate::assert_approx_eq!(l1, r1, $epsilon);
        $crate::assert_approx_eq!(l2, r2, $epsilon);
        $crate::assert_approx_eq!(l3, r3, $epsilon);
    }};
}
