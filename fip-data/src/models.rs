//! Chart-ready view models.
//!
//! These are what the rendering side receives; they serialize to plain
//! JSON objects with the field names below.

use fip_core::spatial::Geometry;
use fip_core::Period;
use serde::Serialize;

/// One bar of a ranked breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryValue {
    pub category: String,
    pub value: f64,
}

/// One slice of a share breakdown; `share` is in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareSlice {
    pub category: String,
    pub value: f64,
    pub share: f64,
}

/// One scatter point: `x` is the denominator sum, `y` the ratio.
///
/// `clamped` is set when the point lay outside the display domain and was
/// pulled onto its edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioPoint {
    pub category: String,
    pub x: f64,
    pub y: f64,
    pub clamped: bool,
}

/// One region of a choropleth; `value` is `None` for regions without data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionValue {
    pub region: String,
    pub period: Period,
    pub value: Option<f64>,
    pub geometry: Geometry,
}

/// A titled choropleth for one measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionMap {
    pub title: String,
    pub measure: String,
    pub regions: Vec<RegionValue>,
}
