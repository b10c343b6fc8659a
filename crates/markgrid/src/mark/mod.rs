//! Mark-detection primitives (circle proposals, dedup, fixed-offset
//! sampling) independent of orchestration.
//!
//! The `pipeline` module owns the high-level call order. This module
//! provides the reusable building blocks that turn a located region into a
//! list of candidate bubble positions.

pub(crate) mod dedup;
pub(crate) mod fixed_offset;
pub(crate) mod proposal;

pub use dedup::merge_overlapping;
pub use proposal::detect_circles;

/// A candidate bubble position in page coordinates.
///
/// Produced by detection, by dedup averaging, or synthesized by the column
/// mapper when a grid slot has no detection.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Circle {
    /// Center (x, y) in page pixels.
    pub center: [f32; 2],
    /// Radius in pixels.
    pub radius: f32,
}

/// Mean radius of a detection set, or `None` when empty.
pub(crate) fn mean_radius(circles: &[Circle]) -> Option<f32> {
    if circles.is_empty() {
        return None;
    }
    Some(circles.iter().map(|c| c.radius).sum::<f32>() / circles.len() as f32)
}
