//! # Line segment detection
//!
//! A [`SegmentDetector`] turns a binary mask into straight line segments. The
//! [`PrincipalAxisDetector`] fits one segment to each connected region of the mask along the
//! region's principal axis, rejecting regions which are too short or which have gaps along the
//! axis larger than the configured maximum.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::GrayImage;
use nalgebra::{Matrix2, Vector2};
use serde::Deserialize;

use super::contour::components;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

pub trait SegmentDetector {
    /// Detect segments in the mask, strongest first.
    fn detect(&self, mask: &GrayImage) -> Vec<Segment>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A line segment in image coordinates (x right, y down), in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SegmentParams {
    /// Minimum length of a segment in pixels
    pub min_length_px: f64,

    /// Largest gap allowed between points along a segment in pixels
    pub max_gap_px: f64,
}

pub struct PrincipalAxisDetector {
    params: SegmentParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Segment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn length(&self) -> f64 {
        ((self.x2 - self.x1).powi(2) + (self.y2 - self.y1).powi(2)).sqrt()
    }

    /// Row of the segment's midpoint
    pub fn mid_row(&self) -> f64 {
        0.5 * (self.y1 + self.y2)
    }
}

impl PrincipalAxisDetector {
    pub fn new(params: SegmentParams) -> Self {
        Self { params }
    }

    /// Fit a segment to a single region, or `None` if the region does not form an acceptable
    /// segment.
    fn fit(&self, region: &[(u32, u32)]) -> Option<Segment> {
        if region.len() < 2 {
            return None;
        }

        let n = region.len() as f64;
        let centroid = region
            .iter()
            .fold(Vector2::zeros(), |acc: Vector2<f64>, &(x, y)| {
                acc + Vector2::new(x as f64, y as f64)
            })
            / n;

        let mut cov = Matrix2::<f64>::zeros();
        for &(x, y) in region {
            let d = Vector2::new(x as f64, y as f64) - centroid;
            cov += d * d.transpose();
        }
        cov /= n;

        let eigen = cov.symmetric_eigen();
        let major = if eigen.eigenvalues[0] >= eigen.eigenvalues[1] {
            0
        } else {
            1
        };
        let axis: Vector2<f64> = eigen.eigenvectors.column(major).into_owned();

        let mut proj: Vec<f64> = region
            .iter()
            .map(|&(x, y)| (Vector2::new(x as f64, y as f64) - centroid).dot(&axis))
            .collect();
        proj.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let largest_gap = proj
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(0.0f64, f64::max);
        if largest_gap > self.params.max_gap_px {
            return None;
        }

        let t_min = proj[0];
        let t_max = proj[proj.len() - 1];
        if t_max - t_min < self.params.min_length_px {
            return None;
        }

        let a = centroid + axis * t_min;
        let b = centroid + axis * t_max;

        // Order endpoints left to right
        let (a, b) = if a.x <= b.x { (a, b) } else { (b, a) };

        Some(Segment::new(a.x, a.y, b.x, b.y))
    }
}

impl SegmentDetector for PrincipalAxisDetector {
    fn detect(&self, mask: &GrayImage) -> Vec<Segment> {
        components(mask)
            .iter()
            .filter_map(|region| self.fit(region))
            .collect()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
