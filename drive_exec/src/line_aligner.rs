//! # Line aligner
//!
//! Estimates how the robot sits relative to a painted reference line ahead of it: whether the line
//! is rotated in the image (angular state) and whether it is above or below a target row (lateral
//! state). The estimate is stateless and uses only the strongest segment found.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serde::Deserialize;

use crate::vision::{
    in_range, Frame, HsvRange, PrincipalAxisDetector, Segment, SegmentDetector, SegmentParams,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LineAlignerParams {
    /// Colour of the reference line
    pub colour: HsvRange,

    /// Parameters of the segment detection
    pub segment: SegmentParams,

    /// Angles with an absolute value below this are centred.
    ///
    /// Units: degrees
    pub angle_tol_deg: f64,

    /// Image row the line's midpoint should sit on.
    ///
    /// Units: pixels
    pub target_row_px: f64,

    /// Half width of the band around the target row which is centred, exclusive.
    ///
    /// Units: pixels
    pub row_tol_px: f64,
}

/// Offset of the robot from the reference line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineOffset {
    pub angular: AlignState,
    pub lateral: AlignState,
}

pub struct LineAligner<D = PrincipalAxisDetector> {
    params: LineAlignerParams,
    detector: D,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignState {
    /// Negative angle, or line above the target row
    Low,

    Centre,

    /// Positive angle, or line below the target row
    High,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for LineAlignerParams {
    fn default() -> Self {
        Self {
            colour: HsvRange::RED,
            segment: SegmentParams {
                min_length_px: 100.0,
                max_gap_px: 80.0,
            },
            angle_tol_deg: 0.3,
            target_row_px: 445.0,
            row_tol_px: 5.0,
        }
    }
}

impl AlignState {
    /// The state as -1, 0 or +1
    pub fn as_sign(&self) -> f64 {
        match self {
            AlignState::Low => -1.0,
            AlignState::Centre => 0.0,
            AlignState::High => 1.0,
        }
    }
}

impl LineOffset {
    pub fn is_centred(&self) -> bool {
        self.angular == AlignState::Centre && self.lateral == AlignState::Centre
    }
}

impl LineAligner<PrincipalAxisDetector> {
    pub fn new(params: LineAlignerParams) -> Self {
        Self::with_detector(params, PrincipalAxisDetector::new(params.segment))
    }
}

impl<D: SegmentDetector> LineAligner<D> {
    pub fn with_detector(params: LineAlignerParams, detector: D) -> Self {
        Self { params, detector }
    }

    /// Estimate the offset from the reference line in this frame.
    ///
    /// Returns `None` if no usable line was found.
    pub fn estimate(&self, frame: &Frame) -> Option<LineOffset> {
        let mask = in_range(frame, &self.params.colour);
        let segment = self.detector.detect(&mask).into_iter().next()?;

        self.classify(&segment)
    }

    /// Classify a single segment, `None` if it is vertical.
    pub fn classify(&self, segment: &Segment) -> Option<LineOffset> {
        let dx = segment.x2 - segment.x1;
        if dx == 0.0 {
            return None;
        }

        let angle_deg = ((segment.y2 - segment.y1) / dx).atan().to_degrees();
        let row_offset = segment.mid_row() - self.params.target_row_px;

        trace!("Line angle {:.2} deg, row offset {:.1} px", angle_deg, row_offset);

        let angular = if angle_deg.abs() < self.params.angle_tol_deg {
            AlignState::Centre
        } else if angle_deg < 0.0 {
            AlignState::Low
        } else {
            AlignState::High
        };

        let lateral = if row_offset.abs() < self.params.row_tol_px {
            AlignState::Centre
        } else if row_offset < 0.0 {
            AlignState::Low
        } else {
            AlignState::High
        };

        Some(LineOffset { angular, lateral })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use image::{GrayImage, Rgb};

    struct FixedDetector(Vec<Segment>);

    impl SegmentDetector for FixedDetector {
        fn detect(&self, _mask: &GrayImage) -> Vec<Segment> {
            self.0.clone()
        }
    }

    fn aligner(segs: Vec<Segment>) -> LineAligner<FixedDetector> {
        LineAligner::with_detector(LineAlignerParams::default(), FixedDetector(segs))
    }

    fn blank() -> Frame {
        Frame::from_pixel(64, 48, Rgb([100, 100, 100]))
    }

    #[test]
    fn test_no_segment() {
        assert_eq!(aligner(vec![]).estimate(&blank()), None);

        let real = LineAligner::new(LineAlignerParams::default());
        assert_eq!(real.estimate(&blank()), None);
    }

    #[test]
    fn test_vertical_segment() {
        let seg = Segment::new(300.0, 100.0, 300.0, 500.0);
        assert_eq!(aligner(vec![seg]).estimate(&blank()), None);
    }

    #[test]
    fn test_centred() {
        let seg = Segment::new(100.0, 445.0, 900.0, 445.0);
        let off = aligner(vec![seg]).estimate(&blank()).unwrap();
        assert!(off.is_centred());
    }

    #[test]
    fn test_offsets() {
        let a = aligner(vec![]);

        // Rising to the right in image coordinates is a negative angle
        let off = a.classify(&Segment::new(0.0, 460.0, 800.0, 430.0)).unwrap();
        assert_eq!(off.angular, AlignState::Low);
        assert_eq!(off.lateral, AlignState::Centre);

        // Band edge is not centred
        let off = a.classify(&Segment::new(0.0, 450.0, 800.0, 450.0)).unwrap();
        assert_eq!(off.angular, AlignState::Centre);
        assert_eq!(off.lateral, AlignState::High);

        let off = a.classify(&Segment::new(0.0, 400.0, 800.0, 420.0)).unwrap();
        assert_eq!(off.angular, AlignState::High);
        assert_eq!(off.lateral, AlignState::Low);
    }

    #[test]
    fn test_strongest_segment_used() {
        let segs = vec![
            Segment::new(100.0, 445.0, 900.0, 445.0),
            Segment::new(100.0, 100.0, 900.0, 300.0),
        ];
        assert!(aligner(segs).estimate(&blank()).unwrap().is_centred());
    }

    #[test]
    fn test_painted_line() {
        let mut frame = Frame::from_pixel(1280, 720, Rgb([90, 90, 90]));
        for y in 443..448 {
            for x in 200..1000 {
                frame.put_pixel(x, y, Rgb([230, 20, 20]));
            }
        }

        let off = LineAligner::new(LineAlignerParams::default())
            .estimate(&frame)
            .unwrap();
        assert!(off.is_centred());
    }
}
