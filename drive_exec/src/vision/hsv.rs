//! HSV colour masking
//!
//! Hue is stored in the half-degree convention (0 to 179) so thresholds tuned against OpenCV
//! masks can be used unchanged.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::{GrayImage, Luma, RgbImage};
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Inclusive HSV bounds, `[h, s, v]` with h in 0..=179.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HsvRange {
    pub low: [u8; 3],
    pub high: [u8; 3],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl HsvRange {
    /// Red road markings (crosswalk lines)
    pub const RED: HsvRange = HsvRange {
        low: [0, 50, 50],
        high: [10, 255, 255],
    };

    /// Blue parked cars, which frame every plate
    pub const BLUE: HsvRange = HsvRange {
        low: [110, 50, 50],
        high: [130, 255, 255],
    };

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.low[i] && hsv[i] <= self.high[i])
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Convert one RGB pixel to HSV.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let r = rgb[0] as f64;
    let g = rgb[1] as f64;
    let b = rgb[2] as f64;

    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = v - min;

    let s = if v > 0.0 { 255.0 * delta / v } else { 0.0 };

    let h_deg = if delta == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / delta
    } else if v == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let h_deg = if h_deg < 0.0 { h_deg + 360.0 } else { h_deg };

    [
        ((h_deg / 2.0).round() as u16 % 180) as u8,
        s.round() as u8,
        v as u8,
    ]
}

/// Build a binary mask (255 inside the range, 0 outside) of the frame.
pub fn in_range(frame: &RgbImage, range: &HsvRange) -> GrayImage {
    let mut mask = GrayImage::new(frame.width(), frame.height());

    for (x, y, px) in frame.enumerate_pixels() {
        if range.contains(rgb_to_hsv(px.0)) {
            mask.put_pixel(x, y, Luma([255]));
        }
    }

    mask
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_rgb_to_hsv() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 0]), [60, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [120, 255, 255]);
        assert_eq!(rgb_to_hsv([128, 128, 128]), [0, 0, 128]);
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
    }

    #[test]
    fn test_in_range() {
        let mut frame = RgbImage::from_pixel(4, 3, Rgb([200, 200, 200]));
        frame.put_pixel(1, 1, Rgb([220, 10, 10]));
        frame.put_pixel(2, 1, Rgb([10, 10, 220]));

        let red = in_range(&frame, &HsvRange::RED);
        assert_eq!(red.get_pixel(1, 1).0, [255]);
        assert_eq!(red.get_pixel(2, 1).0, [0]);
        assert_eq!(red.pixels().filter(|p| p.0[0] > 0).count(), 1);

        let blue = in_range(&frame, &HsvRange::BLUE);
        assert_eq!(blue.get_pixel(2, 1).0, [255]);
        assert_eq!(blue.pixels().filter(|p| p.0[0] > 0).count(), 1);
    }
}
