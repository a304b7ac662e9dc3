//! Grayscale crops and frame differencing

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::{imageops, GrayImage, RgbImage};
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A rectangular window expressed as fractions of the frame size, so that the same window can be
/// applied to frames of any resolution.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CropWindow {
    pub row_start: f64,
    pub row_end: f64,
    pub col_start: f64,
    pub col_end: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CropWindow {
    /// The whole frame
    pub const FULL: CropWindow = CropWindow {
        row_start: 0.0,
        row_end: 1.0,
        col_start: 0.0,
        col_end: 1.0,
    };

    /// Get the pixel bounds `(x, y, width, height)` of this window in a frame of the given size.
    ///
    /// Returns `None` if the window is empty.
    pub fn pixel_bounds(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let clamp = |f: f64, dim: u32| (f.max(0.0).min(1.0) * dim as f64).floor() as u32;

        let x0 = clamp(self.col_start, width);
        let x1 = clamp(self.col_end, width);
        let y0 = clamp(self.row_start, height);
        let y1 = clamp(self.row_end, height);

        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some((x0, y0, x1 - x0, y1 - y0))
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Colour crop of the frame, `None` if the window is empty.
pub fn crop(frame: &RgbImage, window: &CropWindow) -> Option<RgbImage> {
    let (x, y, w, h) = window.pixel_bounds(frame.width(), frame.height())?;
    Some(imageops::crop_imm(frame, x, y, w, h).to_image())
}

/// Grayscale crop of the frame, `None` if the window is empty.
pub fn crop_gray(frame: &RgbImage, window: &CropWindow) -> Option<GrayImage> {
    let (x, y, w, h) = window.pixel_bounds(frame.width(), frame.height())?;
    Some(imageops::grayscale(&imageops::crop_imm(frame, x, y, w, h)))
}

/// Mean of the squared per pixel difference of two equally sized grayscale images.
///
/// Returns `None` if the images differ in size or are empty.
pub fn mean_squared_diff(a: &GrayImage, b: &GrayImage) -> Option<f64> {
    if a.dimensions() != b.dimensions() {
        return None;
    }

    util::maths::mean_squared_diff(a.as_raw(), b.as_raw())
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn test_pixel_bounds() {
        let window = CropWindow {
            row_start: 0.25,
            row_end: 0.75,
            col_start: 0.25,
            col_end: 0.75,
        };
        assert_eq!(window.pixel_bounds(1280, 720), Some((320, 180, 640, 360)));

        let empty = CropWindow {
            row_start: 0.5,
            row_end: 0.5,
            ..CropWindow::FULL
        };
        assert_eq!(empty.pixel_bounds(1280, 720), None);
        assert_eq!(CropWindow::FULL.pixel_bounds(0, 0), None);
    }

    #[test]
    fn test_crop_gray() {
        let frame = RgbImage::from_pixel(10, 10, Rgb([90, 90, 90]));
        let window = CropWindow {
            row_start: 0.4,
            ..CropWindow::FULL
        };

        let gray = crop_gray(&frame, &window).unwrap();
        assert_eq!(gray.dimensions(), (10, 6));
        assert!(gray.pixels().all(|p| p.0[0] == 90));
    }

    #[test]
    fn test_mean_squared_diff() {
        let a = GrayImage::from_pixel(4, 4, Luma([10]));
        let b = GrayImage::from_pixel(4, 4, Luma([13]));
        let c = GrayImage::from_pixel(4, 2, Luma([13]));

        assert_eq!(mean_squared_diff(&a, &a), Some(0.0));
        assert_eq!(mean_squared_diff(&a, &b), Some(9.0));
        assert_eq!(mean_squared_diff(&a, &c), None);
    }
}
