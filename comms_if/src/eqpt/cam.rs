//! # Camera Equipment Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{serde::ts_milliseconds, DateTime, Utc};
use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single serialisable camera frame, as published by the simulator bridge.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CamFrame {
    /// UTC timestamp at which the frame was acquired
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// The format of this frame
    pub format: ImageFormat,

    /// The formatted image data, encoded in base64
    pub b64_data: String,
}

/// A decoded camera frame
#[derive(Clone)]
pub struct CamImage {
    /// UTC timestamp at which the frame was acquired
    pub timestamp: DateTime<Utc>,

    /// The image itself, always 3 channel colour
    pub image: RgbImage,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible formats for camera images. This is used rather than image::ImageFormat to:
///     1. Restrict the formats that can be sent back and forth
///     2. Allow serialisation as image::ImageFormat does not implement serde.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq)]
pub enum ImageFormat {
    /// PNG image
    Png,

    /// JPEG image with a quality value between 1 and 100, where 100 is best.
    Jpeg(u8),
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Failed to decode frame data from base64: {0}")]
    Base64DecodeError(base64::DecodeError),

    #[error("Failed to decode or encode the image: {0}")]
    ImageError(image::ImageError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CamFrame {
    /// Convert this camera frame into a camera image
    pub fn to_cam_image(&self) -> Result<CamImage, FrameError> {
        let bytes = base64::decode(&self.b64_data).map_err(FrameError::Base64DecodeError)?;

        let format = match self.format {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg(_) => image::ImageFormat::Jpeg,
        };

        let image = image::load_from_memory_with_format(&bytes, format)
            .map_err(FrameError::ImageError)?
            .to_rgb8();

        Ok(CamImage {
            timestamp: self.timestamp,
            image,
        })
    }
}

impl CamImage {
    /// Convert this camera image into a camera frame with the given format
    pub fn to_cam_frame(&self, format: ImageFormat) -> Result<CamFrame, FrameError> {
        // Write data to the buffer
        let mut data = Vec::<u8>::new();

        // Get the output format type
        let output_format = match format {
            ImageFormat::Png => image::ImageOutputFormat::Png,
            ImageFormat::Jpeg(q) => image::ImageOutputFormat::Jpeg(q),
        };

        DynamicImage::ImageRgb8(self.image.clone())
            .write_to(&mut data, output_format)
            .map_err(FrameError::ImageError)?;

        Ok(CamFrame {
            timestamp: self.timestamp,
            format,
            b64_data: base64::encode(&data),
        })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_png_frame_is_lossless() -> Result<(), FrameError> {
        let mut image = RgbImage::from_pixel(8, 6, Rgb([10, 20, 30]));
        image.put_pixel(3, 2, Rgb([255, 0, 0]));

        let cam_image = CamImage {
            timestamp: Utc::now(),
            image: image.clone(),
        };

        let decoded = cam_image.to_cam_frame(ImageFormat::Png)?.to_cam_image()?;

        assert_eq!(decoded.image, image);

        Ok(())
    }

    #[test]
    fn test_malformed_frame() {
        let frame = CamFrame {
            timestamp: Utc::now(),
            format: ImageFormat::Png,
            b64_data: "not base 64!".into(),
        };
        assert!(matches!(
            frame.to_cam_image(),
            Err(FrameError::Base64DecodeError(_))
        ));

        let frame = CamFrame {
            timestamp: Utc::now(),
            format: ImageFormat::Png,
            b64_data: base64::encode(b"definitely not a png"),
        };
        assert!(matches!(frame.to_cam_image(), Err(FrameError::ImageError(_))));
    }
}
