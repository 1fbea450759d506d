use image::ImageFormat;
use types::{DecodedImage, ErrorKind, Result};

use crate::decoder_trait::ImageDecoder;

/// Decodes the formats `image` supports with this workspace's feature set:
/// PNG, JPEG, BMP and the PPM/PGM/PBM (PNM) family.
pub struct RasterDecoder {
    extensions: &'static [&'static str],
    format: ImageFormat,
    label: &'static str,
}

impl RasterDecoder {
    pub fn png() -> Self {
        Self {
            extensions: &["png"],
            format: ImageFormat::Png,
            label: "png",
        }
    }

    pub fn jpeg() -> Self {
        Self {
            extensions: &["jpg", "jpeg"],
            format: ImageFormat::Jpeg,
            label: "jpeg",
        }
    }

    pub fn bmp() -> Self {
        Self {
            extensions: &["bmp"],
            format: ImageFormat::Bmp,
            label: "bmp",
        }
    }

    pub fn pnm() -> Self {
        Self {
            extensions: &["ppm", "pgm", "pbm"],
            format: ImageFormat::Pnm,
            label: "pnm",
        }
    }
}

impl ImageDecoder for RasterDecoder {
    fn can_decode(&self, extension: &str) -> bool {
        self.extensions.contains(&extension)
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage> {
        let image = image::load_from_memory_with_format(bytes, self.format).map_err(|e| {
            ErrorKind::Decode {
                format: self.label.to_string(),
                reason: e.to_string(),
            }
        })?;
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(DecodedImage {
            width,
            height,
            channels: 3,
            pixels: rgb.into_raw(),
        })
    }

    fn name(&self) -> &'static str {
        self.label
    }
}
