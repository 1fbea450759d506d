use types::{DecodedImage, ErrorKind, Result};

use crate::decoder_trait::ImageDecoder;

/// Recognized-but-unsupported format: registered so the extension table in
/// the registry documents the full format list from spec §6, even where
/// decoding itself is outside this workspace's dependency budget.
pub struct StubDecoder {
    extensions: &'static [&'static str],
    label: &'static str,
}

impl StubDecoder {
    pub fn webp() -> Self {
        Self {
            extensions: &["webp"],
            label: "webp",
        }
    }

    pub fn gif() -> Self {
        Self {
            extensions: &["gif"],
            label: "gif",
        }
    }

    pub fn tiff() -> Self {
        Self {
            extensions: &["tif", "tiff"],
            label: "tiff",
        }
    }

    pub fn ico() -> Self {
        Self {
            extensions: &["ico"],
            label: "ico",
        }
    }

    pub fn mag() -> Self {
        Self {
            extensions: &["mag"],
            label: "mag",
        }
    }
}

impl ImageDecoder for StubDecoder {
    fn can_decode(&self, extension: &str) -> bool {
        self.extensions.contains(&extension)
    }

    fn decode(&self, _bytes: &[u8]) -> Result<DecodedImage> {
        Err(ErrorKind::UnsupportedFormat(self.label.to_string()))
    }

    fn name(&self) -> &'static str {
        self.label
    }
}
