use std::sync::Arc;

use types::{DecodedImage, ErrorKind, Result};

use crate::decoder_trait::ImageDecoder;

/// Extension → decoder dispatch (spec component C10). Same ordered-list
/// shape as `archive::HandlerRegistry`; the format table is small enough
/// that no LRU memoization is needed here.
pub struct DecoderRegistry {
    decoders: Vec<Arc<dyn ImageDecoder>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    pub fn register(&mut self, decoder: Arc<dyn ImageDecoder>) {
        self.decoders.push(decoder);
    }

    pub fn get_decoder(&self, extension: &str) -> Option<Arc<dyn ImageDecoder>> {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        self.decoders
            .iter()
            .find(|d| d.can_decode(&ext))
            .cloned()
    }

    pub fn decode(&self, extension: &str, bytes: &[u8]) -> Result<DecodedImage> {
        let decoder = self
            .get_decoder(extension)
            .ok_or_else(|| ErrorKind::UnsupportedFormat(extension.to_string()))?;
        decoder.decode(bytes)
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
