use types::{DecodedImage, Result};

/// One image format implementation (spec component C10).
///
/// Mirrors the shape of `archive::ArchiveHandler`: a cheap extension check
/// plus the actual decode, so the registry can dispatch without opening the
/// file twice.
pub trait ImageDecoder: Send + Sync {
    fn can_decode(&self, extension: &str) -> bool;
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage>;
    fn name(&self) -> &'static str;
}
