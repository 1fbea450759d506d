/// Result of decoding one image: a row-major HxWxC byte buffer plus its
/// shape. `channels` is 1 (gray), 3 (RGB) or 4 (RGBA).
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}
