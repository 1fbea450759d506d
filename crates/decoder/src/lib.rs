mod decoder_trait;
mod image_crate_decoder;
mod registry;
mod stub;

pub use self::decoder_trait::ImageDecoder;
pub use self::image_crate_decoder::RasterDecoder;
pub use self::registry::DecoderRegistry;
pub use self::stub::StubDecoder;

use std::sync::Arc;

/// The registry the application ships with, covering every extension named
/// in spec §6: full decoders for PNG/JPEG/BMP/PNM, recognized-but-stubbed
/// entries for the rest.
pub fn default_registry() -> DecoderRegistry {
    let mut registry = DecoderRegistry::new();
    registry.register(Arc::new(RasterDecoder::png()));
    registry.register(Arc::new(RasterDecoder::jpeg()));
    registry.register(Arc::new(RasterDecoder::bmp()));
    registry.register(Arc::new(RasterDecoder::pnm()));
    registry.register(Arc::new(StubDecoder::webp()));
    registry.register(Arc::new(StubDecoder::gif()));
    registry.register(Arc::new(StubDecoder::tiff()));
    registry.register(Arc::new(StubDecoder::ico()));
    registry.register(Arc::new(StubDecoder::mag()));
    registry
}

/// Extensions the image browser treats as image-typed entries when building
/// the browser's total ordering (spec C6).
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "ppm", "pgm", "pbm", "webp", "gif", "tif", "tiff", "ico", "mag",
];

pub fn is_image_extension(extension: &str) -> bool {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_generated_png() {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let registry = default_registry();
        let decoded = registry.decode("png", &bytes).unwrap();
        assert_eq!((decoded.width, decoded.height, decoded.channels), (4, 4, 3));
        assert_eq!(decoded.pixels[0..3], [10, 20, 30]);
    }

    #[test]
    fn unsupported_formats_are_recognized_but_stubbed() {
        let registry = default_registry();
        assert!(registry.get_decoder("webp").is_some());
        let err = registry.decode("webp", &[]).unwrap_err();
        assert!(matches!(err, types::ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn image_extension_table_matches_spec() {
        assert!(is_image_extension(".PNG"));
        assert!(is_image_extension("mag"));
        assert!(!is_image_extension("zip"));
    }
}

