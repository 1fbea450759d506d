//! Super-resolution stand-in (spec component C11).
//!
//! Grounded in `original_source/sr/sr_base.py`'s request/response shape: a
//! pixel buffer goes in, a pixel buffer comes out, tagged by a request id so
//! the caller can detect stale completions (§4.9). The real super-resolution
//! models are external collaborators (§1); this is a trivial 2x
//! nearest-neighbour upscaler that exercises the same contract end to end.

use types::DecodedImage;

/// One super-resolution backend. `enhance` runs on a worker thread like any
/// other task; it is not expected to be fast.
pub trait SrTask: Send + Sync {
    fn enhance(&self, image: &DecodedImage) -> DecodedImage;
}

/// 2x nearest-neighbour upscale — not a real super-resolution model, just
/// enough to exercise the pipeline's supersession contract.
pub struct NearestNeighbourUpscaler {
    pub factor: u32,
}

impl NearestNeighbourUpscaler {
    pub fn new(factor: u32) -> Self {
        Self {
            factor: factor.max(1),
        }
    }
}

impl Default for NearestNeighbourUpscaler {
    fn default() -> Self {
        Self::new(2)
    }
}

impl SrTask for NearestNeighbourUpscaler {
    fn enhance(&self, image: &DecodedImage) -> DecodedImage {
        let factor = self.factor as usize;
        let channels = image.channels as usize;
        let new_width = image.width as usize * factor;
        let new_height = image.height as usize * factor;
        let mut pixels = vec![0u8; new_width * new_height * channels];

        for y in 0..new_height {
            let src_y = y / factor;
            for x in 0..new_width {
                let src_x = x / factor;
                let src_idx = (src_y * image.width as usize + src_x) * channels;
                let dst_idx = (y * new_width + x) * channels;
                pixels[dst_idx..dst_idx + channels]
                    .copy_from_slice(&image.pixels[src_idx..src_idx + channels]);
            }
        }

        DecodedImage {
            width: new_width as u32,
            height: new_height as u32,
            channels: image.channels,
            pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upscales_by_the_requested_factor() {
        let src = DecodedImage {
            width: 2,
            height: 2,
            channels: 3,
            pixels: vec![
                1, 1, 1, 2, 2, 2, //
                3, 3, 3, 4, 4, 4,
            ],
        };
        let upscaler = NearestNeighbourUpscaler::new(2);
        let out = upscaler.enhance(&src);
        assert_eq!((out.width, out.height), (4, 4));
        assert_eq!(out.pixels[0..3], [1, 1, 1]);
        assert_eq!(out.pixels[3..6], [1, 1, 1]);
    }
}
