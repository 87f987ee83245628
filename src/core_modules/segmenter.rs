// THEORY:
// The `ColorSegmenter` is the first stage of the per-frame pipeline. It turns
// a color frame into a binary foreground mask in two fixed steps:
//
// 1.  **Thresholding**: every pixel is converted to HSV and tested against the
//     configured `ColorBand` (inclusive on all three components). Matching
//     pixels become foreground, everything else background.
// 2.  **Cleanup**: the raw mask is denoised with a morphological opening
//     (erosion then dilation) to remove small speckles, followed by a closing
//     (dilation then erosion) to fill small holes inside regions. The order
//     is fixed: open before close. Both passes use a square structuring
//     neighborhood of configurable size, applied for a fixed two iterations.
//
// The segmenter is stateless across frames: it holds only configuration and
// produces a fresh mask per call without touching the input frame.

use crate::core_modules::color::{ColorBand, Hsv, rgb_to_hsv};
use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};

/// Mask value for pixels inside the color band.
pub const FOREGROUND: u8 = 255;

/// Default band tuned for a yellow/beige dough tone.
pub const DEFAULT_DOUGH_BAND: ColorBand = ColorBand {
    lower: Hsv { h: 20, s: 50, v: 50 },
    upper: Hsv { h: 40, s: 255, v: 255 },
};

/// Number of erode/dilate passes per morphological operation.
const MORPH_ITERATIONS: u32 = 2;

/// Converts color frames into denoised binary foreground masks.
#[derive(Debug, Clone)]
pub struct ColorSegmenter {
    band: ColorBand,
    morph_kernel_size: u32,
    cleanup_enabled: bool,
}

impl Default for ColorSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSegmenter {
    pub fn new() -> Self {
        Self {
            band: DEFAULT_DOUGH_BAND,
            morph_kernel_size: 5,
            cleanup_enabled: true,
        }
    }

    pub fn set_color_band(&mut self, band: ColorBand) {
        self.band = band;
    }

    pub fn color_band(&self) -> ColorBand {
        self.band
    }

    pub fn set_morph_kernel_size(&mut self, size: u32) {
        self.morph_kernel_size = size;
    }

    pub fn set_cleanup_enabled(&mut self, enabled: bool) {
        self.cleanup_enabled = enabled;
    }

    /// Produces the binary foreground mask for one frame. An empty frame
    /// yields an empty mask; no error is raised.
    pub fn segment(&self, frame: &RgbImage) -> GrayImage {
        if frame.width() == 0 || frame.height() == 0 {
            return GrayImage::new(0, 0);
        }
        let mask = self.threshold(frame);
        if self.cleanup_enabled {
            self.clean_mask(&mask)
        } else {
            mask
        }
    }

    /// In-range test against the configured band, pixel by pixel.
    fn threshold(&self, frame: &RgbImage) -> GrayImage {
        GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
            if self.band.contains(rgb_to_hsv(*frame.get_pixel(x, y))) {
                Luma([FOREGROUND])
            } else {
                Luma([0])
            }
        })
    }

    /// Opening removes isolated speckles, closing fills small interior holes.
    /// A kernel of size k maps to a square neighborhood of radius k/2, and the
    /// fixed iteration count compounds into a proportionally larger radius.
    fn clean_mask(&self, mask: &GrayImage) -> GrayImage {
        let radius = (self.morph_kernel_size / 2) * MORPH_ITERATIONS;
        if radius == 0 {
            return mask.clone();
        }
        let radius = radius.min(u8::MAX as u32) as u8;
        let opened = open(mask, Norm::LInf, radius);
        close(&opened, Norm::LInf, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const DOUGH: Rgb<u8> = Rgb([200, 200, 40]);
    const SURFACE: Rgb<u8> = Rgb([50, 50, 50]);

    fn segmenter_without_cleanup() -> ColorSegmenter {
        let mut segmenter = ColorSegmenter::new();
        segmenter.set_cleanup_enabled(false);
        segmenter
    }

    #[test]
    fn every_foreground_pixel_is_inside_the_band() {
        let frame = RgbImage::from_fn(16, 16, |x, y| {
            if (x + y) % 3 == 0 { DOUGH } else { SURFACE }
        });

        let segmenter = segmenter_without_cleanup();
        let mask = segmenter.segment(&frame);
        let band = segmenter.color_band();

        for (x, y, pixel) in mask.enumerate_pixels() {
            let in_band = band.contains(rgb_to_hsv(*frame.get_pixel(x, y)));
            assert_eq!(pixel[0] == FOREGROUND, in_band, "mismatch at ({x}, {y})");
        }
    }

    #[test]
    fn empty_frame_yields_empty_mask() {
        let segmenter = ColorSegmenter::new();
        let mask = segmenter.segment(&RgbImage::new(0, 0));
        assert_eq!(mask.dimensions(), (0, 0));
    }

    #[test]
    fn cleanup_removes_speckles_and_fills_holes() {
        let mut frame = RgbImage::from_pixel(100, 100, SURFACE);
        // A 3x3 speckle that opening must erase.
        for y in 5..8 {
            for x in 5..8 {
                frame.put_pixel(x, y, DOUGH);
            }
        }
        // A solid 40x40 block with a 3x3 hole that closing must fill.
        for y in 30..70 {
            for x in 30..70 {
                frame.put_pixel(x, y, DOUGH);
            }
        }
        for y in 48..51 {
            for x in 48..51 {
                frame.put_pixel(x, y, SURFACE);
            }
        }

        let mask = ColorSegmenter::new().segment(&frame);
        assert_eq!(mask.get_pixel(6, 6)[0], 0, "speckle survived opening");
        assert_eq!(mask.get_pixel(49, 49)[0], FOREGROUND, "hole survived closing");
        assert_eq!(mask.get_pixel(50, 50)[0], FOREGROUND, "block interior lost");
    }
}
