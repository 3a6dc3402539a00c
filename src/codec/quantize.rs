//! Luminance quantization for e-ink palettes.

use serde::{Deserialize, Serialize};

/// Number of gray levels in the 2-bit palette.
pub const GRAY_LEVELS: usize = 4;

/// Representative luminance for each 2-bit level, white to black.
///
/// Decoding maps level codes back through this table; re-quantizing the
/// representatives reproduces the same levels.
pub const LEVEL_LUMINANCE: [u8; GRAY_LEVELS] = [255, 170, 85, 0];

/// An 8-bit grayscale raster, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrayRaster {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Luminance samples, `width * height` bytes, row-major
    pub pixels: Vec<u8>,
}

impl GrayRaster {
    /// Create a raster filled with a single luminance value.
    pub fn filled(width: u32, height: u32, luminance: u8) -> Self {
        Self {
            width,
            height,
            pixels: vec![luminance; (width * height) as usize],
        }
    }

    /// Create a raster from existing row-major luminance samples.
    ///
    /// Returns `None` when the sample count does not match the dimensions.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Convert packed 8-bit RGB samples to luminance using the ITU-R 601
    /// integer weights.
    ///
    /// Returns `None` when the sample count does not match the dimensions.
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Option<Self> {
        if rgb.len() != (width as usize) * (height as usize) * 3 {
            return None;
        }
        let pixels = rgb
            .chunks_exact(3)
            .map(|px| {
                let luma =
                    299 * u32::from(px[0]) + 587 * u32::from(px[1]) + 114 * u32::from(px[2]);
                (luma / 1000) as u8
            })
            .collect();
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Luminance at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y * self.width + x) as usize]
    }
}

/// Map one luminance sample to its 2-bit palette level.
///
/// The partition is a fixed device contract:
/// 213..=255 -> 0 (white), 128..=212 -> 1, 43..=127 -> 2, 0..=42 -> 3.
#[inline]
pub fn quantize_pixel(luminance: u8) -> u8 {
    match luminance {
        213..=255 => 0,
        128..=212 => 1,
        43..=127 => 2,
        0..=42 => 3,
    }
}

/// Quantize a grayscale raster to the 4-level palette.
///
/// Returns a same-shape, row-major level map.
pub fn quantize_to_4_levels(raster: &GrayRaster) -> Vec<u8> {
    raster.pixels.iter().map(|&v| quantize_pixel(v)).collect()
}
