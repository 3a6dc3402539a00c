//! Block height estimation.
//!
//! The pagination engine never touches fonts or rasterization directly; it
//! sees rendering only through [`HeightEstimator`]. A real renderer
//! implements the trait on top of its font metrics, while tests use
//! [`FixedHeightEstimator`] for deterministic layouts.

use std::collections::HashMap;

use crate::config::{heading_font_size, LINE_HEIGHT_RATIO, PARAGRAPH_SPACING};
use crate::error::Result;
use crate::model::TextBlock;

/// Estimates the rendered pixel height of a block at a given content width.
///
/// Implementations may keep per-job caches behind `&mut self`; a single
/// instance must not be shared between concurrent conversions unless its
/// own contract says otherwise. A returned error aborts the whole
/// pagination run.
pub trait HeightEstimator {
    /// Pixel height of `block` when wrapped into `available_width` pixels.
    fn estimate_height(&mut self, block: &TextBlock, available_width: u32) -> Result<u32>;
}

/// Estimator returning the same height for every block.
///
/// Useful for unit tests and dry-run page counting.
#[derive(Debug, Clone, Copy)]
pub struct FixedHeightEstimator {
    height: u32,
}

impl FixedHeightEstimator {
    /// Create an estimator that reports `height` pixels for every block.
    pub fn new(height: u32) -> Self {
        Self { height }
    }
}

impl HeightEstimator for FixedHeightEstimator {
    fn estimate_height(&mut self, _block: &TextBlock, _available_width: u32) -> Result<u32> {
        Ok(self.height)
    }
}

/// Font-free height approximation from typographic ratios.
///
/// Assumes an average glyph advance proportional to the font size and
/// counts greedy-wrapped lines from the character count. Good enough for
/// page-count previews without loading fonts; the real renderer's metrics
/// win for final output.
#[derive(Debug, Clone)]
pub struct HeuristicEstimator {
    base_font_size: u32,
    char_width_ratio: f32,
    // glyph advance per effective font size, filled lazily
    advance_cache: HashMap<u32, u32>,
}

impl HeuristicEstimator {
    /// Create an estimator around the given base font size.
    pub fn new(base_font_size: u32) -> Self {
        Self {
            base_font_size,
            char_width_ratio: 0.5,
            advance_cache: HashMap::new(),
        }
    }

    /// Override the glyph-advance-to-font-size ratio.
    pub fn with_char_width_ratio(mut self, ratio: f32) -> Self {
        self.char_width_ratio = ratio;
        self
    }

    fn effective_font_size(&self, block: &TextBlock) -> u32 {
        let level = block.heading_level();
        if level > 0 {
            heading_font_size(self.base_font_size, level)
        } else {
            block.style.font_size
        }
    }

    fn glyph_advance(&mut self, font_size: u32) -> u32 {
        let ratio = self.char_width_ratio;
        *self
            .advance_cache
            .entry(font_size)
            .or_insert_with(|| ((font_size as f32 * ratio) as u32).max(1))
    }
}

impl Default for HeuristicEstimator {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_FONT_SIZE)
    }
}

impl HeightEstimator for HeuristicEstimator {
    fn estimate_height(&mut self, block: &TextBlock, available_width: u32) -> Result<u32> {
        if block.text.trim().is_empty() {
            return Ok(PARAGRAPH_SPACING);
        }

        let font_size = self.effective_font_size(block);
        let advance = self.glyph_advance(font_size);
        let usable = available_width.saturating_sub(block.style.indent).max(advance);
        let chars_per_line = (usable / advance).max(1);

        let char_count = block.text.chars().count() as u32;
        let line_count = char_count.div_ceil(chars_per_line);

        let line_height = (font_size as f32 * LINE_HEIGHT_RATIO) as u32;
        Ok(line_count * line_height + PARAGRAPH_SPACING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_estimator() {
        let mut est = FixedHeightEstimator::new(50);
        let block = TextBlock::paragraph("Hello");
        assert_eq!(est.estimate_height(&block, 400).unwrap(), 50);
        assert_eq!(est.estimate_height(&block, 100).unwrap(), 50);
    }

    #[test]
    fn test_heuristic_positive_height() {
        let mut est = HeuristicEstimator::default();
        let block = TextBlock::paragraph("Hello");
        assert!(est.estimate_height(&block, 400).unwrap() > 0);
    }

    #[test]
    fn test_heuristic_longer_text_taller() {
        let mut est = HeuristicEstimator::default();
        let short = TextBlock::paragraph("Hi");
        let long = TextBlock::paragraph(
            "This is a much longer paragraph that will certainly wrap onto several lines",
        );
        let h1 = est.estimate_height(&short, 200).unwrap();
        let h2 = est.estimate_height(&long, 200).unwrap();
        assert!(h2 > h1);
    }

    #[test]
    fn test_heuristic_heading_taller() {
        let mut est = HeuristicEstimator::default();
        let body = TextBlock::paragraph("Text");
        let heading = TextBlock::heading("Text", 1);
        let h1 = est.estimate_height(&body, 400).unwrap();
        let h2 = est.estimate_height(&heading, 400).unwrap();
        assert!(h2 > h1);
    }

    #[test]
    fn test_heuristic_narrower_width_taller() {
        let mut est = HeuristicEstimator::default();
        let block = TextBlock::paragraph("Words enough to wrap when the column narrows down");
        let wide = est.estimate_height(&block, 448).unwrap();
        let narrow = est.estimate_height(&block, 120).unwrap();
        assert!(narrow > wide);
    }

    #[test]
    fn test_heuristic_empty_text() {
        let mut est = HeuristicEstimator::default();
        let block = TextBlock::paragraph("   ");
        assert_eq!(est.estimate_height(&block, 400).unwrap(), PARAGRAPH_SPACING);
    }

    #[test]
    fn test_heuristic_indent_reduces_width() {
        let mut est = HeuristicEstimator::default();
        let mut block = TextBlock::paragraph("Some text that wraps when the usable width shrinks");
        let plain = est.estimate_height(&block, 200).unwrap();
        block.style.indent = 150;
        let indented = est.estimate_height(&block, 200).unwrap();
        assert!(indented >= plain);
    }

    #[test]
    fn test_advance_cache_reused() {
        let mut est = HeuristicEstimator::default();
        let block = TextBlock::paragraph("Hello");
        est.estimate_height(&block, 400).unwrap();
        est.estimate_height(&block, 400).unwrap();
        assert_eq!(est.advance_cache.len(), 1);
    }
}
