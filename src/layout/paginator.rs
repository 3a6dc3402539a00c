//! The pagination engine.
//!
//! Flows a forward-only sequence of [`TextBlock`]s into fixed-capacity
//! pages, breaking on height overflow and on chapter headings, and tracks
//! which page range each chapter occupies.

use log::{debug, info};

use crate::config::PageSetup;
use crate::error::Result;
use crate::layout::HeightEstimator;
use crate::model::{ChapterMapping, PageContent, PaginationResult, TextBlock};

/// Default highest heading level that opens a new chapter.
///
/// Levels 1 and 2 break pages; level 3 and deeper flow inline.
const DEFAULT_CHAPTER_HEADING_MAX_LEVEL: u8 = 2;

/// Flows text blocks into pages sized by a [`PageSetup`].
///
/// The block sequence is consumed exactly once; re-pagination requires a
/// fresh sequence. Height measurement is delegated entirely to the
/// injected [`HeightEstimator`].
///
/// # Example
///
/// ```
/// use xtcbook::layout::{FixedHeightEstimator, Paginator};
/// use xtcbook::model::TextBlock;
///
/// let mut paginator = Paginator::new(FixedHeightEstimator::new(50));
/// let blocks = vec![
///     TextBlock::heading("Chapter 1", 1),
///     TextBlock::paragraph("Once upon a time."),
/// ];
/// let result = paginator.paginate(blocks).unwrap();
/// assert_eq!(result.total_pages, 1);
/// assert!(result.pages[0].is_chapter_start);
/// ```
pub struct Paginator<E> {
    estimator: E,
    setup: PageSetup,
    chapter_heading_max_level: u8,
}

impl<E: HeightEstimator> Paginator<E> {
    /// Create a paginator for the default device page setup.
    pub fn new(estimator: E) -> Self {
        Self::with_setup(estimator, PageSetup::default())
    }

    /// Create a paginator for a custom page setup.
    pub fn with_setup(estimator: E, setup: PageSetup) -> Self {
        Self {
            estimator,
            setup,
            chapter_heading_max_level: DEFAULT_CHAPTER_HEADING_MAX_LEVEL,
        }
    }

    /// Change which heading levels open a new chapter (1..=level).
    pub fn with_chapter_heading_max_level(mut self, level: u8) -> Self {
        self.chapter_heading_max_level = level;
        self
    }

    /// Whether a block starts a new chapter.
    fn is_chapter_heading(&self, block: &TextBlock) -> bool {
        let level = block.heading_level();
        level >= 1 && level <= self.chapter_heading_max_level
    }

    /// Flow `blocks` into pages.
    ///
    /// Fails only when the height estimator fails; no partial result is
    /// returned in that case.
    pub fn paginate<I>(&mut self, blocks: I) -> Result<PaginationResult>
    where
        I: IntoIterator<Item = TextBlock>,
    {
        let content_width = self.setup.content_width();
        let content_height = self.setup.content_height();

        let mut pages: Vec<PageContent> = Vec::new();
        let mut chapters: Vec<ChapterMapping> = Vec::new();
        let mut open_chapter: Option<ChapterMapping> = None;

        let mut current = PageContent::new(1);
        let mut current_height: u32 = 0;

        for block in blocks {
            if self.is_chapter_heading(&block) {
                if !current.is_empty() {
                    let next_number = current.page_number + 1;
                    debug!(
                        "page {} closed with {} blocks (chapter break)",
                        current.page_number,
                        current.block_count()
                    );
                    pages.push(std::mem::replace(&mut current, PageContent::new(next_number)));
                    current_height = 0;
                }

                current.is_chapter_start = true;
                current.chapter_title = Some(block.text.clone());

                if let Some(mut previous) = open_chapter.take() {
                    previous.end_page = current.page_number - 1;
                    chapters.push(previous);
                }
                open_chapter = Some(ChapterMapping::open(&block.text, current.page_number));
            }

            let height = self.estimator.estimate_height(&block, content_width)?;
            if current_height + height > content_height && !current.is_empty() {
                let next_number = current.page_number + 1;
                debug!(
                    "page {} closed with {} blocks (overflow)",
                    current.page_number,
                    current.block_count()
                );
                pages.push(std::mem::replace(&mut current, PageContent::new(next_number)));
                current_height = 0;
            }
            current.blocks.push(block);
            current_height += height;
        }

        if !current.is_empty() {
            pages.push(current);
        }

        if let Some(mut last) = open_chapter.take() {
            last.end_page = pages
                .last()
                .map(|p| p.page_number)
                .unwrap_or(last.start_page);
            chapters.push(last);
        }

        let total_pages = pages.len() as u32;
        info!("paginated {} pages, {} chapters", total_pages, chapters.len());

        Ok(PaginationResult {
            pages,
            chapters,
            total_pages,
        })
    }

    /// Flow blocks that may include embedded-image placeholders.
    ///
    /// Image-aware layout (reserving raster regions, scaling placeholders)
    /// is an extension point; today images flow exactly like text blocks.
    pub fn paginate_with_images<I>(&mut self, blocks: I) -> Result<PaginationResult>
    where
        I: IntoIterator<Item = TextBlock>,
    {
        self.paginate(blocks)
    }
}
