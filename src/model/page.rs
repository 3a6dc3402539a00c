//! Page-level pagination output types.

use serde::{Deserialize, Serialize};

use super::{ChapterInfo, TextBlock};

/// Blocks assigned to a single output page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    /// Blocks on this page, in reading order
    pub blocks: Vec<TextBlock>,

    /// Page number (1-indexed)
    pub page_number: u32,

    /// Whether this page opens a chapter
    pub is_chapter_start: bool,

    /// Chapter title, carried only on chapter-start pages
    pub chapter_title: Option<String>,
}

impl PageContent {
    /// Create an empty page with the given number.
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            ..Default::default()
        }
    }

    /// Check if the page holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of blocks on the page.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

/// Location of one chapter within the page sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterMapping {
    /// Chapter title
    pub title: String,

    /// First page of the chapter (1-indexed, inclusive)
    pub start_page: u32,

    /// Last page of the chapter (inclusive), 0 until the chapter is closed
    pub end_page: u32,
}

impl ChapterMapping {
    /// Open a new mapping starting at the given page.
    pub fn open(title: impl Into<String>, start_page: u32) -> Self {
        Self {
            title: title.into(),
            start_page,
            end_page: 0,
        }
    }

    /// Whether the mapping has been closed with an end page.
    pub fn is_closed(&self) -> bool {
        self.end_page >= self.start_page
    }
}

/// Complete result of one pagination run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResult {
    /// Pages in order
    pub pages: Vec<PageContent>,

    /// Chapter mappings in order of appearance
    pub chapters: Vec<ChapterMapping>,

    /// Total page count; always equals `pages.len()`
    pub total_pages: u32,
}

impl PaginationResult {
    /// Chapter mappings converted to their persisted container form.
    pub fn chapter_infos(&self) -> Vec<ChapterInfo> {
        self.chapters.iter().map(ChapterInfo::from).collect()
    }
}
