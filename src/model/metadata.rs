//! Book metadata persisted in the container.

use serde::{Deserialize, Serialize};

use super::ChapterMapping;

/// Descriptive metadata written into the container header region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    /// Book title
    pub title: String,

    /// Author name
    pub author: String,
}

impl BookMetadata {
    /// Create metadata with a title and author.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
        }
    }
}

/// Persisted chapter table entry: the container-level counterpart of
/// [`ChapterMapping`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterInfo {
    /// Chapter title
    pub title: String,

    /// First page of the chapter (1-indexed)
    pub start_page: u32,

    /// Last page of the chapter (inclusive)
    pub end_page: u32,
}

impl ChapterInfo {
    /// Create a chapter entry.
    pub fn new(title: impl Into<String>, start_page: u32, end_page: u32) -> Self {
        Self {
            title: title.into(),
            start_page,
            end_page,
        }
    }
}

impl From<&ChapterMapping> for ChapterInfo {
    fn from(mapping: &ChapterMapping) -> Self {
        Self {
            title: mapping.title.clone(),
            start_page: mapping.start_page,
            end_page: mapping.end_page,
        }
    }
}
