//! Error types for the xtcbook library.

use std::io;
use thiserror::Error;

/// Result type alias for xtcbook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during pagination and container encoding.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a recognizable XTC/XTCH container.
    ///
    /// Covers bad magic numbers, truncated headers, and section offsets or
    /// lengths that point outside the file.
    #[error("Invalid container: {0}")]
    InvalidContainer(String),

    /// A page record could not be decoded.
    #[error("Invalid page record: {0}")]
    InvalidPage(String),

    /// A raster could not be encoded into a page record.
    #[error("Page encoding error: {0}")]
    Encode(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (container has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// A chapter entry is inconsistent with the page sequence.
    #[error("Invalid chapter '{title}': pages {start_page}..{end_page} of {page_count}")]
    InvalidChapter {
        /// Chapter title
        title: String,
        /// Declared start page
        start_page: u32,
        /// Declared end page
        end_page: u32,
        /// Total pages in the container being written
        page_count: u32,
    },

    /// Height estimation failed; the whole pagination run is aborted.
    #[error("Height estimation failed: {0}")]
    HeightEstimation(String),
}
