//! # xtcbook
//!
//! Pagination engine and raster container codec for low-power e-ink
//! reading devices.
//!
//! The library covers the two halves of turning a reflowable book into a
//! device-ready file: flowing styled text blocks into fixed-capacity pages
//! with chapter tracking, and packing rendered page rasters into the
//! XTC (1-bit) / XTCH (2-bit) container format with an O(1) page index.
//!
//! ## Quick Start
//!
//! ```no_run
//! use xtcbook::codec::{encode_xth_page, write_container, GrayRaster};
//! use xtcbook::layout::{HeuristicEstimator, Paginator};
//! use xtcbook::model::{BookMetadata, TextBlock};
//!
//! fn main() -> xtcbook::Result<()> {
//!     // Flow blocks into pages
//!     let blocks = vec![
//!         TextBlock::heading("Chapter 1", 1),
//!         TextBlock::paragraph("It was a dark and stormy night."),
//!     ];
//!     let mut paginator = Paginator::new(HeuristicEstimator::default());
//!     let result = paginator.paginate(blocks)?;
//!
//!     // Render each page (external), then encode and write the container
//!     let pages: Vec<Vec<u8>> = result
//!         .pages
//!         .iter()
//!         .map(|_page| encode_xth_page(&GrayRaster::filled(480, 800, 255)))
//!         .collect::<xtcbook::Result<_>>()?;
//!     write_container(
//!         "book.xtch",
//!         &pages,
//!         &result.chapter_infos(),
//!         &BookMetadata::new("Example", "Anonymous"),
//!         true,
//!     )
//! }
//! ```
//!
//! ## Features
//!
//! - **Pagination**: height-budgeted page filling, chapter-heading page
//!   breaks, chapter-to-page-range tracking
//! - **Injected metrics**: the engine sees rendering only through the
//!   [`layout::HeightEstimator`] trait
//! - **Raster codec**: exact 4-level quantization, 1-bit and 2-bit page
//!   records, bit-plane packing
//! - **Container**: self-describing file with page index, metadata, and
//!   chapter table; `read_info` never touches pixel data

pub mod codec;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;

// Re-export commonly used types
pub use codec::{
    decode_page, encode_xtg_page, encode_xth_page, quantize_to_4_levels, read_chapters,
    read_info, read_page, write_container, ContainerFormat, ContainerInfo, DecodedPage,
    GrayRaster, PageFormat,
};
pub use config::{Margins, PageSetup};
pub use error::{Error, Result};
pub use layout::{FixedHeightEstimator, HeightEstimator, HeuristicEstimator, Paginator};
pub use model::{
    BlockKind, BookMetadata, ChapterInfo, ChapterMapping, PageContent, PaginationResult,
    TextBlock, TextStyle,
};
