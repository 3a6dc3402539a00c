//! XTC/XTCH container reading and writing.
//!
//! A container bundles encoded page records with navigation and metadata so
//! device firmware can enumerate a library and seek to any page without
//! touching pixel data. All multi-byte fields are little-endian. The layout
//! is a frozen contract:
//!
//! ```text
//! offset                 size  section
//! 0                      56    container header
//! 56                     16*N  page index (offset u64, length u32, reserved)
//! 56 + 16*N              256   metadata (title 128, author 128)
//! .. + 256               72*C  chapter table (title 64, start u32, end u32)
//! pages_offset           ..    page records, in page order
//! ```
//!
//! Container header sub-fields:
//!
//! ```text
//! offset  size  field
//! 0       4     magic ("XTC\0" mono or "XTCH" grayscale)
//! 4       2     format version (1)
//! 6       2     flags (0)
//! 8       4     page count
//! 12      4     chapter count
//! 16      4     page index offset
//! 20      4     metadata offset
//! 24      4     chapter table offset
//! 28      4     first page record offset
//! 32      4     total file size
//! 36      20    reserved, zero
//! ```
//!
//! Text fields are NFC-normalized UTF-8, truncated at a character boundary
//! so the text plus a NUL terminator fits the field, and zero-padded.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::codec::page::{decode_page, DecodedPage, PageFormat, PageHeader, PAGE_HEADER_SIZE};
use crate::error::{Error, Result};
use crate::model::{BookMetadata, ChapterInfo};

/// Magic number of a mono container ("XTC\0" little-endian).
pub const XTC_MAGIC: u32 = 0x0043_5458;

/// Magic number of a grayscale container ("XTCH" little-endian).
pub const XTCH_MAGIC: u32 = 0x4843_5458;

/// Size of the fixed container header in bytes.
pub const CONTAINER_HEADER_SIZE: usize = 56;

/// Size of one page index entry in bytes.
pub const INDEX_ENTRY_SIZE: usize = 16;

/// Byte budget of the title field, terminator included.
pub const TITLE_FIELD_SIZE: usize = 128;

/// Byte budget of the author field, terminator included.
pub const AUTHOR_FIELD_SIZE: usize = 128;

/// Byte budget of a chapter title, terminator included.
pub const CHAPTER_TITLE_FIELD_SIZE: usize = 64;

/// Size of one chapter table entry in bytes.
pub const CHAPTER_ENTRY_SIZE: usize = CHAPTER_TITLE_FIELD_SIZE + 8;

/// Container format version written by this library.
const FORMAT_VERSION: u16 = 1;

/// Container variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    /// Mono container wrapping 1-bit XTG pages
    Xtc,
    /// Grayscale container wrapping 2-bit XTH pages
    Xtch,
}

impl ContainerFormat {
    /// Magic number identifying this variant.
    pub fn magic(&self) -> u32 {
        match self {
            ContainerFormat::Xtc => XTC_MAGIC,
            ContainerFormat::Xtch => XTCH_MAGIC,
        }
    }

    /// Format tag as text.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerFormat::Xtc => "XTC",
            ContainerFormat::Xtch => "XTCH",
        }
    }

    /// Whether this variant stores 2-bit grayscale pages.
    pub fn is_grayscale(&self) -> bool {
        matches!(self, ContainerFormat::Xtch)
    }

    /// The page sub-format this variant wraps.
    pub fn page_format(&self) -> PageFormat {
        match self {
            ContainerFormat::Xtc => PageFormat::Xtg,
            ContainerFormat::Xtch => PageFormat::Xth,
        }
    }

    fn from_magic(magic: u32) -> Option<Self> {
        match magic {
            XTC_MAGIC => Some(ContainerFormat::Xtc),
            XTCH_MAGIC => Some(ContainerFormat::Xtch),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a container, readable without touching page data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// Container variant
    pub format: ContainerFormat,
    /// Number of pages
    pub page_count: u32,
    /// Number of chapter table entries
    pub chapter_count: u32,
    /// Book title
    pub title: String,
    /// Author name
    pub author: String,
}

/// Parsed container header.
#[derive(Debug, Clone, Copy)]
struct ContainerHeader {
    format: ContainerFormat,
    page_count: u32,
    chapter_count: u32,
    index_offset: u32,
    metadata_offset: u32,
    chapter_table_offset: u32,
    pages_offset: u32,
    file_size: u32,
}

impl ContainerHeader {
    fn encode(&self) -> [u8; CONTAINER_HEADER_SIZE] {
        let mut buf = [0u8; CONTAINER_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.format.magic().to_le_bytes());
        buf[4..6].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
        // flags at 6..8 stay zero
        buf[8..12].copy_from_slice(&self.page_count.to_le_bytes());
        buf[12..16].copy_from_slice(&self.chapter_count.to_le_bytes());
        buf[16..20].copy_from_slice(&self.index_offset.to_le_bytes());
        buf[20..24].copy_from_slice(&self.metadata_offset.to_le_bytes());
        buf[24..28].copy_from_slice(&self.chapter_table_offset.to_le_bytes());
        buf[28..32].copy_from_slice(&self.pages_offset.to_le_bytes());
        buf[32..36].copy_from_slice(&self.file_size.to_le_bytes());
        buf
    }

    fn parse(buf: &[u8; CONTAINER_HEADER_SIZE]) -> Result<Self> {
        let magic = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        let format = ContainerFormat::from_magic(magic).ok_or_else(|| {
            Error::InvalidContainer(format!("unknown container magic 0x{magic:08X}"))
        })?;
        let version = u16::from_le_bytes(buf[4..6].try_into().unwrap());
        if version != FORMAT_VERSION {
            return Err(Error::InvalidContainer(format!(
                "unsupported format version {version}"
            )));
        }
        Ok(Self {
            format,
            page_count: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
            chapter_count: u32::from_le_bytes(buf[12..16].try_into().unwrap()),
            index_offset: u32::from_le_bytes(buf[16..20].try_into().unwrap()),
            metadata_offset: u32::from_le_bytes(buf[20..24].try_into().unwrap()),
            chapter_table_offset: u32::from_le_bytes(buf[24..28].try_into().unwrap()),
            pages_offset: u32::from_le_bytes(buf[28..32].try_into().unwrap()),
            file_size: u32::from_le_bytes(buf[32..36].try_into().unwrap()),
        })
    }

    /// Check the declared section offsets against the actual file length.
    fn validate(&self, actual_len: u64) -> Result<()> {
        if u64::from(self.file_size) != actual_len {
            return Err(Error::InvalidContainer(format!(
                "declared size {} does not match file size {}",
                self.file_size, actual_len
            )));
        }
        let index_end = u64::from(self.index_offset)
            + u64::from(self.page_count) * INDEX_ENTRY_SIZE as u64;
        let metadata_end =
            u64::from(self.metadata_offset) + (TITLE_FIELD_SIZE + AUTHOR_FIELD_SIZE) as u64;
        let chapters_end = u64::from(self.chapter_table_offset)
            + u64::from(self.chapter_count) * CHAPTER_ENTRY_SIZE as u64;
        for (name, end) in [
            ("page index", index_end),
            ("metadata", metadata_end),
            ("chapter table", chapters_end),
            ("page records", u64::from(self.pages_offset)),
        ] {
            if end > actual_len {
                return Err(Error::InvalidContainer(format!(
                    "{name} extends past end of file"
                )));
            }
        }
        Ok(())
    }
}

/// Truncate to the longest prefix that fits `max_bytes` whole characters.
fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Encode text into a fixed NUL-padded field, terminator guaranteed.
fn encode_text_field(text: &str, field_size: usize) -> Vec<u8> {
    let normalized: String = text.nfc().collect();
    let truncated = truncate_utf8(&normalized, field_size - 1);
    let mut field = vec![0u8; field_size];
    field[..truncated.len()].copy_from_slice(truncated.as_bytes());
    field
}

/// Decode a fixed NUL-padded text field.
fn decode_text_field(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn read_exact_or_invalid(file: &mut File, buf: &mut [u8], what: &str) -> Result<()> {
    file.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::InvalidContainer(format!("truncated {what}"))
        } else {
            Error::Io(e)
        }
    })
}

/// Open a container and parse its validated header.
fn open_container(path: &Path) -> Result<(File, ContainerHeader)> {
    let mut file = File::open(path)?;
    let actual_len = file.metadata()?.len();
    let mut buf = [0u8; CONTAINER_HEADER_SIZE];
    read_exact_or_invalid(&mut file, &mut buf, "container header")?;
    let header = ContainerHeader::parse(&buf)?;
    header.validate(actual_len)?;
    Ok((file, header))
}

/// Write a finished container to `path`.
///
/// `pages` are encoded page records in page order; every record must carry
/// the page sub-format matching `grayscale` (XTH for grayscale containers,
/// XTG otherwise). Chapters must reference pages inside `1..=pages.len()`.
/// All validation happens before any bytes reach the filesystem, and the
/// file itself is assembled at a temporary sibling path that is renamed
/// into place only once the write has fully succeeded.
pub fn write_container<P: AsRef<Path>>(
    path: P,
    pages: &[Vec<u8>],
    chapters: &[ChapterInfo],
    metadata: &BookMetadata,
    grayscale: bool,
) -> Result<()> {
    let path = path.as_ref();
    let format = if grayscale {
        ContainerFormat::Xtch
    } else {
        ContainerFormat::Xtc
    };

    let page_count = pages.len() as u32;
    for (i, record) in pages.iter().enumerate() {
        let header = PageHeader::parse(record)
            .map_err(|e| Error::Encode(format!("page {}: {e}", i + 1)))?;
        if header.format != format.page_format() {
            return Err(Error::Encode(format!(
                "page {} is {} but the container is {}",
                i + 1,
                header.format,
                format
            )));
        }
        if record.len() != PAGE_HEADER_SIZE + header.data_size as usize {
            return Err(Error::Encode(format!(
                "page {} record is {} bytes, header declares {}",
                i + 1,
                record.len(),
                PAGE_HEADER_SIZE + header.data_size as usize
            )));
        }
    }
    for chapter in chapters {
        if chapter.start_page == 0
            || chapter.start_page > chapter.end_page
            || chapter.end_page > page_count
        {
            return Err(Error::InvalidChapter {
                title: chapter.title.clone(),
                start_page: chapter.start_page,
                end_page: chapter.end_page,
                page_count,
            });
        }
    }

    let index_offset = CONTAINER_HEADER_SIZE as u64;
    let metadata_offset = index_offset + u64::from(page_count) * INDEX_ENTRY_SIZE as u64;
    let chapter_table_offset = metadata_offset + (TITLE_FIELD_SIZE + AUTHOR_FIELD_SIZE) as u64;
    let pages_offset =
        chapter_table_offset + chapters.len() as u64 * CHAPTER_ENTRY_SIZE as u64;
    let file_size = pages_offset + pages.iter().map(|p| p.len() as u64).sum::<u64>();
    if file_size > u64::from(u32::MAX) {
        return Err(Error::Encode(format!(
            "container would be {file_size} bytes, beyond the 4 GiB limit"
        )));
    }

    let header = ContainerHeader {
        format,
        page_count,
        chapter_count: chapters.len() as u32,
        index_offset: index_offset as u32,
        metadata_offset: metadata_offset as u32,
        chapter_table_offset: chapter_table_offset as u32,
        pages_offset: pages_offset as u32,
        file_size: file_size as u32,
    };

    let file_name = path.file_name().ok_or_else(|| {
        Error::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "output path has no file name",
        ))
    })?;
    let tmp_path = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

    let write_result = (|| -> Result<()> {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(&header.encode())?;

        let mut offset = pages_offset;
        for record in pages {
            let mut entry = [0u8; INDEX_ENTRY_SIZE];
            entry[0..8].copy_from_slice(&offset.to_le_bytes());
            entry[8..12].copy_from_slice(&(record.len() as u32).to_le_bytes());
            writer.write_all(&entry)?;
            offset += record.len() as u64;
        }

        writer.write_all(&encode_text_field(&metadata.title, TITLE_FIELD_SIZE))?;
        writer.write_all(&encode_text_field(&metadata.author, AUTHOR_FIELD_SIZE))?;

        for chapter in chapters {
            writer.write_all(&encode_text_field(
                &chapter.title,
                CHAPTER_TITLE_FIELD_SIZE,
            ))?;
            writer.write_all(&chapter.start_page.to_le_bytes())?;
            writer.write_all(&chapter.end_page.to_le_bytes())?;
        }

        for record in pages {
            writer.write_all(record)?;
        }

        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    })();

    if let Err(e) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    info!(
        "wrote {} container: {} pages, {} chapters, {} bytes",
        format,
        page_count,
        chapters.len(),
        file_size
    );
    Ok(())
}

/// Read the container summary without decoding any pixel data.
///
/// Cost is proportional to the header and metadata sections only, so a
/// device can enumerate a whole library cheaply.
pub fn read_info<P: AsRef<Path>>(path: P) -> Result<ContainerInfo> {
    let (mut file, header) = open_container(path.as_ref())?;

    file.seek(SeekFrom::Start(u64::from(header.metadata_offset)))?;
    let mut metadata = [0u8; TITLE_FIELD_SIZE + AUTHOR_FIELD_SIZE];
    read_exact_or_invalid(&mut file, &mut metadata, "metadata")?;

    Ok(ContainerInfo {
        format: header.format,
        page_count: header.page_count,
        chapter_count: header.chapter_count,
        title: decode_text_field(&metadata[..TITLE_FIELD_SIZE]),
        author: decode_text_field(&metadata[TITLE_FIELD_SIZE..]),
    })
}

/// Read one encoded page record without decoding it.
///
/// `page_number` is 1-based. The page index makes the lookup O(1) in the
/// number of pages.
pub fn read_page_raw<P: AsRef<Path>>(path: P, page_number: u32) -> Result<Vec<u8>> {
    let (mut file, header) = open_container(path.as_ref())?;
    if page_number == 0 || page_number > header.page_count {
        return Err(Error::PageOutOfRange(page_number, header.page_count));
    }

    let entry_offset = u64::from(header.index_offset)
        + u64::from(page_number - 1) * INDEX_ENTRY_SIZE as u64;
    file.seek(SeekFrom::Start(entry_offset))?;
    let mut entry = [0u8; INDEX_ENTRY_SIZE];
    read_exact_or_invalid(&mut file, &mut entry, "page index entry")?;

    let offset = u64::from_le_bytes(entry[0..8].try_into().unwrap());
    let length = u32::from_le_bytes(entry[8..12].try_into().unwrap());
    if offset + u64::from(length) > u64::from(header.file_size) {
        return Err(Error::InvalidContainer(format!(
            "page {page_number} record extends past end of file"
        )));
    }

    debug!("page {page_number}: {length} bytes at offset {offset}");
    file.seek(SeekFrom::Start(offset))?;
    let mut record = vec![0u8; length as usize];
    read_exact_or_invalid(&mut file, &mut record, "page record")?;
    Ok(record)
}

/// Read and decode one page. `page_number` is 1-based.
pub fn read_page<P: AsRef<Path>>(path: P, page_number: u32) -> Result<DecodedPage> {
    let record = read_page_raw(path, page_number)?;
    decode_page(&record)
}

/// Read the chapter table without touching page data.
pub fn read_chapters<P: AsRef<Path>>(path: P) -> Result<Vec<ChapterInfo>> {
    let (mut file, header) = open_container(path.as_ref())?;

    file.seek(SeekFrom::Start(u64::from(header.chapter_table_offset)))?;
    let mut chapters = Vec::with_capacity(header.chapter_count as usize);
    let mut entry = [0u8; CHAPTER_ENTRY_SIZE];
    for _ in 0..header.chapter_count {
        read_exact_or_invalid(&mut file, &mut entry, "chapter table entry")?;
        chapters.push(ChapterInfo {
            title: decode_text_field(&entry[..CHAPTER_TITLE_FIELD_SIZE]),
            start_page: u32::from_le_bytes(
                entry[CHAPTER_TITLE_FIELD_SIZE..CHAPTER_TITLE_FIELD_SIZE + 4]
                    .try_into()
                    .unwrap(),
            ),
            end_page: u32::from_le_bytes(
                entry[CHAPTER_TITLE_FIELD_SIZE + 4..]
                    .try_into()
                    .unwrap(),
            ),
        });
    }
    Ok(chapters)
}
