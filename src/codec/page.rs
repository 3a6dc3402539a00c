//! Page record encoding: XTG (1-bit) and XTH (2-bit) sub-formats.
//!
//! Every page record is self-describing: a fixed 22-byte header followed by
//! packed pixel data. All multi-byte fields are little-endian.
//!
//! ```text
//! offset  size  field
//! 0       4     magic ("XTG\0" or "XTH\0")
//! 4       2     width in pixels
//! 6       2     height in pixels
//! 8       1     color mode (bits per pixel)
//! 9       1     compression mode (0 = none)
//! 10      4     data size in bytes
//! 14      8     reserved, zero
//! ```
//!
//! XTG rows are packed MSB-first into `ceil(width/8)` bytes with bit 1 for
//! white; XTH stores the high-bit plane of the quantized 4-level raster
//! followed by the low-bit plane, each packed the same way. Padding bits at
//! the end of a row are zero and carry no pixel data.

use crate::codec::quantize::{quantize_to_4_levels, GrayRaster, LEVEL_LUMINANCE};
use crate::error::{Error, Result};

/// Magic number of a 1-bit page record ("XTG\0" little-endian).
pub const XTG_MAGIC: u32 = 0x0047_5458;

/// Magic number of a 2-bit page record ("XTH\0" little-endian).
pub const XTH_MAGIC: u32 = 0x0048_5458;

/// Size of the fixed page header in bytes.
pub const PAGE_HEADER_SIZE: usize = 22;

/// Luminance at or above which a pixel reads as white in the 1-bit path.
const MONO_WHITE_THRESHOLD: u8 = 128;

/// Page record sub-format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    /// 1-bit black and white
    Xtg,
    /// 2-bit, four gray levels in two bit planes
    Xth,
}

impl PageFormat {
    /// Magic number identifying this sub-format.
    pub fn magic(&self) -> u32 {
        match self {
            PageFormat::Xtg => XTG_MAGIC,
            PageFormat::Xth => XTH_MAGIC,
        }
    }

    /// Bits of palette data stored per pixel.
    pub fn bits_per_pixel(&self) -> u8 {
        match self {
            PageFormat::Xtg => 1,
            PageFormat::Xth => 2,
        }
    }

    /// Format tag as text.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageFormat::Xtg => "XTG",
            PageFormat::Xth => "XTH",
        }
    }

    fn from_magic(magic: u32) -> Option<Self> {
        match magic {
            XTG_MAGIC => Some(PageFormat::Xtg),
            XTH_MAGIC => Some(PageFormat::Xth),
            _ => None,
        }
    }
}

impl std::fmt::Display for PageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed page record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Sub-format of the record
    pub format: PageFormat,
    /// Page width in pixels
    pub width: u16,
    /// Page height in pixels
    pub height: u16,
    /// Bits per pixel
    pub color_mode: u8,
    /// Compression mode (0 = none)
    pub compression: u8,
    /// Byte length of the pixel data following the header
    pub data_size: u32,
}

impl PageHeader {
    /// Build a header for the given format and geometry.
    pub fn new(format: PageFormat, width: u16, height: u16, data_size: u32) -> Self {
        Self {
            format,
            width,
            height,
            color_mode: format.bits_per_pixel(),
            compression: 0,
            data_size,
        }
    }

    /// Serialize to the fixed 22-byte layout.
    pub fn encode(&self) -> [u8; PAGE_HEADER_SIZE] {
        let mut buf = [0u8; PAGE_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.format.magic().to_le_bytes());
        buf[4..6].copy_from_slice(&self.width.to_le_bytes());
        buf[6..8].copy_from_slice(&self.height.to_le_bytes());
        buf[8] = self.color_mode;
        buf[9] = self.compression;
        buf[10..14].copy_from_slice(&self.data_size.to_le_bytes());
        buf
    }

    /// Parse a header from the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < PAGE_HEADER_SIZE {
            return Err(Error::InvalidPage(format!(
                "record too short for header: {} bytes",
                data.len()
            )));
        }
        let magic = u32::from_le_bytes(data[0..4].try_into().unwrap());
        let format = PageFormat::from_magic(magic)
            .ok_or_else(|| Error::InvalidPage(format!("unknown page magic 0x{magic:08X}")))?;
        let width = u16::from_le_bytes(data[4..6].try_into().unwrap());
        let height = u16::from_le_bytes(data[6..8].try_into().unwrap());
        let color_mode = data[8];
        let compression = data[9];
        let data_size = u32::from_le_bytes(data[10..14].try_into().unwrap());

        if compression != 0 {
            return Err(Error::InvalidPage(format!(
                "unsupported compression mode {compression}"
            )));
        }

        Ok(Self {
            format,
            width,
            height,
            color_mode,
            compression,
            data_size,
        })
    }
}

/// A page decoded back to palette levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    /// Sub-format the record was stored in
    pub format: PageFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Palette level per pixel, row-major. XTG: 1 = white, 0 = black.
    /// XTH: quantizer levels 0 (white) through 3 (black).
    pub levels: Vec<u8>,
}

impl DecodedPage {
    /// Expand levels back to 8-bit luminance using the representative
    /// value of each level.
    pub fn to_luminance(&self) -> GrayRaster {
        let pixels = match self.format {
            PageFormat::Xtg => self
                .levels
                .iter()
                .map(|&bit| if bit != 0 { 255 } else { 0 })
                .collect(),
            PageFormat::Xth => self
                .levels
                .iter()
                .map(|&level| LEVEL_LUMINANCE[level as usize])
                .collect(),
        };
        GrayRaster {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// Bytes per packed 1-bit row.
pub(crate) fn row_stride(width: u32) -> usize {
    (width as usize).div_ceil(8)
}

fn validate_dimensions(raster: &GrayRaster) -> Result<(u16, u16)> {
    if raster.width == 0 || raster.height == 0 {
        return Err(Error::Encode(format!(
            "empty raster {}x{}",
            raster.width, raster.height
        )));
    }
    if raster.width > u16::MAX as u32 || raster.height > u16::MAX as u32 {
        return Err(Error::Encode(format!(
            "raster {}x{} exceeds page geometry limits",
            raster.width, raster.height
        )));
    }
    if raster.pixels.len() != (raster.width as usize) * (raster.height as usize) {
        return Err(Error::Encode(format!(
            "pixel count {} does not match {}x{}",
            raster.pixels.len(),
            raster.width,
            raster.height
        )));
    }
    Ok((raster.width as u16, raster.height as u16))
}

/// Pack one row of bits, MSB first, zero-padding the trailing byte.
fn pack_row<F: Fn(u32) -> bool>(width: u32, bit_at: F, out: &mut Vec<u8>) {
    let stride = row_stride(width);
    let start = out.len();
    out.resize(start + stride, 0);
    for x in 0..width {
        if bit_at(x) {
            out[start + (x / 8) as usize] |= 0x80 >> (x % 8);
        }
    }
}

/// Encode a grayscale raster as a 1-bit XTG page record.
///
/// Each pixel becomes one bit: 1 for white (luminance >= 128), 0 for black.
pub fn encode_xtg_page(raster: &GrayRaster) -> Result<Vec<u8>> {
    let (width, height) = validate_dimensions(raster)?;
    let data_size = row_stride(raster.width) * raster.height as usize;

    let mut record = Vec::with_capacity(PAGE_HEADER_SIZE + data_size);
    record.extend_from_slice(&PageHeader::new(PageFormat::Xtg, width, height, data_size as u32).encode());
    for y in 0..raster.height {
        pack_row(
            raster.width,
            |x| raster.get(x, y) >= MONO_WHITE_THRESHOLD,
            &mut record,
        );
    }
    Ok(record)
}

/// Encode a grayscale raster as a 2-bit XTH page record.
///
/// The raster is quantized to four levels and stored as two bit planes,
/// high bit first, each packed like an XTG page. The declared data size
/// covers both planes, so a renderer can reconstruct all four levels or
/// drive a 2-pass refresh from each plane independently.
pub fn encode_xth_page(raster: &GrayRaster) -> Result<Vec<u8>> {
    let (width, height) = validate_dimensions(raster)?;
    let levels = quantize_to_4_levels(raster);
    let plane_size = row_stride(raster.width) * raster.height as usize;
    let data_size = plane_size * 2;

    let mut record = Vec::with_capacity(PAGE_HEADER_SIZE + data_size);
    record.extend_from_slice(&PageHeader::new(PageFormat::Xth, width, height, data_size as u32).encode());
    for plane_shift in [1u8, 0u8] {
        for y in 0..raster.height {
            let row = &levels[(y * raster.width) as usize..((y + 1) * raster.width) as usize];
            pack_row(
                raster.width,
                |x| (row[x as usize] >> plane_shift) & 1 != 0,
                &mut record,
            );
        }
    }
    Ok(record)
}

fn unpack_plane(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let stride = row_stride(width);
    let mut bits = Vec::with_capacity((width * height) as usize);
    for y in 0..height as usize {
        let row = &data[y * stride..(y + 1) * stride];
        for x in 0..width as usize {
            bits.push((row[x / 8] >> (7 - (x % 8))) & 1);
        }
    }
    bits
}

/// Decode a page record produced by [`encode_xtg_page`] or
/// [`encode_xth_page`].
///
/// The header is parsed first and its magic selects the decode path; the
/// payload length is validated against the declared data size before any
/// unpacking, and row padding bits are discarded.
pub fn decode_page(record: &[u8]) -> Result<DecodedPage> {
    let header = PageHeader::parse(record)?;
    let payload = &record[PAGE_HEADER_SIZE..];
    if payload.len() != header.data_size as usize {
        return Err(Error::InvalidPage(format!(
            "payload is {} bytes, header declares {}",
            payload.len(),
            header.data_size
        )));
    }

    let width = header.width as u32;
    let height = header.height as u32;
    if width == 0 || height == 0 {
        return Err(Error::InvalidPage(format!("empty page {width}x{height}")));
    }
    let plane_size = row_stride(width) * height as usize;

    let levels = match header.format {
        PageFormat::Xtg => {
            if header.data_size as usize != plane_size {
                return Err(Error::InvalidPage(format!(
                    "XTG data size {} does not match {}x{}",
                    header.data_size, width, height
                )));
            }
            unpack_plane(payload, width, height)
        }
        PageFormat::Xth => {
            if header.data_size as usize != plane_size * 2 {
                return Err(Error::InvalidPage(format!(
                    "XTH data size {} does not match {}x{}",
                    header.data_size, width, height
                )));
            }
            let high = unpack_plane(&payload[..plane_size], width, height);
            let low = unpack_plane(&payload[plane_size..], width, height);
            high.iter()
                .zip(low.iter())
                .map(|(&h, &l)| (h << 1) | l)
                .collect()
        }
    };

    Ok(DecodedPage {
        format: header.format,
        width,
        height,
        levels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_22_bytes() {
        let header = PageHeader::new(PageFormat::Xtg, 480, 800, 48000);
        assert_eq!(header.encode().len(), PAGE_HEADER_SIZE);
    }

    #[test]
    fn test_header_fields_roundtrip() {
        let header = PageHeader::new(PageFormat::Xth, 480, 800, 96000);
        let parsed = PageHeader::parse(&header.encode()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_magic_values() {
        assert_eq!(XTG_MAGIC, u32::from_le_bytes(*b"XTG\0"));
        assert_eq!(XTH_MAGIC, u32::from_le_bytes(*b"XTH\0"));
        assert_ne!(XTG_MAGIC, XTH_MAGIC);
    }

    #[test]
    fn test_header_unknown_magic() {
        let mut bytes = PageHeader::new(PageFormat::Xtg, 8, 1, 1).encode();
        bytes[0..4].copy_from_slice(&0xDEADBEEFu32.to_le_bytes());
        assert!(matches!(
            PageHeader::parse(&bytes),
            Err(Error::InvalidPage(_))
        ));
    }

    #[test]
    fn test_header_truncated() {
        assert!(matches!(
            PageHeader::parse(&[0u8; 10]),
            Err(Error::InvalidPage(_))
        ));
    }

    #[test]
    fn test_xtg_white_row() {
        let raster = GrayRaster::filled(8, 1, 255);
        let record = encode_xtg_page(&raster).unwrap();
        assert_eq!(record.len(), PAGE_HEADER_SIZE + 1);
        assert_eq!(record[PAGE_HEADER_SIZE], 0xFF);
    }

    #[test]
    fn test_xtg_black_row() {
        let raster = GrayRaster::filled(8, 1, 0);
        let record = encode_xtg_page(&raster).unwrap();
        assert_eq!(record[PAGE_HEADER_SIZE], 0x00);
    }

    #[test]
    fn test_xtg_alternating_pixels() {
        let pixels: Vec<u8> = (0..8).map(|x| if x % 2 == 0 { 255 } else { 0 }).collect();
        let raster = GrayRaster::from_pixels(8, 1, pixels).unwrap();
        let record = encode_xtg_page(&raster).unwrap();
        // W B W B W B W B = 0b10101010
        assert_eq!(record[PAGE_HEADER_SIZE], 0xAA);
    }

    #[test]
    fn test_xtg_row_padding() {
        // 10 pixels pack into 2 bytes per row; padding bits stay zero.
        let raster = GrayRaster::filled(10, 1, 255);
        let record = encode_xtg_page(&raster).unwrap();
        let header = PageHeader::parse(&record).unwrap();
        assert_eq!(header.data_size, 2);
        assert_eq!(record[PAGE_HEADER_SIZE], 0xFF);
        assert_eq!(record[PAGE_HEADER_SIZE + 1], 0b1100_0000);
    }

    #[test]
    fn test_xtg_full_page_size() {
        let raster = GrayRaster::filled(480, 800, 255);
        let record = encode_xtg_page(&raster).unwrap();
        assert_eq!(record.len(), PAGE_HEADER_SIZE + (480 / 8) * 800);
    }

    #[test]
    fn test_xth_two_planes() {
        let raster = GrayRaster::filled(480, 800, 128);
        let record = encode_xth_page(&raster).unwrap();
        assert_eq!(record.len(), PAGE_HEADER_SIZE + 2 * (480 / 8) * 800);
        let header = PageHeader::parse(&record).unwrap();
        assert_eq!(header.format, PageFormat::Xth);
        assert_eq!(header.color_mode, 2);
    }

    #[test]
    fn test_xth_plane_split() {
        // Level 1 = 0b01: high plane all zero, low plane all one.
        let raster = GrayRaster::filled(8, 1, 170);
        let record = encode_xth_page(&raster).unwrap();
        assert_eq!(record[PAGE_HEADER_SIZE], 0x00);
        assert_eq!(record[PAGE_HEADER_SIZE + 1], 0xFF);

        // Level 2 = 0b10: high plane all one, low plane all zero.
        let raster = GrayRaster::filled(8, 1, 85);
        let record = encode_xth_page(&raster).unwrap();
        assert_eq!(record[PAGE_HEADER_SIZE], 0xFF);
        assert_eq!(record[PAGE_HEADER_SIZE + 1], 0x00);
    }

    #[test]
    fn test_xtg_decode_roundtrip() {
        let pixels: Vec<u8> = (0..10 * 3).map(|i| if i % 3 == 0 { 255 } else { 0 }).collect();
        let raster = GrayRaster::from_pixels(10, 3, pixels).unwrap();
        let record = encode_xtg_page(&raster).unwrap();

        let decoded = decode_page(&record).unwrap();
        assert_eq!(decoded.format, PageFormat::Xtg);
        assert_eq!((decoded.width, decoded.height), (10, 3));

        let reencoded = encode_xtg_page(&decoded.to_luminance()).unwrap();
        assert_eq!(reencoded, record);
    }

    #[test]
    fn test_xth_decode_roundtrip() {
        // All four levels present, width not a multiple of 8.
        let pixels: Vec<u8> = (0..11 * 4)
            .map(|i| [255u8, 170, 85, 0][i % 4])
            .collect();
        let raster = GrayRaster::from_pixels(11, 4, pixels).unwrap();
        let record = encode_xth_page(&raster).unwrap();

        let decoded = decode_page(&record).unwrap();
        assert_eq!(decoded.format, PageFormat::Xth);
        assert_eq!(decoded.levels, quantize_to_4_levels(&raster));

        let reencoded = encode_xth_page(&decoded.to_luminance()).unwrap();
        assert_eq!(reencoded, record);
    }

    #[test]
    fn test_decode_length_mismatch() {
        let raster = GrayRaster::filled(8, 2, 255);
        let mut record = encode_xtg_page(&raster).unwrap();
        record.pop();
        assert!(matches!(
            decode_page(&record),
            Err(Error::InvalidPage(_))
        ));
    }

    #[test]
    fn test_decode_declared_size_mismatch() {
        let raster = GrayRaster::filled(8, 2, 255);
        let mut record = encode_xtg_page(&raster).unwrap();
        // Corrupt the declared data size but keep payload length in step.
        record[10..14].copy_from_slice(&100u32.to_le_bytes());
        record.resize(PAGE_HEADER_SIZE + 100, 0);
        assert!(matches!(decode_page(&record), Err(Error::InvalidPage(_))));
    }

    #[test]
    fn test_encode_rejects_empty_raster() {
        let raster = GrayRaster {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        };
        assert!(matches!(encode_xtg_page(&raster), Err(Error::Encode(_))));
        assert!(matches!(encode_xth_page(&raster), Err(Error::Encode(_))));
    }

    #[test]
    fn test_encode_rejects_mismatched_pixels() {
        let raster = GrayRaster {
            width: 10,
            height: 10,
            pixels: vec![0; 50],
        };
        assert!(matches!(encode_xtg_page(&raster), Err(Error::Encode(_))));
    }

    #[test]
    fn test_encode_rejects_oversized() {
        let raster = GrayRaster {
            width: 70_000,
            height: 1,
            pixels: vec![0; 70_000],
        };
        assert!(matches!(encode_xtg_page(&raster), Err(Error::Encode(_))));
    }
}
