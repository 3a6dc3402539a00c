//! Raster codec: quantization, page records, and the XTC/XTCH container.

mod container;
mod page;
mod quantize;

pub use container::{
    read_chapters, read_info, read_page, read_page_raw, write_container, ContainerFormat,
    ContainerInfo, AUTHOR_FIELD_SIZE, CHAPTER_ENTRY_SIZE, CHAPTER_TITLE_FIELD_SIZE,
    CONTAINER_HEADER_SIZE, INDEX_ENTRY_SIZE, TITLE_FIELD_SIZE, XTCH_MAGIC, XTC_MAGIC,
};
pub use page::{
    decode_page, encode_xtg_page, encode_xth_page, DecodedPage, PageFormat, PageHeader,
    PAGE_HEADER_SIZE, XTG_MAGIC, XTH_MAGIC,
};
pub use quantize::{
    quantize_pixel, quantize_to_4_levels, GrayRaster, GRAY_LEVELS, LEVEL_LUMINANCE,
};
