//! End-to-end pipeline test: paginate, render a stub raster per page,
//! encode, write the container, and read everything back.

use tempfile::TempDir;

use xtcbook::codec::{encode_xtg_page, encode_xth_page, write_container, ContainerFormat};
use xtcbook::layout::{FixedHeightEstimator, Paginator};
use xtcbook::model::{BookMetadata, TextBlock};
use xtcbook::{read_chapters, read_info, read_page, GrayRaster, Result};

/// Stand-in for the external renderer: one flat raster per page, shaded by
/// page number so pages stay distinguishable after decode.
fn render_stub(page_number: u32) -> GrayRaster {
    let shade = [255u8, 170, 85, 0][(page_number as usize - 1) % 4];
    GrayRaster::filled(480, 800, shade)
}

fn sample_blocks() -> Vec<TextBlock> {
    vec![
        TextBlock::heading("Chapter 1", 1),
        TextBlock::paragraph("First chapter text."),
        TextBlock::paragraph("More first chapter text."),
        TextBlock::heading("Chapter 2", 1),
        TextBlock::paragraph("Second chapter text."),
    ]
}

#[test]
fn test_full_grayscale_pipeline() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.xtch");

    let mut paginator = Paginator::new(FixedHeightEstimator::new(100));
    let result = paginator.paginate(sample_blocks())?;

    assert_eq!(result.total_pages, 2);
    assert_eq!(result.chapters.len(), 2);

    let pages: Vec<Vec<u8>> = result
        .pages
        .iter()
        .map(|p| encode_xth_page(&render_stub(p.page_number)))
        .collect::<Result<_>>()?;

    write_container(
        &path,
        &pages,
        &result.chapter_infos(),
        &BookMetadata::new("Pipeline Book", "Integration Test"),
        true,
    )?;

    let info = read_info(&path)?;
    assert_eq!(info.format, ContainerFormat::Xtch);
    assert_eq!(info.page_count, result.total_pages);
    assert_eq!(info.title, "Pipeline Book");

    let chapters = read_chapters(&path)?;
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0].title, "Chapter 1");
    assert_eq!(chapters[0].start_page, 1);
    assert_eq!(chapters[0].end_page, 1);
    assert_eq!(chapters[1].title, "Chapter 2");
    assert_eq!(chapters[1].start_page, 2);
    assert_eq!(chapters[1].end_page, 2);

    for page in &result.pages {
        let decoded = read_page(&path, page.page_number)?;
        let expected = render_stub(page.page_number);
        assert_eq!(decoded.to_luminance(), expected);
    }

    Ok(())
}

#[test]
fn test_full_mono_pipeline() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.xtc");

    let blocks: Vec<TextBlock> = (0..12)
        .map(|i| TextBlock::paragraph(format!("Paragraph number {i}")))
        .collect();

    let mut paginator = Paginator::new(FixedHeightEstimator::new(200));
    let result = paginator.paginate(blocks)?;
    assert!(result.total_pages > 1);
    assert!(result.chapters.is_empty());

    let pages: Vec<Vec<u8>> = result
        .pages
        .iter()
        .map(|p| encode_xtg_page(&render_stub(p.page_number)))
        .collect::<Result<_>>()?;

    write_container(&path, &pages, &[], &BookMetadata::new("Mono", ""), false)?;

    let info = read_info(&path)?;
    assert_eq!(info.format, ContainerFormat::Xtc);
    assert_eq!(info.page_count, result.total_pages);

    // 1-bit decode collapses every shade to black or white.
    let first = read_page(&path, 1)?;
    assert!(first.levels.iter().all(|&l| l == 1)); // shade 255 -> white

    Ok(())
}
