//! Benchmarks for page encoding performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks exercise the quantize and pack hot path on full-size
//! device pages.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use xtcbook::codec::{decode_page, encode_xtg_page, encode_xth_page, quantize_to_4_levels};
use xtcbook::GrayRaster;

/// A full device page with a text-like mix of shades.
fn test_page() -> GrayRaster {
    let pixels = (0..480u32 * 800)
        .map(|i| match i % 7 {
            0 => 0,
            1 => 85,
            2 => 170,
            _ => 255,
        } as u8)
        .collect();
    GrayRaster::from_pixels(480, 800, pixels).unwrap()
}

fn bench_quantize(c: &mut Criterion) {
    let page = test_page();
    c.bench_function("quantize_480x800", |b| {
        b.iter(|| quantize_to_4_levels(black_box(&page)));
    });
}

fn bench_encode(c: &mut Criterion) {
    let page = test_page();

    c.bench_function("encode_xtg_480x800", |b| {
        b.iter(|| encode_xtg_page(black_box(&page)).unwrap());
    });

    c.bench_function("encode_xth_480x800", |b| {
        b.iter(|| encode_xth_page(black_box(&page)).unwrap());
    });
}

fn bench_decode(c: &mut Criterion) {
    let page = test_page();
    let xtg = encode_xtg_page(&page).unwrap();
    let xth = encode_xth_page(&page).unwrap();

    c.bench_function("decode_xtg_480x800", |b| {
        b.iter(|| decode_page(black_box(&xtg)).unwrap());
    });

    c.bench_function("decode_xth_480x800", |b| {
        b.iter(|| decode_page(black_box(&xth)).unwrap());
    });
}

criterion_group!(benches, bench_quantize, bench_encode, bench_decode);
criterion_main!(benches);
