use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use text_layout_builder::{
    BackendCaps, Ellipsize, LayoutCache, MonospaceBackend, MonospaceOptions, TextLayoutBuilder,
};

fn builder(backend: MonospaceBackend) -> TextLayoutBuilder {
    let mut builder =
        TextLayoutBuilder::with_cache(Arc::new(backend), Arc::new(LayoutCache::default()));
    builder.set_width(500).set_text_size(14.0);
    builder
}

fn bench_cache_hit(c: &mut Criterion) {
    let mut builder = builder(MonospaceBackend::new());
    let text = "Cached text that is built once and reused afterwards.\n".repeat(20);
    builder.set_text(text).unwrap();

    c.bench_function("Build/Cache Hit", |b| {
        b.iter(|| {
            // a different text size discards the saved layout, forcing a cache lookup
            builder.set_text_size(black_box(15.0));
            builder.set_text_size(black_box(14.0));
            builder.build().unwrap()
        });
    });
}

fn bench_uncached(c: &mut Criterion) {
    let mut builder = builder(MonospaceBackend::new());
    let text = "This is a very long line that will wrap multiple times at the given width. "
        .repeat(30);
    builder.set_text(text).unwrap().set_should_cache_layout(false);

    c.bench_function("Build/Uncached Wrapping", |b| {
        b.iter(|| builder.build().unwrap());
    });
}

fn bench_single_line(c: &mut Criterion) {
    let mut builder = builder(MonospaceBackend::new());
    builder
        .set_text("A single line of plain Latin text that gets ellipsized at the end")
        .unwrap()
        .set_single_line(true)
        .set_ellipsize(Some(Ellipsize::End))
        .set_should_cache_layout(false);

    c.bench_function("Build/Single Line", |b| {
        b.iter(|| builder.build().unwrap());
    });
}

fn bench_line_count_correction(c: &mut Criterion) {
    let backend = MonospaceBackend::with_options(MonospaceOptions {
        caps: BackendCaps::empty(),
        ..Default::default()
    });
    let mut builder = builder(backend);
    let text = "Paragraph text truncated by the baseline construction path.\n".repeat(40);
    builder
        .set_text(text)
        .unwrap()
        .set_max_lines(3)
        .set_should_cache_layout(false);

    c.bench_function("Build/Line Count Correction", |b| {
        b.iter(|| builder.build().unwrap());
    });
}

criterion_group!(
    benches,
    bench_cache_hit,
    bench_uncached,
    bench_single_line,
    bench_line_count_correction
);
criterion_main!(benches);
