// benches/extraction.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use parcel_track::{core::dom::Document, extract::Extractor, normalize::normalize};

fn load_fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {path}: {e}"))
}

fn bench_extraction(c: &mut Criterion) {
    let widget_page = load_fixture("ups_in_transit.html");
    let selector_page = load_fixture("status_only.html");
    let extractor = Extractor::new();

    c.bench_function("parse_ups_page", |b| {
        b.iter(|| Document::parse(black_box(&widget_page)))
    });

    let doc = Document::parse(&widget_page);
    c.bench_function("extract_widget", |b| {
        b.iter(|| extractor.extract(black_box(&doc)))
    });

    // Worst case for the cascade: every strategy runs before the last one hits.
    let doc = Document::parse(&selector_page);
    c.bench_function("extract_fallthrough", |b| {
        b.iter(|| extractor.extract(black_box(&doc)))
    });

    c.bench_function("parse_extract_normalize", |b| {
        b.iter(|| {
            let doc = Document::parse(black_box(&widget_page));
            extractor.extract(&doc).map(normalize)
        })
    });
}

criterion_group!(benches, bench_extraction);
criterion_main!(benches);
