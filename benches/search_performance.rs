//! Search Performance Benchmarks
//!
//! Scanning throughput of the search engine over in-memory documents.
//!
//! Run with: `cargo bench --bench search_performance`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use std::time::Duration;

use folio_viewer::document::{DocumentSession, InMemoryRenderer, MemoryDocument, MemoryPage};
use folio_viewer::search::{fold, scan_page, search, SearchOptions};
use folio_viewer::TextRun;

const LINE: &str = "Page content with keyword benchmark test and some filler text around it";

/// Document with `page_count` letter pages of 40 lines each
fn create_multipage_document(page_count: usize) -> MemoryDocument {
    (0..page_count).fold(MemoryDocument::new(), |doc, _| {
        let page = (0..40).fold(MemoryPage::letter(), |page, line| {
            page.with_run(LINE, 72.0, 740.0 - line as f32 * 16.0, 460.0, 12.0)
        });
        doc.with_page(page)
    })
}

/// Benchmark scanning a single page of runs
fn bench_scan_page(c: &mut Criterion) {
    let runs: Vec<TextRun> = (0..40)
        .map(|i| TextRun::new(LINE, 72.0, 740.0 - i as f32 * 16.0, 460.0, 12.0, 1))
        .collect();
    let needle = fold("benchmark");

    let mut group = c.benchmark_group("scan_page");
    group.bench_function("scan_40_runs", |b| {
        b.iter(|| black_box(scan_page(1, black_box(&runs), &needle, SearchOptions::default())))
    });
    group.finish();
}

/// Benchmark a full-document search (100 pages), text cache warm
fn bench_document_search(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let renderer = InMemoryRenderer::new();
    renderer.insert("memory://bench", create_multipage_document(100));

    let mut session = DocumentSession::new(Arc::new(renderer), 128);
    runtime.block_on(session.load("memory://bench")).unwrap();

    let mut group = c.benchmark_group("document_search");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(50);

    group.bench_function("search_100_pages", |b| {
        b.iter(|| {
            let outcome = runtime
                .block_on(search(&session, black_box("keyword"), SearchOptions::default()))
                .unwrap();
            black_box(outcome)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_scan_page, bench_document_search);
criterion_main!(benches);
