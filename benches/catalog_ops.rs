//! Benchmarks for library index and extraction hot paths.

use std::io::{Cursor, Write};

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use raven_factory::library::catalog::LibraryCatalog;
use raven_factory::library::model::{CatalogEntry, ContentFormat};
use raven_factory::library::parser;
use raven_factory::transform::prompt;

fn entry(i: usize) -> CatalogEntry {
    CatalogEntry {
        id: Some(format!("modul_{i}")),
        code: "GEM-01".into(),
        title: Some(format!("Modül {i}")),
        author: "RA'VEN AI".into(),
        tag: Some("FİZYOLOJİ".into()),
        class: "3".into(),
        block: "GENEL".into(),
        url: format!("modules/modul_{i}.json"),
    }
}

fn deck(slides: usize) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let opts = zip::write::SimpleFileOptions::default();
    for n in 1..=slides {
        let slide = format!(
            r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>Slayt {n}: kalp döngüsü</a:t></a:r></a:p><a:p><a:r><a:t>Sistol ve diyastol</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#
        );
        zip.start_file(format!("ppt/slides/slide{n}.xml"), opts).unwrap();
        zip.write_all(slide.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn bench_upsert(c: &mut Criterion) {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("kutuphane.json");
    let mut catalog = LibraryCatalog::open(&path).unwrap();
    for i in 0..1_000 {
        catalog.upsert(entry(i));
    }

    c.bench_function("upsert_replace_1k", |bench| {
        bench.iter(|| black_box(catalog.upsert(entry(500))))
    });
}

fn bench_flush_open(c: &mut Criterion) {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("kutuphane.json");
    let mut catalog = LibraryCatalog::open(&path).unwrap();
    for i in 0..1_000 {
        catalog.upsert(entry(i));
    }

    c.bench_function("flush_open_1k", |bench| {
        bench.iter(|| {
            catalog.flush().unwrap();
            black_box(LibraryCatalog::open(&path).unwrap().len())
        })
    });
}

fn bench_slide_deck(c: &mut Criterion) {
    let data = deck(40);
    let extractor = parser::extractor_for(ContentFormat::SlideDeck);

    c.bench_function("extract_pptx_40_slides", |bench| {
        bench.iter(|| black_box(extractor.extract(&data, "deck.pptx").unwrap()))
    });
}

fn bench_user_message(c: &mut Criterion) {
    let text = "Kalp döngüsü sistol ve diyastol evrelerinden oluşur. ".repeat(2_000);

    c.bench_function("user_message_100k", |bench| {
        bench.iter(|| black_box(prompt::user_message("ders.pdf", &text)))
    });
}

criterion_group!(
    benches,
    bench_upsert,
    bench_flush_open,
    bench_slide_deck,
    bench_user_message
);
criterion_main!(benches);
