//! Benchmarks for conversion performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks test the full pipeline and the extraction pass at
//! various document sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::Cursor;

/// Creates a synthetic DOCX document with the given number of
/// paragraphs, every tenth one carrying an explicit run color.
fn create_test_docx(paragraph_count: usize) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));

    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    // [Content_Types].xml
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#,
    )
    .unwrap();

    // _rels/.rels
    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#,
    )
    .unwrap();

    // Generate document content
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>"#,
    );

    for i in 0..paragraph_count {
        if i % 10 == 0 {
            content.push_str(&format!(
                r#"
    <w:p>
      <w:r>
        <w:rPr><w:color w:val="FF{:04X}"/></w:rPr>
        <w:t>Colored paragraph {} with some test content for benchmarking.</w:t>
      </w:r>
    </w:p>"#,
                i % 0xFFFF,
                i
            ));
        } else {
            content.push_str(&format!(
                r#"
    <w:p>
      <w:r>
        <w:t>This is paragraph {} with some test content for benchmarking purposes.</w:t>
      </w:r>
    </w:p>"#,
                i
            ));
        }
    }

    content.push_str(
        r#"
  </w:body>
</w:document>"#,
    );

    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(content.as_bytes()).unwrap();

    zip.finish().unwrap();
    buffer
}

/// Benchmark the full conversion pipeline at various sizes.
fn bench_full_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_conversion");

    for para_count in [10, 100, 500].iter() {
        let data = create_test_docx(*para_count);
        let size = data.len() as u64;

        group.throughput(Throughput::Bytes(size));
        group.bench_with_input(
            BenchmarkId::new("paragraphs", para_count),
            &data,
            |b, data| {
                b.iter(|| {
                    let _ = rehue::convert_bytes(black_box(data));
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the color context extraction pass alone.
fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");

    for para_count in [10, 100, 500, 1000].iter() {
        let data = create_test_docx(*para_count);
        let package = rehue::DocxPackage::from_bytes(data).unwrap();
        let xml = package.document_xml().unwrap();

        group.bench_with_input(BenchmarkId::new("paragraphs", para_count), &xml, |b, xml| {
            b.iter(|| {
                let _ = rehue::extract_color_contexts(black_box(xml));
            });
        });
    }

    group.finish();
}

/// Benchmark color reapplication onto pre-generated HTML.
fn bench_reapplication(c: &mut Criterion) {
    let mut group = c.benchmark_group("reapplication");

    for para_count in [10, 100, 500].iter() {
        let data = create_test_docx(*para_count);
        let package = rehue::DocxPackage::from_bytes(data).unwrap();
        let xml = package.document_xml().unwrap();
        let extraction = rehue::extract_color_contexts(&xml);
        let body = rehue::BuiltinBodyConverter::new();
        let html = rehue::BodyConverter::convert(&body, &package).unwrap().html;

        group.bench_with_input(
            BenchmarkId::new("paragraphs", para_count),
            &(html, extraction.contexts),
            |b, (html, contexts)| {
                b.iter(|| {
                    let _ = rehue::apply_colors(black_box(html), black_box(contexts));
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_full_conversion,
    bench_extraction,
    bench_reapplication,
);
criterion_main!(benches);
