//! パフォーマンスベンチマーク
//!
//! セル参照の変換、セル値の解決、ワークブック全体の抽出にかかる時間を測定します。
//! 入力ワークブックはrust_xlsxwriterでその場で生成します。

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mapsheet::{open_workbook, reference, CellResolver, ExtractorBuilder};
use rust_xlsxwriter::Workbook as XlsxWorkbook;
use std::io::Cursor;

const TOKENS: &[&str] = &["CAT", "DOG", "FOX", "L_OWL", "BEE", "PIG", "HEN"];

/// 7×7のチャプターシートを`sheets`枚含むワークブックを生成
fn generate_chapter_workbook(sheets: usize) -> Vec<u8> {
    let mut workbook = XlsxWorkbook::new();
    for i in 0..sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(format!("Stage{}", i + 1)).unwrap();
        sheet.write_number(0, 0, 7.0).unwrap();
        sheet.write_number(0, 1, (i % 4) as f64).unwrap();
        sheet.write_string(0, 2, "A2, D5, G8").unwrap();
        sheet.write_string(0, 3, "CAT, L_DOG, FOX").unwrap();
        for r in 0..7u32 {
            for c in 0..7u16 {
                let token = TOKENS[(r as usize + c as usize + i) % TOKENS.len()];
                sheet.write_string(r + 1, c, token).unwrap();
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

fn benchmark_reference_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("reference");

    group.bench_function("encode_grid", |b| {
        b.iter(|| {
            for row in 1..=100u32 {
                for col in 1..=100u32 {
                    black_box(reference::encode(black_box(row), black_box(col)).unwrap());
                }
            }
        });
    });

    let references: Vec<String> = (1..=10_000u32)
        .map(|i| reference::encode(i, i).unwrap())
        .collect();
    group.bench_function("decode_10k", |b| {
        b.iter(|| {
            for r in &references {
                black_box(reference::decode(black_box(r)).unwrap());
            }
        });
    });

    group.finish();
}

fn benchmark_resolve(c: &mut Criterion) {
    let data = generate_chapter_workbook(1);
    let workbook = open_workbook(Cursor::new(data)).unwrap();
    let sheet = &workbook.worksheets[0];
    let resolver = CellResolver::new(sheet, workbook.shared_strings.as_deref());

    c.bench_function("resolve_full_grid", |b| {
        b.iter(|| {
            for row in 2..=8u32 {
                for col in 1..=7u32 {
                    let cell = reference::encode(row, col).unwrap();
                    black_box(resolver.resolve(black_box(&cell)).unwrap());
                }
            }
        });
    });
}

fn benchmark_extract_workbook(c: &mut Criterion) {
    let extractor = ExtractorBuilder::new().build().unwrap();
    let mut group = c.benchmark_group("extract_workbook");

    for sheets in [1usize, 10, 50] {
        let data = generate_chapter_workbook(sheets);
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_with_input(BenchmarkId::new("open_and_extract", sheets), &data, |b, data| {
            b.iter(|| {
                let workbook = open_workbook(Cursor::new(black_box(data.as_slice()))).unwrap();
                let extraction = extractor.extract_workbook(&workbook);
                black_box(extraction.document.to_json().unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_reference_codec,
    benchmark_resolve,
    benchmark_extract_workbook
);
criterion_main!(benches);
