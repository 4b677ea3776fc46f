//! Benchmarks for grid building and row operation planning.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_possible_truncation)]

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use formgrid::editor::{plan_row_operation, RowOperation};
use formgrid::types::{LayoutConfiguration, RawCell, Section, SectionSnapshot};
use formgrid::{build_grid, PresentationMode};

/// Section with `rows` configured rows of 4 columns, each holding two
/// parameters and one spanning text cell.
fn section(rows: u32) -> SectionSnapshot {
    let config = LayoutConfiguration::default()
        .with_rows_columns((1..=rows).map(|r| (r, 4)).collect::<BTreeMap<_, _>>());
    let mut parameters = Vec::new();
    let mut text_cells = Vec::new();
    for row in 1..=rows {
        let base = u64::from(row) * 10;
        for column in 1..=2 {
            parameters.push(RawCell {
                id: base + u64::from(column),
                parameter: Some(serde_json::json!(base + u64::from(column))),
                grid_row: Some(row),
                grid_column: Some(column),
                ..RawCell::default()
            });
        }
        text_cells.push(RawCell {
            id: base,
            content: Some(format!("row {row}")),
            grid_row: Some(row),
            grid_column: Some(3),
            grid_span: Some(2),
            ..RawCell::default()
        });
    }
    SectionSnapshot {
        section: Section {
            id: 1,
            config,
            ..Section::default()
        },
        parameters,
        text_cells,
    }
}

fn bench_build_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_grid");
    for rows in [10_u32, 100, 1_000] {
        let snapshot = section(rows);
        group.throughput(Throughput::Elements(u64::from(rows) * 3));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &snapshot, |b, snapshot| {
            b.iter(|| build_grid(black_box(snapshot), PresentationMode::Admin));
        });
    }
    group.finish();
}

/// Build with a stale tail and colliding cells, the degraded path.
fn bench_build_grid_stale(c: &mut Criterion) {
    let mut snapshot = section(200);
    for i in 0..200_u32 {
        snapshot.text_cells.push(RawCell {
            id: 10_000 + u64::from(i),
            content: Some("stale".into()),
            grid_row: Some(if i % 2 == 0 { 500 + i } else { i % 200 + 1 }),
            grid_column: Some(1),
            grid_span: Some(1),
            ..RawCell::default()
        });
    }
    c.bench_function("build_grid_stale", |b| {
        b.iter(|| build_grid(black_box(&snapshot), PresentationMode::View));
    });
}

fn bench_plan_row_operations(c: &mut Criterion) {
    let snapshot = section(500);
    let mut group = c.benchmark_group("plan_row_operation");
    for (name, op) in [
        ("insert_before_first", RowOperation::InsertBefore { row: 1 }),
        ("insert_after_middle", RowOperation::InsertAfter { row: 250 }),
        ("delete_first", RowOperation::Delete { row: 1 }),
        ("set_columns", RowOperation::SetColumns { row: 250, columns: 5 }),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| plan_row_operation(black_box(&snapshot), op).expect("plannable"));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_build_grid,
    bench_build_grid_stale,
    bench_plan_row_operations
);
criterion_main!(benches);
