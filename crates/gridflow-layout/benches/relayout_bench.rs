//! Relayout benchmarks.
//!
//! Measures the full recompute path (placement, dimensions, geometry,
//! transition planning) and the cached path for grids of increasing size,
//! plus a resize sweep that defeats the cache on every step.
//!
//! ## Budgets
//!
//! | Case                  | Budget   |
//! |-----------------------|----------|
//! | Cold relayout, 100    | < 50µs   |
//! | Cold relayout, 1000   | < 600µs  |
//! | Cached relayout       | < 2µs    |
//! | Resize sweep, 20 × 200 | < 5ms   |
//!
//! Run with: cargo bench -p gridflow-layout --bench relayout_bench

use std::hint::black_box;
use std::rc::Rc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use gridflow_core::geometry::Size;
use gridflow_layout::{
    ContentAlignment, GridConfiguration, GridEngine, GridFlow, GridItem, ItemHandle, ItemId,
    PlacementRequest, placement,
};

struct Tile(u64);

impl ItemHandle for Tile {
    fn item_id(&self) -> ItemId {
        ItemId(self.0)
    }

    fn natural_size(&self) -> Size {
        Size::new(80.0 + (self.0 % 5) as f32 * 10.0, 60.0)
    }
}

fn tiles(n: u64) -> Vec<Rc<Tile>> {
    (0..n).map(|i| Rc::new(Tile(i))).collect()
}

fn engine(tiles: &[Rc<Tile>], config: GridConfiguration) -> GridEngine {
    let mut engine = GridEngine::new(config)
        .with_motion_preference(|| false)
        .with_container(Size::new(1280.0, 800.0));
    for (i, tile) in tiles.iter().enumerate() {
        let item = GridItem::new(tile);
        // Every seventh item spans two columns.
        let item = if i % 7 == 0 { item.column_span(2) } else { item };
        engine.add_item(item);
    }
    engine
}

// =============================================================================
// Cold relayout
// =============================================================================

fn bench_cold_relayout(c: &mut Criterion) {
    let mut group = c.benchmark_group("relayout/cold");

    for n in [16u64, 100, 1000] {
        let tiles = tiles(n);
        group.throughput(Throughput::Elements(n));
        group.bench_with_input(BenchmarkId::new("auto", n), &tiles, |b, tiles| {
            let mut e = engine(tiles, GridConfiguration::new());
            b.iter(|| {
                e.invalidate();
                black_box(e.relayout())
            });
        });
        group.bench_with_input(BenchmarkId::new("fixed_8_space_between", n), &tiles, |b, tiles| {
            let config = GridConfiguration::new()
                .columns(8)
                .max_cell_size(Some(Size::new(120.0, 90.0)))
                .justify_content(ContentAlignment::SpaceBetween);
            let mut e = engine(tiles, config);
            b.iter(|| {
                e.invalidate();
                black_box(e.relayout())
            });
        });
    }

    group.finish();
}

// =============================================================================
// Cached relayout
// =============================================================================

fn bench_cached_relayout(c: &mut Criterion) {
    let mut group = c.benchmark_group("relayout/cached");

    for n in [100u64, 1000] {
        let tiles = tiles(n);
        let mut e = engine(&tiles, GridConfiguration::new());
        e.relayout();
        group.bench_function(BenchmarkId::new("hit", n), |b| {
            b.iter(|| black_box(e.relayout()))
        });
    }

    group.finish();
}

// =============================================================================
// Resize sweep (animated, every step misses)
// =============================================================================

fn bench_resize_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("relayout/resize_sweep");
    let tiles = tiles(200);

    group.bench_function("sweep_20", |b| {
        let mut e = engine(&tiles, GridConfiguration::new().animated(true));
        b.iter(|| {
            for step in 0..20u16 {
                e.resize(Size::new(320.0 + f32::from(step) * 64.0, 800.0));
                black_box(e.relayout());
            }
        });
    });

    group.finish();
}

// =============================================================================
// Placement only
// =============================================================================

fn bench_placement(c: &mut Criterion) {
    let mut group = c.benchmark_group("placement/resolve");

    for n in [100u64, 1000] {
        let requests: Vec<PlacementRequest> = (0..n)
            .map(|i| PlacementRequest {
                id: ItemId(i),
                row: (i % 11 == 0).then_some((i / 11) as u32),
                column: (i % 11 == 0).then_some(0),
                row_span: 1,
                column_span: if i % 5 == 0 { 2 } else { 1 },
            })
            .collect();
        group.throughput(Throughput::Elements(n));
        for flow in [GridFlow::Row, GridFlow::ColumnReverse] {
            group.bench_with_input(
                BenchmarkId::new(format!("{flow:?}"), n),
                &requests,
                |b, requests| b.iter(|| black_box(placement::resolve(requests, flow, 12, 12))),
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cold_relayout,
    bench_cached_relayout,
    bench_resize_sweep,
    bench_placement,
);
criterion_main!(benches);
