use criterion::{black_box, criterion_group, criterion_main, Criterion};
use databoard::dashboard::config::GridConfig;
use databoard::dashboard::layout::GridLayout;
use databoard::dashboard::model::{
    CategoricalData, ChartDataEnvelope, ChartType, TableData, WidgetId,
};
use databoard::dashboard::to_render_config;
use serde_json::{json, Map, Value};

fn bench_render(c: &mut Criterion) {
    let labels: Vec<String> = (0..1_000).map(|i| format!("Item {i}")).collect();
    let values: Vec<f64> = (0..1_000).map(|i| i as f64).collect();
    let pie = ChartDataEnvelope::categorical(
        ChartType::Pie,
        CategoricalData {
            labels,
            values,
            x_label: None,
            y_label: Some("count".into()),
        },
    )
    .unwrap();
    c.bench_function("pie_config_1k", |b| {
        b.iter(|| to_render_config(black_box(&pie)))
    });

    let rows: Vec<Map<String, Value>> = (0..1_000)
        .filter_map(|i| {
            json!({"id": i, "name": format!("<row {i}>"), "score": i as f64 / 3.0})
                .as_object()
                .cloned()
        })
        .collect();
    let table = ChartDataEnvelope::Table(TableData {
        columns: None,
        rows,
    });
    c.bench_function("table_view_1k", |b| {
        b.iter(|| to_render_config(black_box(&table)))
    });
}

fn bench_grid(c: &mut Criterion) {
    c.bench_function("grid_first_fit_200", |b| {
        b.iter(|| {
            let mut grid = GridLayout::new(&GridConfig::default());
            for n in 1..=200 {
                let _ = grid.add(WidgetId::from_counter(n), 6, 4);
            }
            grid.rows()
        })
    });
}

criterion_group!(benches, bench_render, bench_grid);
criterion_main!(benches);
