//! Benchmarks for the query renderers and the field serializer
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use dualquery::flux::{render_lines, render_read, ReadRequest, WriteRow};
use dualquery::schema::{FieldKind, Value};
use dualquery::serializer::serialize;
use dualquery::sql::{render, AbstractQuery, JoinSpec, RenderMode};

fn orders_query() -> AbstractQuery {
    let users = AbstractQuery::new("users")
        .alias("u")
        .columns(["name as customer", "email"]);

    AbstractQuery::new("orders")
        .alias("o")
        .columns([
            "id",
            "o.total",
            "UNCOMPRESS(o.notes) as notes",
            "DISTINCT status as state",
        ])
        .join_query(users, JoinSpec::left("user_id", "id"))
        .where_clause("AND o.created_at > '2024-01-01'")
        .order_by("o.id DESC")
        .page(3, 25)
}

fn bench_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql");
    let query = orders_query();

    group.bench_function("select", |b| {
        b.iter(|| render(black_box(&query), RenderMode::Select, None))
    });

    group.bench_function("count_distinct", |b| {
        b.iter(|| render(black_box(&query), RenderMode::CountDistinct, Some("o.id")))
    });

    let write = AbstractQuery::new("orders")
        .where_clause("AND id = 1")
        .set("total", "12.5")
        .set("notes", "O\\'Reilly's order")
        .set("body", "COMPRESS('{}')");

    group.bench_function("update", |b| {
        b.iter(|| render(black_box(&write), RenderMode::Update, None))
    });

    group.finish();
}

fn bench_flux(c: &mut Criterion) {
    let mut group = c.benchmark_group("flux");

    let request = ReadRequest::new("metrics")
        .from_beginning()
        .stop("now()")
        .stage("filter(fn: (r) => r.host == \"a\")")
        .stage("aggregateWindow(every: 1m, fn: mean)")
        .measurement("cpu");

    group.bench_function("render_read", |b| b.iter(|| render_read(black_box(&request))));

    for size in [100, 1000] {
        let rows: Vec<WriteRow> = (0..size)
            .map(|i| {
                WriteRow::new()
                    .time(1_700_000_000 + i as i64)
                    .tag("host", "bench host")
                    .field("value", i as f64 * 0.5)
                    .field("label", "a,b=c")
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("render_lines_{}", size), |b| {
            b.iter(|| render_lines("cpu", black_box(&rows), 0))
        });
    }

    group.finish();
}

fn bench_serializer(c: &mut Criterion) {
    let mut group = c.benchmark_group("serializer");

    let text = Value::from("  <p>It's a \"quoted\" value</p>  ");
    let json = Value::Json(serde_json::json!({"tags": ["a", "b"], "note": "O'Reilly"}));

    group.bench_function("html", |b| {
        b.iter(|| serialize(black_box(&text), FieldKind::Html, false))
    });
    group.bench_function("json_compressed", |b| {
        b.iter(|| serialize(black_box(&json), FieldKind::Json, true))
    });
    group.bench_function("float", |b| {
        b.iter(|| serialize(black_box(&Value::from("12.75")), FieldKind::Float, false))
    });

    group.finish();
}

criterion_group!(benches, bench_sql, bench_flux, bench_serializer);
criterion_main!(benches);
