use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use dom::{Document, NodeId};
use renderer::{Namespace, NodeOps, RendererOptions, StaticRange, TrustedGate};
use std::hint::black_box;
use std::rc::Rc;

const ROWS: usize = 50;

fn make_rows(rows: usize) -> String {
    let mut out = String::with_capacity(rows * 64);
    for i in 0..rows {
        out.push_str("<tr class=\"row\"><td>");
        out.push_str(&i.to_string());
        out.push_str("</td><td><a href=\"#\">label</a></td></tr>");
    }
    out
}

/// Renderer with `content` inserted once, returning the range to clone from
fn primed(content: &str) -> (NodeOps<Document>, NodeId, StaticRange<NodeId>) {
    let mut doc = Document::new();
    let table = doc.create_element("tbody").unwrap();
    doc.append_child(doc.root(), table).unwrap();
    let mut ops = NodeOps::new(doc, Rc::new(TrustedGate::inactive()));
    let range = ops
        .insert_static_content(content, table, None, Namespace::None, None)
        .unwrap();
    (ops, table, range)
}

fn bench_fresh_insert(c: &mut Criterion) {
    let content = make_rows(ROWS);
    c.bench_function("bench_insert_static_fresh", |b| {
        b.iter_batched(
            || primed(&content),
            |(mut ops, table, _)| {
                let range = ops.insert_static_content(
                    black_box(&content),
                    table,
                    None,
                    Namespace::None,
                    None,
                );
                black_box(range.is_ok());
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_cached_insert(c: &mut Criterion) {
    let content = make_rows(ROWS);
    c.bench_function("bench_insert_static_cached", |b| {
        b.iter_batched(
            || primed(&content),
            |(mut ops, table, cached)| {
                let range = ops.insert_static_content(
                    black_box(&content),
                    table,
                    None,
                    Namespace::None,
                    cached.bounds(),
                );
                black_box(range.is_ok());
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_fresh_insert, bench_cached_insert);
criterion_main!(benches);
