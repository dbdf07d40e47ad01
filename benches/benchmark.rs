use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use filearray::construct::{Record, Store};
use serde_json::{json, Value};

fn records(n: i64) -> Vec<Record> {
    (1..=n)
        .map(|i| match json!({"Name": format!("name{}", i % 997), "Age": i % 90, "ID": i}) {
            Value::Object(record) => record,
            _ => unreachable!(),
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    for n in [1_000, 100_000] {
        let mut store = Store::from_records(records(n)).unwrap();
        c.bench_function(&format!("search regex {}", n), |b| {
            b.iter(|| store.search("Name", black_box(&json!("^name1[0-9]$"))).unwrap())
        });
        c.bench_function(&format!("search equal {}", n), |b| {
            b.iter(|| store.search("Age", black_box(&json!(42))).unwrap())
        });
        c.bench_function(&format!("sort {}", n), |b| {
            b.iter(|| store.sort(black_box("Name"), false).unwrap())
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
