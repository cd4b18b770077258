/*!
# Filter Benchmarks

Measures filter compilation for typical auth-framework queries.

## Usage

```bash
cargo bench --bench filter_benchmarks

# Quick benchmark with fewer samples
cargo bench --bench filter_benchmarks -- --quick
```

HTML reports are generated in `target/criterion/report/index.html`.
*/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pbauth_adapter::filtering::{Condition, FilterOperator, compile_where, page_for};
use serde_json::json;
use std::hint::black_box;

fn session_lookup() -> Vec<Condition> {
    vec![
        Condition::eq("token", "b2c5c8e0a1f94d0e8b7a"),
        Condition::new("expiresAt", FilterOperator::Gt, "2024-01-01 00:00:00"),
    ]
}

fn wide_query(width: usize) -> Vec<Condition> {
    (0..width)
        .map(|n| match n % 4 {
            0 => Condition::eq(format!("field{n}"), format!("value{n}")),
            1 => Condition::new(format!("field{n}"), FilterOperator::Gte, n),
            2 => Condition::new(format!("field{n}"), FilterOperator::StartsWith, "prefix"),
            _ => Condition::new(format!("field{n}"), FilterOperator::In, json!(["a", "b", "c", n])),
        })
        .collect()
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("Filter Compilation");

    let lookup = session_lookup();
    group.bench_function("session_lookup", |b| b.iter(|| compile_where(black_box(&lookup))));

    for width in [1, 8, 64] {
        let conditions = wide_query(width);
        group.bench_with_input(BenchmarkId::new("wide_query", width), &conditions, |b, conditions| {
            b.iter(|| compile_where(black_box(conditions)));
        });
    }

    group.finish();
}

fn bench_pagination(c: &mut Criterion) {
    c.bench_function("page_for", |b| {
        b.iter(|| page_for(black_box(Some(1_250)), black_box(Some(50))));
    });
}

criterion_group!(benches, bench_compile, bench_pagination);
criterion_main!(benches);
