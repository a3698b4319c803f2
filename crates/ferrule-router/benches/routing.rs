//! Resolver benchmarks over a catalog-shaped route table.
//!
//! `cargo bench -p ferrule-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrule_router::Router;
use http::Method;

/// `families` groups of five routes each: a collection, an item, a literal
/// sibling of the item, a nested item and a delete.
fn catalog(families: usize) -> Router<usize> {
    let mut router = Router::new();
    for f in 0..families {
        let id = f * 5;
        router.get(&format!("/shop/family{f}"), id, []).unwrap();
        router.get(&format!("/shop/family{f}/{{sku}}"), id + 1, []).unwrap();
        router.get(&format!("/shop/family{f}/featured"), id + 2, []).unwrap();
        router
            .get(&format!("/shop/family{f}/{{sku}}/variants/{{variant}}"), id + 3, [])
            .unwrap();
        router.delete(&format!("/shop/family{f}/{{sku}}"), id + 4, []).unwrap();
    }
    router
}

fn bench_shapes(c: &mut Criterion) {
    let router = catalog(40);
    let mut group = c.benchmark_group("resolve");

    for (name, method, path) in [
        ("literal", Method::GET, "/shop/family17/featured"),
        ("parameter", Method::GET, "/shop/family17/SKU-0042"),
        ("nested", Method::GET, "/shop/family17/sku-0042/variants/blue"),
        ("trailing_slash", Method::GET, "/Shop/Family17/"),
        ("miss", Method::GET, "/shop/family17/sku-0042/reviews"),
        ("other_method", Method::DELETE, "/shop/family17/sku-0042"),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(router.resolve(&method, black_box(path))));
        });
    }
    group.finish();
}

fn bench_table_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_size");

    for families in [2, 20, 200] {
        let router = catalog(families);
        let path = format!("/shop/family{}/sku-1/variants/red", families - 1);
        group.bench_with_input(BenchmarkId::from_parameter(families * 5), &path, |b, path| {
            b.iter(|| black_box(router.resolve(&Method::GET, path)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_shapes, bench_table_size);
criterion_main!(benches);
