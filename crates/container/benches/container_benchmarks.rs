//! Performance benchmarks for service resolution
//!
//! Measures cold construction of dependency chains of various lengths and the
//! cached lookup path taken by every subsequent `get`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use elif_container::{Argument, Container, ContainerConfig, ServiceDefinition, TypeRegistry};

struct Link {
    _next: Option<std::sync::Arc<Link>>,
}

fn link_types() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    types.register("Link", |args| {
        let next = if args.is_empty() {
            None
        } else {
            Some(args.service::<Link>(0)?)
        };
        Ok(Link { _next: next })
    });
    types
}

/// Create a chain Link0 -> Link1 -> ... -> Link(n-1)
fn create_chain_container(size: usize) -> Container {
    let mut builder = Container::builder()
        .types(link_types())
        .config(ContainerConfig::new().with_max_resolution_depth(size + 1));

    for i in 0..size {
        let mut definition = ServiceDefinition::new("Link");
        if i + 1 < size {
            definition = definition.argument(Argument::service(format!("Link{}", i + 1)));
        }
        builder = builder.service(format!("Link{}", i), definition);
    }

    builder.build().unwrap()
}

/// Benchmark first-access construction of whole chains
fn benchmark_cold_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_resolution");

    for size in [1, 10, 50, 200].iter() {
        group.bench_with_input(BenchmarkId::new("linear_chain", size), size, |b, &size| {
            b.iter(|| {
                let container = create_chain_container(size);
                black_box(container.get("Link0").unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark cache hits once a service exists
fn benchmark_cached_resolution(c: &mut Criterion) {
    let container = create_chain_container(10);
    container.get("Link0").unwrap();

    c.bench_function("cached_get", |b| {
        b.iter(|| black_box(container.get(black_box("Link0")).unwrap()));
    });

    c.bench_function("get_parameter_missing", |b| {
        b.iter(|| black_box(container.has_parameter(black_box("app.missing.path"))));
    });
}

/// Benchmark whole-table validation
fn benchmark_validation(c: &mut Criterion) {
    let container = create_chain_container(200);

    c.bench_function("validate_200_services", |b| {
        b.iter(|| black_box(container.validate().is_ok()));
    });
}

criterion_group!(
    benches,
    benchmark_cold_resolution,
    benchmark_cached_resolution,
    benchmark_validation
);
criterion_main!(benches);
