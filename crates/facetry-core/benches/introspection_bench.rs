//! # Introspection Benchmarks
//!
//! Performance benchmarks for facetry-core introspection, validation and export.
//!
//! Run with: `cargo bench -p facetry-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use facetry_core::{
    Annotation, ClassDescriptor, MetamodelConfig, MetamodelContext, MethodDescriptor,
    ParamDescriptor, ReflectorConfig, SpecificationLoader, TypeCatalog, TypeRef,
};
use std::hint::black_box;

/// A chain of N types, each referencing the next and the first.
fn create_chain_catalog(size: usize) -> TypeCatalog {
    let types = (0..size).map(|i| {
        let next = format!("Type{}", (i + 1) % size);
        ClassDescriptor::new(format!("Type{i}"))
            .with_annotation(Annotation::new("Entity"))
            .with_method(MethodDescriptor::new("getName", TypeRef::named("string")))
            .with_method(MethodDescriptor::new("setName", TypeRef::Void).with_param(
                ParamDescriptor::new(TypeRef::named("string")),
            ))
            .with_method(MethodDescriptor::new("getNext", TypeRef::named(next.as_str())))
            .with_method(MethodDescriptor::new("getAll", TypeRef::collection("list", "Type0")))
            .with_method(
                MethodDescriptor::new("link", TypeRef::Void)
                    .with_param(ParamDescriptor::new(TypeRef::named(next)).named("target")),
            )
    });
    TypeCatalog::from_descriptors(types).expect("catalog")
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_cold_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_load");

    for size in [10, 100, 500].iter() {
        let catalog = create_chain_catalog(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let loader = SpecificationLoader::new(catalog.clone(), ReflectorConfig::default());
                black_box(loader.load("Type0").expect("load"))
            });
        });
    }

    group.finish();
}

fn bench_cached_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_load");

    for size in [10, 100, 500].iter() {
        let loader = SpecificationLoader::new(create_chain_catalog(*size), ReflectorConfig::default());
        loader.load("Type0").expect("load");
        let target = format!("Type{}", size / 2);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(loader.load(&target)));
        });
    }

    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation");

    for size in [10, 100, 500].iter() {
        let context = MetamodelContext::new(create_chain_catalog(*size), MetamodelConfig::default());
        context.bootstrap().expect("bootstrap");

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(context.validate()));
        });
    }

    group.finish();
}

fn bench_export_canonical(c: &mut Criterion) {
    use facetry_core::export::export_canonical;

    let mut group = c.benchmark_group("export_canonical");

    for size in [10, 100, 500].iter() {
        let context = MetamodelContext::new(create_chain_catalog(*size), MetamodelConfig::default());
        context.bootstrap().expect("bootstrap");
        let specs = context.specifications();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(export_canonical(&specs)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cold_load,
    bench_cached_load,
    bench_validation,
    bench_export_canonical
);
criterion_main!(benches);
