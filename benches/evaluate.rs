use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use event_algebra::{
    BinaryOp, ComparisonOperation, Event, NumericOperation, OperatorId, OperatorTree, ResetPolicy,
    ResolverCaching, TreeOptions,
};

/// Build a tree with `n` comparisons (each on a unique attribute) ANDed
/// under one root, plus a matching event.
fn build_tree(n: usize, options: TreeOptions) -> (OperatorTree, OperatorId, Arc<Event>) {
    let mut tree = OperatorTree::with_options(options);
    let mut event = Event::new();
    let mut leaves = Vec::with_capacity(n);

    for i in 0..n {
        let attribute = format!("f{i}");
        leaves.push(
            tree.insert(ComparisonOperation::greater_than_or_equal(&attribute, 1_i64))
                .unwrap(),
        );
        event = event.set(&attribute, 10_i64);
    }

    let root = tree.insert(BinaryOp::and(leaves)).unwrap();
    (tree, root, Arc::new(event))
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_eval");

    for &n in &[5, 20, 50] {
        let (mut tree, root, event) = build_tree(n, TreeOptions::default());
        group.bench_function(format!("{n}_comparisons"), |b| {
            b.iter(|| tree.apply(root, black_box(&event)));
        });
    }

    group.finish();
}

fn bench_resolver(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolver");

    for caching in [ResolverCaching::Sticky, ResolverCaching::Recompute] {
        let mut tree =
            OperatorTree::with_options(TreeOptions::new().with_resolver_caching(caching));
        let source = tree.insert(ComparisonOperation::greater_than("x", 0_i64)).unwrap();
        let scaled = tree.insert(NumericOperation::multiply("x", source, 1.5)).unwrap();
        let event = Arc::new(Event::single("x", 8_i64));
        tree.apply(source, &event).unwrap();

        group.bench_function(format!("{caching:?}"), |b| {
            b.iter(|| tree.apply(scaled, black_box(&event)));
        });
    }

    group.finish();
}

fn bench_reset(c: &mut Criterion) {
    let mut group = c.benchmark_group("reset");

    for policy in [
        ResetPolicy::Clear,
        ResetPolicy::ReleaseCaches,
        ResetPolicy::RetainMatches,
    ] {
        let (mut tree, root, event) =
            build_tree(50, TreeOptions::new().with_reset_policy(policy));
        group.bench_function(format!("{policy:?}"), |b| {
            b.iter(|| {
                tree.apply(root, &event).unwrap();
                tree.reset_all();
            });
        });
    }

    group.finish();
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    for &n in &[5, 20, 50] {
        group.bench_function(format!("{n}_comparisons"), |b| {
            b.iter(|| black_box(build_tree(n, TreeOptions::default())));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_evaluate,
    bench_resolver,
    bench_reset,
    bench_construction
);
criterion_main!(benches);
