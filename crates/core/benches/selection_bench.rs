//! Selection and leaf extraction benchmarks over a synthetic catalog

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pricetree_core::{
    selected_leaf_ids, CategoryId, CategoryRecord, CategoryTree, FetchStrategy, Selection, StaticFetcher,
    TreeBuilder,
};

/// depth 4, fanout 8: 4680 nodes, 4096 leaves
fn wide_catalog() -> Vec<CategoryRecord> {
    let mut records = Vec::new();
    let mut frontier = vec!["root".to_string()];
    for _ in 0..4 {
        let mut next = Vec::new();
        for parent in &frontier {
            for i in 0..8 {
                let child = format!("{parent}.{i}");
                records.push(CategoryRecord::new(child.as_str(), child.as_str(), Some(parent.as_str().into())));
                next.push(child);
            }
        }
        frontier = next;
    }
    records
}

fn build(strategy: FetchStrategy) -> CategoryTree {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let builder = TreeBuilder::new(StaticFetcher::new(wide_catalog())).with_strategy(strategy);
    runtime.block_on(builder.build(&CategoryId::from("root"))).unwrap()
}

fn bench_tree_build(c: &mut Criterion) {
    c.bench_function("build_sequential_4680", |b| {
        b.iter(|| black_box(build(FetchStrategy::Sequential)))
    });

    c.bench_function("build_parallel_4680", |b| {
        b.iter(|| black_box(build(FetchStrategy::parallel(8))))
    });
}

fn bench_selection(c: &mut Criterion) {
    let tree = build(FetchStrategy::Sequential);
    let root_level = CategoryId::from("root.3");
    let leaf = CategoryId::from("root.3.1.4.1");

    c.bench_function("toggle_root_level_subtree", |b| {
        b.iter(|| {
            let mut sel = Selection::new();
            sel.toggle_select(&tree, &root_level).unwrap();
            sel.toggle_select(&tree, &root_level).unwrap();
            black_box(sel.len())
        });
    });

    c.bench_function("toggle_deep_leaf", |b| {
        let mut sel = Selection::new();
        sel.select(&tree, &root_level).unwrap();
        b.iter(|| {
            sel.toggle_select(&tree, &leaf).unwrap();
            black_box(sel.len())
        });
    });

    c.bench_function("selected_leaf_ids_all", |b| {
        let mut sel = Selection::new();
        for id in tree.root_ids() {
            sel.select(&tree, id).unwrap();
        }
        b.iter(|| black_box(selected_leaf_ids(&tree, &sel).len()));
    });
}

criterion_group!(benches, bench_tree_build, bench_selection);
criterion_main!(benches);
