//! Benchmarks for the respack pipeline.

use std::collections::{BTreeMap, BTreeSet};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use respack::pipeline::{BuildResult, Theme};
use respack::{build_archive, exclude, merge, rasterize, FileSet, PathEntry, SourceTree};

const ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="96" height="96">
  <rect width="96" height="96" fill="#ff0000"/>
  <circle cx="48" cy="48" r="32" fill="#00ff00" stroke="#0000ff" stroke-width="4"/>
</svg>"##;

/// A source tree with `n` base assets and an overlay touching every other one.
fn synthetic_tree(n: usize) -> SourceTree {
    let mut files = FileSet::new();
    for i in 0..n {
        files.insert(PathEntry::new(
            format!("assets/textures/block_{:04}.png", i),
            vec![(i % 251) as u8; 256],
        ));
        if i % 2 == 0 {
            files.insert(PathEntry::new(
                format!("34/assets/textures/block_{:04}.png", i + n / 2),
                vec![0u8; 256],
            ));
        }
    }
    SourceTree::from_files("src", files)
}

// -- Resolution benchmarks --

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    for n in [100, 1_000, 10_000] {
        let tree = synthetic_tree(n);
        let removals: BTreeSet<String> = (0..n)
            .step_by(10)
            .map(|i| format!("assets/textures/block_{:04}.png", i))
            .collect();

        group.bench_with_input(BenchmarkId::new("exclude", n), &n, |b, _| {
            b.iter(|| exclude(black_box(tree.files()), black_box(&removals)))
        });

        group.bench_with_input(BenchmarkId::new("exclude_then_merge", n), &n, |b, _| {
            b.iter(|| {
                let filtered = exclude(tree.files(), &removals);
                merge(black_box(filtered), &tree, Some("34"))
            })
        });
    }

    group.finish();
}

// -- Vector benchmarks --

fn bench_vectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectors");

    let defaults: BTreeMap<String, String> = [
        ("red", "#ff0000"),
        ("green", "#00ff00"),
        ("blue", "#0000ff"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let theme = Theme::new(
        "nord",
        [("red", "#bf616a"), ("green", "#a3be8c"), ("blue", "#5e81ac")],
    )
    .unwrap();
    let recolour = theme.plan(&defaults);

    group.bench_function("theme_apply", |b| {
        b.iter(|| recolour.apply(black_box(ICON_SVG)))
    });

    for dpi in [24, 96, 384] {
        group.bench_with_input(BenchmarkId::new("rasterize", dpi), &dpi, |b, &dpi| {
            b.iter(|| rasterize("icon.svg", black_box(ICON_SVG.as_bytes()), dpi).unwrap())
        });
    }

    group.finish();
}

// -- Archive benchmarks --

fn bench_archive(c: &mut Criterion) {
    let tree = synthetic_tree(1_000);
    let build = BuildResult {
        format: 34,
        label: "1.21".to_string(),
        packver: "bench".to_string(),
        scale: None,
        dpi: None,
        files: tree.files().clone(),
        manifest: r#"{"pack": {"pack_format": 34, "description": "bench"}}"#.to_string(),
    };

    c.bench_function("build_archive_1000", |b| {
        b.iter(|| build_archive(black_box(&build), None).unwrap())
    });
}

criterion_group!(benches, bench_resolution, bench_vectors, bench_archive);
criterion_main!(benches);
