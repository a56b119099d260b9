use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scratch_dom::{merge, properties_from_json, BuildArg, Document, MergeMode, PropertyMap, Value};
use serde_json::json;

fn sample_properties() -> PropertyMap {
    properties_from_json(json!({
        "className": "row",
        "title": "benchmark",
        "style": { "color": "red", "margin": "0", "border": { "width": 1 } }
    }))
    .unwrap_or_default()
}

fn bench_merge(c: &mut Criterion) {
    let source = sample_properties();

    let modes = [
        ("merge_alias", MergeMode::Alias),
        ("merge_deep_copy", MergeMode::DeepCopy),
    ];
    for (name, mode) in modes {
        c.bench_function(name, |b| {
            b.iter(|| {
                let mut target = sample_properties();
                merge(&mut target, black_box(&source), mode);
                target
            })
        });
    }
}

fn bench_build(c: &mut Criterion) {
    let properties = sample_properties();

    c.bench_function("build_100_rows", |b| {
        b.iter(|| {
            let mut doc = Document::new();
            let rows: Vec<Value> = (0..100i32)
                .filter_map(|i| {
                    doc.build(
                        "li",
                        [
                            BuildArg::from(properties.clone()),
                            BuildArg::from(vec![Value::from(i)]),
                        ],
                    )
                    .ok()
                    .map(Value::Node)
                })
                .collect();
            doc.build("ul", [BuildArg::from(rows)]).ok()
        })
    });
}

criterion_group!(benches, bench_merge, bench_build);
criterion_main!(benches);
