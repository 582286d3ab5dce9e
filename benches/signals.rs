//! Benchmarks for reactive-core's track/trigger/effect throughput.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use reactive_core::{computed, effect, r#ref, EffectOptions, Value};

// =============================================================================
// REF BENCHMARKS
// =============================================================================

fn bench_ref_create(c: &mut Criterion) {
    c.bench_function("ref_create", |b| {
        b.iter(|| black_box(r#ref(Value::from(0.0))))
    });
}

fn bench_ref_get(c: &mut Criterion) {
    let r = r#ref(Value::from(42.0));
    c.bench_function("ref_get", |b| b.iter(|| black_box(r.get())));
}

fn bench_ref_set(c: &mut Criterion) {
    let r = r#ref(Value::from(0.0));
    let mut i = 0.0;
    c.bench_function("ref_set", |b| {
        b.iter(|| {
            r.set(Value::from(black_box(i)));
            i += 1.0;
        })
    });
}

fn bench_ref_set_same_value(c: &mut Criterion) {
    let r = r#ref(Value::from(42.0));
    c.bench_function("ref_set_same_value", |b| {
        b.iter(|| r.set(Value::from(black_box(42.0))))
    });
}

// =============================================================================
// COMPUTED BENCHMARKS
// =============================================================================

fn bench_computed_create(c: &mut Criterion) {
    let s = r#ref(Value::from(0.0));
    c.bench_function("computed_create", |b| {
        b.iter(|| {
            let s = s.clone();
            black_box(computed(move || Value::from(s.get().as_number().unwrap() * 2.0)))
        })
    });
}

fn bench_computed_get_cached(c: &mut Criterion) {
    let s = r#ref(Value::from(42.0));
    let s_clone = s.clone();
    let d = computed(move || Value::from(s_clone.get().as_number().unwrap() * 2.0));
    let _ = d.get();

    c.bench_function("computed_get_cached", |b| b.iter(|| black_box(d.get())));
}

fn bench_computed_get_dirty(c: &mut Criterion) {
    let s = r#ref(Value::from(0.0));
    let s_clone = s.clone();
    let d = computed(move || Value::from(s_clone.get().as_number().unwrap() * 2.0));

    let mut i = 0.0;
    c.bench_function("computed_get_dirty", |b| {
        b.iter(|| {
            s.set(Value::from(i));
            i += 1.0;
            black_box(d.get())
        })
    });
}

fn bench_computed_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("computed_chain");

    for depth in [1, 5, 10, 20] {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            let s = r#ref(Value::from(1.0));

            let mut current = {
                let s = s.clone();
                computed(move || Value::from(s.get().as_number().unwrap() + 1.0))
            };

            for _ in 1..depth {
                let prev = current.clone();
                current = computed(move || Value::from(prev.get().as_number().unwrap() + 1.0));
            }

            b.iter(|| {
                s.set(Value::from(black_box(1.0)));
                black_box(current.get())
            })
        });
    }

    group.finish();
}

// =============================================================================
// EFFECT BENCHMARKS
// =============================================================================

fn bench_effect_create(c: &mut Criterion) {
    c.bench_function("effect_create", |b| {
        b.iter(|| black_box(effect(|| {}, EffectOptions::default())))
    });
}

fn bench_effect_trigger(c: &mut Criterion) {
    let s = r#ref(Value::from(0.0));
    let s_clone = s.clone();
    let _e = effect(
        move || {
            black_box(s_clone.get());
        },
        EffectOptions::default(),
    );

    let mut i = 0.0;
    c.bench_function("effect_trigger", |b| {
        b.iter(|| {
            s.set(Value::from(i));
            i += 1.0;
        })
    });
}

fn bench_effect_multiple_deps(c: &mut Criterion) {
    let a = r#ref(Value::from(0.0));
    let b_ref = r#ref(Value::from(0.0));
    let c_ref = r#ref(Value::from(0.0));

    let a_c = a.clone();
    let b_c = b_ref.clone();
    let c_c = c_ref.clone();
    let _e = effect(
        move || {
            black_box(
                a_c.get().as_number().unwrap()
                    + b_c.get().as_number().unwrap()
                    + c_c.get().as_number().unwrap(),
            );
        },
        EffectOptions::default(),
    );

    let mut i = 0.0;
    c.bench_function("effect_multiple_deps", |b| {
        b.iter(|| {
            a.set(Value::from(i));
            i += 1.0;
        })
    });
}

// =============================================================================
// STRESS TESTS
// =============================================================================

fn bench_many_refs(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_refs");

    for count in [100, 1000, 10000] {
        group.bench_with_input(BenchmarkId::new("create", count), &count, |b, &count| {
            b.iter(|| {
                let refs: Vec<_> = (0..count).map(|i| r#ref(Value::from(i as f64))).collect();
                black_box(refs)
            })
        });
    }

    group.finish();
}

fn bench_many_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_effects");

    for count in [10, 100, 500] {
        group.bench_with_input(BenchmarkId::new("trigger", count), &count, |b, &count| {
            let s = r#ref(Value::from(0.0));

            let effects: Vec<_> = (0..count)
                .map(|_| {
                    let s = s.clone();
                    effect(
                        move || {
                            black_box(s.get());
                        },
                        EffectOptions::default(),
                    )
                })
                .collect();

            let mut i = 0.0;
            b.iter(|| {
                s.set(Value::from(i));
                i += 1.0;
            });

            drop(effects);
        });
    }

    group.finish();
}

// =============================================================================
// CRITERION SETUP
// =============================================================================

criterion_group!(
    ref_benches,
    bench_ref_create,
    bench_ref_get,
    bench_ref_set,
    bench_ref_set_same_value,
);

criterion_group!(
    computed_benches,
    bench_computed_create,
    bench_computed_get_cached,
    bench_computed_get_dirty,
    bench_computed_chain,
);

criterion_group!(
    effect_benches,
    bench_effect_create,
    bench_effect_trigger,
    bench_effect_multiple_deps,
);

criterion_group!(stress_benches, bench_many_refs, bench_many_effects);

criterion_main!(ref_benches, computed_benches, effect_benches, stress_benches);
