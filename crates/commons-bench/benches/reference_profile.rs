//! Criterion benchmarks for full environment steps.

use std::hint::black_box;

use commons_bench::{random_actions, reference_profile, stress_profile};
use commons_core::EnvKey;
use commons_engine::{BatchedEnv, HarvestEnv};
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_step_reference(c: &mut Criterion) {
    let env = HarvestEnv::new(reference_profile()).unwrap();
    let (_, mut state) = env.reset(EnvKey(42));
    let mut t = 0u64;

    c.bench_function("step_reference_7_agents", |b| {
        b.iter(|| {
            t += 1;
            let key = EnvKey(42).fold_in(t);
            let actions = random_actions(key, env.num_agents());
            let result = env.step(key, &state, &actions);
            state = black_box(result).state;
        });
    });
}

fn bench_step_stress(c: &mut Criterion) {
    let env = HarvestEnv::new(stress_profile()).unwrap();
    let (_, mut state) = env.reset(EnvKey(42));
    let mut t = 0u64;

    c.bench_function("step_stress_32_agents", |b| {
        b.iter(|| {
            t += 1;
            let key = EnvKey(7).fold_in(t);
            let actions = random_actions(key, env.num_agents());
            let result = env.step(key, &state, &actions);
            state = black_box(result).state;
        });
    });
}

fn bench_reset(c: &mut Criterion) {
    let env = HarvestEnv::new(reference_profile()).unwrap();
    let mut t = 0u64;
    c.bench_function("reset_reference", |b| {
        b.iter(|| {
            t += 1;
            black_box(env.reset(EnvKey(t)));
        });
    });
}

fn bench_batched_8(c: &mut Criterion) {
    let mut batch = BatchedEnv::new(reference_profile(), 8, 42).unwrap();
    let n = batch.env().num_agents();
    let mut t = 0u64;

    c.bench_function("step_batched_8_worlds", |b| {
        b.iter(|| {
            t += 1;
            let keys: Vec<EnvKey> = (0..8).map(|w| EnvKey(w).fold_in(t)).collect();
            let codes: Vec<Vec<u8>> = keys
                .iter()
                .map(|&k| random_actions(k, n).iter().map(|a| a.code()).collect())
                .collect();
            black_box(batch.step_all(&keys, &codes).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_step_reference,
    bench_step_stress,
    bench_reset,
    bench_batched_8
);
criterion_main!(benches);
