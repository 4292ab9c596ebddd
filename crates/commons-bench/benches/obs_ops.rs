//! Criterion micro-benchmarks for observation building.

use std::hint::black_box;

use commons_bench::reference_profile;
use commons_core::{AgentId, EnvKey};
use commons_obs::{ObsLayout, ObservationBuilder};
use commons_engine::HarvestEnv;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_observe_all(c: &mut Criterion) {
    let env = HarvestEnv::new(reference_profile()).unwrap();
    let state = env.reset_state(EnvKey(42));

    let mut group = c.benchmark_group("observe_all_agents");
    for window in [5usize, 11, 21] {
        let builder = ObservationBuilder::new(window, ObsLayout::Spatial).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(window), &builder, |b, builder| {
            b.iter(|| black_box(builder.observe(&state)));
        });
    }
    group.finish();
}

fn bench_observe_one(c: &mut Criterion) {
    let env = HarvestEnv::new(reference_profile()).unwrap();
    let state = env.reset_state(EnvKey(42));
    let builder = ObservationBuilder::new(11, ObsLayout::Flat).unwrap();

    c.bench_function("observe_single_agent_flat", |b| {
        b.iter(|| black_box(builder.observe_agent(&state, AgentId(3))));
    });
}

criterion_group!(benches, bench_observe_all, bench_observe_one);
criterion_main!(benches);
