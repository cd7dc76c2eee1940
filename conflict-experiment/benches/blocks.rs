use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pprof::criterion::{Output, PProfProfiler};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

use conflict_experiment::{BlockBuilder, TaskConfig, TaskDefinition, TaskKind, score_block};
use conflict_core::{Stage, TrialId, TrialOutcome};
use conflict_timing::{BoundedExponential, IntervalSampler};

/// Builds the block builder fresh for each batch so every measured call sees
/// a full schedule.
pub fn bench_test_blocks(c: &mut Criterion) {
    let config = TaskConfig::default();
    let mut group = c.benchmark_group("test_block");
    group
        .sample_size(50)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));

    for kind in [TaskKind::Flanker, TaskKind::Stroop] {
        let definition = TaskDefinition::new(kind, config.group_index).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(kind), &definition, |b, def| {
            let mut rng = StdRng::seed_from_u64(1);
            b.iter_batched(
                || def.block_builder(&config, &mut rng).unwrap(),
                |mut builder| {
                    let mut rng = StdRng::seed_from_u64(2);
                    black_box(builder.test_block(&mut rng).unwrap());
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

pub fn bench_iti(c: &mut Criterion) {
    let sampler = BoundedExponential::default();
    let mut rng = StdRng::seed_from_u64(3);
    c.bench_function("iti_sample", |b| {
        b.iter(|| black_box(sampler.next_interval(&mut rng)));
    });
}

pub fn bench_scoring(c: &mut Criterion) {
    let config = TaskConfig::default();
    let definition = TaskDefinition::new(TaskKind::Stroop, config.group_index).unwrap();
    let mut rng = StdRng::seed_from_u64(4);
    let mut builder = definition.block_builder(&config, &mut rng).unwrap();

    // Three full test blocks, the last one scored.
    let mut log = Vec::new();
    for block in 0..config.num_test_blocks {
        let queue = builder.test_block(&mut rng).unwrap();
        log.extend(queue.as_slice().iter().map(|spec| {
            TrialOutcome::new(
                TrialId::TestTrial,
                Stage::Test,
                block,
                spec,
                Some(spec.correct_response),
                Some(520.0),
            )
        }));
    }

    c.bench_function("score_block", |b| {
        b.iter(|| black_box(score_block(black_box(&log), Stage::Test, 2)));
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
        .confidence_level(0.95)
        .noise_threshold(0.02)
        .significance_level(0.05);
    targets = bench_test_blocks, bench_iti, bench_scoring
}

criterion_main!(benches);
