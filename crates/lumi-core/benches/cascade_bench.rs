//! # Cascade Benchmarks
//!
//! Performance benchmarks for the lumi-core decision cascade.
//!
//! Run with: `cargo bench -p lumi-core`

use criterion::{Criterion, criterion_group, criterion_main};
use lumi_core::{
    Cascade, LabelScore, ModelVersions, Observation, Score, ThresholdGrid, Thresholds,
    ZeroShotOutput, grid_search,
};
use std::hint::black_box;

fn full_distribution() -> Vec<LabelScore> {
    [
        ("anger", 120_000),
        ("disgust", 40_000),
        ("fear", 210_000),
        ("joy", 180_000),
        ("neutral", 250_000),
        ("sadness", 150_000),
        ("surprise", 50_000),
    ]
    .into_iter()
    .map(|(l, ppm)| LabelScore::new(l, Score::from_ppm(ppm)))
    .collect()
}

fn zero_shot() -> ZeroShotOutput {
    ZeroShotOutput {
        labels: vec!["Fearful/Anxious".to_string(), "Calm/Relaxed".to_string()],
        scores: vec![Score::from_ppm(420_000), Score::from_ppm(160_000)],
    }
}

fn bench_decide(c: &mut Criterion) {
    let cascade = Cascade::default();
    let scores = full_distribution();
    let zs = zero_shot();

    c.bench_function("cascade_decide_fallthrough", |b| {
        b.iter(|| cascade.decide(black_box("exam tomorrow"), black_box(&scores), |_| zs.clone()));
    });
}

fn bench_grid(c: &mut Criterion) {
    let observations: Vec<Observation> = (0..100)
        .map(|i| Observation {
            text: format!("entry {}", i),
            label: "Fearful/Anxious".to_string(),
            emotion_scores: full_distribution(),
            zero_shot: zero_shot(),
        })
        .collect();
    let grid = ThresholdGrid::default();
    let versions = ModelVersions::default();

    c.bench_function("grid_search_100_samples", |b| {
        b.iter(|| {
            grid_search(
                black_box(&observations),
                &grid,
                Thresholds::default(),
                &versions,
            )
        });
    });
}

criterion_group!(benches, bench_decide, bench_grid);
criterion_main!(benches);
