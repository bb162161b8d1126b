// Benchmarks for the per-tick hot paths: pheromone decay over a full-size
// field, and whole-match ticks at the default balance.
//
// Run with `cargo bench -p formica_sim`.

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use formica_sim::config::GameConfig;
use formica_sim::pheromone::PheromoneField;
use formica_sim::prng::GameRng;
use formica_sim::sim::SimState;
use formica_sim::types::Vec2;
use std::hint::black_box;

/// A default-size field with every channel scattered with deposits.
fn seeded_field(config: &GameConfig, deposits: usize) -> PheromoneField {
    let mut field = PheromoneField::from_config(config);
    let mut rng = GameRng::new(0xF0F0);
    for _ in 0..deposits {
        let pos = Vec2::new(
            rng.range_f32(0.0, config.world.width),
            rng.range_f32(0.0, config.world.height),
        );
        let channel = rng.range_usize(0, field.channel_count());
        field.deposit(pos, channel, rng.range_f32(1.0, 200.0));
    }
    field
}

fn pheromone_decay(c: &mut Criterion) {
    let config = GameConfig::default();
    let mut group = c.benchmark_group("pheromone_decay");
    for deposits in [1_000usize, 20_000] {
        group.bench_function(format!("deposits_{deposits}"), |b| {
            b.iter_batched(
                || seeded_field(&config, deposits),
                |mut field| {
                    field.decay();
                    black_box(field)
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn full_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("sim_step");
    for warmup in [0u32, 600] {
        group.bench_function(format!("after_{warmup}_ticks"), |b| {
            b.iter_batched(
                || {
                    let mut sim = SimState::new(0xBEEF).expect("default config is valid");
                    for _ in 0..warmup {
                        sim.step();
                    }
                    sim
                },
                |mut sim| {
                    for _ in 0..16 {
                        black_box(sim.step());
                    }
                    sim
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, pheromone_decay, full_tick);
criterion_main!(benches);
