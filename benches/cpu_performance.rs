use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dyeflow::{
    AdvectForcePass, ForceSample, GridState, PressureRelaxationPass, ProjectionAdvectDyePass,
    SimConfig, Simulator,
};
use glam::Vec2;

fn stirred(size: usize) -> Simulator {
    let mut sim = Simulator::new(SimConfig::with_size(size, size)).unwrap();
    let center = Vec2::splat(size as f32 / 2.0);
    for _ in 0..5 {
        sim.tick_with(ForceSample {
            location: center,
            radius: 16.0,
            force_vector: Vec2::new(2.0, 1.0),
            feed: 1.0,
        });
    }
    sim
}

fn benchmark_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_tick");

    for size in [64, 128, 256].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut sim = stirred(size);
            b.iter(|| {
                black_box(sim.tick_with(ForceSample::NONE));
            });
        });
    }
    group.finish();
}

fn benchmark_passes(c: &mut Criterion) {
    let mut group = c.benchmark_group("passes");
    let size = 256;

    let mut state = GridState::new(size, size).unwrap();
    let force = ForceSample::push(Vec2::splat(128.0), 16.0, Vec2::new(3.0, 0.0));
    for _ in 0..3 {
        state.execute(&AdvectForcePass::new(force, 1.0));
    }

    group.bench_function("advect_force", |b| {
        let mut state = state.clone();
        b.iter(|| state.execute(&AdvectForcePass::new(force, 1.0)));
    });

    group.bench_function("pressure_relaxation", |b| {
        let mut state = state.clone();
        b.iter(|| state.execute(&PressureRelaxationPass));
    });

    group.bench_function("projection_advect_dye", |b| {
        let mut state = state.clone();
        b.iter(|| state.execute(&ProjectionAdvectDyePass));
    });

    group.finish();
}

criterion_group!(benches, benchmark_tick, benchmark_passes);
criterion_main!(benches);
