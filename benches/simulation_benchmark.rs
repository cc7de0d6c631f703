//! Simulation benchmarks
//!
//! Benchmarks driver throughput for a single block and a feedback model.

use blocksim::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// y[k] = u[k] - 0.5 y[k-1]
fn feedback_model() -> Model {
    let mut model = Model::new();
    let u = model.add_input("u", ValueType::Real).unwrap();
    let sum = model.build(|p| Sum::new("sum", ValueType::Real, "+-", p)).unwrap();
    let half = model
        .build(|p| Gain::new("half", ValueType::Real, Value::Real(0.5), p))
        .unwrap();
    let z = model
        .build(|p| Delay::new("z", ValueType::Real, Value::Real(0.0), p))
        .unwrap();

    let sum_y = model.outport(sum, "y").unwrap();
    let z_y = model.outport(z, "y").unwrap();
    let half_y = model.outport(half, "y").unwrap();
    model.connect(z, "u", sum_y).unwrap();
    model.connect(half, "u", z_y).unwrap();
    model.connect(sum, "u0", u).unwrap();
    model.connect(sum, "u1", half_y).unwrap();
    model.add_output("y", sum_y).unwrap();
    model
}

fn input(samples: usize) -> SimData {
    let time: Vec<f64> = (0..samples).map(|k| k as f64 * 0.001).collect();
    let u: Vec<f64> = time.iter().map(|t| (10.0 * t).sin()).collect();
    SimData::new(time).with_signal("u", u)
}

fn bench_feedback_model(c: &mut Criterion) {
    let mut group = c.benchmark_group("Feedback model");

    for samples in [100, 1_000, 10_000].iter() {
        let data = input(*samples);
        group.bench_with_input(BenchmarkId::new("samples", samples), samples, |b, _| {
            b.iter(|| {
                let mut model = feedback_model();
                Simulation::run_model(&mut model, black_box(&data)).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_single_block(c: &mut Criterion) {
    let data = input(1_000);
    c.bench_function("Gain 1000 samples", |b| {
        b.iter(|| {
            let mut model = Model::new();
            let g = model
                .build(|p| Gain::new("g", ValueType::Real, Value::Real(2.0), p))
                .unwrap();
            model.sim(g, black_box(&data)).unwrap()
        });
    });
}

criterion_group!(benches, bench_feedback_model, bench_single_block);
criterion_main!(benches);
