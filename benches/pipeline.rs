use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use vector_melt::config::RenderConfig;
use vector_melt::effect::DatamoshEffect;
use vector_melt::ingest::{FrameSource, HostFrame, SyntheticSource};
use vector_melt::motion::{MotionEstimator, MotionField};
use vector_melt::params::{Interpolation, ParameterSnapshot};

fn frames(count: usize) -> Vec<HostFrame> {
    let config = RenderConfig::with_dimensions(640, 360);
    let mut source = SyntheticSource::new();
    source.open(&config).expect("open synthetic source");
    (0..count)
        .map(|_| source.next_frame().expect("synthetic frame"))
        .collect()
}

fn update_frame(c: &mut Criterion) {
    let frames = frames(2);
    let mut group = c.benchmark_group("update_frame_640x360");

    for (name, params) in [
        ("default", ParameterSnapshot::default()),
        (
            "full",
            ParameterSnapshot {
                block_size: 4.0,
                color_shift: 30.0,
                decay: 10.0,
                edge_factor: 50.0,
                mask_softness: 5,
                interpolation: Interpolation::Linear,
                ..Default::default()
            },
        ),
    ] {
        let mut primed = DatamoshEffect::new();
        primed.process(&frames[0], &params, 0).expect("initialise");

        group.bench_function(name, |b| {
            b.iter_batched(
                || primed.clone(),
                |mut effect| black_box(effect.process(&frames[1], &params, 1)),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn motion_only(c: &mut Criterion) {
    let frames = frames(2);
    let params = ParameterSnapshot::default();
    let mut estimator = MotionEstimator::new();
    let mut field = MotionField::default();

    c.bench_function("motion_estimate_640x360", |b| {
        b.iter(|| {
            estimator
                .estimate(&frames[0].buffer, &frames[1].buffer, &params, &mut field)
                .expect("estimate");
            black_box(field.mean_magnitude())
        })
    });
}

criterion_group!(benches, update_frame, motion_only);
criterion_main!(benches);
