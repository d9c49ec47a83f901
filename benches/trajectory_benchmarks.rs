//! Trajectory and session benchmarks using Criterion.
//!
//! Every appended sample re-warps the whole history, so the cost of a frame grows
//! with the length of the video.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use climbing_wire_rs::{
    Frame, GeometricTransform, JointFrameSnapshot, JointName, JointTrackingSession, JointTrajectory,
    PoseDetector, RawLandmark, RawLandmarkResult, Result, SessionConfig, WarpStrategy,
};

fn camera_shake() -> GeometricTransform {
    GeometricTransform::from_row_slice(&[1.002, 0.001, -1.5, -0.001, 0.998, 0.75, 1e-6, -1e-6, 1.0])
}

fn snapshot_at(x: f64, y: f64) -> JointFrameSnapshot {
    let raw = RawLandmarkResult::filled(RawLandmark::new(x, y, 0.9));
    JointFrameSnapshot::new(&raw, (640, 480), 0.5)
}

fn trajectory_with_history(strategy: WarpStrategy, n: usize) -> JointTrajectory {
    let mut trajectory = JointTrajectory::with_strategy(JointName::LeftHand, strategy);
    let transform = camera_shake();
    for i in 0..n {
        let t = (i % 100) as f64 / 100.0;
        trajectory
            .append(&snapshot_at(t, 1.0 - t), &transform)
            .expect("left hand is mapped");
    }
    trajectory
}

fn benchmark_trajectory_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("trajectory_append");
    let transform = camera_shake();
    let snapshot = snapshot_at(0.5, 0.5);

    for &history in &[10usize, 100, 1000] {
        for strategy in [WarpStrategy::Incremental, WarpStrategy::Composed] {
            let trajectory = trajectory_with_history(strategy, history);
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", strategy), history),
                &trajectory,
                |b, trajectory| {
                    b.iter(|| {
                        let mut trajectory = trajectory.clone();
                        trajectory
                            .append(black_box(&snapshot), black_box(&transform))
                            .expect("left hand is mapped");
                        trajectory
                    })
                },
            );
        }
    }

    group.finish();
}

fn benchmark_transform_apply(c: &mut Criterion) {
    let transform = camera_shake();
    let points = trajectory_with_history(WarpStrategy::Incremental, 1000).positions().clone();

    c.bench_function("transform_apply_1000_points", |b| {
        b.iter(|| transform.apply(black_box(&points)))
    });
}

struct StillDetector;

impl PoseDetector<()> for StillDetector {
    fn detect(&mut self, _image: &Frame<()>) -> Result<Option<RawLandmarkResult>> {
        Ok(Some(RawLandmarkResult::filled(RawLandmark::new(0.5, 0.5, 0.9))))
    }

    fn close(&mut self) {}
}

fn shake_estimator(_older: &Frame<()>, _newer: &Frame<()>) -> Result<GeometricTransform> {
    Ok(camera_shake())
}

fn benchmark_session_300_frames(c: &mut Criterion) {
    let _ = env_logger::builder().is_test(true).try_init();

    let frames: Vec<Frame<()>> = (0..300)
        .map(|i| Frame::new((), 640, 480, i, i as i64 * 33_333))
        .collect();

    c.bench_function("session_process_300_frames", |b| {
        b.iter(|| {
            let mut session =
                JointTrackingSession::new(SessionConfig::default(), shake_estimator, StillDetector)
                    .expect("valid session");
            let summary = session.process_frames(black_box(frames.clone())).expect("frames processed");
            session.release();
            summary
        })
    });
}

criterion_group!(
    benches,
    benchmark_trajectory_append,
    benchmark_transform_apply,
    benchmark_session_300_frames,
);
criterion_main!(benches);
