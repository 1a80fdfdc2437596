use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gesture_core::coordinator::{Coordinator, CoordinatorConfig};
use gesture_core::detector::{DetectorReport, RecordingDetector};
use gesture_core::types::{BodyFrame, BodyRecord, HandState, TrackingId};

/// `n` frames where the tracked body drifts between slots every `period`.
fn make_frames(n: usize, period: usize) -> Vec<BodyFrame> {
    (0..n)
        .map(|i| {
            let epoch = i / period;
            let slot = epoch % 6;
            let mut records = vec![BodyRecord::EMPTY; 6];
            records[slot] = BodyRecord::tracked(
                epoch as u64 + 1,
                HandState::Open,
                HandState::NotTracked,
            );
            BodyFrame::from_records(records, 6).unwrap()
        })
        .collect()
}

fn bench_coordinator(c: &mut Criterion) {
    let mut group = c.benchmark_group("coordinator");

    for period in [1, 30, 1000] {
        let frames = make_frames(1000, period);
        group.bench_function(format!("1000_frames_switch_every_{period}"), |b| {
            b.iter(|| {
                let (detector, _calls) = RecordingDetector::new();
                let mut coord = Coordinator::new(CoordinatorConfig::default(), Box::new(detector));
                for (i, frame) in frames.iter().enumerate() {
                    black_box(coord.on_frame(Some(frame)));
                    let id = TrackingId((i / period) as u64 + 1);
                    black_box(coord.on_report(&DetectorReport::detected(id, 0.8, "Swipe")));
                }
                black_box(coord.shutdown());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_coordinator);
criterion_main!(benches);
