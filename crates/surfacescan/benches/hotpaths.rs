use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use surfacescan::{
    scan_frame, DetectConfig, DetectorInput, DetectorKind, GrayFrame, HitTestResult,
    MotionSample, NativePlaneObservation, Pose, SurfaceDetector, VisionConfig, VisionDetection,
    XrFrameData,
};

fn make_camera_fixture(width: u32, height: u32, seed: u64) -> RgbaImage {
    let mut rng = StdRng::seed_from_u64(seed);
    // Smooth tabletop with sensor noise, plus a few textured objects on it.
    let mut img = RgbaImage::from_fn(width, height, |x, y| {
        let v = 140.0
            + 20.0 * ((x as f32 * 0.004).sin() + (y as f32 * 0.006).cos())
            + rng.gen_range(-2.0f32..2.0f32);
        let v = v.clamp(0.0, 255.0) as u8;
        Rgba([v, v.saturating_sub(10), v.saturating_sub(20), 255])
    });

    for _ in 0..12 {
        let cx = rng.gen_range(0..width);
        let cy = rng.gen_range(0..height);
        let half = rng.gen_range(20..80u32);
        for y in cy.saturating_sub(half)..(cy + half).min(height) {
            for x in cx.saturating_sub(half)..(cx + half).min(width) {
                let v = if (x / 3 + y / 5) % 2 == 0 { 30 } else { 220 };
                img.put_pixel(x, y, Rgba([v, v, v, 255]));
            }
        }
    }
    img
}

fn bench_vision_scan(c: &mut Criterion) {
    let cfg = VisionConfig::default();
    let frame_720 = make_camera_fixture(1280, 720, 7);
    let gray_720 = GrayFrame::from_rgba(&frame_720);

    c.bench_function("gray_convert_1280x720", |b| {
        b.iter(|| black_box(GrayFrame::from_rgba(black_box(&frame_720))))
    });

    c.bench_function("grid_scan_1280x720", |b| {
        b.iter(|| {
            let points = scan_frame(black_box(&gray_720), black_box(&cfg));
            black_box(points.len())
        })
    });

    c.bench_function("vision_detect_1280x720", |b| {
        b.iter(|| {
            let detection = VisionDetection::detect(black_box(&frame_720), black_box(&cfg), 0);
            black_box(detection.clusters.len())
        })
    });
}

fn bench_motion_ingest(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let samples: Vec<MotionSample> = (0..10_000u64)
        .map(|i| {
            MotionSample::new(
                [
                    rng.gen_range(-0.5..0.5),
                    rng.gen_range(-0.5..0.5),
                    9.81 + rng.gen_range(-0.3..0.3),
                ],
                i * 100,
            )
        })
        .collect();
    let cfg = DetectConfig::for_kind(DetectorKind::MotionHeuristic);

    c.bench_function("motion_ingest_10k", |b| {
        b.iter(|| {
            let mut det = SurfaceDetector::new(&cfg);
            for (i, sample) in samples.iter().enumerate() {
                det.ingest(DetectorInput::Motion(*sample));
                if i % 5 == 0 {
                    det.ingest(DetectorInput::Tick {
                        now_ms: sample.timestamp_ms,
                    });
                }
            }
            black_box(det.confidence())
        })
    });
}

fn bench_plane_tracking(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(5);
    let frames: Vec<XrFrameData> = (0..600u64)
        .map(|i| XrFrameData {
            timestamp_ms: i * 16,
            planes: (0..rng.gen_range(4..24u64))
                .map(|native_id| NativePlaneObservation {
                    native_id,
                    pose: Pose::from_position([
                        rng.gen_range(-3.0..3.0),
                        rng.gen_range(-1.5..0.5),
                        rng.gen_range(-4.0..-0.5),
                    ]),
                    polygon: vec![[-0.5, 0.0, -0.5], [0.5, 0.0, -0.5], [0.5, 0.0, 0.5]],
                })
                .collect(),
            hits: vec![HitTestResult::at([0.0, -1.0, -1.5])],
        })
        .collect();
    let cfg = DetectConfig::for_kind(DetectorKind::NativePlatform);

    c.bench_function("plane_tracking_600_frames", |b| {
        b.iter(|| {
            let mut det = SurfaceDetector::new(&cfg);
            for frame in &frames {
                det.ingest(DetectorInput::XrFrame(frame));
            }
            black_box(det.candidates())
        })
    });
}

criterion_group!(
    hotpaths,
    bench_vision_scan,
    bench_motion_ingest,
    bench_plane_tracking
);
criterion_main!(hotpaths);
