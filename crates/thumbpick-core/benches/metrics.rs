//! Metrics Engine benchmarks.
//!
//! # Running
//! ```bash
//! cargo bench --package thumbpick-core --bench metrics
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use opencv::core::{Mat, Scalar, CV_8UC1, CV_8UC3};
use opencv::prelude::*;
use std::time::Duration;
use thumbpick_core::metrics::raw;

/// A synthetic BGR frame with enough texture that edge/variance metrics
/// aren't trivially zero.
fn create_test_frame(width: i32, height: i32) -> Mat {
    let mut frame = Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(128.0)).expect("test frame");

    for y in 0..height {
        for x in 0..width {
            let pixel = frame.at_2d_mut::<opencv::core::Vec3b>(y, x).unwrap();
            pixel[0] = ((x * 7 + y * 11) % 256) as u8;
            pixel[1] = ((x * 13 + y * 17) % 256) as u8;
            pixel[2] = ((x * 19 + y * 23) % 256) as u8;
        }
    }

    frame
}

fn to_gray(bgr: &Mat) -> Mat {
    let mut gray = Mat::default();
    opencv::imgproc::cvt_color(bgr, &mut gray, opencv::imgproc::COLOR_BGR2GRAY, 0).unwrap();
    gray
}

fn bench_sharpness(c: &mut Criterion) {
    let mut group = c.benchmark_group("sharpness");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    for (width, height) in [(1920, 1080), (640, 360)] {
        let gray = to_gray(&create_test_frame(width, height));
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("laplacian_variance", format!("{width}x{height}")), &gray, |b, gray| {
            b.iter(|| black_box(raw::sharpness(black_box(gray)).unwrap()))
        });
    }

    group.finish();
}

fn bench_exposure_contrast(c: &mut Criterion) {
    let mut group = c.benchmark_group("exposure_contrast");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let frame = create_test_frame(640, 360);
    group.bench_function("lab_mean_stddev", |b| {
        b.iter(|| black_box(raw::exposure_and_contrast(black_box(&frame)).unwrap()))
    });

    group.finish();
}

fn bench_colorfulness(c: &mut Criterion) {
    let mut group = c.benchmark_group("colorfulness");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let frame = create_test_frame(640, 360);
    group.bench_function("hasler_susstrunk", |b| b.iter(|| black_box(raw::colorfulness(black_box(&frame)).unwrap())));

    group.finish();
}

fn bench_clutter(c: &mut Criterion) {
    let mut group = c.benchmark_group("clutter");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let frame = create_test_frame(640, 360);
    group.bench_function("canny_density_no_faces", |b| b.iter(|| black_box(raw::clutter(black_box(&frame), &[]).unwrap())));

    group.finish();
}

fn bench_motion(c: &mut Criterion) {
    let mut group = c.benchmark_group("motion");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let prev = Mat::new_rows_cols_with_default(360, 640, CV_8UC1, Scalar::all(100.0)).unwrap();
    let current = to_gray(&create_test_frame(640, 360));

    group.bench_function("absdiff_stddev", |b| b.iter(|| black_box(raw::motion(black_box(&current), Some(black_box(&prev))).unwrap())));

    group.finish();
}

criterion_group!(benches, bench_sharpness, bench_exposure_contrast, bench_colorfulness, bench_clutter, bench_motion);
criterion_main!(benches);
