//! Candidate Ranker: greedy diverse top-K selection (§4.7).

use opencv::core::{Mat, Vector};
use opencv::prelude::*;

use crate::error::ThumbResult;
use crate::frame::FrameMetrics;

/// Histogram bins per channel for appearance distance (§9 numeric
/// semantics — a design constant, not a preset knob).
pub const HISTOGRAM_BINS: i32 = 32;
const APPEARANCE_THUMB_SIZE: i32 = 64;

/// Sort `eligible_indices` (already filtered by hard-reject, §4.6) by score
/// descending, ties by earlier sample time, then greedily accept
/// candidates that clear both the temporal-gap and appearance-distance
/// thresholds against every already-accepted pick (§4.7). Returns indices
/// back into `frames`.
pub fn select_top_k(frames: &[FrameMetrics], eligible_indices: &[usize], temporal_min_gap_sec: f64, appearance_min_dist: f64, k: usize) -> ThumbResult<Vec<usize>> {
    if k == 0 || eligible_indices.is_empty() {
        return Ok(Vec::new());
    }

    let mut order: Vec<usize> = eligible_indices.to_vec();
    order.sort_by(|&a, &b| {
        frames[b]
            .score
            .partial_cmp(&frames[a].score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| frames[a].t.partial_cmp(&frames[b].t).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut accepted: Vec<usize> = Vec::new();

    for candidate_idx in order {
        if accepted.len() >= k {
            break;
        }

        let candidate = &frames[candidate_idx];
        let mut ok = true;
        for &existing_idx in &accepted {
            let existing = &frames[existing_idx];
            if (candidate.t - existing.t).abs() < temporal_min_gap_sec {
                ok = false;
                break;
            }
            let dist = appearance_distance(candidate, existing)?;
            if dist < appearance_min_dist {
                ok = false;
                break;
            }
        }

        if ok {
            accepted.push(candidate_idx);
        }
    }

    Ok(accepted)
}

/// Composite appearance divergence between two frames' analysis images and
/// face sets (§4.7).
pub fn appearance_distance(a: &FrameMetrics, b: &FrameMetrics) -> ThumbResult<f64> {
    let color_dist = color_distance(&a.analysis_image, &b.analysis_image)?;

    let face_overlap = match (a.largest_face(), b.largest_face()) {
        (Some(fa), Some(fb)) => fa.iou(fb),
        _ => 0.0,
    };

    Ok((color_dist + (1.0 - face_overlap)) / 2.0)
}

fn color_distance(a: &Mat, b: &Mat) -> ThumbResult<f64> {
    let a64 = resize_64(a)?;
    let b64 = resize_64(b)?;

    let mut a_ycc = Mat::default();
    let mut b_ycc = Mat::default();
    opencv::imgproc::cvt_color(&a64, &mut a_ycc, opencv::imgproc::COLOR_BGR2YCrCb, 0)?;
    opencv::imgproc::cvt_color(&b64, &mut b_ycc, opencv::imgproc::COLOR_BGR2YCrCb, 0)?;

    let mut a_channels = Vector::<Mat>::new();
    let mut b_channels = Vector::<Mat>::new();
    opencv::core::split(&a_ycc, &mut a_channels)?;
    opencv::core::split(&b_ycc, &mut b_channels)?;

    let mut total = 0.0;
    let channel_count = a_channels.len().min(b_channels.len());

    for i in 0..channel_count {
        let ca = a_channels.get(i)?;
        let cb = b_channels.get(i)?;

        let hist_a = channel_histogram(&ca)?;
        let hist_b = channel_histogram(&cb)?;

        let correlation = opencv::imgproc::compare_hist(&hist_a, &hist_b, opencv::imgproc::HISTCMP_CORREL)?;
        total += 1.0 - correlation;
    }

    if channel_count == 0 {
        return Ok(0.0);
    }

    Ok(total / channel_count as f64)
}

fn resize_64(image: &Mat) -> ThumbResult<Mat> {
    let mut out = Mat::default();
    opencv::imgproc::resize(
        image,
        &mut out,
        opencv::core::Size::new(APPEARANCE_THUMB_SIZE, APPEARANCE_THUMB_SIZE),
        0.0,
        0.0,
        opencv::imgproc::INTER_AREA,
    )?;
    Ok(out)
}

fn channel_histogram(channel: &Mat) -> ThumbResult<Mat> {
    let images = Vector::<Mat>::from_iter([channel.clone()]);
    let channels = Vector::<i32>::from_iter([0]);
    let hist_size = Vector::<i32>::from_iter([HISTOGRAM_BINS]);
    let ranges = Vector::<f32>::from_iter([0.0f32, 256.0f32]);

    let mut hist = Mat::default();
    opencv::imgproc::calc_hist(&images, &channels, &opencv::core::no_array(), &mut hist, &hist_size, &ranges, false)?;
    opencv::core::normalize(
        &hist.clone(),
        &mut hist,
        1.0,
        0.0,
        opencv::core::NORM_L1,
        -1,
        &opencv::core::no_array(),
    )?;
    Ok(hist)
}
