//! Image scaling.
//!
//! Nearest-neighbour sampling, or a separable two-pass filter: rows are
//! resampled horizontally into an intermediate buffer, which is then
//! resampled vertically. When shrinking, the filter is stretched by the
//! scale factor so every source pixel contributes.
//!
//! # Example
//!
//! ```rust
//! use warhola_core::{Color, Layout, PixelBuffer};
//! use warhola_ops::resize::{resize, fit_dimensions};
//! use warhola_ops::{Executor, ResampleFilter};
//!
//! let buf = PixelBuffer::scratch(Layout::Rgba32, 640, 480).unwrap();
//! let (w, h) = fit_dimensions(640, 480, 100, 100);
//! assert_eq!((w, h), (100, 75));
//!
//! let out = resize(&Executor::inline(), &buf, w, h, &ResampleFilter::CATMULL_ROM).unwrap();
//! assert_eq!(out.rect().dx(), 100);
//! ```

use tracing::{debug, trace};
use warhola_core::{Layout, PixelBuffer};

use crate::parallel::Executor;
use crate::resample::ResampleFilter;
use crate::{OpsError, OpsResult, restore};

/// Source window and weights for one destination index.
#[derive(Debug, Clone)]
struct Contrib {
    start: usize,
    weights: Vec<f64>,
    sum: f64,
}

fn contributions(dst_len: usize, src_len: usize, filter: &ResampleFilter) -> Vec<Contrib> {
    let delta = src_len as f64 / dst_len as f64;
    let scale = delta.max(1.0);
    let radius = (scale * filter.support).ceil();
    let last = src_len as i64 - 1;

    (0..dst_len)
        .map(|i| {
            let center = (i as f64 + 0.5) * delta - 0.5;
            let start = ((center - radius + 0.5) as i64).max(0);
            let end = ((center + radius) as i64).min(last);
            let weights: Vec<f64> = (start..=end)
                .map(|k| (filter.weight)((k as f64 - center) / scale))
                .collect();
            let sum = weights.iter().sum();
            Contrib {
                start: start as usize,
                weights,
                sum,
            }
        })
        .collect()
}

#[inline]
fn finish(sum: f64, weights: f64) -> u8 {
    if weights == 0.0 {
        0
    } else {
        (sum / weights + 0.5).clamp(0.0, 255.0) as u8
    }
}

/// Scales `src` to `width x height` using `filter`.
///
/// Returns [`OpsError::InvalidDimensions`] for a non-positive target or an
/// empty source.
pub fn resize(
    exec: &Executor,
    src: &PixelBuffer,
    width: i32,
    height: i32,
    filter: &ResampleFilter,
) -> OpsResult<PixelBuffer> {
    trace!(width, height, %filter, "resize");
    if width <= 0 || height <= 0 || src.is_empty() {
        return Err(OpsError::InvalidDimensions(format!(
            "{}x{} -> {}x{}",
            src.width(),
            src.height(),
            width,
            height
        )));
    }

    let work = src.clone_to(Layout::Rgba32);
    let out = if filter.is_nearest() {
        nearest(exec, &work, width, height)?
    } else {
        let tmp = resample_h(exec, &work, width, filter)?;
        resample_v(exec, &tmp, height, filter)?
    };
    Ok(restore(out, src))
}

fn nearest(exec: &Executor, work: &PixelBuffer, width: i32, height: i32) -> OpsResult<PixelBuffer> {
    let (sw, sh) = (work.width() as f64, work.height() as f64);
    let mut dst = work.scratch_like(Layout::Rgba32, width, height)?;
    let cols: Vec<usize> = (0..width)
        .map(|x| (((x as f64 + 0.5) * sw / width as f64) as usize).min(work.width() as usize - 1))
        .collect();

    let stride = dst.stride();
    exec.rows(dst.bytes_mut(), stride, height as usize, |y, row| {
        let sy = (((y as f64 + 0.5) * sh / height as f64) as usize).min(work.height() as usize - 1);
        let src_row = work.row(sy);
        for (d, &sx) in row.chunks_exact_mut(4).zip(&cols) {
            d.copy_from_slice(&src_row[sx * 4..sx * 4 + 4]);
        }
    });
    Ok(dst)
}

fn resample_h(exec: &Executor, work: &PixelBuffer, width: i32, filter: &ResampleFilter) -> OpsResult<PixelBuffer> {
    let height = work.height();
    let contribs = contributions(width as usize, work.width() as usize, filter);
    debug!(from = work.width(), to = width, "horizontal pass");
    let mut dst = work.scratch_like(Layout::Rgba32, width, height)?;

    let stride = dst.stride();
    exec.rows(dst.bytes_mut(), stride, height as usize, |y, row| {
        let src_row = work.row(y);
        for (d, c) in row.chunks_exact_mut(4).zip(&contribs) {
            let mut acc = [0.0f64; 4];
            for (j, w) in c.weights.iter().enumerate() {
                let i = (c.start + j) * 4;
                for (ch, a) in acc.iter_mut().enumerate() {
                    *a += w * src_row[i + ch] as f64;
                }
            }
            for ch in 0..4 {
                d[ch] = finish(acc[ch], c.sum);
            }
        }
    });
    Ok(dst)
}

fn resample_v(exec: &Executor, work: &PixelBuffer, height: i32, filter: &ResampleFilter) -> OpsResult<PixelBuffer> {
    let width = work.width();
    let contribs = contributions(height as usize, work.height() as usize, filter);
    debug!(from = work.height(), to = height, "vertical pass");
    let mut dst = work.scratch_like(Layout::Rgba32, width, height)?;

    let stride = dst.stride();
    exec.rows(dst.bytes_mut(), stride, height as usize, |y, row| {
        let c = &contribs[y];
        let mut acc = vec![0.0f64; row.len()];
        for (j, w) in c.weights.iter().enumerate() {
            let src_row = work.row(c.start + j);
            for (a, &s) in acc.iter_mut().zip(src_row) {
                *a += w * s as f64;
            }
        }
        for (d, a) in row.iter_mut().zip(acc) {
            *d = finish(a, c.sum);
        }
    });
    Ok(dst)
}

/// Largest size with the source aspect ratio that fits in
/// `max_width x max_height`. Never smaller than 1x1.
pub fn fit_dimensions(width: i32, height: i32, max_width: i32, max_height: i32) -> (i32, i32) {
    scaled(width, height, max_width, max_height, f64::min)
}

/// Smallest size with the source aspect ratio that covers
/// `min_width x min_height`. Never smaller than 1x1.
pub fn fill_dimensions(width: i32, height: i32, min_width: i32, min_height: i32) -> (i32, i32) {
    scaled(width, height, min_width, min_height, f64::max)
}

fn scaled(width: i32, height: i32, bw: i32, bh: i32, pick: fn(f64, f64) -> f64) -> (i32, i32) {
    if width <= 0 || height <= 0 {
        return (bw.max(1), bh.max(1));
    }
    let ratio = pick(bw as f64 / width as f64, bh as f64 / height as f64);
    (
        ((width as f64 * ratio).round() as i32).max(1),
        ((height as f64 * ratio).round() as i32).max(1),
    )
}
