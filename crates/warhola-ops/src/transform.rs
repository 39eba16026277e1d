//! Geometric transforms.
//!
//! Every transform except [`crop`] maps each destination pixel back to one
//! source pixel; destination pixels whose source falls outside the image
//! stay transparent black. Rotation by angles that are not multiples of 90
//! degrees and shearing work on a 2x nearest-upscaled copy that is scaled
//! back down with a linear filter afterwards.
//!
//! # Example
//!
//! ```rust
//! use warhola_core::{Layout, PixelBuffer, Rect};
//! use warhola_ops::transform::{crop, rotate};
//! use warhola_ops::Executor;
//!
//! let buf = PixelBuffer::scratch(Layout::Rgba32, 100, 50).unwrap();
//! let out = rotate(&Executor::inline(), &buf, 90.0, true, None).unwrap();
//! assert_eq!((out.width(), out.height()), (50, 100));
//!
//! let part = crop(&buf, Rect::new(90, 40, 200, 200)).unwrap();
//! assert_eq!((part.width(), part.height()), (10, 10));
//! ```

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};
use warhola_core::{Layout, PixelBuffer, Rect};

use crate::parallel::Executor;
use crate::resample::ResampleFilter;
use crate::resize::resize;
use crate::{OpsError, OpsResult, restore};

/// Axis for flip and shear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Along the x axis.
    Horizontal,
    /// Along the y axis.
    Vertical,
}

impl FromStr for Direction {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "horizontal" | "x" => Ok(Direction::Horizontal),
            "v" | "vertical" | "y" => Ok(Direction::Vertical),
            _ => Err(OpsError::UnsupportedDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Horizontal => "horizontal",
            Direction::Vertical => "vertical",
        })
    }
}

/// Builds a `width x height` RGBA32 buffer where pixel `(x, y)` is copied
/// from `map(x, y)` in `work`, or left zero when `map` returns `None`.
fn remap<F>(exec: &Executor, work: &PixelBuffer, width: i32, height: i32, map: F) -> OpsResult<PixelBuffer>
where
    F: Fn(i32, i32) -> Option<(i32, i32)> + Sync,
{
    let (sw, sh) = (work.width(), work.height());
    let mut dst = work.scratch_like(Layout::Rgba32, width, height)?;
    let stride = dst.stride();
    exec.rows(dst.bytes_mut(), stride, height as usize, |y, row| {
        for (x, d) in row.chunks_exact_mut(4).enumerate() {
            let Some((ix, iy)) = map(x as i32, y as i32) else { continue };
            if ix < 0 || ix >= sw || iy < 0 || iy >= sh {
                continue;
            }
            let i = ix as usize * 4;
            d.copy_from_slice(&work.row(iy as usize)[i..i + 4]);
        }
    });
    Ok(dst)
}

fn upsample(exec: &Executor, work: &PixelBuffer) -> OpsResult<PixelBuffer> {
    resize(exec, work, work.width() * 2, work.height() * 2, &ResampleFilter::NEAREST)
}

fn downsample(exec: &Executor, work: &PixelBuffer) -> OpsResult<PixelBuffer> {
    let (w, h) = ((work.width() / 2).max(1), (work.height() / 2).max(1));
    resize(exec, work, w, h, &ResampleFilter::LINEAR)
}

fn check_angle(angle: f64) -> OpsResult<()> {
    if angle.is_finite() {
        Ok(())
    } else {
        Err(OpsError::InvalidParameter(format!("angle {angle}")))
    }
}

/// Returns the part of `src` inside `rect` as a view sharing its pixels.
///
/// Fails with [`OpsError::EmptyIntersect`] when `rect` misses the image.
pub fn crop(src: &PixelBuffer, rect: Rect) -> OpsResult<PixelBuffer> {
    trace!(%rect, "crop");
    let r = rect.intersect(&src.rect());
    if r.is_empty() {
        return Err(OpsError::EmptyIntersect(format!("{rect} does not overlap {}", src.rect())));
    }
    Ok(src.sub_region(r))
}

/// Rotates `src` clockwise by `angle` degrees about `pivot`.
///
/// The pivot defaults to the image center. With `preserve_bounds` the
/// canvas grows to hold the whole rotated image and the rotation is about
/// its center, ignoring `pivot`.
pub fn rotate(
    exec: &Executor,
    src: &PixelBuffer,
    angle: f64,
    preserve_bounds: bool,
    pivot: Option<(i32, i32)>,
) -> OpsResult<PixelBuffer> {
    trace!(angle, preserve_bounds, ?pivot, "rotate");
    check_angle(angle)?;
    let whole = (angle.abs() + 0.5) as i64;
    if whole % 360 == 0 || src.is_empty() {
        return Ok(src.clone());
    }
    let supersample = whole % 90 != 0;

    let mut work = src.clone_to(Layout::Rgba32);
    let scale = if supersample { 2 } else { 1 };
    if supersample {
        work = upsample(exec, &work)?;
    }
    let (sw, sh) = (work.width(), work.height());

    let (mut px, mut py) = match pivot {
        Some((x, y)) => match (x.checked_mul(scale), y.checked_mul(scale)) {
            (Some(x), Some(y)) => (x as f64, y as f64),
            _ => return Err(OpsError::InvalidParameter(format!("pivot {x},{y} out of range"))),
        },
        None => ((sw / 2) as f64, (sh / 2) as f64),
    };

    let theta = -angle * PI / 180.0;
    let (sin, cos) = theta.sin_cos();
    let (dw, dh) = if preserve_bounds {
        px = sw as f64 / 2.0;
        py = sh as f64 / 2.0;
        let (w, h) = (sw as f64, sh as f64);
        (
            (h * sin.abs() + w * cos.abs() + 0.5) as i32,
            (w * sin.abs() + h * cos.abs() + 0.5) as i32,
        )
    } else {
        (sw, sh)
    };
    let (ox, oy) = ((dw - sw) / 2, (dh - sh) / 2);
    debug!(dw, dh, px, py, supersample, "rotate canvas");

    let out = remap(exec, &work, dw, dh, |x, y| {
        let dx = (x - ox) as f64 - px + 0.5;
        let dy = (y - oy) as f64 - py + 0.5;
        let ix = (cos * dx - sin * dy + px) as i32;
        let iy = (sin * dx + cos * dy + py) as i32;
        Some((ix, iy))
    })?;

    let out = if supersample { downsample(exec, &out)? } else { out };
    Ok(restore(out, src))
}

/// Shears `src` by `angle` degrees along `axis`, growing the canvas to fit.
pub fn shear(exec: &Executor, src: &PixelBuffer, axis: Direction, angle: f64) -> OpsResult<PixelBuffer> {
    trace!(%axis, angle, "shear");
    check_angle(angle)?;
    if src.is_empty() {
        return Ok(src.clone());
    }
    let k = (angle * PI / 180.0).tan();

    let work = upsample(exec, &src.clone_to(Layout::Rgba32))?;
    let (sw, sh) = (work.width(), work.height());
    let across = match axis {
        Direction::Horizontal => sh,
        Direction::Vertical => sw,
    };
    let grow = (across as f64 * k.abs()).ceil();
    if grow > (i32::MAX / 4) as f64 {
        return Err(OpsError::InvalidParameter(format!("shear angle {angle} too steep")));
    }
    let grow = grow as i32;

    let (dw, dh) = match axis {
        Direction::Horizontal => (sw + grow, sh),
        Direction::Vertical => (sw, sh + grow),
    };
    let (px, py) = (dw / 2, dh / 2);
    let (ox, oy) = ((dw - sw) / 2, (dh - sh) / 2);
    debug!(dw, dh, k, "shear canvas");

    let out = remap(exec, &work, dw, dh, |x, y| {
        let mut ix = x - px - ox;
        let mut iy = y - py - oy;
        match axis {
            Direction::Horizontal => ix -= (iy as f64 * k).round() as i32,
            Direction::Vertical => iy -= (ix as f64 * k).round() as i32,
        }
        Some((ix + px, iy + py))
    })?;

    Ok(restore(downsample(exec, &out)?, src))
}

/// Mirrors `src` along `axis`.
pub fn flip(exec: &Executor, src: &PixelBuffer, axis: Direction) -> OpsResult<PixelBuffer> {
    trace!(%axis, "flip");
    let work = src.clone_to(Layout::Rgba32);
    let (w, h) = (work.width(), work.height());
    let out = match axis {
        Direction::Horizontal => remap(exec, &work, w, h, |x, y| Some((w - 1 - x, y)))?,
        Direction::Vertical => remap(exec, &work, w, h, |x, y| Some((x, h - 1 - y)))?,
    };
    Ok(restore(out, src))
}

/// Shifts content right by `dx` and up by `dy` pixels.
///
/// Pixels moved past the edge are dropped and uncovered ones are left zero.
pub fn translate(exec: &Executor, src: &PixelBuffer, dx: i32, dy: i32) -> OpsResult<PixelBuffer> {
    trace!(dx, dy, "translate");
    if dx == 0 && dy == 0 {
        return Ok(src.clone());
    }
    let work = src.clone_to(Layout::Rgba32);
    let out = remap(exec, &work, work.width(), work.height(), |x, y| {
        Some((x.checked_sub(dx)?, y.checked_add(dy)?))
    })?;
    Ok(restore(out, src))
}
