//! Kernel convolution and blurs.
//!
//! # Kernels
//!
//! - [`Kernel::identity`] - 1x1 pass-through
//! - [`Kernel::box_blur`] - flat average
//! - [`Kernel::gaussian_blur`] - Gaussian falloff
//! - [`Kernel::sharpen`], [`Kernel::edge_detect`], [`Kernel::emboss`] - 3x3 classics
//!
//! # Example
//!
//! ```rust
//! use warhola_core::{Color, Layout, PixelBuffer};
//! use warhola_ops::convolve::{blur, BlurKind};
//! use warhola_ops::Executor;
//!
//! let mut buf = PixelBuffer::scratch(Layout::Rgba32, 16, 16).unwrap();
//! buf.fill(Color::WHITE);
//! let out = blur(&Executor::inline(), &buf, BlurKind::Gaussian, 2.0).unwrap();
//! assert_eq!(out.rect(), buf.rect());
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};
use warhola_core::{Layout, PadMode, PixelBuffer};

use crate::parallel::Executor;
use crate::{OpsError, OpsResult, restore};

/// Row-major convolution kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    /// Kernel weights, `width * height` values.
    pub values: Vec<f64>,
    /// Columns.
    pub width: usize,
    /// Rows.
    pub height: usize,
}

impl Kernel {
    /// Creates a kernel from row-major values.
    pub fn new(values: Vec<f64>, width: usize, height: usize) -> OpsResult<Self> {
        if width == 0 || height == 0 {
            return Err(OpsError::InvalidParameter(format!("kernel size {width}x{height}")));
        }
        if values.len() != width * height {
            return Err(OpsError::InvalidParameter(format!(
                "kernel data size {} doesn't match {}x{}",
                values.len(),
                width,
                height
            )));
        }
        Ok(Self { values, width, height })
    }

    /// 1x1 kernel that leaves every pixel unchanged.
    pub fn identity() -> Self {
        Self {
            values: vec![1.0],
            width: 1,
            height: 1,
        }
    }

    /// Square kernel of side `ceil(2r + 1)` with equal weights.
    pub fn box_blur(radius: f64) -> Self {
        let side = blur_side(radius);
        Self {
            values: vec![1.0; side * side],
            width: side,
            height: side,
        }
        .normalized()
    }

    /// Square kernel of side `ceil(2r + 1)` with weights
    /// `exp(-(x² + y²) / (4r))`.
    ///
    /// ```rust
    /// use warhola_ops::Kernel;
    ///
    /// let k = Kernel::gaussian_blur(1.0);
    /// assert_eq!(k.width, 3);
    /// assert!(k.at(1, 1) > k.at(0, 0));
    /// ```
    pub fn gaussian_blur(radius: f64) -> Self {
        let side = blur_side(radius);
        let sigma = 4.0 * radius;
        let r = radius.max(0.0);
        let mut values = Vec::with_capacity(side * side);
        for y in 0..side {
            for x in 0..side {
                if sigma == 0.0 {
                    values.push(1.0);
                    continue;
                }
                let dx = x as f64 - r;
                let dy = y as f64 - r;
                values.push((-(dx * dx / sigma + dy * dy / sigma)).exp());
            }
        }
        Self {
            values,
            width: side,
            height: side,
        }
        .normalized()
    }

    /// 3x3 sharpen.
    pub fn sharpen() -> Self {
        Self::square3([0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0])
    }

    /// 3x3 Laplacian edge detector.
    pub fn edge_detect() -> Self {
        Self::square3([-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0])
    }

    /// 3x3 emboss.
    pub fn emboss() -> Self {
        Self::square3([-1.0, -1.0, 0.0, -1.0, 1.0, 1.0, 0.0, 1.0, 1.0])
    }

    fn square3(values: [f64; 9]) -> Self {
        Self {
            values: values.to_vec(),
            width: 3,
            height: 3,
        }
    }

    /// Weight at column `x`, row `y`.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.width + x]
    }

    /// Sum of absolute weights.
    pub fn abs_sum(&self) -> f64 {
        self.values.iter().map(|v| v.abs()).sum()
    }

    /// Copy divided by [`abs_sum`](Self::abs_sum), or unchanged when that
    /// sum is zero.
    pub fn normalized(&self) -> Self {
        let mut sum = self.abs_sum();
        if sum == 0.0 {
            sum = 1.0;
        }
        Self {
            values: self.values.iter().map(|v| v / sum).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

fn blur_side(radius: f64) -> usize {
    (2.0 * radius.max(0.0) + 1.0).ceil() as usize
}

/// Blur kernel family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlurKind {
    /// [`Kernel::box_blur`]
    Box,
    /// [`Kernel::gaussian_blur`]
    Gaussian,
}

impl BlurKind {
    /// Kernel for `radius`.
    pub fn kernel(self, radius: f64) -> Kernel {
        match self {
            BlurKind::Box => Kernel::box_blur(radius),
            BlurKind::Gaussian => Kernel::gaussian_blur(radius),
        }
    }
}

impl FromStr for BlurKind {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "box" => Ok(BlurKind::Box),
            "gaussian" | "gauss" => Ok(BlurKind::Gaussian),
            _ => Err(OpsError::InvalidParameter(format!("unknown blur: {s}"))),
        }
    }
}

impl fmt::Display for BlurKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlurKind::Box => "box",
            BlurKind::Gaussian => "gaussian",
        })
    }
}

/// Convolves `src` with `kernel`.
///
/// The kernel is anchored at `(width / 2, height / 2)`. Pixels past the
/// edge repeat the border, or wrap around when `wrap` is set. `bias` is added
/// to R, G and B before clamping. With `keep_alpha` the source alpha is
/// copied through, otherwise alpha is convolved without bias.
pub fn convolve(
    exec: &Executor,
    src: &PixelBuffer,
    kernel: &Kernel,
    bias: f64,
    wrap: bool,
    keep_alpha: bool,
) -> OpsResult<PixelBuffer> {
    trace!(kw = kernel.width, kh = kernel.height, bias, wrap, keep_alpha, "convolve");
    if kernel.values.len() != kernel.width * kernel.height || kernel.values.is_empty() {
        return Err(OpsError::InvalidParameter("malformed kernel".into()));
    }
    let (w, h) = (src.width(), src.height());
    let mut dst = src.scratch_like(Layout::Rgba32, w, h)?;
    if src.is_empty() {
        return Ok(restore(dst, src));
    }

    let rx = kernel.width / 2;
    let ry = kernel.height / 2;
    let mode = if wrap { PadMode::Wrap } else { PadMode::Extend };
    let padded = src.pad(mode, rx as i32, ry as i32)?;
    debug!(rx, ry, ?mode, "convolve padded");

    let stride = dst.stride();
    exec.rows(dst.bytes_mut(), stride, h as usize, |y, row| {
        for (x, d) in row.chunks_exact_mut(4).enumerate() {
            let mut sum = [0.0f64; 4];
            for ky in 0..kernel.height {
                let src_row = padded.row(y + ky);
                for kx in 0..kernel.width {
                    let k = kernel.at(kx, ky);
                    let i = (x + kx) * 4;
                    for (c, s) in sum.iter_mut().enumerate() {
                        *s += k * src_row[i + c] as f64;
                    }
                }
            }
            for c in 0..3 {
                d[c] = (sum[c] + bias).clamp(0.0, 255.0) as u8;
            }
            d[3] = if keep_alpha {
                padded.row(y + ry)[(x + rx) * 4 + 3]
            } else {
                sum[3].clamp(0.0, 255.0) as u8
            };
        }
    });
    Ok(restore(dst, src))
}

/// Blurs with a normalized box or Gaussian kernel of `radius`.
///
/// A negative radius returns a copy.
pub fn blur(exec: &Executor, src: &PixelBuffer, kind: BlurKind, radius: f64) -> OpsResult<PixelBuffer> {
    if !radius.is_finite() {
        return Err(OpsError::InvalidParameter(format!("blur radius {radius}")));
    }
    if radius < 0.0 {
        debug!(radius, "negative blur radius, skipping pass");
        return Ok(src.clone());
    }
    convolve(exec, src, &kind.kernel(radius), 0.0, false, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use warhola_core::Color;

    fn gradient(w: i32, h: i32) -> PixelBuffer {
        let mut buf = PixelBuffer::scratch(Layout::Rgba32, w, h).unwrap();
        for y in 0..h {
            for x in 0..w {
                buf.set(x, y, Color::Rgba([(x * 20) as u8, (y * 30) as u8, 77, 255]));
            }
        }
        buf
    }

    #[test]
    fn test_kernel_new_validates() {
        assert!(Kernel::new(vec![1.0; 4], 2, 2).is_ok());
        assert!(Kernel::new(vec![1.0; 5], 2, 2).is_err());
        assert!(Kernel::new(vec![], 0, 0).is_err());
    }

    #[test]
    fn test_blur_kernels_normalized() {
        let k = Kernel::box_blur(1.0);
        assert_eq!((k.width, k.height), (3, 3));
        assert_relative_eq!(k.abs_sum(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(k.at(0, 0), 1.0 / 9.0, epsilon = 1e-12);

        let k = Kernel::gaussian_blur(2.0);
        assert_eq!(k.width, 5);
        assert_relative_eq!(k.abs_sum(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(k.at(0, 2), k.at(4, 2), epsilon = 1e-12);
        assert!(k.at(2, 2) > k.at(1, 2));

        let k = Kernel::box_blur(0.5);
        assert_eq!(k.width, 2);
    }

    #[test]
    fn test_normalized_zero_sum() {
        let k = Kernel::new(vec![0.0; 9], 3, 3).unwrap().normalized();
        assert!(k.values.iter().all(|&v| v == 0.0));
        let k = Kernel::edge_detect().normalized();
        assert_relative_eq!(k.at(1, 1), 0.5);
    }

    #[test]
    fn test_identity_kernel() {
        let src = gradient(7, 5);
        let out = convolve(&Executor::inline(), &src, &Kernel::identity(), 0.0, false, false).unwrap();
        assert_eq!(out.packed(), src.packed());
    }

    #[test]
    fn test_bias_and_keep_alpha() {
        let mut src = PixelBuffer::scratch(Layout::Rgba32, 3, 3).unwrap();
        src.fill(Color::Rgba([100, 100, 100, 128]));
        let out = convolve(&Executor::inline(), &src, &Kernel::identity(), 50.0, false, true).unwrap();
        assert_eq!(out.at(1, 1), Color::Rgba([150, 150, 150, 128]));
        let out = convolve(&Executor::inline(), &src, &Kernel::identity(), 200.0, false, false).unwrap();
        assert_eq!(out.at(2, 2), Color::Rgba([255, 255, 255, 128]));
    }

    #[test]
    fn test_edge_detect_flat_is_black() {
        let mut src = PixelBuffer::scratch(Layout::Rgba32, 5, 5).unwrap();
        src.fill(Color::Rgba([90, 40, 200, 255]));
        let out = convolve(&Executor::inline(), &src, &Kernel::edge_detect(), 0.0, false, true).unwrap();
        assert_eq!(out.at(0, 0), Color::Rgba([0, 0, 0, 255]));
        assert_eq!(out.at(2, 2), Color::Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_wrap_reads_opposite_edge() {
        let mut src = PixelBuffer::scratch(Layout::Rgba32, 3, 1).unwrap();
        src.set(2, 0, Color::Rgba([255, 0, 0, 255]));
        // picks the left neighbour
        let k = Kernel::new(vec![1.0, 0.0, 0.0], 3, 1).unwrap();
        let wrapped = convolve(&Executor::inline(), &src, &k, 0.0, true, true).unwrap();
        assert_eq!(wrapped.at(0, 0).to_rgba()[0], 255);
        let clamped = convolve(&Executor::inline(), &src, &k, 0.0, false, true).unwrap();
        assert_eq!(clamped.at(0, 0).to_rgba()[0], 0);
    }

    #[test]
    fn test_blur_negative_radius_copies() {
        let src = gradient(4, 4);
        let out = blur(&Executor::inline(), &src, BlurKind::Box, -1.0).unwrap();
        assert_eq!(out.packed(), src.packed());
        let out = blur(&Executor::inline(), &src, BlurKind::Gaussian, 0.0).unwrap();
        assert_eq!(out.packed(), src.packed());
    }

    #[test]
    fn test_blur_kind_parse() {
        assert_eq!("Gaussian".parse::<BlurKind>().unwrap(), BlurKind::Gaussian);
        assert!("motion".parse::<BlurKind>().is_err());
    }
}
