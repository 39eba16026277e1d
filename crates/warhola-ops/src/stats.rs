//! Channel extraction, thresholding and histograms.
//!
//! Histograms accumulate over the whole image and are computed on the
//! calling thread.

use std::fmt;
use std::str::FromStr;

use tracing::trace;
use warhola_core::{Layout, PixelBuffer};

use crate::parallel::Executor;
use crate::{OpsError, OpsResult};

/// An RGBA channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Red.
    Red,
    /// Green.
    Green,
    /// Blue.
    Blue,
    /// Alpha.
    Alpha,
}

impl Channel {
    const fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
            Channel::Alpha => 3,
        }
    }
}

impl FromStr for Channel {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" | "r" => Ok(Channel::Red),
            "green" | "g" => Ok(Channel::Green),
            "blue" | "b" => Ok(Channel::Blue),
            "alpha" | "a" => Ok(Channel::Alpha),
            _ => Err(OpsError::InvalidParameter(format!("unknown channel: {s}"))),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
            Channel::Alpha => "alpha",
        })
    }
}

/// Perceptual luminance of an RGB triple, `0..=255`.
#[inline]
pub fn rank(r: u8, g: u8, b: u8) -> f64 {
    0.2125 * r as f64 + 0.7154 * g as f64 + 0.0721 * b as f64
}

fn to_gray<F>(exec: &Executor, src: &PixelBuffer, f: F) -> OpsResult<PixelBuffer>
where
    F: Fn(&[u8]) -> u8 + Sync,
{
    let work = src.clone_to(Layout::Rgba32);
    let mut dst = PixelBuffer::scratch(Layout::Gray8, work.width(), work.height())?.inherit(src);
    dst.set_palette(None);
    let stride = dst.stride();
    exec.rows(dst.bytes_mut(), stride, work.height() as usize, |y, row| {
        for (d, s) in row.iter_mut().zip(work.row(y).chunks_exact(4)) {
            *d = f(s);
        }
    });
    Ok(dst)
}

/// Copies one channel of the RGBA32 form of `src` into a gray buffer.
pub fn channel(exec: &Executor, src: &PixelBuffer, ch: Channel) -> OpsResult<PixelBuffer> {
    trace!(%ch, "channel");
    let i = ch.index();
    to_gray(exec, src, |px| px[i])
}

/// Gray buffer that is white where the luminance reaches `level` and black
/// elsewhere.
pub fn threshold(exec: &Executor, src: &PixelBuffer, level: u8) -> OpsResult<PixelBuffer> {
    trace!(level, "threshold");
    to_gray(exec, src, |px| {
        if rank(px[0], px[1], px[2]) as u8 >= level { 0xff } else { 0 }
    })
}

/// Counts per bin.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Histogram {
    /// Bin counts.
    pub bins: Vec<usize>,
}

impl Histogram {
    /// Histogram with `n` empty bins.
    pub fn new(n: usize) -> Self {
        Self { bins: vec![0; n] }
    }

    /// Highest count, 0 when there are no bins.
    pub fn max(&self) -> usize {
        self.bins.iter().copied().max().unwrap_or(0)
    }

    /// Lowest count, 0 when there are no bins.
    pub fn min(&self) -> usize {
        self.bins.iter().copied().min().unwrap_or(0)
    }

    /// Running totals.
    pub fn cumulative(&self) -> Histogram {
        let bins = self
            .bins
            .iter()
            .scan(0usize, |acc, &v| {
                *acc += v;
                Some(*acc)
            })
            .collect();
        Histogram { bins }
    }

    /// Square gray bar chart, one column per bin, bars scaled to the
    /// highest bin and drawn from the bottom.
    pub fn image(&self) -> OpsResult<PixelBuffer> {
        let n = self.bins.len() as i32;
        let mut dst = PixelBuffer::scratch(Layout::Gray8, n, n)?;
        let max = self.max().max(1);
        let stride = dst.stride();
        let bytes = dst.bytes_mut();
        for (x, &count) in self.bins.iter().enumerate() {
            let bar = (((count << 16) / max) * n as usize) >> 16;
            for y in (n as usize - bar)..n as usize {
                bytes[y * stride + x] = 0xff;
            }
        }
        Ok(dst)
    }
}

/// One 256-bin histogram per RGBA channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaHistogram {
    /// Red.
    pub r: Histogram,
    /// Green.
    pub g: Histogram,
    /// Blue.
    pub b: Histogram,
    /// Alpha.
    pub a: Histogram,
}

impl RgbaHistogram {
    /// Counts the RGBA32 values of every pixel of `src`.
    pub fn new(src: &PixelBuffer) -> Self {
        let work = src.clone_to(Layout::Rgba32);
        let mut h = [Histogram::new(256), Histogram::new(256), Histogram::new(256), Histogram::new(256)];
        for y in 0..work.height().max(0) as usize {
            for px in work.row(y).chunks_exact(4) {
                for (hist, &v) in h.iter_mut().zip(px) {
                    hist.bins[v as usize] += 1;
                }
            }
        }
        let [r, g, b, a] = h;
        Self { r, g, b, a }
    }

    /// Histogram of one channel.
    pub fn get(&self, ch: Channel) -> &Histogram {
        match ch {
            Channel::Red => &self.r,
            Channel::Green => &self.g,
            Channel::Blue => &self.b,
            Channel::Alpha => &self.a,
        }
    }

    /// Running totals per channel.
    pub fn cumulative(&self) -> Self {
        Self {
            r: self.r.cumulative(),
            g: self.g.cumulative(),
            b: self.b.cumulative(),
            a: self.a.cumulative(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warhola_core::Color;

    fn two_tone() -> PixelBuffer {
        let mut buf = PixelBuffer::scratch(Layout::Rgba32, 4, 2).unwrap();
        buf.fill(Color::Rgba([200, 50, 10, 255]));
        for x in 0..4 {
            buf.set(x, 1, Color::Rgba([0, 0, 0, 255]));
        }
        buf
    }

    #[test]
    fn test_channel() {
        let out = channel(&Executor::inline(), &two_tone(), Channel::Red).unwrap();
        assert_eq!(out.layout(), Layout::Gray8);
        assert_eq!(out.at(2, 0), Color::Gray(200));
        assert_eq!(out.at(2, 1), Color::Gray(0));
        let out = channel(&Executor::inline(), &two_tone(), "alpha".parse().unwrap()).unwrap();
        assert_eq!(out.at(0, 1), Color::Gray(255));
    }

    #[test]
    fn test_threshold() {
        let out = threshold(&Executor::inline(), &two_tone(), 60).unwrap();
        assert_eq!(out.at(0, 0), Color::Gray(0xff));
        assert_eq!(out.at(0, 1), Color::Gray(0));
        let out = threshold(&Executor::inline(), &two_tone(), 0).unwrap();
        assert_eq!(out.at(0, 1), Color::Gray(0xff));
    }

    #[test]
    fn test_histogram() {
        let h = RgbaHistogram::new(&two_tone());
        assert_eq!(h.r.bins[200], 4);
        assert_eq!(h.r.bins[0], 4);
        assert_eq!(h.get(Channel::Alpha).bins[255], 8);
        assert_eq!(h.r.max(), 4);
        assert_eq!(h.r.min(), 0);
        let c = h.cumulative();
        assert_eq!(c.r.bins[199], 4);
        assert_eq!(c.r.bins[255], 8);
        assert_eq!(Histogram::default().max(), 0);
    }

    #[test]
    fn test_histogram_image() {
        let h = Histogram { bins: vec![4, 2, 0, 1] };
        let img = h.image().unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));
        assert_eq!(img.at(0, 0), Color::Gray(0xff));
        assert_eq!(img.at(1, 1), Color::Gray(0));
        assert_eq!(img.at(1, 2), Color::Gray(0xff));
        assert_eq!(img.at(2, 3), Color::Gray(0));
        assert_eq!(img.at(3, 3), Color::Gray(0xff));
    }
}
