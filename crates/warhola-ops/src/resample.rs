//! Resampling filters.
//!
//! A filter is a support radius plus a weight function over source-pixel
//! distance. A support of zero selects nearest-neighbour sampling.
//!
//! | name                | support |
//! |---------------------|---------|
//! | `nearest`           | 0       |
//! | `box`               | 0.5     |
//! | `linear`            | 1       |
//! | `gaussian`          | 1       |
//! | `hermite`           | 1       |
//! | `mitchellnetravali` | 2       |
//! | `catmullrom`        | 2       |
//! | `bspline`           | 2       |
//! | `lanczos`           | 3       |
//! | `bartlett`          | 3       |
//! | `hann`              | 3       |
//! | `hamming`           | 3       |
//! | `blackman`          | 3       |
//! | `welch`             | 3       |
//! | `cosine`            | 3       |

use std::f64::consts::PI;
use std::fmt;

use tracing::warn;

/// Named resampling filter.
#[derive(Clone, Copy)]
pub struct ResampleFilter {
    /// Lookup name.
    pub name: &'static str,
    /// Half-width of the kernel in source pixels at scale 1.
    pub support: f64,
    /// Weight at a distance.
    pub weight: fn(f64) -> f64,
}

impl ResampleFilter {
    /// Nearest neighbour.
    pub const NEAREST: Self = Self::new("nearest", 0.0, box_weight);
    /// Box.
    pub const BOX: Self = Self::new("box", 0.5, box_weight);
    /// Triangle.
    pub const LINEAR: Self = Self::new("linear", 1.0, linear);
    /// Truncated Gaussian.
    pub const GAUSSIAN: Self = Self::new("gaussian", 1.0, gaussian);
    /// Mitchell-Netravali cubic, `B = C = 1/3`.
    pub const MITCHELL_NETRAVALI: Self = Self::new("mitchellnetravali", 2.0, mitchell_netravali);
    /// Catmull-Rom cubic.
    pub const CATMULL_ROM: Self = Self::new("catmullrom", 2.0, catmull_rom);
    /// Lanczos-3.
    pub const LANCZOS: Self = Self::new("lanczos", 3.0, lanczos);
    /// Bartlett-windowed sinc.
    pub const BARTLETT: Self = Self::new("bartlett", 3.0, bartlett);
    /// Hermite cubic.
    pub const HERMITE: Self = Self::new("hermite", 1.0, hermite);
    /// Cubic B-spline.
    pub const BSPLINE: Self = Self::new("bspline", 2.0, bspline);
    /// Hann-windowed sinc.
    pub const HANN: Self = Self::new("hann", 3.0, hann);
    /// Hamming-windowed sinc.
    pub const HAMMING: Self = Self::new("hamming", 3.0, hamming);
    /// Blackman-windowed sinc.
    pub const BLACKMAN: Self = Self::new("blackman", 3.0, blackman);
    /// Welch-windowed sinc.
    pub const WELCH: Self = Self::new("welch", 3.0, welch);
    /// Cosine-windowed sinc.
    pub const COSINE: Self = Self::new("cosine", 3.0, cosine);

    /// The fourteen filtering kernels, without nearest.
    pub const ALL: [Self; 14] = [
        Self::BOX,
        Self::LINEAR,
        Self::GAUSSIAN,
        Self::MITCHELL_NETRAVALI,
        Self::CATMULL_ROM,
        Self::LANCZOS,
        Self::BARTLETT,
        Self::HERMITE,
        Self::BSPLINE,
        Self::HANN,
        Self::HAMMING,
        Self::BLACKMAN,
        Self::WELCH,
        Self::COSINE,
    ];

    const fn new(name: &'static str, support: f64, weight: fn(f64) -> f64) -> Self {
        Self { name, support, weight }
    }

    /// Looks a filter up by case-insensitive name.
    pub fn find(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        if lower == Self::NEAREST.name || lower == "nearestneighbor" {
            return Some(Self::NEAREST);
        }
        Self::ALL.into_iter().find(|f| f.name == lower)
    }

    /// Like [`find`](Self::find), but unknown names fall back to
    /// [`NEAREST`](Self::NEAREST) with a warning.
    pub fn by_name(name: &str) -> Self {
        Self::find(name).unwrap_or_else(|| {
            warn!(filter = name, "unsupported resample filter, using nearest");
            Self::NEAREST
        })
    }

    /// Whether this filter samples the nearest pixel only.
    pub fn is_nearest(&self) -> bool {
        self.support <= 0.0
    }
}

impl fmt::Debug for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResampleFilter")
            .field("name", &self.name)
            .field("support", &self.support)
            .finish()
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl PartialEq for ResampleFilter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Mitchell-Netravali family with parameters `b` and `c`.
fn bc_spline(x: f64, b: f64, c: f64) -> f64 {
    let x = x.abs();
    if x < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * x * x * x + (-18.0 + 12.0 * b + 6.0 * c) * x * x + (6.0 - 2.0 * b)) / 6.0
    } else if x < 2.0 {
        ((-b - 6.0 * c) * x * x * x + (6.0 * b + 30.0 * c) * x * x + (-12.0 * b - 48.0 * c) * x + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

fn box_weight(x: f64) -> f64 {
    if x.abs() < 0.5 { 1.0 } else { 0.0 }
}

fn linear(x: f64) -> f64 {
    let x = x.abs();
    if x < 1.0 { 1.0 - x } else { 0.0 }
}

fn gaussian(x: f64) -> f64 {
    let x = x.abs();
    if x >= 1.0 {
        return 0.0;
    }
    let x = x * 2.0;
    let y = 0.5f64.powf(x * x);
    let base = 0.5f64.powi(4);
    (y - base) / (1.0 - base)
}

fn mitchell_netravali(x: f64) -> f64 {
    bc_spline(x, 1.0 / 3.0, 1.0 / 3.0)
}

fn catmull_rom(x: f64) -> f64 {
    bc_spline(x, 0.0, 0.5)
}

fn hermite(x: f64) -> f64 {
    if x.abs() < 1.0 { bc_spline(x, 0.0, 0.0) } else { 0.0 }
}

fn bspline(x: f64) -> f64 {
    bc_spline(x, 1.0, 0.0)
}

fn lanczos(x: f64) -> f64 {
    let x = x.abs();
    if x == 0.0 {
        1.0
    } else if x < 3.0 {
        3.0 * (PI * x).sin() * (PI * x / 3.0).sin() / (PI * PI * x * x)
    } else {
        0.0
    }
}

/// Applies `window` over the 3-lobe sinc.
fn windowed(x: f64, window: impl Fn(f64) -> f64) -> f64 {
    let x = x.abs();
    if x < 3.0 { sinc(x) * window(x) } else { 0.0 }
}

fn bartlett(x: f64) -> f64 {
    windowed(x, |x| (3.0 - x) / 3.0)
}

fn hann(x: f64) -> f64 {
    windowed(x, |x| 0.5 + 0.5 * (PI * x / 3.0).cos())
}

fn hamming(x: f64) -> f64 {
    windowed(x, |x| 0.54 + 0.46 * (PI * x / 3.0).cos())
}

fn blackman(x: f64) -> f64 {
    windowed(x, |x| 0.42 - 0.5 * (PI * x / 3.0 + PI).cos() + 0.08 * (2.0 * PI * x / 3.0).cos())
}

fn welch(x: f64) -> f64 {
    windowed(x, |x| 1.0 - x * x / 9.0)
}

fn cosine(x: f64) -> f64 {
    windowed(x, |x| (PI / 2.0 * (x / 3.0)).cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lookup() {
        assert_eq!(ResampleFilter::find("Lanczos"), Some(ResampleFilter::LANCZOS));
        assert_eq!(ResampleFilter::find("CatmullRom"), Some(ResampleFilter::CATMULL_ROM));
        assert_eq!(ResampleFilter::find("bicubic"), None);
        assert_eq!(ResampleFilter::by_name("bicubic"), ResampleFilter::NEAREST);
        assert!(ResampleFilter::by_name("nope").is_nearest());
        for f in ResampleFilter::ALL {
            assert_eq!(ResampleFilter::by_name(f.name), f);
            assert!(!f.is_nearest());
        }
    }

    #[test]
    fn test_peak_at_zero() {
        for f in ResampleFilter::ALL {
            let w = (f.weight)(0.0);
            match f.name {
                "mitchellnetravali" => assert_relative_eq!(w, 8.0 / 9.0, epsilon = 1e-12),
                "bspline" => assert_relative_eq!(w, 2.0 / 3.0, epsilon = 1e-12),
                _ => assert_relative_eq!(w, 1.0, epsilon = 1e-12),
            }
        }
    }

    #[test]
    fn test_zero_outside_support() {
        for f in ResampleFilter::ALL {
            let w = (f.weight)(f.support + 0.01);
            assert_relative_eq!(w, 0.0, epsilon = 1e-12);
            assert_relative_eq!((f.weight)(0.3), (f.weight)(-0.3), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_interpolating_cubic_hits_zero_at_one() {
        assert_relative_eq!(catmull_rom(1.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(linear(0.25), 0.75);
        assert_relative_eq!(box_weight(0.5), 0.0);
    }
}
