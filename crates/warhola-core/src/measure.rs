//! Physical measurement and named anchor points for a buffer's bounds.
//!
//! A [`Measure`] tracks a pixel density ("points per unit") in one of the
//! supported [`Unit`]s and derives the other two from it. It also keeps a
//! list of anchors: named functions from the measure to a [`Point`]. Three
//! anchors are always present:
//!
//! - `origin` - `(0, 0)`
//! - `center` - `(width / 2, height / 2)`
//! - `bound`  - `(width, height)`
//!
//! ```rust
//! use warhola_core::{Measure, Point, Rect, Unit};
//!
//! let mut m = Measure::new(Rect::from_size(236, 118));
//! assert_eq!(m.anchor("center"), Some(Point::new(118.0, 59.0)));
//! assert_eq!(m.distance(Unit::Centimeter, Point::ZERO, Point::new(118.0, 0.0)), 1.0);
//!
//! m.set_pp(Unit::Inch, 300.0);
//! assert!((m.pp(Unit::Centimeter) - 300.0 / 2.54).abs() < 1e-9);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::rect::Rect;

/// Default density: 118 points per centimeter (roughly 300 per inch).
pub const DEFAULT_PP: f64 = 118.0;

/// Units of physical measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    /// Raw pixels; conversions are the identity.
    Pixel,
    /// Inches
    Inch,
    /// Centimeters
    #[default]
    Centimeter,
    /// Millimeters
    Millimeter,
}

impl Unit {
    /// Parses a unit name, falling back to [`Unit::Pixel`] for anything
    /// unrecognised.
    pub fn from_name(s: &str) -> Unit {
        match s.trim().to_ascii_lowercase().as_str() {
            "inch" | "in" => Unit::Inch,
            "centimeter" | "cm" => Unit::Centimeter,
            "millimeter" | "mm" => Unit::Millimeter,
            _ => Unit::Pixel,
        }
    }

    /// Short name.
    pub const fn name(self) -> &'static str {
        match self {
            Unit::Pixel => "px",
            Unit::Inch => "inch",
            Unit::Centimeter => "cm",
            Unit::Millimeter => "mm",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A 2-D point with float coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// `(0, 0)`
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Creates a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `o`.
    pub fn distance(self, o: Point) -> f64 {
        (self.x - o.x).hypot(self.y - o.y)
    }

    /// Linear interpolation toward `o`; `t = 0` is `self`, `t = 1` is `o`.
    pub fn interpolate(self, o: Point, t: f64) -> Point {
        Point::new(self.x + (o.x - self.x) * t, self.y + (o.y - self.y) * t)
    }

    /// Sum of two points.
    pub fn add(self, o: Point) -> Point {
        Point::new(self.x + o.x, self.y + o.y)
    }

    /// Difference of two points.
    pub fn sub(self, o: Point) -> Point {
        Point::new(self.x - o.x, self.y - o.y)
    }

    /// Scales both coordinates.
    pub fn mul(self, k: f64) -> Point {
        Point::new(self.x * k, self.y * k)
    }

    /// Divides both coordinates.
    pub fn div(self, k: f64) -> Point {
        Point::new(self.x / k, self.y / k)
    }

    /// Returns `true` if the point falls inside the half-open rectangle.
    pub fn in_rect(self, r: &Rect) -> bool {
        r.min_x as f64 <= self.x && self.x < r.max_x as f64 && r.min_y as f64 <= self.y && self.y < r.max_y as f64
    }

    /// Wraps the point into `r`, treating the rectangle as a torus.
    pub fn modulo(self, r: &Rect) -> Point {
        let min = Point::new(r.min_x as f64, r.min_y as f64);
        let p = self.sub(min);
        let wrap = |v: f64, size: f64| {
            let m = v % size;
            if m < 0.0 { m + size } else { m }
        };
        Point::new(wrap(p.x, r.dx() as f64), wrap(p.y, r.dy() as f64)).add(min)
    }

    /// Rounds to integer pixel coordinates.
    pub fn round(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x as f64, y as f64)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4},{:.4})", self.x, self.y)
    }
}

/// Function computing an anchor point from a measure.
pub type AnchorFn = Arc<dyn Fn(&Measure) -> Point + Send + Sync>;

/// Pixel density, units and anchors for a rectangle.
#[derive(Clone)]
pub struct Measure {
    bounds: Rect,
    unit: Unit,
    pp: f64,
    ppi: f64,
    ppc: f64,
    ppm: f64,
    anchors: Vec<(String, AnchorFn)>,
}

impl Measure {
    /// Creates a measure over `bounds` at the default density.
    pub fn new(bounds: Rect) -> Self {
        Self::with_pp(bounds, Unit::default(), DEFAULT_PP)
    }

    /// Creates a measure with an explicit density.
    pub fn with_pp(bounds: Rect, unit: Unit, pp: f64) -> Self {
        let mut m = Self {
            bounds,
            unit,
            pp,
            ppi: 0.0,
            ppc: 0.0,
            ppm: 0.0,
            anchors: Vec::new(),
        };
        m.set_pp(unit, pp);
        m.set_anchor("origin", |_| Point::ZERO);
        m.set_anchor("center", |m| Point::new(m.width() / 2.0, m.height() / 2.0));
        m.set_anchor("bound", |m| Point::new(m.width(), m.height()));
        m
    }

    /// Unit the density was last set in.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Rectangle being measured.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Returns a copy measuring `bounds`, keeping density and anchors.
    pub fn rebind(&self, bounds: Rect) -> Measure {
        Measure {
            bounds,
            ..self.clone()
        }
    }

    /// Points per `unit`. [`Unit::Pixel`] returns the raw stored value.
    pub fn pp(&self, unit: Unit) -> f64 {
        match unit {
            Unit::Inch => self.ppi,
            Unit::Centimeter => self.ppc,
            Unit::Millimeter => self.ppm,
            Unit::Pixel => self.pp,
        }
    }

    /// Sets the density in `unit` and derives the others.
    ///
    /// [`Unit::Pixel`] stores the raw value and leaves the derived
    /// densities untouched.
    pub fn set_pp(&mut self, unit: Unit, pp: f64) {
        self.pp = pp;
        self.unit = unit;
        match unit {
            Unit::Centimeter => {
                self.ppc = pp;
                self.ppm = pp / 10.0;
                self.ppi = pp * 2.54;
            }
            Unit::Millimeter => {
                self.ppm = pp;
                self.ppc = pp * 10.0;
                self.ppi = self.ppc * 2.54;
            }
            Unit::Inch => {
                self.ppi = pp;
                self.ppc = pp / 2.54;
                self.ppm = self.ppc / 10.0;
            }
            Unit::Pixel => {}
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> f64 {
        self.bounds.dx() as f64
    }

    /// Height in pixels.
    pub fn height(&self) -> f64 {
        self.bounds.dy() as f64
    }

    /// Half the height.
    pub fn radius(&self) -> f64 {
        self.height() / 2.0
    }

    /// Distance between two points, in `unit`.
    pub fn distance(&self, unit: Unit, a: Point, b: Point) -> f64 {
        let d = a.distance(b);
        match unit {
            Unit::Pixel => d,
            u => d / self.pp(u),
        }
    }

    /// Evaluates the anchor named `tag`.
    pub fn anchor(&self, tag: &str) -> Option<Point> {
        self.anchors.iter().find(|(t, _)| t == tag).map(|(_, f)| f(self))
    }

    /// Evaluates an anchor, returning [`Point::ZERO`] when it is missing.
    pub fn anchor_or_zero(&self, tag: &str) -> Point {
        self.anchor(tag).unwrap_or(Point::ZERO)
    }

    /// Defines an anchor, replacing any existing one with the same tag.
    pub fn set_anchor(&mut self, tag: &str, f: impl Fn(&Measure) -> Point + Send + Sync + 'static) {
        let f: AnchorFn = Arc::new(f);
        match self.anchors.iter_mut().find(|(t, _)| t == tag) {
            Some(slot) => slot.1 = f,
            None => self.anchors.push((tag.to_string(), f)),
        }
    }

    /// Anchor tags in definition order.
    pub fn anchor_tags(&self) -> impl Iterator<Item = &str> {
        self.anchors.iter().map(|(t, _)| t.as_str())
    }
}

impl Default for Measure {
    fn default() -> Self {
        Measure::new(Rect::default())
    }
}

impl fmt::Debug for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Measure")
            .field("bounds", &self.bounds)
            .field("unit", &self.unit)
            .field("pp", &self.pp)
            .field("anchors", &self.anchor_tags().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_density() {
        let m = Measure::new(Rect::from_size(10, 10));
        assert_eq!(m.unit(), Unit::Centimeter);
        assert_relative_eq!(m.pp(Unit::Centimeter), 118.0);
        assert_relative_eq!(m.pp(Unit::Millimeter), 11.8);
        assert_relative_eq!(m.pp(Unit::Inch), 118.0 * 2.54);
        assert_relative_eq!(m.pp(Unit::Pixel), 118.0);
    }

    #[test]
    fn test_set_pp_units() {
        let mut m = Measure::default();
        m.set_pp(Unit::Millimeter, 12.0);
        assert_relative_eq!(m.pp(Unit::Centimeter), 120.0);
        assert_relative_eq!(m.pp(Unit::Inch), 304.8, epsilon = 1e-9);

        m.set_pp(Unit::Inch, 254.0);
        assert_relative_eq!(m.pp(Unit::Centimeter), 100.0, epsilon = 1e-9);
        assert_relative_eq!(m.pp(Unit::Millimeter), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unit_names() {
        assert_eq!(Unit::from_name("in"), Unit::Inch);
        assert_eq!(Unit::from_name("CM"), Unit::Centimeter);
        assert_eq!(Unit::from_name("millimeter"), Unit::Millimeter);
        assert_eq!(Unit::from_name("furlong"), Unit::Pixel);
    }

    #[test]
    fn test_distance() {
        let m = Measure::new(Rect::from_size(500, 500));
        let a = Point::ZERO;
        let b = Point::new(236.0, 0.0);
        assert_relative_eq!(m.distance(Unit::Centimeter, a, b), 2.0);
        assert_relative_eq!(m.distance(Unit::Millimeter, a, b), 20.0, epsilon = 1e-9);
        assert_relative_eq!(m.distance(Unit::Pixel, a, b), 236.0);
    }

    #[test]
    fn test_anchors() {
        let mut m = Measure::new(Rect::from_size(100, 40));
        assert_eq!(m.anchor("origin"), Some(Point::ZERO));
        assert_eq!(m.anchor("center"), Some(Point::new(50.0, 20.0)));
        assert_eq!(m.anchor("bound"), Some(Point::new(100.0, 40.0)));
        assert_eq!(m.anchor("nowhere"), None);
        assert_eq!(m.anchor_or_zero("nowhere"), Point::ZERO);
        assert_relative_eq!(m.radius(), 20.0);

        m.set_anchor("quarter", |m| Point::new(m.width() / 4.0, m.height() / 4.0));
        assert_eq!(m.anchor("quarter"), Some(Point::new(25.0, 10.0)));

        m.set_anchor("center", |_| Point::new(1.0, 1.0));
        assert_eq!(m.anchor("center"), Some(Point::new(1.0, 1.0)));
        assert_eq!(m.anchor_tags().count(), 4);

        let smaller = m.rebind(Rect::from_size(10, 10));
        assert_eq!(smaller.anchor("quarter"), Some(Point::new(2.5, 2.5)));
    }

    #[test]
    fn test_point_ops() {
        let a = Point::ZERO;
        let b = Point::new(50.0, 100.0);
        assert_relative_eq!(a.distance(b), 50f64.hypot(100.0));
        assert_eq!(a.interpolate(b, 0.5), Point::new(25.0, 50.0));
        assert_eq!(b.add(b).sub(b), b);
        assert_eq!(b.mul(2.0).div(4.0), Point::new(25.0, 50.0));
        assert_eq!(Point::new(1.4, 2.6).round(), (1, 3));
        assert_eq!(b.to_string(), "(50.0000,100.0000)");

        let r = Rect::new(10, 10, 20, 20);
        assert!(Point::new(10.0, 19.5).in_rect(&r));
        assert!(!Point::new(20.0, 15.0).in_rect(&r));
        assert_eq!(Point::new(25.0, 5.0).modulo(&r), Point::new(15.0, 15.0));
    }
}
