//! Integer rectangles in pixel space.
//!
//! A [`Rect`] is half-open: it contains every point with
//! `min_x <= x < max_x` and `min_y <= y < max_y`. Rectangles with zero
//! width or height are empty, and an empty rectangle is the usual way to
//! signal "no overlap".
//!
//! ```text
//! (min_x,min_y) ────────► X
//!   │   ┌──────────┐
//!   │   │          │
//!   │   └──────────┘ (max_x,max_y) exclusive
//!   ▼
//!   Y
//! ```
//!
//! # Usage
//!
//! ```rust
//! use warhola_core::Rect;
//!
//! let a = Rect::new(0, 0, 100, 50);
//! let b = Rect::new(80, 40, 200, 200);
//! assert_eq!(a.intersect(&b), Rect::new(80, 40, 100, 50));
//! assert!(a.contains(99, 49));
//! assert!(!a.contains(100, 0));
//! ```

use std::fmt;

/// Half-open rectangle given by its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge (inclusive)
    pub min_x: i32,
    /// Top edge (inclusive)
    pub min_y: i32,
    /// Right edge (exclusive)
    pub max_x: i32,
    /// Bottom edge (exclusive)
    pub max_y: i32,
}

impl Rect {
    /// Creates a rectangle from its corners.
    ///
    /// Corners are swapped if given in the wrong order, so
    /// `Rect::new(10, 10, 0, 0) == Rect::new(0, 0, 10, 10)`.
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates a `width x height` rectangle at the origin.
    #[inline]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Width of the rectangle.
    #[inline]
    pub const fn dx(&self) -> i32 {
        self.max_x - self.min_x
    }

    /// Height of the rectangle.
    #[inline]
    pub const fn dy(&self) -> i32 {
        self.max_y - self.min_y
    }

    /// Returns `true` if the rectangle has no area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    /// Returns `true` if the point lies inside.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        self.min_x <= x && x < self.max_x && self.min_y <= y && y < self.max_y
    }

    /// Returns the largest rectangle contained by both.
    ///
    /// When there is no overlap the result is the empty rectangle
    /// [`Rect::default()`].
    pub fn intersect(&self, other: &Rect) -> Rect {
        let r = Rect {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        };
        if r.is_empty() { Rect::default() } else { r }
    }

    /// Returns the rectangle moved by `(dx, dy)`.
    #[inline]
    pub const fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Returns the same-size rectangle anchored at the origin.
    #[inline]
    pub const fn at_origin(&self) -> Rect {
        self.translate(-self.min_x, -self.min_y)
    }

    /// Number of pixels covered.
    #[inline]
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.dx() as usize * self.dy() as usize
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})-({},{})", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_corners() {
        assert_eq!(Rect::new(10, 20, 0, 5), Rect::new(0, 5, 10, 20));
        assert_eq!(Rect::from_size(4, 3).area(), 12);
    }

    #[test]
    fn test_intersect() {
        let a = Rect::from_size(10, 10);
        assert_eq!(a.intersect(&Rect::new(5, 5, 20, 20)), Rect::new(5, 5, 10, 10));
        assert!(a.intersect(&Rect::new(20, 20, 30, 30)).is_empty());
        // touching edges do not overlap
        assert!(a.intersect(&Rect::new(10, 0, 20, 10)).is_empty());
    }

    #[test]
    fn test_translate_and_origin() {
        let r = Rect::new(3, 4, 8, 10);
        assert_eq!(r.at_origin(), Rect::from_size(5, 6));
        assert_eq!(r.translate(-3, -4), r.at_origin());
        assert_eq!(r.to_string(), "(3,4)-(8,10)");
    }
}
