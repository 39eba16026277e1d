//! Palette hooks applied to every write into a buffer.

use std::fmt;
use std::sync::Arc;

use crate::color::Color;

/// Maps colors written into a [`PixelBuffer`](crate::PixelBuffer).
///
/// Indexed images decode with a [`Palette::Indexed`] hook so writes stay
/// inside the original color table.
#[derive(Clone)]
pub enum Palette {
    /// Snap to the closest entry of a color table.
    Indexed(Arc<[Color]>),
    /// Replace every color with a single one.
    Uniform(Color),
    /// Arbitrary mapping.
    Custom(Arc<dyn Fn(Color) -> Color + Send + Sync>),
}

impl Palette {
    /// Creates an indexed palette from a color table.
    pub fn indexed(colors: impl Into<Vec<Color>>) -> Self {
        Palette::Indexed(colors.into().into())
    }

    /// Creates a palette from a closure.
    pub fn custom(f: impl Fn(Color) -> Color + Send + Sync + 'static) -> Self {
        Palette::Custom(Arc::new(f))
    }

    /// Applies the palette to one color.
    pub fn apply(&self, c: Color) -> Color {
        match self {
            Palette::Indexed(table) => table.get(closest(table, c)).copied().unwrap_or(c),
            Palette::Uniform(u) => *u,
            Palette::Custom(f) => f(c),
        }
    }
}

/// Index of the table entry nearest to `c`; ties keep the first entry.
pub fn closest(table: &[Color], c: Color) -> usize {
    let want = c.rgba16();
    let mut best = (0, u64::MAX);
    for (i, entry) in table.iter().enumerate() {
        let have = entry.rgba16();
        let sum: u64 = want
            .iter()
            .zip(have.iter())
            .map(|(&a, &b)| {
                let d = a.abs_diff(b) as u64;
                (d * d) >> 2
            })
            .sum();
        if sum == 0 {
            return i;
        }
        if sum < best.1 {
            best = (i, sum);
        }
    }
    best.0
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Palette::Indexed(t) => f.debug_tuple("Indexed").field(&t.len()).finish(),
            Palette::Uniform(c) => f.debug_tuple("Uniform").field(c).finish(),
            Palette::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_snaps() {
        let p = Palette::indexed(vec![Color::BLACK, Color::WHITE]);
        assert_eq!(p.apply(Color::Rgba([200, 210, 190, 255])), Color::WHITE);
        assert_eq!(p.apply(Color::Gray(20)), Color::BLACK);
    }

    #[test]
    fn test_first_wins_on_tie() {
        let table = [Color::Gray(0), Color::Gray(0)];
        assert_eq!(closest(&table, Color::Gray(10)), 0);
        assert_eq!(closest(&[], Color::Gray(10)), 0);
    }

    #[test]
    fn test_uniform_and_custom() {
        let red = Color::Rgba([255, 0, 0, 255]);
        assert_eq!(Palette::Uniform(red).apply(Color::WHITE), red);
        let invert = Palette::custom(|c| {
            let [r, g, b, a] = c.to_rgba();
            Color::Rgba([a - r, a - g, a - b, a])
        });
        assert_eq!(invert.apply(Color::WHITE), Color::BLACK);
    }
}
