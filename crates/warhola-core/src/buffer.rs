//! Addressable pixel buffers.
//!
//! [`PixelBuffer`] is a rectangle of bytes tagged with a [`Layout`]. Pixels
//! are located by `offset + (y - min_y) * stride + (x - min_x) * byte_width`.
//!
//! # Memory Management
//!
//! Bytes live in an [`Arc<Vec<u8>>`]. Cloning a buffer or taking a
//! [`sub_region`](PixelBuffer::sub_region) shares the bytes; the first
//! write through a shared handle detaches it (copy-on-write), so a sub-view
//! never writes through to its parent.
//!
//! # Example
//!
//! ```rust
//! use warhola_core::{Color, Layout, PixelBuffer, Rect};
//!
//! let mut buf = PixelBuffer::scratch(Layout::Rgba32, 4, 4).unwrap();
//! buf.set(1, 2, Color::WHITE);
//! assert_eq!(buf.at(1, 2), Color::WHITE);
//! assert_eq!(buf.pix_offset(1, 2), 2 * 16 + 4);
//!
//! let gray = buf.clone_to(Layout::Gray8);
//! assert_eq!(gray.at(1, 2), Color::Gray(255));
//!
//! let view = buf.sub_region(Rect::new(1, 2, 3, 4));
//! assert_eq!(view.rect(), Rect::from_size(2, 2));
//! assert_eq!(view.at(0, 0), Color::WHITE);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::color::Color;
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::measure::Measure;
use crate::palette::Palette;
use crate::rect::Rect;

/// How [`PixelBuffer::pad`] fills the border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PadMode {
    /// Leave the border transparent.
    #[default]
    None,
    /// Repeat the nearest edge pixel.
    Extend,
    /// Tile the image periodically.
    Wrap,
}

/// A rectangle of pixels in one channel layout.
#[derive(Clone)]
pub struct PixelBuffer {
    layout: Layout,
    data: Arc<Vec<u8>>,
    offset: usize,
    stride: usize,
    rect: Rect,
    palette: Option<Palette>,
    measure: Measure,
}

impl PixelBuffer {
    /// Creates a zero-filled `width x height` buffer at the origin.
    ///
    /// Zero-sized buffers are allowed; negative sizes are not.
    pub fn scratch(layout: Layout, width: i32, height: i32) -> Result<Self> {
        if width < 0 || height < 0 {
            return Err(Error::invalid_dimensions(width, height));
        }
        let stride = layout.byte_width() * width as usize;
        let rect = Rect::from_size(width, height);
        Ok(Self {
            layout,
            data: Arc::new(vec![0u8; stride * height as usize]),
            offset: 0,
            stride,
            rect,
            palette: None,
            measure: Measure::new(rect),
        })
    }

    /// Like [`scratch`](Self::scratch) but keeps this buffer's palette and
    /// measurement settings.
    pub fn scratch_like(&self, layout: Layout, width: i32, height: i32) -> Result<Self> {
        let mut out = Self::scratch(layout, width, height)?;
        out.palette = self.palette.clone();
        out.measure = self.measure.rebind(out.rect);
        Ok(out)
    }

    /// Wraps tightly packed bytes (`stride = width * byte_width`).
    pub fn from_raw(layout: Layout, width: i32, height: i32, data: Vec<u8>) -> Result<Self> {
        if width < 0 || height < 0 {
            return Err(Error::invalid_dimensions(width, height));
        }
        let stride = layout.byte_width() * width as usize;
        let need = stride * height as usize;
        if data.len() < need {
            return Err(Error::InvalidParameter(format!(
                "{} {}x{} needs {} bytes, got {}",
                layout,
                width,
                height,
                need,
                data.len()
            )));
        }
        let rect = Rect::from_size(width, height);
        Ok(Self {
            layout,
            data: Arc::new(data),
            offset: 0,
            stride,
            rect,
            palette: None,
            measure: Measure::new(rect),
        })
    }

    /// Degenerate buffer: [`Layout::Unset`], empty rectangle, no bytes.
    pub fn empty() -> Self {
        Self {
            layout: Layout::Unset,
            data: Arc::new(Vec::new()),
            offset: 0,
            stride: 0,
            rect: Rect::default(),
            palette: None,
            measure: Measure::default(),
        }
    }

    /// Channel layout.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Bounding rectangle.
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> i32 {
        self.rect.dx()
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> i32 {
        self.rect.dy()
    }

    /// Bytes between the starts of consecutive rows.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns `true` if the buffer covers no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }

    /// Bytes from the first pixel onward.
    pub fn bytes(&self) -> &[u8] {
        &self.data[self.offset..]
    }

    /// Mutable bytes from the first pixel onward, detaching shared storage.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        let offset = self.offset;
        &mut Arc::make_mut(&mut self.data)[offset..]
    }

    /// Pixel bytes of row `y`, counted from the top of the buffer.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = self.offset + y * self.stride;
        let len = self.width() as usize * self.layout.byte_width();
        &self.data[start..start + len]
    }

    /// Rows packed without stride padding.
    pub fn packed(&self) -> Vec<u8> {
        if self.is_empty() {
            return Vec::new();
        }
        (0..self.height() as usize).flat_map(|y| self.row(y).iter().copied()).collect()
    }

    /// Palette hook applied on writes, if any.
    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// Installs or removes the palette hook.
    pub fn set_palette(&mut self, palette: Option<Palette>) {
        self.palette = palette;
    }

    /// Measurement companion for this buffer's bounds.
    pub fn measure(&self) -> &Measure {
        &self.measure
    }

    /// Mutable measurement companion.
    pub fn measure_mut(&mut self) -> &mut Measure {
        &mut self.measure
    }

    /// Copies palette and measurement settings from `src`, keeping this
    /// buffer's bounds.
    pub fn inherit(mut self, src: &PixelBuffer) -> Self {
        self.palette = src.palette.clone();
        self.measure = src.measure.rebind(self.rect);
        self
    }

    /// Byte offset of `(x, y)` relative to [`bytes`](Self::bytes).
    #[inline]
    pub fn pix_offset(&self, x: i32, y: i32) -> usize {
        (y - self.rect.min_y) as usize * self.stride + (x - self.rect.min_x) as usize * self.layout.byte_width()
    }

    /// Reads a pixel. Out of bounds reads return the layout's zero color.
    pub fn at(&self, x: i32, y: i32) -> Color {
        if !self.rect.contains(x, y) {
            return self.layout.zero();
        }
        let i = self.offset + self.pix_offset(x, y);
        self.layout.decode(&self.data[i..])
    }

    /// Writes a pixel through the palette hook. Out of bounds writes are
    /// ignored.
    pub fn set(&mut self, x: i32, y: i32, c: Color) {
        if !self.rect.contains(x, y) {
            return;
        }
        let c = self.palettize(c);
        let i = self.pix_offset(x, y);
        let layout = self.layout;
        layout.encode(c, &mut self.bytes_mut()[i..]);
    }

    /// Applies the palette hook to one color.
    #[inline]
    pub fn palettize(&self, c: Color) -> Color {
        match &self.palette {
            Some(p) => p.apply(c),
            None => c,
        }
    }

    /// Sets every pixel to `c`.
    pub fn fill(&mut self, c: Color) {
        if self.is_empty() {
            return;
        }
        let c = self.palettize(c);
        let bw = self.layout.byte_width();
        let mut px = [0u8; 8];
        self.layout.encode(c, &mut px);
        let (w, h, stride) = (self.width() as usize, self.height() as usize, self.stride);
        let bytes = self.bytes_mut();
        for y in 0..h {
            for x in 0..w {
                let i = y * stride + x * bw;
                bytes[i..i + bw].copy_from_slice(&px[..bw]);
            }
        }
    }

    /// Returns `true` if every pixel is fully opaque.
    ///
    /// Empty buffers and layouts without alpha are always opaque.
    pub fn is_opaque(&self) -> bool {
        if self.is_empty() || !self.layout.has_alpha() {
            return true;
        }
        let bw = self.layout.byte_width();
        (0..self.height() as usize).all(|y| self.row(y).chunks_exact(bw).all(|px| self.layout.is_opaque_pixel(px)))
    }

    /// Converts every pixel into `layout`, applying the palette hook.
    ///
    /// The copy has the same size, anchored at the origin. Runs on the
    /// calling thread; operators parallelise their own passes.
    pub fn clone_to(&self, layout: Layout) -> PixelBuffer {
        let (w, h) = (self.width().max(0), self.height().max(0));
        let mut out = match self.scratch_like(layout, w, h) {
            Ok(out) => out,
            Err(_) => return PixelBuffer::empty(),
        };
        if self.is_empty() || layout == Layout::Unset {
            return out;
        }

        let src_bw = self.layout.byte_width();
        let dst_bw = layout.byte_width();
        let dst_stride = out.stride;
        let palette = self.palette.clone();
        Arc::make_mut(&mut out.data)
            .chunks_mut(dst_stride)
            .enumerate()
            .for_each(|(y, dst_row)| {
                let src_row = self.row(y);
                for (s, d) in src_row.chunks_exact(src_bw).zip(dst_row.chunks_exact_mut(dst_bw)) {
                    let mut c = self.layout.decode(s);
                    if let Some(p) = &palette {
                        c = p.apply(c);
                    }
                    layout.encode(c, d);
                }
            });
        out
    }

    /// Returns a view of the part of the buffer inside `r`.
    ///
    /// The view shares bytes with this buffer and its rectangle is moved
    /// to the origin. No overlap yields [`PixelBuffer::empty`].
    pub fn sub_region(&self, r: Rect) -> PixelBuffer {
        let r = r.intersect(&self.rect);
        if r.is_empty() {
            return PixelBuffer::empty();
        }
        let rect = r.at_origin();
        PixelBuffer {
            layout: self.layout,
            data: Arc::clone(&self.data),
            offset: self.offset + self.pix_offset(r.min_x, r.min_y),
            stride: self.stride,
            rect,
            palette: self.palette.clone(),
            measure: self.measure.rebind(rect),
        }
    }

    /// Returns an RGBA32 copy grown by `px` columns and `py` rows on each
    /// side, with the border filled according to `mode`.
    pub fn pad(&self, mode: PadMode, px: i32, py: i32) -> Result<PixelBuffer> {
        if px < 0 || py < 0 {
            return Err(Error::InvalidParameter(format!("negative padding {px}x{py}")));
        }
        let src = self.clone_to(Layout::Rgba32);
        let (w, h) = (src.width(), src.height());
        let mut out = src.scratch_like(Layout::Rgba32, w + 2 * px, h + 2 * py)?;
        if src.is_empty() {
            return Ok(out);
        }

        let map = |v: i32, pad: i32, size: i32| -> Option<i32> {
            let i = v - pad;
            if (0..size).contains(&i) {
                return Some(i);
            }
            match mode {
                PadMode::None => None,
                PadMode::Extend => Some(i.clamp(0, size - 1)),
                PadMode::Wrap => Some(i.rem_euclid(size)),
            }
        };

        let stride = out.stride;
        Arc::make_mut(&mut out.data)
            .chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| {
                let Some(sy) = map(y as i32, py, h) else { return };
                let src_row = src.row(sy as usize);
                for (x, d) in row.chunks_exact_mut(4).enumerate() {
                    if let Some(sx) = map(x as i32, px, w) {
                        let s = sx as usize * 4;
                        d.copy_from_slice(&src_row[s..s + 4]);
                    }
                }
            });
        Ok(out)
    }

    /// Copies `src` into this buffer with its origin at `at`, clipped to
    /// this buffer's bounds.
    pub fn paste(&mut self, src: &PixelBuffer, at: (i32, i32)) {
        let target = src.rect.at_origin().translate(at.0, at.1).intersect(&self.rect);
        for y in target.min_y..target.max_y {
            for x in target.min_x..target.max_x {
                let c = src.at(src.rect.min_x + x - at.0, src.rect.min_y + y - at.1);
                self.set(x, y, c);
            }
        }
    }

    /// Composites `src` over this buffer at `at` with `opacity` percent
    /// (`0..=100`).
    pub fn overlay(&mut self, src: &PixelBuffer, at: (i32, i32), opacity: f64) {
        const M: u64 = 0xffff;
        let ma = (255.0 * (opacity / 100.0)).clamp(0.0, 255.0) as u64 * 0x101;
        if ma == 0 {
            return;
        }
        let target = src.rect.at_origin().translate(at.0, at.1).intersect(&self.rect);
        for y in target.min_y..target.max_y {
            for x in target.min_x..target.max_x {
                let s = src.at(src.rect.min_x + x - at.0, src.rect.min_y + y - at.1).rgba16();
                let d = self.at(x, y).rgba16();
                let a = M - (s[3] as u64 * ma / M);
                let mix = |i: usize| ((d[i] as u64 * a + s[i] as u64 * ma) / M).min(M) as u16;
                self.set(x, y, Color::Rgba64([mix(0), mix(1), mix(2), mix(3)]));
            }
        }
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        PixelBuffer::empty()
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("layout", &self.layout)
            .field("rect", &self.rect)
            .field("stride", &self.stride)
            .field("offset", &self.offset)
            .field("palette", &self.palette)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: i32, h: i32) -> PixelBuffer {
        let mut buf = PixelBuffer::scratch(Layout::Rgba32, w, h).unwrap();
        for y in 0..h {
            for x in 0..w {
                buf.set(x, y, Color::Rgba([(x * 10) as u8, (y * 10) as u8, 0, 255]));
            }
        }
        buf
    }

    #[test]
    fn test_scratch() {
        let buf = PixelBuffer::scratch(Layout::Rgba64, 3, 2).unwrap();
        assert_eq!(buf.stride(), 24);
        assert_eq!(buf.bytes().len(), 48);
        assert!(buf.bytes().iter().all(|&b| b == 0));
        assert!(PixelBuffer::scratch(Layout::Gray8, -1, 2).unwrap_err().is_invalid_dimensions());
    }

    #[test]
    fn test_bounds_checked_access() {
        let mut buf = PixelBuffer::scratch(Layout::Gray8, 2, 2).unwrap();
        buf.set(5, 5, Color::WHITE);
        assert!(buf.bytes().iter().all(|&b| b == 0));
        assert_eq!(buf.at(-1, 0), Color::Gray(0));
        let cmyk = PixelBuffer::scratch(Layout::Cmyk32, 1, 1).unwrap();
        assert_eq!(cmyk.at(9, 9), Color::Cmyk([0; 4]));
    }

    #[test]
    fn test_is_opaque() {
        let mut buf = PixelBuffer::scratch(Layout::Rgba32, 2, 2).unwrap();
        assert!(!buf.is_opaque());
        buf.fill(Color::BLACK);
        assert!(buf.is_opaque());
        buf.set(1, 1, Color::Rgba([0, 0, 0, 254]));
        assert!(!buf.is_opaque());
        assert!(PixelBuffer::scratch(Layout::Gray16, 2, 2).unwrap().is_opaque());
        assert!(PixelBuffer::empty().is_opaque());
    }

    #[test]
    fn test_clone_round_trip() {
        let src = gradient(4, 3);
        for layout in [Layout::Rgba64, Layout::Nrgba32, Layout::Nrgba64] {
            let back = src.clone_to(layout).clone_to(Layout::Rgba32);
            assert_eq!(back.packed(), src.packed(), "{layout}");
        }
        let gray = src.clone_to(Layout::Gray8);
        assert_eq!(gray.layout(), Layout::Gray8);
        assert_eq!(gray.rect(), src.rect());
    }

    #[test]
    fn test_clone_round_trip_every_layout() {
        let mut src = PixelBuffer::scratch(Layout::Rgba32, 16, 16).unwrap();
        for y in 0..16 {
            for x in 0..16 {
                let c = [(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8, (y * 15) as u8];
                src.set(x, y, Color::Nrgba(c));
            }
        }

        for layout in Layout::ALL {
            let tolerance = match layout {
                Layout::Cmyk32 => 512,
                Layout::Nrgba32 => 257,
                Layout::Nrgba64 => 2,
                _ => 1,
            };
            let first = src.clone_to(layout);
            let back = first.clone_to(Layout::Rgba64).clone_to(layout);
            assert_eq!(back.layout(), layout);
            assert_eq!(back.rect(), src.rect());
            for y in 0..16 {
                for x in 0..16 {
                    let (want, got) = (first.at(x, y).rgba16(), back.at(x, y).rgba16());
                    for (w, g) in want.iter().zip(got.iter()) {
                        assert!(w.abs_diff(*g) <= tolerance, "{layout} at {x},{y}: {want:?} vs {got:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_clone_to_stays_on_calling_thread() {
        use std::sync::Mutex;
        use std::thread::{self, ThreadId};

        let seen: Arc<Mutex<Vec<ThreadId>>> = Arc::default();
        let log = Arc::clone(&seen);
        let mut src = gradient(64, 64);
        src.set_palette(Some(Palette::custom(move |c| {
            if let Ok(mut ids) = log.lock() {
                ids.push(thread::current().id());
            }
            c
        })));

        let out = src.clone_to(Layout::Rgba64);
        assert_eq!(out.rect(), src.rect());
        let ids = seen.lock().unwrap();
        assert_eq!(ids.len(), 64 * 64);
        assert!(ids.iter().all(|&id| id == thread::current().id()));
    }

    #[test]
    fn test_sub_region_shares_and_detaches() {
        let src = gradient(5, 5);
        let mut view = src.sub_region(Rect::new(2, 1, 10, 3));
        assert_eq!(view.rect(), Rect::from_size(3, 2));
        assert_eq!(view.stride(), src.stride());
        assert_eq!(view.at(0, 0), src.at(2, 1));

        view.set(0, 0, Color::WHITE);
        assert_eq!(view.at(0, 0), Color::WHITE);
        assert_ne!(src.at(2, 1), Color::WHITE);

        let none = src.sub_region(Rect::new(10, 10, 20, 20));
        assert!(none.is_empty());
        assert_eq!(none.layout(), Layout::Unset);
    }

    #[test]
    fn test_pad_modes() {
        let src = gradient(3, 2);

        let none = src.pad(PadMode::None, 1, 1).unwrap();
        assert_eq!(none.rect(), Rect::from_size(5, 4));
        assert_eq!(none.at(0, 0), Color::TRANSPARENT);
        assert_eq!(none.at(1, 1), src.at(0, 0));

        let ext = src.pad(PadMode::Extend, 2, 1).unwrap();
        assert_eq!(ext.at(0, 0), src.at(0, 0));
        assert_eq!(ext.at(6, 3), src.at(2, 1));
        assert_eq!(ext.at(0, 2), src.at(0, 1));

        let wrap = src.pad(PadMode::Wrap, 1, 1).unwrap();
        assert_eq!(wrap.at(0, 0), src.at(2, 1));
        assert_eq!(wrap.at(4, 3), src.at(0, 0));
        assert_eq!(wrap.at(2, 2), src.at(1, 1));
    }

    #[test]
    fn test_palette_applied_on_write() {
        let mut buf = PixelBuffer::scratch(Layout::Rgba32, 2, 1).unwrap();
        buf.set_palette(Some(Palette::indexed(vec![Color::BLACK, Color::WHITE])));
        buf.set(0, 0, Color::Rgba([250, 240, 230, 255]));
        buf.set(1, 0, Color::Rgba([5, 5, 5, 255]));
        assert_eq!(buf.at(0, 0), Color::WHITE);
        assert_eq!(buf.at(1, 0), Color::BLACK);
    }

    #[test]
    fn test_paste_and_overlay() {
        let mut dst = PixelBuffer::scratch(Layout::Rgba32, 4, 4).unwrap();
        dst.fill(Color::BLACK);
        let mut src = PixelBuffer::scratch(Layout::Rgba32, 2, 2).unwrap();
        src.fill(Color::WHITE);

        dst.paste(&src, (3, 3));
        assert_eq!(dst.at(3, 3), Color::WHITE);
        assert_eq!(dst.at(2, 2), Color::BLACK);

        let mut dst2 = PixelBuffer::scratch(Layout::Rgba32, 2, 2).unwrap();
        dst2.fill(Color::BLACK);
        dst2.overlay(&src, (0, 0), 100.0);
        assert_eq!(dst2.at(1, 1), Color::WHITE);

        let mut dst3 = PixelBuffer::scratch(Layout::Rgba32, 1, 1).unwrap();
        dst3.fill(Color::BLACK);
        dst3.overlay(&src, (0, 0), 50.0);
        let [r, _, _, a] = dst3.at(0, 0).to_rgba();
        assert_eq!(a, 255);
        assert!((125..=128).contains(&r));
    }
}
