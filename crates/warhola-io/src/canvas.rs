//! File-backed canvas.
//!
//! A [`Canvas`] pairs a [`PixelBuffer`] with the path and format it was
//! loaded from (or will be written to). Construction goes through
//! [`CanvasBuilder`], which decides one of three actions:
//!
//! - no path: [`Action::Noop`], a 1x1 buffer that is never saved
//! - a path that does not exist: [`Action::New`], a zero-filled buffer of the
//!   configured size, written to disk immediately
//! - an existing path: [`Action::Open`], decoded and converted to the
//!   configured layout
//!
//! The notes collected while building come back as [`Diagnostics`].
//!
//! # Example
//!
//! ```rust,no_run
//! use warhola_core::Layout;
//! use warhola_io::{Action, CanvasBuilder};
//! use warhola_ops::{Adjustment, Direction};
//!
//! let (mut canvas, notes) = CanvasBuilder::new()
//!     .path("photo.png")
//!     .layout(Layout::Rgba32)
//!     .size(640, 480)
//!     .build()
//!     .unwrap();
//! println!("{notes}");
//!
//! canvas.adjust(Adjustment::Brightness, 0.2).unwrap();
//! canvas.flip(Direction::Horizontal).unwrap();
//! canvas.save().unwrap();
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};
use warhola_core::{DEFAULT_PP, Layout, Measure, PixelBuffer, Rect, Unit};
use warhola_ops::{
    Adjustment, BlendMode, BlendPosition, BlurKind, Direction, Executor, Kernel, ResampleFilter, adjust, blend,
    convolve, resize, transform,
};

use crate::{Codec, Format, IoError, IoResult, StandardCodec};

/// What [`CanvasBuilder::build`] did to produce the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// No path; placeholder buffer, never saved.
    Noop,
    /// Fresh buffer written to a new file.
    New,
    /// Buffer decoded from an existing file.
    Open,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Noop => "noop",
            Action::New => "new",
            Action::Open => "open",
        })
    }
}

/// Expected and actual settings recorded while building a canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    expected: Vec<String>,
    actual: Vec<String>,
}

impl Diagnostics {
    fn expect(&mut self, note: String) {
        self.expected.push(note);
    }

    fn record(&mut self, note: String) {
        self.actual.push(note);
    }

    /// Settings as requested.
    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// Settings as produced.
    pub fn actual(&self) -> &[String] {
        &self.actual
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for note in &self.expected {
            writeln!(f, "canvas expected {note}")?;
        }
        for note in &self.actual {
            writeln!(f, "canvas actual {note}")?;
        }
        Ok(())
    }
}

/// Builder for [`Canvas`].
#[derive(Clone)]
pub struct CanvasBuilder {
    layout: Option<Layout>,
    path: Option<PathBuf>,
    format: Option<Format>,
    width: i32,
    height: i32,
    pp: f64,
    unit: Unit,
    debug: bool,
    exec: Option<Executor>,
    codec: Arc<dyn Codec>,
}

impl Default for CanvasBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasBuilder {
    /// Creates a builder with no path, RGBA32 for new images and the default
    /// density.
    pub fn new() -> Self {
        Self {
            layout: None,
            path: None,
            format: None,
            width: 0,
            height: 0,
            pp: DEFAULT_PP,
            unit: Unit::Centimeter,
            debug: false,
            exec: None,
            codec: Arc::new(StandardCodec::default()),
        }
    }

    /// Sets the working layout. Opened images are converted to it.
    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Sets the backing file.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the file format for new images. Opened images keep theirs.
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the size of a new image.
    pub fn size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the density in points per `unit`.
    pub fn pp(mut self, pp: f64) -> Self {
        self.pp = pp;
        self
    }

    /// Sets the unit [`pp`](Self::pp) is expressed in.
    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Saves to `<path>-debug` instead of `path` and logs the diagnostics.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Executor used by the canvas operators.
    pub fn executor(mut self, exec: Executor) -> Self {
        self.exec = Some(exec);
        self
    }

    /// Codec used to read and write the backing file.
    pub fn codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    fn validate(&self) -> IoResult<()> {
        if self.layout == Some(Layout::Unset) {
            return Err(IoError::InvalidCanvas(format!("layout is {}", Layout::Unset)));
        }
        if self.width < 0 || self.height < 0 {
            return Err(IoError::InvalidCanvas(format!(
                "negative size {}x{}",
                self.width, self.height
            )));
        }
        if !self.pp.is_finite() || self.pp <= 0.0 {
            return Err(IoError::InvalidCanvas(format!("points per {} must be positive", self.unit)));
        }
        Ok(())
    }

    /// Validates the settings, performs the action and returns the canvas.
    pub fn build(self) -> IoResult<(Canvas, Diagnostics)> {
        self.validate()?;
        let mut notes = Diagnostics::default();
        let layout = self.layout.unwrap_or(Layout::Rgba32);
        let rect = Rect::from_size(self.width, self.height);

        notes.expect(format!("debug is {}", self.debug));
        notes.expect(format!("layout is {layout}"));
        if let Some(path) = &self.path {
            notes.expect(format!("path is {}", path.display()));
        }
        if let Some(format) = self.format {
            notes.expect(format!("format is {format}"));
        }
        notes.expect(format!("rectangle is {rect}"));

        let mut measure = Measure::new(rect);
        measure.set_pp(self.unit, self.pp);
        notes.expect(format!("measure imperial: {} points per inch", measure.pp(Unit::Inch)));
        notes.expect(format!("measure metric: {} points per cm", measure.pp(Unit::Centimeter)));

        let action = match &self.path {
            None => Action::Noop,
            Some(path) if path.exists() => Action::Open,
            Some(_) => Action::New,
        };
        notes.expect(format!("action is {action}"));
        debug!(%action, path = ?self.path, "canvas build");

        let (mut buf, format) = match (&self.path, action) {
            (Some(path), Action::Open) => {
                let (decoded, format) = self.codec.read(path)?;
                let buf = match self.layout {
                    Some(l) if l != decoded.layout() => decoded.clone_to(l),
                    _ => decoded,
                };
                info!(path = %path.display(), %format, "image exists");
                (buf, format)
            }
            (Some(path), Action::New) => {
                if rect.is_empty() {
                    return Err(IoError::InvalidCanvas(format!("rectangle {rect} is empty")));
                }
                let format = self
                    .format
                    .or_else(|| Format::from_extension(path))
                    .ok_or_else(|| IoError::InvalidCanvas(format!("no format for {}", path.display())))?;
                let buf = PixelBuffer::scratch(layout, self.width, self.height)?;
                self.codec.write(path, &buf, format)?;
                info!(path = %path.display(), %format, "image is new");
                (buf, format)
            }
            _ => {
                info!("image is noop");
                (PixelBuffer::scratch(layout, 1, 1)?, self.format.unwrap_or_default())
            }
        };
        buf.measure_mut().set_pp(self.unit, self.pp);

        let mut path = self.path;
        if self.debug {
            path = path.map(|p| {
                let mut s = p.into_os_string();
                s.push("-debug");
                PathBuf::from(s)
            });
            info!(path = ?path, "debug path");
        }

        notes.record(format!("layout is {}", buf.layout()));
        if let Some(path) = &path {
            notes.record(format!("path is {}", path.display()));
        }
        notes.record(format!("format is {format}"));
        notes.record(format!("rectangle is {}", buf.rect()));
        notes.record(format!("action is {action}"));
        if self.debug {
            for line in notes.to_string().lines() {
                info!("{line}");
            }
        }

        let canvas = Canvas {
            buf,
            path,
            format,
            action,
            exec: self.exec.unwrap_or_default(),
            codec: self.codec,
        };
        Ok((canvas, notes))
    }
}

/// A pixel buffer bound to a file.
///
/// Operator methods replace the buffer with the operator's result.
#[derive(Clone)]
pub struct Canvas {
    buf: PixelBuffer,
    path: Option<PathBuf>,
    format: Format,
    action: Action,
    exec: Executor,
    codec: Arc<dyn Codec>,
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("layout", &self.buf.layout())
            .field("rect", &self.buf.rect())
            .field("path", &self.path)
            .field("format", &self.format)
            .field("action", &self.action)
            .finish()
    }
}

impl Canvas {
    /// Action taken when the canvas was built.
    pub fn action(&self) -> Action {
        self.action
    }

    /// `true` if there is no useful image to work with.
    pub fn is_noop(&self) -> bool {
        self.action == Action::Noop
    }

    /// Path the canvas saves to.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Changes the save path. A recognised extension also changes the format.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if let Some(format) = Format::from_extension(&path) {
            self.format = format;
        }
        self.path = Some(path);
    }

    /// File format used by [`save`](Self::save).
    pub fn format(&self) -> Format {
        self.format
    }

    /// Overrides the file format.
    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    /// Current buffer.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buf
    }

    /// Replaces the buffer.
    pub fn set_buffer(&mut self, buf: PixelBuffer) {
        self.buf = buf;
    }

    /// Consumes the canvas, returning its buffer.
    pub fn into_buffer(self) -> PixelBuffer {
        self.buf
    }

    /// Measurement settings of the current buffer.
    pub fn measure(&self) -> &Measure {
        self.buf.measure()
    }

    /// Executor used by the operator methods.
    pub fn executor(&self) -> &Executor {
        &self.exec
    }

    /// Writes the buffer to the canvas path. Does nothing for a noop canvas.
    pub fn save(&self) -> IoResult<()> {
        match (&self.path, self.action) {
            (_, Action::Noop) => {
                debug!("noop canvas, nothing saved");
                Ok(())
            }
            (Some(path), _) => {
                info!(path = %path.display(), format = %self.format, "save");
                self.codec.write(path, &self.buf, self.format)
            }
            (None, _) => Err(IoError::InvalidCanvas("no path to save to".into())),
        }
    }

    /// See [`adjust::adjust`].
    pub fn adjust(&mut self, kind: Adjustment, amount: f64) -> IoResult<()> {
        self.buf = adjust::adjust(&self.exec, &self.buf, kind, amount)?;
        Ok(())
    }

    /// See [`blend::blend`].
    pub fn blend(&mut self, other: &PixelBuffer, position: BlendPosition, mode: BlendMode, option: f64) -> IoResult<()> {
        self.buf = blend::blend(&self.exec, &self.buf, other, position, mode, option)?;
        Ok(())
    }

    /// See [`convolve::convolve`].
    pub fn convolve(&mut self, kernel: &Kernel, bias: f64, wrap: bool, keep_alpha: bool) -> IoResult<()> {
        self.buf = convolve::convolve(&self.exec, &self.buf, kernel, bias, wrap, keep_alpha)?;
        Ok(())
    }

    /// See [`convolve::blur`].
    pub fn blur(&mut self, kind: BlurKind, radius: f64) -> IoResult<()> {
        self.buf = convolve::blur(&self.exec, &self.buf, kind, radius)?;
        Ok(())
    }

    /// See [`resize::resize`].
    pub fn resize(&mut self, width: i32, height: i32, filter: &ResampleFilter) -> IoResult<()> {
        self.buf = resize::resize(&self.exec, &self.buf, width, height, filter)?;
        Ok(())
    }

    /// See [`transform::crop`]. On error the buffer is left as it was.
    pub fn crop(&mut self, rect: Rect) -> IoResult<()> {
        self.buf = transform::crop(&self.buf, rect)?;
        Ok(())
    }

    /// See [`transform::rotate`].
    pub fn rotate(&mut self, angle: f64, preserve_bounds: bool, pivot: Option<(i32, i32)>) -> IoResult<()> {
        self.buf = transform::rotate(&self.exec, &self.buf, angle, preserve_bounds, pivot)?;
        Ok(())
    }

    /// See [`transform::shear`].
    pub fn shear(&mut self, axis: Direction, angle: f64) -> IoResult<()> {
        self.buf = transform::shear(&self.exec, &self.buf, axis, angle)?;
        Ok(())
    }

    /// See [`transform::flip`].
    pub fn flip(&mut self, axis: Direction) -> IoResult<()> {
        self.buf = transform::flip(&self.exec, &self.buf, axis)?;
        Ok(())
    }

    /// See [`transform::translate`].
    pub fn translate(&mut self, dx: i32, dy: i32) -> IoResult<()> {
        self.buf = transform::translate(&self.exec, &self.buf, dx, dy)?;
        Ok(())
    }

    /// Copies `src` onto the canvas with its origin at `at`.
    pub fn paste(&mut self, src: &PixelBuffer, at: (i32, i32)) {
        self.buf.paste(src, at);
    }

    /// Composites `src` onto the canvas at `at` with `opacity` percent.
    pub fn overlay(&mut self, src: &PixelBuffer, at: (i32, i32), opacity: f64) {
        self.buf.overlay(src, at, opacity);
    }
}
