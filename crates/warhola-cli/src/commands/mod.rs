//! CLI command implementations

pub mod adjust;
pub mod blend;
pub mod blur;
pub mod channels;
pub mod info;
pub mod resize;
pub mod transform;

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};
use warhola_core::{Layout, PixelBuffer, Unit};
use warhola_io::{Canvas, CanvasBuilder, Codec, Format, StandardCodec};

use crate::CanvasArgs;

/// Builds the canvas for `input` from the shared canvas flags.
pub fn open_canvas(input: &Path, args: &CanvasArgs) -> Result<Canvas> {
    let mut builder = CanvasBuilder::new()
        .path(input)
        .unit(Unit::from_name(&args.unit))
        .debug(args.debug)
        .codec(StandardCodec::with_jpeg_quality(args.quality));

    if let Some(layout) = &args.layout {
        let layout: Layout = layout.parse()?;
        builder = builder.layout(layout);
    }
    if let Some(format) = &args.format {
        let format: Format = format.parse()?;
        builder = builder.format(format);
    }
    if let Some(size) = &args.size {
        let (w, h) = parse_size(size)?;
        builder = builder.size(w, h);
    }
    if let Some(pp) = args.pp {
        builder = builder.pp(pp);
    }

    let (mut canvas, notes) = builder
        .build()
        .with_context(|| format!("Failed to open canvas: {}", input.display()))?;
    for line in notes.to_string().lines() {
        debug!("{line}");
    }
    info!(action = %canvas.action(), layout = %canvas.buffer().layout(), "canvas ready");

    if let Some(output) = &args.output {
        canvas.set_path(output);
    }
    Ok(canvas)
}

/// Saves the canvas to its path.
pub fn save_canvas(canvas: &Canvas, verbose: u8) -> Result<()> {
    canvas.save().context("Failed to save canvas")?;
    if verbose > 0 {
        if let Some(path) = canvas.path() {
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}

/// Loads a second image for blend and paste.
pub fn load_buffer(path: &Path) -> Result<PixelBuffer> {
    let (buf, format) = StandardCodec::default()
        .read(path)
        .with_context(|| format!("Failed to load: {}", path.display()))?;
    debug!(path = %path.display(), %format, "loaded");
    Ok(buf)
}

/// Parses `WIDTHxHEIGHT`.
pub fn parse_size(s: &str) -> Result<(i32, i32)> {
    let Some((w, h)) = s.split_once(['x', 'X']) else {
        bail!("Invalid size '{s}', expected WIDTHxHEIGHT");
    };
    let w = w.trim().parse().with_context(|| format!("Invalid width in '{s}'"))?;
    let h = h.trim().parse().with_context(|| format!("Invalid height in '{s}'"))?;
    Ok((w, h))
}

/// Parses a comma separated list of `n` integers.
pub fn parse_ints(s: &str, n: usize) -> Result<Vec<i32>> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid integer list '{s}'"))?;
    if values.len() != n {
        bail!("Expected {n} comma separated values, got {}", values.len());
    }
    Ok(values)
}
