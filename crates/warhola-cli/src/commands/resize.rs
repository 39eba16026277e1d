//! Resize command

use anyhow::{Result, bail};
use tracing::{info, trace};
use warhola_io::Canvas;
use warhola_ops::ResampleFilter;
use warhola_ops::resize::{fill_dimensions, fit_dimensions};

use crate::ResizeArgs;

pub fn run(args: ResizeArgs, canvas: &mut Canvas, verbose: u8) -> Result<()> {
    trace!(width = ?args.width, height = ?args.height, scale = ?args.scale, filter = %args.filter, "resize::run");
    let (src_w, src_h) = (canvas.buffer().width(), canvas.buffer().height());
    let (w, h) = target_size(&args, src_w, src_h)?;

    let filter = ResampleFilter::by_name(&args.filter);

    info!(src_w, src_h, w, h, %filter, "Resizing");
    if verbose > 0 {
        println!("Resizing {src_w}x{src_h} -> {w}x{h} ({filter})");
    }
    canvas.resize(w, h, &filter)?;
    Ok(())
}

fn target_size(args: &ResizeArgs, src_w: i32, src_h: i32) -> Result<(i32, i32)> {
    if let Some(scale) = args.scale {
        if !scale.is_finite() || scale <= 0.0 {
            bail!("Scale must be positive");
        }
        let w = ((src_w as f64 * scale).round() as i32).max(1);
        let h = ((src_h as f64 * scale).round() as i32).max(1);
        return Ok((w, h));
    }
    let (w, h) = match (args.width, args.height) {
        (Some(w), Some(h)) => (w, h),
        // Keep the aspect ratio when one side is given
        (Some(w), None) => (w, ((src_h as f64 * w as f64 / src_w.max(1) as f64).round() as i32).max(1)),
        (None, Some(h)) => (((src_w as f64 * h as f64 / src_h.max(1) as f64).round() as i32).max(1), h),
        (None, None) => bail!("Specify --width, --height or --scale"),
    };
    Ok(if args.fit {
        fit_dimensions(src_w, src_h, w, h)
    } else if args.fill {
        fill_dimensions(src_w, src_h, w, h)
    } else {
        (w, h)
    })
}
