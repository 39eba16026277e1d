//! Blend and paste commands.

use anyhow::Result;
use tracing::{info, trace};
use warhola_io::Canvas;
use warhola_ops::{BlendMode, BlendPosition};

use crate::{BlendArgs, PasteArgs};

pub fn run(args: BlendArgs, canvas: &mut Canvas, verbose: u8) -> Result<()> {
    trace!(other = %args.other.display(), mode = %args.mode, position = %args.position, "blend::run");
    let mode: BlendMode = args.mode.parse()?;
    let position: BlendPosition = args.position.parse()?;
    let other = super::load_buffer(&args.other)?;

    info!(%mode, %position, w = other.width(), h = other.height(), "Blending");
    if verbose > 0 {
        println!("Blending {} as {position} ({mode})", args.other.display());
    }
    canvas.blend(&other, position, mode, args.opacity)?;
    Ok(())
}

pub fn run_paste(args: PasteArgs, canvas: &mut Canvas, verbose: u8) -> Result<()> {
    trace!(other = %args.other.display(), x = args.x, y = args.y, "paste::run");
    let other = super::load_buffer(&args.other)?;

    match args.opacity {
        Some(opacity) => {
            info!(x = args.x, y = args.y, opacity, "Overlaying");
            if verbose > 0 {
                println!("Overlaying {} at {},{} ({opacity}%)", args.other.display(), args.x, args.y);
            }
            canvas.overlay(&other, (args.x, args.y), opacity);
        }
        None => {
            info!(x = args.x, y = args.y, "Pasting");
            if verbose > 0 {
                println!("Pasting {} at {},{}", args.other.display(), args.x, args.y);
            }
            canvas.paste(&other, (args.x, args.y));
        }
    }
    Ok(())
}
