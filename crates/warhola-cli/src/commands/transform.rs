//! Geometry commands: crop, rotate, shear, flip, translate.

use anyhow::Result;
use tracing::{info, trace};
use warhola_core::Rect;
use warhola_io::Canvas;
use warhola_ops::Direction;

use crate::{CropArgs, FlipArgs, RotateArgs, ShearArgs, TranslateArgs};

pub fn run_crop(args: CropArgs, canvas: &mut Canvas, verbose: u8) -> Result<()> {
    trace!(rect = %args.rect, "crop::run");
    let v = super::parse_ints(&args.rect, 4)?;
    let rect = Rect::new(v[0], v[1], v[2], v[3]);

    info!(%rect, "Cropping");
    if verbose > 0 {
        println!("Cropping to {rect}");
    }
    canvas.crop(rect)?;
    Ok(())
}

pub fn run_rotate(args: RotateArgs, canvas: &mut Canvas, verbose: u8) -> Result<()> {
    trace!(angle = args.angle, preserve_bounds = args.preserve_bounds, pivot = ?args.pivot, "rotate::run");
    let pivot = match &args.pivot {
        Some(p) => {
            let v = super::parse_ints(p, 2)?;
            Some((v[0], v[1]))
        }
        None => None,
    };

    info!(angle = args.angle, preserve_bounds = args.preserve_bounds, ?pivot, "Rotating");
    if verbose > 0 {
        println!("Rotating {}deg", args.angle);
    }
    canvas.rotate(args.angle, args.preserve_bounds, pivot)?;
    Ok(())
}

pub fn run_shear(args: ShearArgs, canvas: &mut Canvas, verbose: u8) -> Result<()> {
    trace!(axis = %args.axis, angle = args.angle, "shear::run");
    let axis: Direction = args.axis.parse()?;

    info!(%axis, angle = args.angle, "Shearing");
    if verbose > 0 {
        println!("Shearing {axis} {}deg", args.angle);
    }
    canvas.shear(axis, args.angle)?;
    Ok(())
}

pub fn run_flip(args: FlipArgs, canvas: &mut Canvas, verbose: u8) -> Result<()> {
    trace!(axis = %args.axis, "flip::run");
    let axis: Direction = args.axis.parse()?;

    info!(%axis, "Flipping");
    if verbose > 0 {
        println!("Flipping {axis}");
    }
    canvas.flip(axis)?;
    Ok(())
}

pub fn run_translate(args: TranslateArgs, canvas: &mut Canvas, verbose: u8) -> Result<()> {
    trace!(dx = args.dx, dy = args.dy, "translate::run");

    info!(dx = args.dx, dy = args.dy, "Translating");
    if verbose > 0 {
        println!("Translating by {},{}", args.dx, args.dy);
    }
    canvas.translate(args.dx, args.dy)?;
    Ok(())
}
