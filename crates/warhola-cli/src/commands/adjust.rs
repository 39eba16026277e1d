//! Adjust command (brightness, contrast, gamma, hue, saturation).

use anyhow::{Result, bail};
use tracing::{info, trace};
use warhola_io::Canvas;
use warhola_ops::Adjustment;

use crate::AdjustArgs;

pub fn run(args: AdjustArgs, canvas: &mut Canvas, verbose: u8) -> Result<()> {
    trace!(kind = %args.kind, amount = args.amount, "adjust::run");
    let kind: Adjustment = args.kind.parse()?;

    let (lo, hi) = kind.range();
    if !(lo..=hi).contains(&args.amount) || (kind == Adjustment::Gamma && args.amount <= 0.0) {
        bail!("{}", kind.instruction());
    }

    info!(%kind, amount = args.amount, "Applying adjustment");
    if verbose > 0 {
        println!("Applying {kind} {}", args.amount);
    }
    canvas.adjust(kind, args.amount)?;
    Ok(())
}
