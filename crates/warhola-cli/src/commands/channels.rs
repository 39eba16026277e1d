//! Channel extraction, threshold and histogram commands.

use anyhow::Result;
use tracing::{info, trace};
use warhola_io::Canvas;
use warhola_ops::stats::{self, Channel, RgbaHistogram};

use crate::{ChannelArgs, HistogramArgs, ThresholdArgs};

pub fn run_channel(args: ChannelArgs, canvas: &mut Canvas, verbose: u8) -> Result<()> {
    trace!(channel = %args.channel, "channel::run");
    let ch: Channel = args.channel.parse()?;

    info!(%ch, "Extracting channel");
    if verbose > 0 {
        println!("Extracting {ch}");
    }
    let gray = stats::channel(canvas.executor(), canvas.buffer(), ch)?;
    canvas.set_buffer(gray);
    Ok(())
}

pub fn run_threshold(args: ThresholdArgs, canvas: &mut Canvas, verbose: u8) -> Result<()> {
    trace!(level = args.level, "threshold::run");

    info!(level = args.level, "Thresholding");
    if verbose > 0 {
        println!("Threshold at {}", args.level);
    }
    let mask = stats::threshold(canvas.executor(), canvas.buffer(), args.level)?;
    canvas.set_buffer(mask);
    Ok(())
}

pub fn run_histogram(args: HistogramArgs, canvas: &mut Canvas, verbose: u8) -> Result<()> {
    trace!(channel = %args.channel, cumulative = args.cumulative, "histogram::run");
    let ch: Channel = args.channel.parse()?;

    let mut hist = RgbaHistogram::new(canvas.buffer());
    if args.cumulative {
        hist = hist.cumulative();
    }
    let h = hist.get(ch);
    info!(%ch, max = h.max(), min = h.min(), "Charting histogram");
    if verbose > 0 {
        println!("Histogram of {ch}: peak {}", h.max());
    }
    canvas.set_buffer(h.image()?);
    Ok(())
}
