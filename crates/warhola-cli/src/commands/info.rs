//! Canvas info command.
//!
//! Prints size, layout, format and density; `--stats` adds per-channel
//! mean, minimum and maximum from the RGBA histograms.

use anyhow::Result;
use warhola_core::Unit;
use warhola_io::Canvas;
use warhola_ops::stats::{Channel, Histogram, RgbaHistogram};

use crate::InfoArgs;

/// Runs the info command.
pub fn run(args: InfoArgs, canvas: &Canvas, verbose: u8) -> Result<()> {
    let buf = canvas.buffer();
    let measure = canvas.measure();

    if let Some(path) = canvas.path() {
        println!("{}", path.display());
    }
    println!("  Resolution: {}x{}", buf.width(), buf.height());
    println!("  Layout:     {}", buf.layout());
    println!("  Format:     {}", canvas.format());
    println!("  Opaque:     {}", buf.is_opaque());
    println!("  Palette:    {}", if buf.palette().is_some() { "yes" } else { "no" });

    if verbose > 0 {
        println!("  Action:     {}", canvas.action());
        println!("  Density:    {:.2} per inch, {:.2} per cm", measure.pp(Unit::Inch), measure.pp(Unit::Centimeter));
        println!(
            "  Size:       {:.2} x {:.2} cm",
            measure.width() / measure.pp(Unit::Centimeter),
            measure.height() / measure.pp(Unit::Centimeter)
        );
    }

    if args.stats {
        let hist = RgbaHistogram::new(buf);
        for ch in [Channel::Red, Channel::Green, Channel::Blue, Channel::Alpha] {
            let (min, max, mean) = summarize(hist.get(ch));
            println!("  {ch:<6} min {min:>3}  max {max:>3}  mean {mean:>7.2}");
        }
    }

    Ok(())
}

/// Lowest and highest occupied bin and the mean value.
fn summarize(h: &Histogram) -> (usize, usize, f64) {
    let total: usize = h.bins.iter().sum();
    if total == 0 {
        return (0, 0, 0.0);
    }
    let min = h.bins.iter().position(|&c| c > 0).unwrap_or(0);
    let max = h.bins.iter().rposition(|&c| c > 0).unwrap_or(0);
    let sum: usize = h.bins.iter().enumerate().map(|(v, &c)| v * c).sum();
    (min, max, sum as f64 / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize() {
        let mut h = Histogram::new(256);
        h.bins[10] = 1;
        h.bins[20] = 3;
        assert_eq!(summarize(&h), (10, 20, 17.5));
        assert_eq!(summarize(&Histogram::new(256)), (0, 0, 0.0));
    }
}
