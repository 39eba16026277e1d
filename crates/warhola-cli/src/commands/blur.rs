//! Blur and convolve commands.

use anyhow::{Context, Result, bail};
use tracing::{debug, info, trace};
use warhola_io::Canvas;
use warhola_ops::{BlurKind, Kernel};

use crate::{BlurArgs, ConvolveArgs};

pub fn run(args: BlurArgs, canvas: &mut Canvas, verbose: u8) -> Result<()> {
    trace!(kind = %args.kind, radius = args.radius, "blur::run");
    let kind: BlurKind = args.kind.parse()?;

    info!(%kind, radius = args.radius, "Applying blur");
    if verbose > 0 {
        println!("Applying {kind} blur (radius={})", args.radius);
    }
    canvas.blur(kind, args.radius)?;
    Ok(())
}

pub fn run_convolve(args: ConvolveArgs, canvas: &mut Canvas, verbose: u8) -> Result<()> {
    trace!(kernel = ?args.kernel, values = ?args.values, "convolve::run");
    let mut kernel = match (&args.kernel, &args.values) {
        (_, Some(values)) => custom_kernel(values, args.width)?,
        (Some(name), None) => named_kernel(name)?,
        (None, None) => bail!("Either --kernel or --values is required"),
    };
    if args.normalize {
        kernel = kernel.normalized();
    }
    debug!(w = kernel.width, h = kernel.height, "kernel");

    info!(bias = args.bias, wrap = args.wrap, keep_alpha = args.keep_alpha, "Convolving");
    if verbose > 0 {
        println!("Convolving with {}x{} kernel", kernel.width, kernel.height);
    }
    canvas.convolve(&kernel, args.bias, args.wrap, args.keep_alpha)?;
    Ok(())
}

fn named_kernel(name: &str) -> Result<Kernel> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "identity" => Kernel::identity(),
        "sharpen" => Kernel::sharpen(),
        "edge" | "edgedetect" => Kernel::edge_detect(),
        "emboss" => Kernel::emboss(),
        other => bail!("Unknown kernel '{other}'. Use identity, sharpen, edge or emboss."),
    })
}

/// Builds a kernel from comma separated values; without `width` the kernel
/// must be square.
fn custom_kernel(values: &str, width: Option<usize>) -> Result<Kernel> {
    let values = values
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid kernel values '{values}'"))?;
    let width = match width {
        Some(w) => w,
        None => {
            let side = (values.len() as f64).sqrt().round() as usize;
            if side * side != values.len() {
                bail!("{} values do not form a square kernel; pass --width", values.len());
            }
            side
        }
    };
    if width == 0 || values.len() % width != 0 {
        bail!("{} values do not fill rows of width {width}", values.len());
    }
    let height = values.len() / width;
    Ok(Kernel::new(values, width, height)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_kernel() {
        let k = custom_kernel("0,0,0, 0,1,0, 0,0,0", None).unwrap();
        assert_eq!((k.width, k.height), (3, 3));
        let k = custom_kernel("1,2,1,1,2,1", Some(3)).unwrap();
        assert_eq!((k.width, k.height), (3, 2));
        assert!(custom_kernel("1,2", None).is_err());
        assert!(custom_kernel("1,2,3", Some(2)).is_err());
        assert!(custom_kernel("1,x", Some(2)).is_err());
    }

    #[test]
    fn test_named_kernel() {
        assert_eq!(named_kernel("Sharpen").unwrap(), Kernel::sharpen());
        assert!(named_kernel("blurry").is_err());
    }
}
