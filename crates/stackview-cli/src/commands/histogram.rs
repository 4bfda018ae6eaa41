//! Histogram command.
//!
//! Prints one CSV row per bin: `bin,low,<channel>,<channel>,...`.

use crate::HistogramArgs;
use anyhow::{Result, bail};
use stackview_ops::histogram::{Histogram, HistogramIndex, BINS};
use std::io::{self, BufWriter, Write};

/// Runs the histogram command.
pub fn run(args: HistogramArgs, _verbose: bool) -> Result<()> {
    let loaded = super::load(&args.volume)?;
    let depth = loaded.volume.depth();
    if args.depth >= depth {
        bail!("depth {} out of range (volume has {} layers)", args.depth, depth);
    }

    let index = HistogramIndex::compute(&loaded.volume)?;
    let layer = index.layer(args.depth).unwrap_or_default();
    let names: Vec<&str> = loaded
        .entries
        .iter()
        .map(|e| e.config.shortname.as_str())
        .collect();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_csv(&mut out, &names, layer, args.display)?;
    out.flush()?;
    Ok(())
}

/// Writes histograms as CSV.
fn write_csv<W: Write>(
    out: &mut W,
    names: &[&str],
    layer: &[Histogram],
    display: bool,
) -> io::Result<()> {
    write!(out, "bin,low")?;
    for name in names {
        write!(out, ",{}", name.replace(',', " "))?;
    }
    writeln!(out)?;

    let heights: Vec<Vec<f32>> = layer.iter().map(|h| h.display_heights()).collect();
    for bin in 0..BINS {
        write!(out, "{},{:.6}", bin, bin as f32 / 255.0)?;
        for (c, hist) in layer.iter().enumerate() {
            if display {
                write!(out, ",{:.6}", heights[c][bin])?;
            } else {
                write!(out, ",{}", hist.bins()[bin])?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_csv() {
        let layer = vec![
            Histogram::from_slice(&[0.0, 0.0, 1.0]),
            Histogram::from_slice(&[0.5]),
        ];
        let mut buf = Vec::new();
        write_csv(&mut buf, &["DAPI", "GFP,x"], &layer, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), BINS + 1);
        assert_eq!(lines[0], "bin,low,DAPI,GFP x");
        assert_eq!(lines[1], "0,0.000000,2,0");
        assert_eq!(lines[128], "127,0.498039,0,1");
        assert_eq!(lines[256], "255,1.000000,1,0");
    }
}
