//! Volume info command.
//!
//! Displays volume dimensions and the display settings each channel resolves
//! to after metadata is applied.

use crate::InfoArgs;
use anyhow::Result;
use stackview_io::ChannelEntry;
use stackview_ops::histogram::HistogramIndex;

/// Runs the info command.
pub fn run(args: InfoArgs, verbose: bool) -> Result<()> {
    let loaded = super::load(&args.volume)?;
    let vol = &loaded.volume;

    println!("{}", args.volume.input.display());
    println!("  Resolution: {}x{}", vol.width(), vol.height());
    println!("  Depth:      {}", vol.depth());
    println!("  Channels:   {}", vol.channels());
    if let Some(raw) = &args.volume.raw {
        println!("  Raw layout: {} {}", raw, args.volume.sample);
    }

    println!("  Display:");
    for entry in &loaded.entries {
        println!("    {}", describe(entry));
    }

    if verbose {
        let index = HistogramIndex::compute(vol)?;
        println!("  Saturated pixels per layer (bin 255):");
        for z in 0..index.depth() {
            let counts: Vec<String> = index
                .layer(z)
                .unwrap_or_default()
                .iter()
                .map(|h| h.bins()[255].to_string())
                .collect();
            println!("    z={:<4} {}", z, counts.join(" "));
        }
    }
    Ok(())
}

/// One-line summary of a channel's display settings.
fn describe(entry: &ChannelEntry) -> String {
    let cfg = &entry.config;
    let window = if cfg.is_threshold() {
        format!("threshold > {}", cfg.high)
    } else {
        format!("window {}..{}", cfg.low, cfg.high)
    };
    format!(
        "[{}] {:<12} #{} {}{}",
        entry.index,
        cfg.shortname,
        cfg.color,
        window,
        if cfg.visible { "" } else { " (hidden)" }
    )
}
