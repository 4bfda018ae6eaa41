//! Render command.
//!
//! Resolves display settings in order of precedence, lowest first:
//! defaults, sidecar metadata, YAML settings file, command-line flags.
//! Then renders one snapshot and writes it.

use super::{entry_mut, parse_rgb, parse_window, split_channel_arg};
use crate::RenderArgs;
use anyhow::{Context, Result, bail};
use stackview_io::{ChannelEntry, DisplaySettings, Format};
use stackview_ops::{BlendMode, DisplaySnapshot, LayerSelection, MergeRange, Session};
use tracing::{debug, info};

/// Runs the render command.
pub fn run(args: RenderArgs, verbose: bool) -> Result<()> {
    if !Format::from_extension(&args.output).can_write() {
        bail!(
            "unsupported output format: {} (use png, tif/tiff or jpg/jpeg)",
            args.output.display()
        );
    }

    let loaded = super::load(&args.volume)?;
    let mut entries = loaded.entries;

    let settings = match &args.settings {
        Some(path) => DisplaySettings::read(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?,
        None => DisplaySettings::default(),
    };
    settings.apply_to(&mut entries)?;
    apply_flags(&args, &mut entries)?;

    let selection = resolve_selection(&args, &settings)?;
    debug!(?selection, "layer selection");

    let session = Session::new(loaded.volume)?;
    let snapshot = DisplaySnapshot {
        channels: entries.into_iter().map(|e| e.config).collect(),
        selection,
    };
    let image = session.render(&snapshot)?;

    super::save_image(&args.output, &image)?;
    info!(output = %args.output.display(), "image written");
    if verbose {
        println!(
            "{} ({}x{})",
            args.output.display(),
            image.width(),
            image.height()
        );
    }
    Ok(())
}

/// Applies `--window`, `--color`, `--hide` and `--show`.
fn apply_flags(args: &RenderArgs, entries: &mut [ChannelEntry]) -> Result<()> {
    for arg in &args.window {
        let (c, value) = split_channel_arg(arg)?;
        let (low, high) = parse_window(value)?;
        let cfg = &mut entry_mut(entries, c)?.config;
        cfg.low = low;
        cfg.high = high;
    }
    for arg in &args.color {
        let (c, value) = split_channel_arg(arg)?;
        entry_mut(entries, c)?.config.color = parse_rgb(value)?;
    }
    for &c in &args.hide {
        entry_mut(entries, c)?.config.visible = false;
    }
    for &c in &args.show {
        entry_mut(entries, c)?.config.visible = true;
    }
    Ok(())
}

/// Picks depth or merge from flags, then the settings file.
///
/// An explicit `--depth` turns off a merge named in the settings file.
fn resolve_selection(args: &RenderArgs, settings: &DisplaySettings) -> Result<LayerSelection> {
    let mode_name = args
        .mode
        .as_deref()
        .or(settings.mode.as_deref())
        .unwrap_or(BlendMode::default().name());

    let settings_merge = settings.merge.map(|[s, e]| MergeRange::new(s, e));
    let range = match (args.merge, args.depth) {
        (Some(range), _) => Some(range),
        (None, Some(_)) => None,
        (None, None) => settings_merge,
    };
    let depth = args.depth.or(settings.depth).unwrap_or(0);

    Ok(LayerSelection::resolve(
        range.is_some(),
        depth,
        range.unwrap_or(MergeRange::single(depth)),
        mode_name,
    )?)
}
