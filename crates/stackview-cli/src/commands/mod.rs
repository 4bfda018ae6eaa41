//! CLI command implementations

pub mod histogram;
pub mod info;
pub mod modes;
pub mod render;

use crate::VolumeArgs;
use anyhow::{Context, Result, bail};
use stackview_core::{Rgb8, Volume};
use stackview_io::metadata::{channel_indices, default_entries, parse_color};
use stackview_io::{ChannelEntry, RawLayout};
use std::path::Path;
use tracing::{debug, info};

/// Volume restricted to displayable channels, with their settings.
pub struct Loaded {
    /// Volume holding only the channels listed in `entries`.
    pub volume: Volume,
    /// One entry per volume channel, in storage order.
    pub entries: Vec<ChannelEntry>,
}

/// Loads the volume and its display metadata.
///
/// Channels the metadata drops are removed from the volume, so configs and
/// channels stay aligned.
pub fn load(args: &VolumeArgs) -> Result<Loaded> {
    let volume = load_volume(args)?;
    info!(
        channels = volume.channels(),
        depth = volume.depth(),
        width = volume.width(),
        height = volume.height(),
        "volume loaded"
    );

    let Some(meta) = &args.meta else {
        return Ok(Loaded {
            entries: default_entries(volume.channels()),
            volume,
        });
    };

    let settings = stackview_io::read_display_settings(meta)
        .with_context(|| format!("Failed to read metadata: {}", meta.display()))?;
    let volume = settings
        .select(&volume)
        .with_context(|| format!("Metadata does not match volume: {}", meta.display()))?;
    if settings.entries.is_empty() {
        bail!("{}: no channel has display settings", meta.display());
    }
    debug!(indices = ?settings.indices(), "channels kept by metadata");
    Ok(Loaded {
        volume,
        entries: settings.entries,
    })
}

/// Reads a TIFF stack or, with `--raw`, a headerless raw file.
pub fn load_volume(args: &VolumeArgs) -> Result<Volume> {
    let path = &args.input;
    match &args.raw {
        Some(dims) => {
            let layout = RawLayout::parse(dims, args.sample)?;
            stackview_io::read_raw(path, layout)
                .with_context(|| format!("Failed to load: {}", path.display()))
        }
        None => stackview_io::read_tiff_stack(path, args.channels)
            .with_context(|| format!("Failed to load: {}", path.display())),
    }
}

/// Save image to path
pub fn save_image(path: &Path, image: &stackview_core::RgbImage) -> Result<()> {
    stackview_io::write(path, image).with_context(|| format!("Failed to save: {}", path.display()))
}

/// Splits `C=VALUE` into the channel index and the value.
pub fn split_channel_arg(arg: &str) -> Result<(usize, &str)> {
    let (c, value) = arg
        .split_once('=')
        .with_context(|| format!("expected C=VALUE, got {:?}", arg))?;
    let c = c
        .trim()
        .parse()
        .with_context(|| format!("bad channel index in {:?}", arg))?;
    Ok((c, value.trim()))
}

/// Parses `LOW:HIGH`.
pub fn parse_window(value: &str) -> Result<(f32, f32)> {
    let (low, high) = value
        .split_once(':')
        .with_context(|| format!("expected LOW:HIGH, got {:?}", value))?;
    let low = low.trim().parse().with_context(|| format!("bad low bound {:?}", low))?;
    let high = high.trim().parse().with_context(|| format!("bad high bound {:?}", high))?;
    Ok((low, high))
}

/// Parses `RRGGBB`, `#RRGGBB` or `#AARRGGBB`.
pub fn parse_rgb(value: &str) -> Result<Rgb8> {
    if value.starts_with('#') {
        Ok(parse_color(value)?)
    } else {
        Ok(Rgb8::from_hex(value)?)
    }
}

/// Finds the entry for volume channel `index`.
pub fn entry_mut(entries: &mut [ChannelEntry], index: usize) -> Result<&mut ChannelEntry> {
    let known: Vec<usize> = channel_indices(entries);
    entries
        .iter_mut()
        .find(|e| e.index == index)
        .with_context(|| format!("no displayable channel {} (channels: {:?})", index, known))
}
