//! Sidecar display metadata.
//!
//! Reads per-channel display settings from acquisition XML. Only the first
//! `DisplaySetting` block and its first `Channels` list are used:
//!
//! ```xml
//! <DisplaySetting>
//!   <Channels>
//!     <Channel>
//!       <Color>#FFFF0000</Color>
//!       <Low>0.05</Low>
//!       <High>0.6</High>
//!       <ShortName>DAPI</ShortName>
//!       <IsSelected>true</IsSelected>
//!     </Channel>
//!   </Channels>
//! </DisplaySetting>
//! ```
//!
//! A channel without a `Color` element is dropped. Every other missing field
//! takes its [`ChannelConfig::with_index`] default. When a field occurs more
//! than once inside a channel, the first occurrence wins.
//!
//! The number of `Channel` elements is kept alongside the entries, so a
//! sidecar written for a different acquisition is rejected by
//! [`DisplayMetadata::select`] instead of silently trimming the volume.

use crate::{IoError, IoResult};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use stackview_core::{ChannelConfig, Rgb8, Volume};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
#[allow(unused_imports)]
use tracing::{debug, trace, warn};

/// Display settings of one channel, tagged with its volume channel index.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEntry {
    /// Position of the `Channel` element, i.e. the volume channel.
    pub index: usize,
    /// Resolved settings.
    pub config: ChannelConfig,
}

/// Parsed display metadata of one acquisition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayMetadata {
    /// Number of `Channel` elements, with or without a `Color`.
    pub channels: usize,
    /// Entries of the channels that have a `Color`, in document order.
    pub entries: Vec<ChannelEntry>,
}

impl DisplayMetadata {
    /// Volume channel indices of the displayable channels.
    pub fn indices(&self) -> Vec<usize> {
        channel_indices(&self.entries)
    }

    /// Keeps only the displayable channels of `volume`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] when the metadata describes a
    /// different number of channels than `volume` holds.
    pub fn select(&self, volume: &Volume) -> IoResult<Volume> {
        if self.channels != volume.channels() {
            return Err(IoError::DimensionMismatch {
                expected: format!("{} channels (metadata)", self.channels),
                actual: format!("{} channels (volume)", volume.channels()),
            });
        }
        Ok(volume.select_channels(&self.indices())?)
    }
}

/// Volume channel indices of `entries`, in order.
pub fn channel_indices(entries: &[ChannelEntry]) -> Vec<usize> {
    entries.iter().map(|e| e.index).collect()
}

/// Default entries for `channels` channels.
pub fn default_entries(channels: usize) -> Vec<ChannelEntry> {
    (0..channels)
        .map(|index| ChannelEntry {
            index,
            config: ChannelConfig::with_index(index),
        })
        .collect()
}

/// Parses a metadata color: `#AARRGGBB` (alpha ignored) or `#RRGGBB`.
///
/// ```rust
/// use stackview_core::Rgb8;
/// use stackview_io::metadata::parse_color;
///
/// assert_eq!(parse_color("#FF00FF80").unwrap(), Rgb8::new(0, 255, 128));
/// assert_eq!(parse_color("#00FF80").unwrap(), Rgb8::new(0, 255, 128));
/// assert!(parse_color("00FF80").is_err());
/// ```
pub fn parse_color(text: &str) -> IoResult<Rgb8> {
    let text = text.trim();
    let hex = text
        .strip_prefix('#')
        .ok_or_else(|| IoError::Parse(format!("color {:?}: missing '#'", text)))?;
    let rgb = match hex.len() {
        8 => hex.get(2..).unwrap_or_default(),
        6 => hex,
        n => {
            return Err(IoError::Parse(format!(
                "color {:?}: expected 6 or 8 hex digits, got {}",
                text, n
            )));
        }
    };
    Rgb8::from_hex(rgb).map_err(|e| IoError::Parse(format!("color {:?}: {}", text, e)))
}

/// Raw field text collected for one `Channel` element.
#[derive(Debug, Default)]
struct ChannelFields {
    color: Option<String>,
    low: Option<String>,
    high: Option<String>,
    shortname: Option<String>,
    is_selected: Option<String>,
}

impl ChannelFields {
    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "Color" => Some(&mut self.color),
            "Low" => Some(&mut self.low),
            "High" => Some(&mut self.high),
            "ShortName" => Some(&mut self.shortname),
            "IsSelected" => Some(&mut self.is_selected),
            _ => None,
        }
    }

    fn record(&mut self, name: &str, text: &str) {
        if let Some(slot) = self.slot(name) {
            if slot.is_none() {
                *slot = Some(text.to_string());
            }
        }
    }

    fn into_entry(self, index: usize) -> IoResult<Option<ChannelEntry>> {
        let Some(color) = self.color else {
            debug!(channel = index, "channel has no Color, skipped");
            return Ok(None);
        };

        let mut config = ChannelConfig::with_index(index).color(parse_color(&color)?);
        if let Some(low) = self.low {
            config.low = parse_float("Low", index, &low)?;
        }
        if let Some(high) = self.high {
            config.high = parse_float("High", index, &high)?;
        }
        if let Some(name) = self.shortname {
            config.shortname = name.trim().to_string();
        }
        if let Some(sel) = self.is_selected {
            config.visible = sel.trim() != "false";
        }
        Ok(Some(ChannelEntry { index, config }))
    }
}

fn parse_float(field: &str, index: usize, text: &str) -> IoResult<f32> {
    text.trim()
        .parse()
        .map_err(|e| IoError::Parse(format!("channel {} {}: {:?}: {}", index, field, text, e)))
}

/// Reads display settings from a metadata XML file.
pub fn read_display_settings<P: AsRef<Path>>(path: P) -> IoResult<DisplayMetadata> {
    let file = File::open(path.as_ref())?;
    parse_display_settings(BufReader::new(file))
}

/// Parses display settings from XML.
///
/// Keeps one entry per `Channel` that has a `Color`, in document order.
/// A document without a `DisplaySetting` block yields no channels.
/// Entity and character references in field text are resolved.
pub fn parse_display_settings<R: BufRead>(reader: R) -> IoResult<DisplayMetadata> {
    trace!("metadata::parse_display_settings");
    // untrimmed: spaces around entity references belong to the value
    let mut xml = Reader::from_reader(reader);

    let mut buf = Vec::new();
    let mut text = String::new();
    let mut stack: Vec<String> = Vec::new();

    // stack depth of the open DisplaySetting / Channels / Channel elements
    let mut display: Option<usize> = None;
    let mut channels: Option<usize> = None;
    let mut current: Option<(usize, ChannelFields)> = None;
    let mut display_done = false;
    let mut channels_done = false;

    let mut index = 0usize;
    let mut entries = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let in_channels = channels.is_some_and(|d| d + 1 == stack.len());
                match name.as_str() {
                    "DisplaySetting" if display.is_none() && !display_done => {
                        display = Some(stack.len());
                    }
                    "Channels" if display.is_some() && channels.is_none() && !channels_done => {
                        channels = Some(stack.len());
                    }
                    "Channel" if in_channels && current.is_none() => {
                        current = Some((stack.len(), ChannelFields::default()));
                    }
                    _ => {}
                }
                stack.push(name);
                text.clear();
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if let Some((_, fields)) = current.as_mut() {
                    fields.record(&name, "");
                } else if name == "Channel" && channels.is_some_and(|d| d + 1 == stack.len()) {
                    debug!(channel = index, "empty channel element, skipped");
                    index += 1;
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                stack.pop();
                let depth = stack.len();

                let closes_channel = matches!(&current, Some((start, _)) if *start == depth);
                if closes_channel {
                    if let Some((_, fields)) = current.take() {
                        if let Some(entry) = fields.into_entry(index)? {
                            entries.push(entry);
                        }
                    }
                    index += 1;
                } else if let Some((_, fields)) = current.as_mut() {
                    fields.record(&name, &text);
                } else if channels == Some(depth) {
                    channels = None;
                    channels_done = true;
                } else if display == Some(depth) {
                    display = None;
                    display_done = true;
                }
                text.clear();
            }
            Ok(Event::Text(e)) => {
                text.push_str(&e.decode().unwrap_or_default());
            }
            Ok(Event::CData(e)) => {
                text.push_str(&e.decode().unwrap_or_default());
            }
            Ok(Event::GeneralRef(e)) => {
                let name = e.decode().unwrap_or_default().into_owned();
                match e.resolve_char_ref() {
                    Ok(Some(ch)) => text.push(ch),
                    Ok(None) => match resolve_predefined_entity(&name) {
                        Some(value) => text.push_str(value),
                        None => {
                            warn!(entity = %name, "unknown entity kept verbatim");
                            text.push('&');
                            text.push_str(&name);
                            text.push(';');
                        }
                    },
                    Err(err) => {
                        return Err(IoError::Parse(format!(
                            "bad character reference &{};: {}",
                            name, err
                        )));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(IoError::Parse(format!("XML error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    debug!(channels = index, kept = entries.len(), "display settings parsed");
    if entries.len() < index {
        warn!(
            dropped = index - entries.len(),
            "channels without a display color were dropped"
        );
    }
    Ok(DisplayMetadata {
        channels: index,
        entries,
    })
}
