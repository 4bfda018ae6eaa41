//! TIFF format support.
//!
//! Reads multi-page grayscale stacks into a [`Volume`] and writes 8-bit RGB
//! rasters with LZW compression.
//!
//! Stack pages are ordered channel-major: page `c * depth + z` holds channel
//! `c` at depth `z`. Samples are normalized to `[0, 1]`:
//!
//! | Page type | Mapping |
//! |-----------|---------|
//! | Gray 8 | `v / 255` |
//! | Gray 16 | `v / 65535` |
//! | Gray 32f | as stored |

use crate::{IoError, IoResult};
use stackview_core::{RgbImage, Volume};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
#[allow(unused_imports)]
use tracing::{debug, trace};

fn decode_err(e: tiff::TiffError) -> IoError {
    IoError::DecodeError(e.to_string())
}

/// Reads a multi-page grayscale TIFF as a `channels`-channel volume.
///
/// # Errors
///
/// - the page count is not a multiple of `channels`
/// - pages differ in size
/// - a page is not 8/16-bit or float grayscale
pub fn read_stack<P: AsRef<Path>>(path: P, channels: usize) -> IoResult<Volume> {
    use tiff::decoder::{Decoder, DecodingResult};
    use tiff::ColorType;

    let path = path.as_ref();
    trace!(path = %path.display(), channels, "tiff::read_stack");
    if channels == 0 {
        return Err(IoError::InvalidFile("channel count must be at least 1".into()));
    }

    let file = File::open(path)?;
    let mut decoder = Decoder::new(BufReader::new(file)).map_err(decode_err)?;
    let (width, height) = decoder.dimensions().map_err(decode_err)?;

    let mut data: Vec<f32> = Vec::new();
    let mut pages = 0usize;
    loop {
        let dims = decoder.dimensions().map_err(decode_err)?;
        if dims != (width, height) {
            return Err(IoError::DimensionMismatch {
                expected: format!("{}x{}", width, height),
                actual: format!("{}x{} (page {})", dims.0, dims.1, pages),
            });
        }

        let color_type = decoder.colortype().map_err(decode_err)?;
        match (color_type, decoder.read_image().map_err(decode_err)?) {
            (ColorType::Gray(8), DecodingResult::U8(buf)) => {
                data.extend(buf.iter().map(|&v| v as f32 / 255.0));
            }
            (ColorType::Gray(16), DecodingResult::U16(buf)) => {
                data.extend(buf.iter().map(|&v| v as f32 / 65535.0));
            }
            (ColorType::Gray(32), DecodingResult::F32(buf)) => {
                data.extend_from_slice(&buf);
            }
            (ct, _) => {
                return Err(IoError::UnsupportedBitDepth(format!(
                    "page {}: {:?} (expected 8/16-bit or float grayscale)",
                    pages, ct
                )));
            }
        }
        pages += 1;

        if !decoder.more_images() {
            break;
        }
        decoder.next_image().map_err(decode_err)?;
    }

    if pages % channels != 0 {
        return Err(IoError::InvalidFile(format!(
            "{} pages cannot be split into {} channels",
            pages, channels
        )));
    }
    let depth = pages / channels;
    debug!(pages, channels, depth, width, height, "tiff stack read");

    Ok(Volume::from_data(channels, depth, height, width, data)?)
}

/// Writes an RGB raster as 8-bit LZW-compressed TIFF.
pub fn write<P: AsRef<Path>>(path: P, image: &RgbImage) -> IoResult<()> {
    use tiff::encoder::{colortype, Compression, TiffEncoder};

    let file = File::create(path.as_ref())?;
    let mut encoder = TiffEncoder::new(file)
        .map_err(|e: tiff::TiffError| IoError::EncodeError(e.to_string()))?
        .with_compression(Compression::Lzw);

    encoder
        .write_image::<colortype::RGB8>(image.width(), image.height(), image.data())
        .map_err(|e: tiff::TiffError| IoError::EncodeError(e.to_string()))?;

    Ok(())
}
