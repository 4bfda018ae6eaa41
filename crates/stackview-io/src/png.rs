//! PNG format support.
//!
//! Writes 8-bit RGB rasters.

use crate::{IoError, IoResult};
use stackview_core::RgbImage;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Encodes an RGB raster as PNG into any writer.
pub fn write_to<W: Write>(writer: W, image: &RgbImage) -> IoResult<()> {
    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::default());

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    png_writer
        .write_image_data(image.data())
        .map_err(|e| IoError::EncodeError(e.to_string()))?;

    Ok(())
}

/// Writes an RGB raster to a PNG file.
pub fn write<P: AsRef<Path>>(path: P, image: &RgbImage) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    write_to(BufWriter::new(file), image)
}
