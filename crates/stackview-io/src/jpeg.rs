//! JPEG format support.
//!
//! Writes 8-bit RGB rasters, quality 90 unless told otherwise.

use crate::{IoError, IoResult};
use stackview_core::RgbImage;
use std::path::Path;

/// Default encoder quality.
pub const DEFAULT_QUALITY: u8 = 90;

/// Encodes an RGB raster to JPEG bytes.
pub fn encode(image: &RgbImage, quality: u8) -> IoResult<Vec<u8>> {
    use jpeg_encoder::{ColorType, Encoder};

    let too_big = |v: u32| v > u16::MAX as u32;
    if too_big(image.width()) || too_big(image.height()) {
        return Err(IoError::EncodeError(format!(
            "{}x{} exceeds the JPEG size limit of {}",
            image.width(),
            image.height(),
            u16::MAX
        )));
    }

    let mut buffer = Vec::new();
    let encoder = Encoder::new(&mut buffer, quality.clamp(1, 100));
    encoder
        .encode(
            image.data(),
            image.width() as u16,
            image.height() as u16,
            ColorType::Rgb,
        )
        .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;

    Ok(buffer)
}

/// Writes an RGB raster to a JPEG file with the given quality.
pub fn write_with_quality<P: AsRef<Path>>(path: P, image: &RgbImage, quality: u8) -> IoResult<()> {
    let data = encode(image, quality)?;
    std::fs::write(path.as_ref(), data)?;
    Ok(())
}

/// Writes an RGB raster to a JPEG file at [`DEFAULT_QUALITY`].
pub fn write<P: AsRef<Path>>(path: P, image: &RgbImage) -> IoResult<()> {
    write_with_quality(path, image, DEFAULT_QUALITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_has_jpeg_markers() {
        let image = RgbImage::from_data(8, 8, vec![200; 8 * 8 * 3]).unwrap();
        let bytes = encode(&image, DEFAULT_QUALITY).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        write(&path, &RgbImage::new(16, 4)).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
