//! Headerless raw volumes.
//!
//! Samples are little-endian and stored in `c, z, y, x` order with no
//! header. The caller supplies the layout; the file size must match it
//! exactly.

use crate::{IoError, IoResult};
use byteorder::{ByteOrder, LittleEndian};
use stackview_core::volume::sample_count;
use stackview_core::Volume;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Sample type of a raw volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleType {
    /// 8-bit unsigned, normalized by 255.
    U8,
    /// 16-bit unsigned, normalized by 65535.
    #[default]
    U16,
    /// 32-bit float, taken as stored.
    F32,
}

impl SampleType {
    /// Bytes per sample.
    pub fn size(&self) -> usize {
        match self {
            SampleType::U8 => 1,
            SampleType::U16 => 2,
            SampleType::F32 => 4,
        }
    }
}

impl FromStr for SampleType {
    type Err = IoError;

    fn from_str(s: &str) -> IoResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "u8" => Ok(SampleType::U8),
            "u16" => Ok(SampleType::U16),
            "f32" => Ok(SampleType::F32),
            _ => Err(IoError::UnsupportedBitDepth(format!(
                "{} (expected u8, u16 or f32)",
                s
            ))),
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SampleType::U8 => "u8",
            SampleType::U16 => "u16",
            SampleType::F32 => "f32",
        })
    }
}

/// Shape and sample type of a raw volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLayout {
    /// Channel count.
    pub channels: usize,
    /// Depth layers per channel.
    pub depth: usize,
    /// Rows per plane.
    pub height: u32,
    /// Columns per plane.
    pub width: u32,
    /// Sample encoding.
    pub sample: SampleType,
}

impl RawLayout {
    /// Parses `CxZxHxW`, e.g. `3x10x512x512`.
    pub fn parse(dims: &str, sample: SampleType) -> IoResult<Self> {
        let parts: Vec<&str> = dims.split(['x', 'X']).collect();
        if parts.len() != 4 {
            return Err(IoError::Parse(format!(
                "raw layout {:?}: expected CxZxHxW",
                dims
            )));
        }
        let num = |s: &str| -> IoResult<usize> {
            s.trim()
                .parse()
                .map_err(|e| IoError::Parse(format!("raw layout {:?}: {}", dims, e)))
        };
        let dim = |s: &str| -> IoResult<u32> {
            s.trim()
                .parse()
                .map_err(|e| IoError::Parse(format!("raw layout {:?}: {}", dims, e)))
        };
        let layout = Self {
            channels: num(parts[0])?,
            depth: num(parts[1])?,
            height: dim(parts[2])?,
            width: dim(parts[3])?,
            sample,
        };
        layout.byte_len()?;
        Ok(layout)
    }

    /// Total sample count.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Parse`] if the count overflows `usize`.
    pub fn samples(&self) -> IoResult<usize> {
        sample_count(self.channels, self.depth, self.height, self.width)
            .ok_or_else(|| IoError::Parse(format!("raw layout {} is too large", self)))
    }

    /// Expected byte length.
    pub fn byte_len(&self) -> IoResult<usize> {
        self.samples()?
            .checked_mul(self.sample.size())
            .ok_or_else(|| IoError::Parse(format!("raw layout {} is too large", self)))
    }
}

impl fmt::Display for RawLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}x{}x{} {}",
            self.channels, self.depth, self.height, self.width, self.sample
        )
    }
}

/// Decodes raw little-endian bytes into a volume.
pub fn decode(bytes: &[u8], layout: RawLayout) -> IoResult<Volume> {
    let expected = layout.byte_len()?;
    if bytes.len() != expected {
        return Err(IoError::DimensionMismatch {
            expected: format!("{} bytes for {}", expected, layout),
            actual: format!("{} bytes", bytes.len()),
        });
    }

    let n = layout.samples()?;
    let data: Vec<f32> = match layout.sample {
        SampleType::U8 => bytes.iter().map(|&v| v as f32 / 255.0).collect(),
        SampleType::U16 => {
            let mut buf = vec![0u16; n];
            LittleEndian::read_u16_into(bytes, &mut buf);
            buf.iter().map(|&v| v as f32 / 65535.0).collect()
        }
        SampleType::F32 => {
            let mut buf = vec![0f32; n];
            LittleEndian::read_f32_into(bytes, &mut buf);
            buf
        }
    };

    Ok(Volume::from_data(
        layout.channels,
        layout.depth,
        layout.height,
        layout.width,
        data,
    )?)
}

/// Reads a raw volume from any reader.
pub fn read_from<R: Read>(mut reader: R, layout: RawLayout) -> IoResult<Volume> {
    let mut bytes = Vec::with_capacity(layout.byte_len()?);
    reader.read_to_end(&mut bytes)?;
    decode(&bytes, layout)
}

/// Reads a raw volume file.
pub fn read<P: AsRef<Path>>(path: P, layout: RawLayout) -> IoResult<Volume> {
    let path = path.as_ref();
    trace!(path = %path.display(), layout = %layout, "raw::read");
    let file = std::fs::File::open(path)?;
    let vol = read_from(std::io::BufReader::new(file), layout)?;
    debug!(channels = vol.channels(), depth = vol.depth(), "raw volume read");
    Ok(vol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    #[test]
    fn test_parse_layout() {
        let l = RawLayout::parse("2x3x4x5", SampleType::U8).unwrap();
        assert_eq!((l.channels, l.depth, l.height, l.width), (2, 3, 4, 5));
        assert_eq!(l.byte_len().unwrap(), 120);
        assert_eq!(
            RawLayout::parse("2x3x4x5", SampleType::F32).unwrap().byte_len().unwrap(),
            480
        );
        assert!(RawLayout::parse("2x3x4", SampleType::U8).is_err());
        assert!(RawLayout::parse("2xAx4x5", SampleType::U8).is_err());
        assert_eq!("F32".parse::<SampleType>().unwrap(), SampleType::F32);
        assert!("u32".parse::<SampleType>().is_err());
    }

    #[test]
    fn test_layout_too_large() {
        let huge = format!("{}x{}x4294967295x4294967295", usize::MAX, usize::MAX);
        assert!(matches!(
            RawLayout::parse(&huge, SampleType::U8),
            Err(IoError::Parse(_))
        ));

        // sample count fits, byte length does not
        let layout = RawLayout {
            channels: usize::MAX / 2,
            depth: 1,
            height: 1,
            width: 1,
            sample: SampleType::F32,
        };
        assert_eq!(layout.samples().unwrap(), usize::MAX / 2);
        assert!(matches!(layout.byte_len(), Err(IoError::Parse(_))));
        assert!(decode(&[], layout).is_err());
    }

    #[test]
    fn test_decode_u16() {
        let layout = RawLayout::parse("2x1x1x2", SampleType::U16).unwrap();
        let mut bytes = Vec::new();
        for v in [0u16, 65535, 13107, 32768] {
            bytes.write_u16::<LittleEndian>(v).unwrap();
        }
        let vol = decode(&bytes, layout).unwrap();
        assert_eq!(vol.plane_data(0, 0).unwrap(), &[0.0, 1.0]);
        approx::assert_abs_diff_eq!(vol.plane_data(1, 0).unwrap()[0], 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_decode_f32_and_u8() {
        let layout = RawLayout::parse("1x2x1x1", SampleType::F32).unwrap();
        let mut bytes = Vec::new();
        bytes.write_f32::<LittleEndian>(0.75).unwrap();
        bytes.write_f32::<LittleEndian>(-1.0).unwrap();
        let vol = decode(&bytes, layout).unwrap();
        assert_eq!(vol.plane_data(0, 1).unwrap(), &[-1.0]);

        let layout = RawLayout::parse("1x1x1x2", SampleType::U8).unwrap();
        let vol = read_from(&[0u8, 255][..], layout).unwrap();
        assert_eq!(vol.plane_data(0, 0).unwrap(), &[0.0, 1.0]);
    }

    #[test]
    fn test_size_must_match() {
        let layout = RawLayout::parse("1x1x2x2", SampleType::U16).unwrap();
        assert!(matches!(
            decode(&[0u8; 7], layout),
            Err(IoError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vol.raw");
        std::fs::write(&path, [0u8, 51, 102, 255]).unwrap();
        let layout = RawLayout::parse("1x1x2x2", SampleType::U8).unwrap();
        let vol = read(&path, layout).unwrap();
        approx::assert_abs_diff_eq!(vol.plane_data(0, 0).unwrap()[1], 0.2, epsilon = 1e-6);
    }
}
