//! Format detection from file extensions.

use std::path::Path;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// TIFF format (multi-page stacks on input).
    Tiff,
    /// Headerless raw samples.
    Raw,
    /// Unknown/unsupported format.
    Unknown,
}

impl Format {
    /// Detects format from file extension only.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("png") => Format::Png,
            Some("jpg") | Some("jpeg") => Format::Jpeg,
            Some("tif") | Some("tiff") => Format::Tiff,
            Some("raw") | Some("bin") => Format::Raw,
            _ => Format::Unknown,
        }
    }

    /// Returns `true` if rasters can be written in this format.
    pub fn can_write(&self) -> bool {
        matches!(self, Format::Png | Format::Jpeg | Format::Tiff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Format::from_extension("a.PNG"), Format::Png);
        assert_eq!(Format::from_extension("dir/b.jpeg"), Format::Jpeg);
        assert_eq!(Format::from_extension("c.tif"), Format::Tiff);
        assert_eq!(Format::from_extension("d.raw"), Format::Raw);
        assert_eq!(Format::from_extension("e.exr"), Format::Unknown);
        assert_eq!(Format::from_extension("noext"), Format::Unknown);
        assert!(!Format::Raw.can_write());
    }
}
