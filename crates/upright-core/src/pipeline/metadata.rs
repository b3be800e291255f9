//! Orientation hint extraction from EXIF metadata.

use exif::{In, Reader, Tag};
use image::ImageFormat;
use std::io::Cursor;
use std::path::Path;

use crate::error::PipelineError;
use crate::orientation::Orientation;

/// Reads the EXIF `Orientation` tag from encoded images.
pub struct OrientationReader;

impl OrientationReader {
    /// Read the orientation hint from an encoded image.
    ///
    /// Formats that never carry EXIF, files without an EXIF block, and EXIF
    /// blocks without an orientation tag all yield [`Orientation::Other`].
    /// An EXIF block that is present but unreadable is an error: it is
    /// reported, not silently treated as upright.
    pub fn read(bytes: &[u8], path: &Path) -> Result<Orientation, PipelineError> {
        let carries_exif = image::guess_format(bytes)
            .map(Self::carries_exif)
            .unwrap_or(false);
        if !carries_exif {
            return Ok(Orientation::Other);
        }

        let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => return Ok(Orientation::Other),
            Err(e) => {
                return Err(PipelineError::Metadata {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };

        let orientation = exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|f| f.value.get_uint(0))
            .map(Orientation::from_exif)
            .unwrap_or_default();
        tracing::trace!("Orientation for {:?}: {:?}", path, orientation);
        Ok(orientation)
    }

    /// Read the orientation hint from a file on disk.
    pub fn from_path(path: &Path) -> Result<Orientation, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path).map_err(|e| PipelineError::Metadata {
            path: path.to_path_buf(),
            message: format!("Cannot read file: {}", e),
        })?;
        Self::read(&bytes, path)
    }

    /// Containers kamadak-exif knows how to search.
    fn carries_exif(format: ImageFormat) -> bool {
        matches!(
            format,
            ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP | ImageFormat::Tiff
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{jpeg_with_orientation, tiff_orientation_block};

    #[test]
    fn test_read_from_tiff_block() {
        let bytes = tiff_orientation_block(6);
        let orientation = OrientationReader::read(&bytes, Path::new("block.tif")).unwrap();
        assert_eq!(orientation, Orientation::Rotate90);
    }

    #[test]
    fn test_read_from_jpeg_app1() {
        let bytes = jpeg_with_orientation(8, 6, 4);
        let orientation = OrientationReader::read(&bytes, Path::new("photo.jpg")).unwrap();
        assert_eq!(orientation, Orientation::Rotate270);
    }

    #[test]
    fn test_mirrored_value_is_other() {
        let bytes = jpeg_with_orientation(2, 6, 4);
        let orientation = OrientationReader::read(&bytes, Path::new("mirror.jpg")).unwrap();
        assert_eq!(orientation, Orientation::Other);
    }

    #[test]
    fn test_jpeg_without_exif_is_other() {
        let bytes = crate::pipeline::test_support::jpeg_bytes(6, 4);
        let orientation = OrientationReader::read(&bytes, Path::new("plain.jpg")).unwrap();
        assert_eq!(orientation, Orientation::Other);
    }

    #[test]
    fn test_non_exif_format_is_other() {
        let orientation = OrientationReader::read(b"BM\0\0\0\0", Path::new("x.bmp")).unwrap();
        assert_eq!(orientation, Orientation::Other);
    }

    #[test]
    fn test_corrupt_exif_is_error() {
        // Valid TIFF header pointing the first IFD far past the end
        let bytes = [b'I', b'I', 0x2A, 0x00, 0xFF, 0xFF, 0x00, 0x00];
        let result = OrientationReader::read(&bytes, Path::new("broken.tif"));
        assert!(matches!(result, Err(PipelineError::Metadata { .. })));
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = OrientationReader::from_path(Path::new("/nonexistent/file.jpg"));
        assert!(matches!(result, Err(PipelineError::FileNotFound(_))));
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rot180.jpg");
        std::fs::write(&path, jpeg_with_orientation(3, 4, 4)).unwrap();
        assert_eq!(
            OrientationReader::from_path(&path).unwrap(),
            Orientation::Rotate180
        );
    }
}
