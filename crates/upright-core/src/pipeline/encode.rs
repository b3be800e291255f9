//! Lossless PNG output.
//!
//! Output is always PNG, whatever the input format was, so the alpha channel
//! and every pixel of the normalized raster survive unchanged.

use image::codecs::png::PngEncoder as ImagePngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::path::Path;

use crate::error::PipelineError;
use crate::raster::RawImage;

/// Encodes rasters to PNG.
pub struct PngEncoder;

impl PngEncoder {
    /// Encode `image` as an RGBA8 PNG.
    ///
    /// `path` only labels errors.
    pub fn encode(image: &RawImage, path: &Path) -> Result<Vec<u8>, PipelineError> {
        let (width, height) = image.dimensions();
        let mut buffer = Vec::new();
        ImagePngEncoder::new(&mut buffer)
            .write_image(image.pixels().as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(|e| PipelineError::Encode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(buffer)
    }
}
