//! Data types describing the outcome of a resize-and-rotate run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::orientation::Orientation;

/// Summary of one processed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeReport {
    // === Input ===
    /// Path (or label) of the source image
    pub source: PathBuf,

    /// Detected input format ("jpeg", "png", ...)
    pub format: String,

    /// Decoded width in pixels
    pub original_width: u32,

    /// Decoded height in pixels
    pub original_height: u32,

    /// Orientation hint read from the source
    pub orientation: Orientation,

    // === Plan ===
    /// Planned width before truncation
    pub planned_width: f64,

    /// Planned height before truncation
    pub planned_height: f64,

    // === Output ===
    /// Final width in pixels (after rotation)
    pub width: u32,

    /// Final height in pixels (after rotation)
    pub height: u32,

    /// Whether the raster was resampled
    pub scaled: bool,

    /// Whether the raster was rotated
    pub rotated: bool,

    /// Size of the encoded PNG in bytes
    pub output_size: u64,

    /// Where the PNG was written, when it was written to disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}
