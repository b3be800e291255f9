//! Pipeline stages around the pure core.
//!
//! - **validate**: Pre-decode checks (existence, size, magic bytes)
//! - **decode**: Decode bytes into an RGBA raster with limits and timeout
//! - **metadata**: Read the EXIF orientation hint
//! - **encode**: Lossless PNG output
//! - **discovery**: Find image files in directories
//! - **processor**: Orchestrates decode → plan → scale → normalize → encode

pub mod decode;
pub mod discovery;
pub mod encode;
pub mod metadata;
pub mod processor;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use encode::PngEncoder;
pub use metadata::OrientationReader;
pub use processor::{fit_and_orient, ImageResizer, Oriented, ResizeOptions, ResizedImage};
pub use validate::Validator;
