//! Upright Core - fit images inside bounds and turn them upright.
//!
//! The heart of the crate is two pure functions:
//!
//! - [`plan::plan_dimensions`] computes an aspect-preserving target size for
//!   optional max width/height bounds.
//! - [`orientation::normalize`] rotates a raster by 0/90/180/270 degrees
//!   according to its EXIF orientation hint.
//!
//! The [`pipeline`] module wraps them with decoding, orientation reading and
//! lossless PNG encoding:
//!
//! ```text
//! Bytes → Validate → Read Orientation → Decode → Plan → Scale → Rotate → PNG
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use upright_core::{Config, Constraint, ImageResizer, ResizeOptions};
//!
//! #[tokio::main]
//! async fn main() -> upright_core::Result<()> {
//!     let resizer = ImageResizer::new(&Config::load()?);
//!     let options = ResizeOptions::new(Constraint::new(Some(1024.0), None));
//!
//!     let result = resizer.process_file("./photo.jpg".as_ref(), &options).await?;
//!     std::fs::write("photo.png", &result.png)?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod orientation;
pub mod output;
pub mod pipeline;
pub mod plan;
pub mod raster;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, Result, UprightError};
pub use orientation::{normalize, Orientation};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{
    fit_and_orient, DiscoveredFile, FileDiscovery, ImageResizer, ResizeOptions, ResizedImage,
};
pub use plan::{plan, plan_dimensions, Constraint, Size};
pub use raster::{QuarterTurn, RawImage, ScaleFilter};
pub use types::ResizeReport;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
