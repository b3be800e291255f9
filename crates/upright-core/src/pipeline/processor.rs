//! Pipeline orchestration - wires the planner and normalizer between decode and encode.

use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::{Config, LimitsConfig};
use crate::error::{PipelineError, Result};
use crate::orientation::{normalize, Orientation};
use crate::plan::{plan, Constraint, Size};
use crate::raster::{RawImage, ScaleFilter};
use crate::types::ResizeReport;

use super::decode::{format_to_string, ImageDecoder};
use super::encode::PngEncoder;
use super::metadata::OrientationReader;
use super::validate::Validator;

/// Per-call bounds and scale filter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResizeOptions {
    pub constraint: Constraint,
    pub scale_filter: ScaleFilter,
}

impl ResizeOptions {
    pub fn new(constraint: Constraint) -> Self {
        Self {
            constraint,
            scale_filter: ScaleFilter::default(),
        }
    }

    pub fn with_filter(mut self, scale_filter: ScaleFilter) -> Self {
        self.scale_filter = scale_filter;
        self
    }
}

/// Encoded output plus its report.
#[derive(Debug, Clone)]
pub struct ResizedImage {
    /// PNG bytes
    pub png: Vec<u8>,
    pub report: ResizeReport,
}

/// Result of [`fit_and_orient`].
#[derive(Debug, Clone)]
pub struct Oriented {
    pub image: RawImage,
    /// Real-valued plan, before truncation
    pub planned: Size,
    pub scaled: bool,
}

/// Scale `image` into `constraint`, then rotate it upright.
///
/// Pure and synchronous. Scaling is skipped entirely when the constraint has
/// no bounds. Every intermediate raster is consumed by the next stage.
pub fn fit_and_orient(
    image: RawImage,
    orientation: Orientation,
    constraint: Constraint,
    filter: ScaleFilter,
) -> Oriented {
    let original = image.size();
    let planned = plan(original, constraint);

    let (image, scaled) = if constraint.is_unbounded() {
        (image, false)
    } else {
        let before = image.dimensions();
        let image = image.scale(planned, filter);
        let scaled = image.dimensions() != before;
        (image, scaled)
    };

    Oriented {
        image: normalize(image, orientation),
        planned,
        scaled,
    }
}

/// Runs validate → read orientation → decode → plan/scale/rotate → encode.
pub struct ImageResizer {
    decoder: ImageDecoder,
    validator: Validator,
    limits: LimitsConfig,
    defaults: ResizeOptions,
}

impl ImageResizer {
    /// Create a new resizer with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            validator: Validator::new(config.limits.clone()),
            limits: config.limits.clone(),
            defaults: ResizeOptions {
                constraint: config.resize.constraint(),
                scale_filter: config.resize.scale_filter,
            },
        }
    }

    /// Options taken from the `[resize]` config section.
    pub fn default_options(&self) -> ResizeOptions {
        self.defaults
    }

    /// Process a file on disk.
    pub async fn process_file(&self, path: &Path, options: &ResizeOptions) -> Result<ResizedImage> {
        self.validator.validate(path)?;
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(bytes, path, options).await
    }

    /// Process an encoded image held in memory.
    ///
    /// `path` labels the report and any error.
    pub async fn process_bytes(
        &self,
        bytes: Vec<u8>,
        path: &Path,
        options: &ResizeOptions,
    ) -> Result<ResizedImage> {
        let start = std::time::Instant::now();
        tracing::debug!("Processing: {:?}", path);

        if let Some((axis, value)) = options.constraint.invalid_bound() {
            return Err(PipelineError::InvalidConstraint { axis, value }.into());
        }
        self.validator.validate_bytes(&bytes, path)?;

        // Orientation is read before decode takes ownership of the buffer
        let orientation = OrientationReader::read(&bytes, path)?;
        tracing::trace!("  Orientation: {:?}", orientation);

        let decode_start = std::time::Instant::now();
        let decoded = self.decoder.decode_from_bytes(bytes, path).await?;
        tracing::trace!("  Decode: {:?}", decode_start.elapsed());

        let (original_width, original_height) = (decoded.width, decoded.height);
        let format = format_to_string(decoded.format);
        let image = decoded.image;

        let transform_start = std::time::Instant::now();
        let options = *options;
        let path_owned = path.to_path_buf();
        let transform = timeout(
            Duration::from_millis(self.limits.transform_timeout_ms),
            tokio::task::spawn_blocking(move || {
                let oriented =
                    fit_and_orient(image, orientation, options.constraint, options.scale_filter);
                let png = PngEncoder::encode(&oriented.image, &path_owned)?;
                Ok::<_, PipelineError>((oriented, png))
            }),
        )
        .await;

        let (oriented, png) = match transform {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => {
                return Err(PipelineError::Encode {
                    path: path.to_path_buf(),
                    message: format!("Task join error: {}", e),
                }
                .into())
            }
            Err(_) => {
                return Err(PipelineError::Timeout {
                    path: path.to_path_buf(),
                    stage: "transform".to_string(),
                    timeout_ms: self.limits.transform_timeout_ms,
                }
                .into())
            }
        };
        tracing::trace!("  Transform + encode: {:?}", transform_start.elapsed());

        let (width, height) = oriented.image.dimensions();
        tracing::debug!(
            "Processed {:?} in {:?} ({}x{} -> {}x{}, {:?})",
            path,
            start.elapsed(),
            original_width,
            original_height,
            width,
            height,
            orientation
        );

        let report = ResizeReport {
            source: path.to_path_buf(),
            format,
            original_width,
            original_height,
            orientation,
            planned_width: oriented.planned.width,
            planned_height: oriented.planned.height,
            width,
            height,
            scaled: oriented.scaled,
            rotated: orientation.degrees().is_some(),
            output_size: png.len() as u64,
            output_path: None,
        };

        Ok(ResizedImage { png, report })
    }
}
