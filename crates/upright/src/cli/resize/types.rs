//! CLI enum types for the resize command.

use clap::ValueEnum;
use upright_core::{OutputFormat as CoreOutputFormat, ScaleFilter};

/// Supported report formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Resampling filter for the scale step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScaleFilterArg {
    /// Nearest neighbour (no smoothing)
    Nearest,
    /// Bilinear
    Triangle,
    /// Bicubic
    CatmullRom,
    /// Gaussian
    Gaussian,
    /// Lanczos with window 3
    Lanczos3,
}

impl From<ScaleFilterArg> for ScaleFilter {
    fn from(arg: ScaleFilterArg) -> Self {
        match arg {
            ScaleFilterArg::Nearest => ScaleFilter::Nearest,
            ScaleFilterArg::Triangle => ScaleFilter::Triangle,
            ScaleFilterArg::CatmullRom => ScaleFilter::CatmullRom,
            ScaleFilterArg::Gaussian => ScaleFilter::Gaussian,
            ScaleFilterArg::Lanczos3 => ScaleFilter::Lanczos3,
        }
    }
}
