//! The `upright plan` command: dimension planning without any image I/O.

use clap::Args;
use serde::Serialize;
use upright_core::{plan_dimensions, Orientation};

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Original width in pixels
    pub width: f64,

    /// Original height in pixels
    pub height: f64,

    /// Maximum output width
    #[arg(long)]
    pub max_width: Option<f64>,

    /// Maximum output height
    #[arg(long)]
    pub max_height: Option<f64>,

    /// EXIF orientation value (1-8) to account for in the final dimensions
    #[arg(long, default_value = "1")]
    pub exif_orientation: u32,
}

#[derive(Debug, Serialize)]
struct PlanOutput {
    planned_width: f64,
    planned_height: f64,
    pixel_width: u32,
    pixel_height: u32,
    orientation: Orientation,
    final_width: u32,
    final_height: u32,
}

/// Execute the plan command.
pub fn execute(args: PlanArgs) -> anyhow::Result<()> {
    let output = compute(&args)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn compute(args: &PlanArgs) -> anyhow::Result<PlanOutput> {
    for (name, value) in [("width", Some(args.width)), ("height", Some(args.height))]
        .into_iter()
        .chain([("--max-width", args.max_width), ("--max-height", args.max_height)])
    {
        if let Some(v) = value {
            if !(v.is_finite() && v > 0.0) {
                anyhow::bail!("{} must be a finite number > 0 (got {})", name, v);
            }
        }
    }

    let planned = plan_dimensions(args.width, args.height, args.max_width, args.max_height);
    let (pixel_width, pixel_height) = planned.to_pixels();
    let orientation = Orientation::from_exif(args.exif_orientation);
    let (final_width, final_height) = if orientation.swaps_dimensions() {
        (pixel_height, pixel_width)
    } else {
        (pixel_width, pixel_height)
    };

    Ok(PlanOutput {
        planned_width: planned.width,
        planned_height: planned.height,
        pixel_width,
        pixel_height,
        orientation,
        final_width,
        final_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(width: f64, height: f64, max_width: Option<f64>, max_height: Option<f64>) -> PlanArgs {
        PlanArgs {
            width,
            height,
            max_width,
            max_height,
            exif_orientation: 1,
        }
    }

    #[test]
    fn test_compute_plan() {
        let out = compute(&args(1000.0, 500.0, Some(333.0), None)).unwrap();
        assert_eq!(out.planned_width, 333.0);
        assert!((out.planned_height - 166.5).abs() < 1e-9);
        assert_eq!((out.pixel_width, out.pixel_height), (333, 166));
    }

    #[test]
    fn test_compute_swaps_for_rotation() {
        let mut a = args(800.0, 600.0, Some(400.0), Some(400.0));
        a.exif_orientation = 6;
        let out = compute(&a).unwrap();
        assert_eq!(out.orientation, Orientation::Rotate90);
        assert_eq!((out.final_width, out.final_height), (300, 400));
    }

    #[test]
    fn test_compute_rejects_bad_input() {
        assert!(compute(&args(0.0, 10.0, None, None)).is_err());
        let err = compute(&args(10.0, 10.0, None, Some(-2.0))).unwrap_err();
        assert!(err.to_string().contains("--max-height"));
    }
}
