//! Dimension planning: fit an image inside optional bounds, keeping its aspect ratio.
//!
//! The planner works on real-valued dimensions. Truncation to whole pixels
//! happens only when the raster is actually resampled (see [`Size::to_pixels`]).

use serde::{Deserialize, Serialize};

/// A real-valued width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Build a size from integer pixel dimensions.
    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self {
            width: f64::from(width),
            height: f64::from(height),
        }
    }

    /// Truncate toward zero to pixel dimensions.
    ///
    /// Each axis is clamped to at least one pixel so that a very thin source
    /// squeezed by a tight bound still yields a non-empty buffer.
    pub fn to_pixels(self) -> (u32, u32) {
        (truncate_axis(self.width), truncate_axis(self.height))
    }
}

fn truncate_axis(value: f64) -> u32 {
    // `as` saturates and maps NaN to 0
    (value.trunc() as u32).max(1)
}

/// Optional per-axis bounds. `None` means the axis is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
}

impl Constraint {
    pub fn new(max_width: Option<f64>, max_height: Option<f64>) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// No bound on either axis.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// True when neither axis carries a bound (the image is never scaled).
    pub fn is_unbounded(&self) -> bool {
        self.max_width.is_none() && self.max_height.is_none()
    }

    /// Returns the first bound that is not a finite positive number, if any.
    pub fn invalid_bound(&self) -> Option<(&'static str, f64)> {
        [("max_width", self.max_width), ("max_height", self.max_height)]
            .into_iter()
            .find_map(|(name, bound)| match bound {
                Some(v) if !(v.is_finite() && v > 0.0) => Some((name, v)),
                _ => None,
            })
    }
}

/// Plan the target size for `original` under `constraint`.
pub fn plan(original: Size, constraint: Constraint) -> Size {
    plan_dimensions(
        original.width,
        original.height,
        constraint.max_width,
        constraint.max_height,
    )
}

/// Compute target dimensions for an image of `original_width` x `original_height`.
///
/// The more restrictive axis decides a single scale factor, which is then
/// carried over to the other axis through the original aspect ratio. When the
/// clamped dimensions come out equal, the original aspect ratio picks the axis
/// to shrink.
///
/// The branch order and the exact arithmetic below are load-bearing: callers
/// depend on the precise output, so this must not be collapsed into a
/// `min(max_w / w, max_h / h)` scale factor. The two disagree at the equality
/// boundary, and it is unclear whether the equal-dimensions rule was a
/// deliberate choice or a side effect of how the branches were written. Keep
/// it as is.
///
/// Inputs are expected to be positive; other values are passed through the
/// arithmetic unchecked.
pub fn plan_dimensions(
    original_width: f64,
    original_height: f64,
    max_width: Option<f64>,
    max_height: Option<f64>,
) -> Size {
    if max_width.is_none() && max_height.is_none() {
        return Size::new(original_width, original_height);
    }

    let mut width = max_width.map_or(original_width, |max| original_width.min(max));
    let mut height = max_height.map_or(original_height, |max| original_height.min(max));

    let downscale_width = max_width.is_some_and(|max| max < original_width);
    let downscale_height = max_height.is_some_and(|max| max < original_height);
    if !downscale_width && !downscale_height {
        return Size::new(width, height);
    }

    let width_from_height = (height / original_height) * original_width;
    let height_from_width = (width / original_width) * original_height;

    if width < height {
        if max_width.is_none() {
            width = width_from_height;
        } else {
            height = height_from_width;
        }
    } else if height < width {
        if max_height.is_none() {
            height = height_from_width;
        } else {
            width = width_from_height;
        }
    } else if original_width < original_height {
        width = width_from_height;
    } else if original_height < original_width {
        height = height_from_width;
    }

    Size::new(width, height)
}
