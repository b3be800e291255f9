//! Orientation hints and the normalizer that turns a raster upright.
//!
//! Only the pure rotations of the EXIF orientation tag are honoured.
//! Mirrored variants (2, 4, 5, 7) and unknown values fall into
//! [`Orientation::Other`] and leave the image as it is.

use serde::{Deserialize, Serialize};

use crate::raster::{QuarterTurn, RawImage};

/// EXIF `Orientation` tag values the normalizer acts on.
pub mod exif_value {
    pub const NORMAL: u32 = 1;
    pub const ROTATE_180: u32 = 3;
    pub const ROTATE_90: u32 = 6;
    pub const ROTATE_270: u32 = 8;
}

/// How the stored pixels must be turned to appear upright.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Normal,
    Rotate90,
    Rotate180,
    Rotate270,
    /// Missing, undefined, mirrored or out-of-range. Treated as `Normal`.
    #[default]
    Other,
}

impl Orientation {
    /// Map a raw EXIF orientation value.
    pub fn from_exif(value: u32) -> Self {
        match value {
            exif_value::NORMAL => Self::Normal,
            exif_value::ROTATE_90 => Self::Rotate90,
            exif_value::ROTATE_180 => Self::Rotate180,
            exif_value::ROTATE_270 => Self::Rotate270,
            _ => Self::Other,
        }
    }

    /// Clockwise rotation to apply, or `None` for identity.
    pub fn quarter_turn(self) -> Option<QuarterTurn> {
        match self {
            Self::Rotate90 => Some(QuarterTurn::Cw90),
            Self::Rotate180 => Some(QuarterTurn::Cw180),
            Self::Rotate270 => Some(QuarterTurn::Cw270),
            Self::Normal | Self::Other => None,
        }
    }

    pub fn degrees(self) -> Option<u32> {
        self.quarter_turn().map(QuarterTurn::degrees)
    }

    /// Whether normalizing swaps width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Rotate90 | Self::Rotate270)
    }
}

/// Rotate `image` so it displays upright, consuming the orientation hint.
///
/// `Normal` and `Other` hand back the same buffer without copying.
pub fn normalize(image: RawImage, orientation: Orientation) -> RawImage {
    match orientation.quarter_turn() {
        Some(turn) => {
            tracing::trace!("Rotating {}° for {:?}", turn.degrees(), orientation);
            image.rotate(turn)
        }
        None => image,
    }
}
