//! Owned RGBA raster and the two pixel primitives the pipeline needs:
//! resampling to a planned size and rotation by a quarter turn.
//!
//! Every transform consumes the input raster and returns a new one, so an
//! intermediate buffer is freed as soon as its successor exists.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::plan::Size;

/// A decoded image held as 8-bit RGBA.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pixels: RgbaImage,
}

impl RawImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Convert any decoded image into the RGBA8 working format.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            pixels: image.into_rgba8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Real-valued size, as consumed by the planner.
    pub fn size(&self) -> Size {
        Size::from_pixels(self.width(), self.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// Resample to `target`, truncated to whole pixels.
    ///
    /// Returns `self` untouched when the truncated size equals the current one.
    pub fn scale(self, target: Size, filter: ScaleFilter) -> Self {
        let (width, height) = target.to_pixels();
        if (width, height) == self.dimensions() {
            return self;
        }
        tracing::trace!(
            "Scaling {}x{} -> {}x{} ({:?})",
            self.width(),
            self.height(),
            width,
            height,
            filter
        );
        Self {
            pixels: imageops::resize(&self.pixels, width, height, filter.into()),
        }
    }

    /// Rotate clockwise about the image centre.
    ///
    /// Each output pixel is mapped back through the inverse rotation and
    /// sampled bilinearly from the source. Rotation always smooths, whatever
    /// filter was used for scaling. For quarter turns the sample points fall
    /// on source pixel centres, so no value is actually blended.
    pub fn rotate(self, turn: QuarterTurn) -> Self {
        let (src_w, src_h) = self.dimensions();
        let (dst_w, dst_h) = turn.rotated_dimensions(src_w, src_h);
        if src_w == 0 || src_h == 0 {
            return Self::new(RgbaImage::new(dst_w, dst_h));
        }

        let (cos, sin) = turn.cos_sin();
        let src_cx = f64::from(src_w) / 2.0;
        let src_cy = f64::from(src_h) / 2.0;
        let dst_cx = f64::from(dst_w) / 2.0;
        let dst_cy = f64::from(dst_h) / 2.0;

        let src = &self.pixels;
        let pixels = RgbaImage::from_fn(dst_w, dst_h, |x, y| {
            let x_rel = f64::from(x) + 0.5 - dst_cx;
            let y_rel = f64::from(y) + 0.5 - dst_cy;
            let sx = x_rel * cos + y_rel * sin + src_cx - 0.5;
            let sy = -x_rel * sin + y_rel * cos + src_cy - 0.5;
            sample_bilinear(src, sx, sy)
        });

        Self { pixels }
    }
}

/// Bilinear sample at pixel-centre coordinates, clamping at the borders.
fn sample_bilinear(src: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let max_x = f64::from(src.width() - 1);
    let max_y = f64::from(src.height() - 1);

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let ix0 = x0.clamp(0.0, max_x) as u32;
    let iy0 = y0.clamp(0.0, max_y) as u32;
    let ix1 = (x0 + 1.0).clamp(0.0, max_x) as u32;
    let iy1 = (y0 + 1.0).clamp(0.0, max_y) as u32;

    let p00 = src.get_pixel(ix0, iy0);
    let p10 = src.get_pixel(ix1, iy0);
    let p01 = src.get_pixel(ix0, iy1);
    let p11 = src.get_pixel(ix1, iy1);

    let mut out = [0u8; 4];
    for (c, value) in out.iter_mut().enumerate() {
        let top = f64::from(p00[c]) * (1.0 - fx) + f64::from(p10[c]) * fx;
        let bottom = f64::from(p01[c]) * (1.0 - fx) + f64::from(p11[c]) * fx;
        *value = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

/// Clockwise rotation by a multiple of 90 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuarterTurn {
    Cw90,
    Cw180,
    Cw270,
}

impl QuarterTurn {
    pub fn degrees(self) -> u32 {
        match self {
            Self::Cw90 => 90,
            Self::Cw180 => 180,
            Self::Cw270 => 270,
        }
    }

    /// Output dimensions for a `width` x `height` source.
    pub fn rotated_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Self::Cw180 => (width, height),
            Self::Cw90 | Self::Cw270 => (height, width),
        }
    }

    // Exact values; `f64::to_radians().cos()` would leave ~1e-17 residue
    fn cos_sin(self) -> (f64, f64) {
        match self {
            Self::Cw90 => (0.0, 1.0),
            Self::Cw180 => (-1.0, 0.0),
            Self::Cw270 => (0.0, -1.0),
        }
    }
}

/// Resampling filter used when scaling.
///
/// Defaults to nearest neighbour: scaling is deliberately unfiltered, while
/// rotation always interpolates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleFilter {
    #[default]
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ScaleFilter> for FilterType {
    fn from(filter: ScaleFilter) -> Self {
        match filter {
            ScaleFilter::Nearest => FilterType::Nearest,
            ScaleFilter::Triangle => FilterType::Triangle,
            ScaleFilter::CatmullRom => FilterType::CatmullRom,
            ScaleFilter::Gaussian => FilterType::Gaussian,
            ScaleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every pixel gets a distinct value so misplaced pixels show up.
    fn gradient(width: u32, height: u32) -> RawImage {
        RawImage::new(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        }))
    }

    #[test]
    fn test_rotate90_swaps_dimensions_and_moves_origin() {
        let img = gradient(200, 100);
        let origin = *img.pixels().get_pixel(0, 0);

        let rotated = img.rotate(QuarterTurn::Cw90);
        assert_eq!(rotated.dimensions(), (100, 200));
        // Top-left of the source ends up top-right after a clockwise turn
        assert_eq!(*rotated.pixels().get_pixel(99, 0), origin);
    }

    #[test]
    fn test_rotation_matches_lossless_reference() {
        let img = gradient(7, 4);
        let src = img.pixels().clone();

        assert_eq!(
            img.clone().rotate(QuarterTurn::Cw90).into_pixels(),
            imageops::rotate90(&src)
        );
        assert_eq!(
            img.clone().rotate(QuarterTurn::Cw180).into_pixels(),
            imageops::rotate180(&src)
        );
        assert_eq!(
            img.rotate(QuarterTurn::Cw270).into_pixels(),
            imageops::rotate270(&src)
        );
    }

    #[test]
    fn test_rotate180_keeps_dimensions() {
        let rotated = gradient(31, 17).rotate(QuarterTurn::Cw180);
        assert_eq!(rotated.dimensions(), (31, 17));
    }

    #[test]
    fn test_four_quarter_turns_round_trip() {
        let img = gradient(13, 6);
        let mut out = img.clone();
        for _ in 0..4 {
            out = out.rotate(QuarterTurn::Cw90);
        }
        assert_eq!(out, img);
    }

    #[test]
    fn test_alpha_survives_rotation() {
        let img = RawImage::new(RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 40])));
        let rotated = img.rotate(QuarterTurn::Cw270);
        assert!(rotated.pixels().pixels().all(|p| p.0 == [10, 20, 30, 40]));
    }

    #[test]
    fn test_scale_truncates_planned_size() {
        let scaled = gradient(1000, 500).scale(Size::new(333.9, 166.95), ScaleFilter::Nearest);
        assert_eq!(scaled.dimensions(), (333, 166));
    }

    #[test]
    fn test_scale_same_size_is_identity() {
        let img = gradient(40, 30);
        let scaled = img.clone().scale(Size::new(40.7, 30.2), ScaleFilter::Lanczos3);
        assert_eq!(scaled, img);
    }


    #[test]
    fn test_scale_filter_serde_names() {
        let filter: ScaleFilter = serde_json::from_str("\"catmull-rom\"").unwrap();
        assert_eq!(filter, ScaleFilter::CatmullRom);
        assert_eq!(ScaleFilter::default(), ScaleFilter::Nearest);
    }
}
