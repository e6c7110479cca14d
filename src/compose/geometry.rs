//! Scale-to-cover placement math.
//!
//! Fills a target canvas with a source image of arbitrary aspect ratio,
//! cropping whichever axis overflows.

use crate::error::{Result, SafariError};

/// Where a source image lands on the target canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverPlacement {
    /// Uniform scale applied to the source.
    pub scale: f64,
    /// Drawn width in canvas pixels (unrounded).
    pub width: f64,
    /// Drawn height in canvas pixels (unrounded).
    pub height: f64,
    /// Horizontal offset of the drawn image; zero or negative.
    pub x: f64,
    /// Vertical offset of the drawn image; zero or negative.
    pub y: f64,
}

/// Integer rectangle used when actually resampling and drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl CoverPlacement {
    /// Compute the cover placement of a `src_w`x`src_h` image on a
    /// `target_w`x`target_h` canvas.
    pub fn compute(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> Result<Self> {
        if src_w == 0 || src_h == 0 {
            return Err(SafariError::Decode {
                source_name: "source image".to_string(),
                message: format!("image has no pixels ({}x{})", src_w, src_h),
            });
        }

        let (sw, sh) = (f64::from(src_w), f64::from(src_h));
        let (tw, th) = (f64::from(target_w), f64::from(target_h));

        let scale = (tw / sw).max(th / sh);
        let width = sw * scale;
        let height = sh * scale;

        Ok(Self {
            scale,
            width,
            height,
            x: (tw - width) / 2.0,
            y: (th - height) / 2.0,
        })
    }

    /// Snap the placement to whole pixels.
    ///
    /// The drawn size is rounded up, never below the target, and the offset
    /// is the floor of the centred offset, so the rectangle always covers
    /// `[0, target_w) x [0, target_h)`.
    pub fn pixel_rect(&self, target_w: u32, target_h: u32) -> PixelRect {
        let width = snap_up(self.width).max(target_w);
        let height = snap_up(self.height).max(target_h);

        PixelRect {
            x: -(i64::from(width - target_w) / 2),
            y: -(i64::from(height - target_h) / 2),
            width,
            height,
        }
    }

    /// The region of the source that ends up visible on the canvas.
    ///
    /// Resampling only this region to the target size is equivalent to
    /// drawing the whole scaled source at the cover offset.
    pub fn source_crop(&self, src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> PixelRect {
        let width = (f64::from(target_w) / self.scale)
            .round()
            .clamp(1.0, f64::from(src_w)) as u32;
        let height = (f64::from(target_h) / self.scale)
            .round()
            .clamp(1.0, f64::from(src_h)) as u32;

        let x = ((-self.x / self.scale).round().max(0.0) as u32).min(src_w - width);
        let y = ((-self.y / self.scale).round().max(0.0) as u32).min(src_h - height);

        PixelRect {
            x: i64::from(x),
            y: i64::from(y),
            width,
            height,
        }
    }
}

/// Round up, ignoring float noise like `1080.0000000001`.
fn snap_up(value: f64) -> u32 {
    let rounded = value.round();
    if (value - rounded).abs() < 1e-6 {
        rounded as u32
    } else {
        value.ceil() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(rect: PixelRect, target: u32) {
        assert!(rect.x <= 0 && rect.y <= 0, "offset must not leave a gap: {:?}", rect);
        assert!(rect.x + i64::from(rect.width) >= i64::from(target), "{:?}", rect);
        assert!(rect.y + i64::from(rect.height) >= i64::from(target), "{:?}", rect);
    }

    #[test]
    fn test_landscape_camera_photo() {
        let placement = CoverPlacement::compute(4000, 3000, 1080, 1080).unwrap();

        assert!((placement.scale - 0.36).abs() < 1e-12);
        assert!((placement.width - 1440.0).abs() < 1e-9);
        assert!((placement.height - 1080.0).abs() < 1e-9);
        assert!((placement.x - -180.0).abs() < 1e-9);
        assert!(placement.y.abs() < 1e-9);

        let rect = placement.pixel_rect(1080, 1080);
        assert_eq!(
            rect,
            PixelRect {
                x: -180,
                y: 0,
                width: 1440,
                height: 1080
            }
        );
    }

    #[test]
    fn test_portrait_crops_vertically() {
        let placement = CoverPlacement::compute(1080, 1920, 1080, 1080).unwrap();

        assert_eq!(placement.scale, 1.0);
        assert_eq!(placement.x, 0.0);
        assert_eq!(placement.y, -420.0);
    }

    #[test]
    fn test_small_square_upscales() {
        let placement = CoverPlacement::compute(100, 100, 1080, 1080).unwrap();
        assert_eq!(placement.scale, 10.8);

        let rect = placement.pixel_rect(1080, 1080);
        assert_eq!(rect.width, 1080);
        assert_eq!(rect.height, 1080);
        assert_eq!((rect.x, rect.y), (0, 0));
    }

    #[test]
    fn test_odd_sizes_always_cover() {
        let sizes = [(1, 1), (3, 7), (4001, 2999), (1079, 1081), (333, 1000), (1, 5000)];
        for (w, h) in sizes {
            let rect = CoverPlacement::compute(w, h, 1080, 1080)
                .unwrap()
                .pixel_rect(1080, 1080);
            assert_covers(rect, 1080);
        }
    }

    #[test]
    fn test_source_crop_centres_visible_region() {
        let placement = CoverPlacement::compute(4000, 3000, 1080, 1080).unwrap();
        let crop = placement.source_crop(4000, 3000, 1080, 1080);

        assert_eq!(
            crop,
            PixelRect {
                x: 500,
                y: 0,
                width: 3000,
                height: 3000
            }
        );
    }

    #[test]
    fn test_source_crop_stays_inside_source() {
        for (w, h) in [(1, 1), (7, 3), (1081, 1079), (1, 5000)] {
            let placement = CoverPlacement::compute(w, h, 1080, 1080).unwrap();
            let crop = placement.source_crop(w, h, 1080, 1080);
            assert!(crop.width >= 1 && crop.height >= 1);
            assert!(crop.x as u32 + crop.width <= w, "{:?}", crop);
            assert!(crop.y as u32 + crop.height <= h, "{:?}", crop);
        }
    }

    #[test]
    fn test_zero_sized_source_is_decode_error() {
        let err = CoverPlacement::compute(0, 10, 1080, 1080).unwrap_err();
        assert!(matches!(err, SafariError::Decode { .. }));
    }
}
