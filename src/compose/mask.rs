//! Overlay masking strategies.
//!
//! A mask "punches" a transparent window into a copy of the frame overlay so
//! the photo underneath stays visible even where the frame asset itself is
//! not transparent. Which shape to punch is a product decision, so the
//! strategy is configurable.

use std::fmt;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SafariError};

/// A transformation applied to a private copy of the overlay.
pub trait OverlayMask: Send + Sync + fmt::Debug {
    /// Modify the overlay's alpha channel in place.
    fn apply(&self, overlay: &mut RgbaImage);

    /// True when `apply` never changes anything, so the copy can be skipped.
    fn is_identity(&self) -> bool {
        false
    }
}

/// Leave the overlay untouched and rely on the asset's own transparency.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPunch;

impl OverlayMask for NoPunch {
    fn apply(&self, _overlay: &mut RgbaImage) {}

    fn is_identity(&self) -> bool {
        true
    }
}

/// Clear every pixel further than `margin` from all four edges.
#[derive(Debug, Clone, Copy)]
pub struct RectPunch {
    pub margin: u32,
}

impl OverlayMask for RectPunch {
    fn apply(&self, overlay: &mut RgbaImage) {
        let (w, h) = overlay.dimensions();
        if self.margin.saturating_mul(2) >= w || self.margin.saturating_mul(2) >= h {
            return;
        }

        for y in self.margin..h - self.margin {
            for x in self.margin..w - self.margin {
                overlay.get_pixel_mut(x, y).0[3] = 0;
            }
        }
    }
}

/// Radial window: transparent inside `inner`, fading linearly back to the
/// overlay's own alpha at `outer`.
///
/// Radii are fractions of half the overlay's shorter side, so `1.0` touches
/// the nearest edges.
#[derive(Debug, Clone, Copy)]
pub struct RadialPunch {
    pub inner: f32,
    pub outer: f32,
}

impl OverlayMask for RadialPunch {
    fn apply(&self, overlay: &mut RgbaImage) {
        let (w, h) = overlay.dimensions();
        let half = w.min(h) as f32 / 2.0;
        if half <= 0.0 {
            return;
        }

        let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
        let span = (self.outer - self.inner).max(f32::EPSILON);

        for (x, y, px) in overlay.enumerate_pixels_mut() {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let d = (dx * dx + dy * dy).sqrt() / half;

            if d >= self.outer {
                continue;
            }
            let keep = ((d - self.inner) / span).clamp(0.0, 1.0);
            px.0[3] = (f32::from(px.0[3]) * keep).round() as u8;
        }
    }
}

/// Serializable mask selection, as written in `safari.yaml`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MaskSpec {
    #[default]
    None,
    Rect {
        margin: u32,
    },
    Radial {
        inner: f32,
        outer: f32,
    },
}

impl MaskSpec {
    /// Check parameters without building the strategy.
    pub fn validate(&self) -> Result<()> {
        match *self {
            MaskSpec::None | MaskSpec::Rect { .. } => Ok(()),
            MaskSpec::Radial { inner, outer } => {
                if !(inner.is_finite() && outer.is_finite()) || inner < 0.0 || outer <= inner {
                    return Err(SafariError::Validation {
                        message: format!(
                            "radial mask needs 0 <= inner < outer (got inner={}, outer={})",
                            inner, outer
                        ),
                        help: Some("Radii are fractions of half the frame size, e.g. inner: 0.6, outer: 0.8".to_string()),
                    });
                }
                Ok(())
            }
        }
    }

    /// Build the strategy this selection names.
    pub fn build(&self) -> Result<Box<dyn OverlayMask>> {
        self.validate()?;
        Ok(match *self {
            MaskSpec::None => Box::new(NoPunch),
            MaskSpec::Rect { margin } => Box::new(RectPunch { margin }),
            MaskSpec::Radial { inner, outer } => Box::new(RadialPunch { inner, outer }),
        })
    }
}
