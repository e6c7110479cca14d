//! Photo + frame compositor.
//!
//! A composite is built in three steps:
//! 1. the photo is scaled to cover the square canvas and centre-cropped,
//! 2. a copy of the frame overlay is masked by the configured strategy,
//! 3. the frame is alpha-blended on top and the canvas is JPEG-encoded.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::data_url;
use crate::error::{Result, SafariError};

use super::geometry::CoverPlacement;
use super::loader::{ImageLoader, ImageSource};
use super::mask::{MaskSpec, OverlayMask};
use super::overlay::OverlayStore;

/// Media type of every composite.
pub const COMPOSITE_MEDIA_TYPE: &str = "image/jpeg";

/// Compositor settings as written in `safari.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Edge length of the square output, in pixels.
    pub size: u32,

    /// JPEG quality, 1-100.
    pub quality: u8,

    /// Upper bound on waiting for the photo and frame to load.
    pub timeout_ms: u64,

    /// Window punched into the frame before compositing.
    pub mask: MaskSpec,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            size: 1080,
            quality: 85,
            timeout_ms: 15_000,
            mask: MaskSpec::None,
        }
    }
}

impl CompositorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(SafariError::Validation {
                message: "compositor.size must be greater than zero".to_string(),
                help: None,
            });
        }
        if !(1..=100).contains(&self.quality) {
            return Err(SafariError::Validation {
                message: format!("compositor.quality must be 1-100 (got {})", self.quality),
                help: Some("85 is a good balance of size and detail".to_string()),
            });
        }
        if self.timeout_ms == 0 {
            return Err(SafariError::Validation {
                message: "compositor.timeout_ms must be greater than zero".to_string(),
                help: None,
            });
        }
        self.mask.validate()
    }
}

/// An encoded composite, ready for the gallery.
#[derive(Clone, PartialEq, Eq)]
pub struct CompositeResult {
    bytes: Arc<[u8]>,
    width: u32,
    height: u32,
}

impl CompositeResult {
    /// Wrap encoded JPEG bytes, reading the dimensions from the header.
    pub fn from_jpeg(bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let bytes: Arc<[u8]> = bytes.into();
        let (width, height) = ImageReader::new(Cursor::new(&bytes[..]))
            .with_guessed_format()
            .map_err(SafariError::IoError)?
            .into_dimensions()
            .map_err(|e| SafariError::Decode {
                source_name: "stored photo".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            bytes,
            width,
            height,
        })
    }

    /// Parse a `data:` URL as produced by [`CompositeResult::to_data_url`].
    pub fn from_data_url(url: &str) -> Result<Self> {
        let (media_type, bytes) = data_url::decode(url)?;
        if media_type != COMPOSITE_MEDIA_TYPE {
            return Err(SafariError::Parse {
                message: format!("expected {} photo, found {}", COMPOSITE_MEDIA_TYPE, media_type),
                help: None,
            });
        }
        Self::from_jpeg(bytes)
    }

    pub fn to_data_url(&self) -> String {
        data_url::encode(COMPOSITE_MEDIA_TYPE, &self.bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Write the JPEG payload to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes).map_err(|e| SafariError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to write photo: {}", e),
        })
    }
}

impl fmt::Debug for CompositeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeResult")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Composites photos into the configured frame.
#[derive(Debug, Clone)]
pub struct Compositor {
    size: u32,
    quality: u8,
    timeout: Duration,
    mask: Arc<dyn OverlayMask>,
}

impl Compositor {
    pub fn new(config: &CompositorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            size: config.size,
            quality: config.quality,
            timeout: Duration::from_millis(config.timeout_ms),
            mask: Arc::from(config.mask.build()?),
        })
    }

    /// Replace the mask strategy.
    pub fn with_mask(mut self, mask: Arc<dyn OverlayMask>) -> Self {
        self.mask = mask;
        self
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Draw `source` covering the canvas and `overlay` on top.
    ///
    /// Neither input is modified; the mask is applied to a private copy of
    /// the overlay.
    pub fn render(&self, source: &RgbaImage, overlay: &RgbaImage) -> Result<RgbaImage> {
        let size = self.size;
        let (sw, sh) = source.dimensions();

        let placement = CoverPlacement::compute(sw, sh, size, size)?;
        let crop = placement.source_crop(sw, sh, size, size);
        let visible = imageops::crop_imm(source, crop.x as u32, crop.y as u32, crop.width, crop.height);
        let mut canvas = imageops::resize(&*visible, size, size, FilterType::Triangle);

        let mut frame = if overlay.dimensions() == (size, size) {
            Cow::Borrowed(overlay)
        } else {
            Cow::Owned(imageops::resize(overlay, size, size, FilterType::Triangle))
        };
        if !self.mask.is_identity() {
            self.mask.apply(frame.to_mut());
        }

        imageops::overlay(&mut canvas, &*frame, 0, 0);
        Ok(canvas)
    }

    /// JPEG-encode a rendered canvas.
    ///
    /// Transparent areas are flattened onto black first.
    pub fn encode(&self, canvas: RgbaImage) -> Result<CompositeResult> {
        let (width, height) = canvas.dimensions();
        let mut flat = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
        imageops::overlay(&mut flat, &canvas, 0, 0);
        let rgb = DynamicImage::ImageRgba8(flat).into_rgb8();

        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, self.quality);
        rgb.write_with_encoder(encoder).map_err(|e| SafariError::Encode {
            message: format!("JPEG encoding failed: {}", e),
        })?;

        Ok(CompositeResult {
            bytes: bytes.into(),
            width,
            height,
        })
    }

    /// Load `source` and the overlay concurrently, then composite.
    #[tracing::instrument(skip_all, fields(source = %source.name(), size = self.size))]
    pub async fn composite(
        &self,
        loader: &ImageLoader,
        source: &ImageSource,
        overlays: &OverlayStore,
    ) -> Result<CompositeResult> {
        self.composite_from(loader.load(source), overlays.get(loader))
            .await
    }

    /// Composite once both inputs resolve.
    ///
    /// Rendering starts only after both futures complete. The wait is
    /// bounded by the configured timeout; the first failing input aborts
    /// the other.
    pub async fn composite_from<S, O>(&self, source: S, overlay: O) -> Result<CompositeResult>
    where
        S: Future<Output = Result<RgbaImage>>,
        O: Future<Output = Result<Arc<RgbaImage>>>,
    {
        let started = Instant::now();

        let joined = async { tokio::try_join!(source, overlay) };
        let (source, overlay) = tokio::time::timeout(self.timeout, joined)
            .await
            .map_err(|_| SafariError::Timeout {
                what: "photo and frame to load".to_string(),
                after: self.timeout,
            })??;

        let this = self.clone();
        let result = tokio::task::spawn_blocking(move || {
            let canvas = this.render(&source, &overlay)?;
            this.encode(canvas)
        })
        .await
        .map_err(|e| SafariError::Encode {
            message: format!("compositing task failed: {}", e),
        })??;

        tracing::info!(
            bytes = result.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "composited photo"
        );
        Ok(result)
    }
}
