//! Cached frame overlay.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use tokio::sync::OnceCell;

use crate::error::{Result, SafariError};

use super::loader::{ImageLoader, ImageSource};

/// Loads the frame overlay once and hands out shared read-only copies.
///
/// A failed load is not cached; the next call tries again.
#[derive(Debug)]
pub struct OverlayStore {
    path: PathBuf,
    cached: OnceCell<Arc<RgbaImage>>,
}

impl OverlayStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: OnceCell::new(),
        }
    }

    /// Wrap an already decoded overlay.
    pub fn from_image(path: impl Into<PathBuf>, image: RgbaImage) -> Self {
        Self {
            path: path.into(),
            cached: OnceCell::new_with(Some(Arc::new(image))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.initialized()
    }

    /// Get the overlay, loading it on first use.
    ///
    /// Any failure is a [`SafariError::Config`]: the frame is part of the
    /// deployment, not user input.
    pub async fn get(&self, loader: &ImageLoader) -> Result<Arc<RgbaImage>> {
        let overlay = self
            .cached
            .get_or_try_init(|| async {
                let source = ImageSource::Path(self.path.clone());
                let image = loader.load(&source).await.map_err(|e| SafariError::Config {
                    message: format!("frame overlay unavailable: {}", e),
                    help: Some(format!(
                        "Check that `overlay` in safari.yaml points at a readable image ({})",
                        self.path.display()
                    )),
                })?;
                tracing::info!(
                    path = %self.path.display(),
                    width = image.width(),
                    height = image.height(),
                    "loaded frame overlay"
                );
                Ok::<_, SafariError>(Arc::new(image))
            })
            .await?;

        Ok(Arc::clone(overlay))
    }
}
