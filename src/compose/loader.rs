//! Asynchronous image loading.
//!
//! Every image the compositor touches goes through [`ImageLoader::load`]:
//! bytes are read without blocking the runtime and decoded on the blocking
//! pool. Decoding first sniffs the content, then falls back to the format
//! implied by the file extension or media type.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};

use crate::data_url;
use crate::error::{Result, SafariError};

/// Default upper bound on encoded input size (40 MiB).
pub const DEFAULT_MAX_BYTES: usize = 40 * 1024 * 1024;

/// Where an image comes from.
#[derive(Clone)]
pub enum ImageSource {
    /// A file on disk.
    Path(PathBuf),
    /// Encoded bytes already in memory, e.g. an upload.
    Bytes {
        name: String,
        bytes: Arc<[u8]>,
        hint: Option<ImageFormat>,
    },
    /// A base64 `data:` URL.
    DataUrl(String),
}

impl ImageSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ImageSource::Path(path.into())
    }

    pub fn bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        ImageSource::Bytes {
            name: name.into(),
            bytes: bytes.into(),
            hint: None,
        }
    }

    /// Human-readable name used in error messages and logs.
    pub fn name(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes { name, .. } => name.clone(),
            ImageSource::DataUrl(_) => "data URL".to_string(),
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            ImageSource::Bytes { name, bytes, hint } => f
                .debug_struct("Bytes")
                .field("name", name)
                .field("len", &bytes.len())
                .field("hint", hint)
                .finish(),
            ImageSource::DataUrl(url) => f.debug_tuple("DataUrl").field(&url.len()).finish(),
        }
    }
}

/// Loads and decodes images into RGBA buffers.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    max_bytes: usize,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader {
    pub fn new() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    /// Reject encoded inputs larger than `max_bytes`.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Load and decode `source`.
    ///
    /// All failures, including unreadable files, surface as
    /// [`SafariError::Decode`] naming the source.
    #[tracing::instrument(skip_all, fields(source = %source.name()))]
    pub async fn load(&self, source: &ImageSource) -> Result<RgbaImage> {
        let name = source.name();
        let fail = |message: String| SafariError::Decode {
            source_name: name.clone(),
            message,
        };

        let (bytes, hint) = read(source).await.map_err(fail)?;
        if bytes.len() > self.max_bytes {
            return Err(fail(format!(
                "{} bytes exceeds the {} byte limit",
                bytes.len(),
                self.max_bytes
            )));
        }

        let image = tokio::task::spawn_blocking(move || decode(&bytes, hint))
            .await
            .map_err(|e| fail(format!("decoder task failed: {}", e)))?
            .map_err(fail)?;

        tracing::debug!(width = image.width(), height = image.height(), "decoded image");
        Ok(image)
    }
}

async fn read(source: &ImageSource) -> std::result::Result<(Arc<[u8]>, Option<ImageFormat>), String> {
    match source {
        ImageSource::Path(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| format!("failed to read file: {}", e))?;
            Ok((bytes.into(), ImageFormat::from_path(path).ok()))
        }
        ImageSource::Bytes { bytes, hint, .. } => Ok((Arc::clone(bytes), *hint)),
        ImageSource::DataUrl(url) => {
            let (media_type, bytes) = data_url::decode(url).map_err(|e| e.to_string())?;
            Ok((bytes.into(), ImageFormat::from_mime_type(media_type)))
        }
    }
}

/// Decode by sniffed format first, then by the hinted format.
fn decode(bytes: &[u8], hint: Option<ImageFormat>) -> std::result::Result<RgbaImage, String> {
    let sniffed = image::guess_format(bytes).ok();
    let fallback = hint.filter(|h| Some(*h) != sniffed);

    let mut last_error = "unrecognised image format".to_string();
    for format in sniffed.into_iter().chain(fallback) {
        match image::load_from_memory_with_format(bytes, format) {
            Ok(image) => return Ok(image.to_rgba8()),
            Err(e) => {
                tracing::debug!(?format, error = %e, "decode attempt failed");
                last_error = e.to_string();
            }
        }
    }

    Err(last_error)
}
