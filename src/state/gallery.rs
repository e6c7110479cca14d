//! Photo gallery, newest first.

use std::fs;
use std::path::{Path, PathBuf};

use crate::compose::CompositeResult;
use crate::error::{Result, SafariError};

use super::store::{Storage, KEY_GALLERY};

/// A gallery photo together with its position, used to address deletes.
#[derive(Debug, Clone, Copy)]
pub struct GalleryEntry<'a> {
    pub index: usize,
    pub photo: &'a CompositeResult,
}

/// Ordered gallery of composites.
///
/// Mutations persist the whole sequence back to storage.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    photos: Vec<CompositeResult>,
}

impl Gallery {
    /// Load the gallery from `store`.
    pub fn load(store: &dyn Storage) -> Result<Self> {
        let Some(raw) = store.get(KEY_GALLERY)? else {
            return Ok(Self::default());
        };

        let urls: Vec<String> = serde_json::from_str(&raw).map_err(|e| SafariError::Parse {
            message: format!("Invalid gallery data: {}", e),
            help: Some(format!("`{}` must be a JSON array of data URLs", KEY_GALLERY)),
        })?;

        let photos = urls
            .iter()
            .map(|url| CompositeResult::from_data_url(url))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(photos = photos.len(), "loaded gallery");
        Ok(Self { photos })
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CompositeResult> {
        self.photos.get(index)
    }

    pub fn entries(&self) -> impl Iterator<Item = GalleryEntry<'_>> {
        self.photos
            .iter()
            .enumerate()
            .map(|(index, photo)| GalleryEntry { index, photo })
    }

    /// Add `photo` at the front and persist.
    pub fn push(&mut self, photo: CompositeResult, store: &mut dyn Storage) -> Result<()> {
        let mut next = Vec::with_capacity(self.photos.len() + 1);
        next.push(photo);
        next.extend(self.photos.iter().cloned());
        persist(&next, store)?;
        self.photos = next;
        tracing::info!(photos = self.photos.len(), "photo added to gallery");
        Ok(())
    }

    /// Remove the photo at `index`, keeping the others in order, and persist.
    pub fn remove(&mut self, index: usize, store: &mut dyn Storage) -> Result<CompositeResult> {
        if index >= self.photos.len() {
            return Err(SafariError::Validation {
                message: format!(
                    "No photo at index {} (gallery has {})",
                    index,
                    self.photos.len()
                ),
                help: Some("Run `safari gallery list` to see indices".to_string()),
            });
        }

        let mut next = self.photos.clone();
        let removed = next.remove(index);
        persist(&next, store)?;
        self.photos = next;
        tracing::info!(index, photos = self.photos.len(), "photo removed from gallery");
        Ok(removed)
    }

    /// Write every photo to `dir` as `safari-NNN.jpg`, newest first.
    pub fn export(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).map_err(|e| SafariError::Io {
            path: dir.to_path_buf(),
            message: format!("Failed to create export directory: {}", e),
        })?;

        self.entries()
            .map(|entry| -> Result<PathBuf> {
                let path = dir.join(format!("safari-{:03}.jpg", entry.index));
                entry.photo.write_to(&path)?;
                Ok(path)
            })
            .collect()
    }
}

/// Write `photos` to `store`; callers adopt them only after this succeeds.
fn persist(photos: &[CompositeResult], store: &mut dyn Storage) -> Result<()> {
    let urls: Vec<String> = photos.iter().map(CompositeResult::to_data_url).collect();
    let json = serde_json::to_string(&urls).map_err(|e| SafariError::Parse {
        message: format!("Failed to serialize gallery: {}", e),
        help: None,
    })?;
    store.set(KEY_GALLERY, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{Compositor, CompositorConfig};
    use crate::state::store::{FileStore, MemoryStore};
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    /// Distinct photos of different sizes so they can be told apart.
    fn photo(size: u32) -> CompositeResult {
        let comp = Compositor::new(&CompositorConfig {
            size,
            ..Default::default()
        })
        .unwrap();
        comp.encode(RgbaImage::from_pixel(size, size, Rgba([9, 9, 9, 255])))
            .unwrap()
    }

    fn sizes(gallery: &Gallery) -> Vec<u32> {
        gallery.entries().map(|e| e.photo.width()).collect()
    }

    #[test]
    fn test_push_prepends() {
        let mut store = MemoryStore::new();
        let mut gallery = Gallery::load(&store).unwrap();

        gallery.push(photo(8), &mut store).unwrap();
        gallery.push(photo(16), &mut store).unwrap();

        assert_eq!(sizes(&gallery), vec![16, 8]);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut store = MemoryStore::new();
        let mut gallery = Gallery::default();
        for size in [24, 16, 8] {
            gallery.push(photo(size), &mut store).unwrap();
        }
        assert_eq!(sizes(&gallery), vec![8, 16, 24]);

        let removed = gallery.remove(1, &mut store).unwrap();

        assert_eq!(removed.width(), 16);
        assert_eq!(sizes(&gallery), vec![8, 24]);
        assert_eq!(sizes(&Gallery::load(&store).unwrap()), vec![8, 24]);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut store = MemoryStore::new();
        let mut gallery = Gallery::default();
        gallery.push(photo(8), &mut store).unwrap();

        assert!(matches!(
            gallery.remove(1, &mut store),
            Err(SafariError::Validation { .. })
        ));
        assert_eq!(gallery.len(), 1);
    }

    #[test]
    fn test_reload_from_file_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let mut store = FileStore::open(&path).unwrap();
            let mut gallery = Gallery::load(&store).unwrap();
            gallery.push(photo(8), &mut store).unwrap();
            gallery.push(photo(12), &mut store).unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        let gallery = Gallery::load(&store).unwrap();
        assert_eq!(sizes(&gallery), vec![12, 8]);
    }

    /// Storage whose writes always fail.
    struct ReadOnly;

    impl Storage for ReadOnly {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&mut self, key: &str, _value: String) -> Result<()> {
            Err(SafariError::Io {
                path: key.into(),
                message: "read-only".to_string(),
            })
        }

        fn remove(&mut self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_push_keeps_gallery_unchanged() {
        let mut gallery = Gallery::default();

        assert!(gallery.push(photo(8), &mut ReadOnly).is_err());
        assert!(gallery.is_empty());
    }

    #[test]
    fn test_failed_remove_keeps_photo() {
        let mut store = MemoryStore::new();
        let mut gallery = Gallery::default();
        gallery.push(photo(8), &mut store).unwrap();
        gallery.push(photo(16), &mut store).unwrap();

        assert!(gallery.remove(0, &mut ReadOnly).is_err());
        assert_eq!(sizes(&gallery), vec![16, 8]);

        // The next successful write must not resurrect anything.
        gallery.push(photo(24), &mut store).unwrap();
        assert_eq!(sizes(&Gallery::load(&store).unwrap()), vec![24, 16, 8]);
    }

    #[test]
    fn test_corrupt_gallery_is_parse_error() {
        let mut store = MemoryStore::new();
        store.set(KEY_GALLERY, "{\"not\": \"a list\"}".to_string()).unwrap();
        assert!(matches!(Gallery::load(&store), Err(SafariError::Parse { .. })));
    }

    #[test]
    fn test_export_writes_numbered_files() {
        let dir = tempdir().unwrap();
        let mut store = MemoryStore::new();
        let mut gallery = Gallery::default();
        gallery.push(photo(8), &mut store).unwrap();
        gallery.push(photo(16), &mut store).unwrap();

        let out = dir.path().join("export");
        let paths = gallery.export(&out).unwrap();

        assert_eq!(paths, vec![out.join("safari-000.jpg"), out.join("safari-001.jpg")]);
        let first = image::open(&paths[0]).unwrap();
        assert_eq!(first.width(), 16);
    }
}
