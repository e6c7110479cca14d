//! Persisted state: storage backend, feature toggles and the gallery.

mod gallery;
mod settings;
mod store;

pub use gallery::{Gallery, GalleryEntry};
pub use settings::{Flag, Settings};
pub use store::{
    FileStore, MemoryStore, Storage, KEY_ADMIN, KEY_GALLERY, KEY_PHOTO_SAFARI_ENABLED,
    KEY_RSVP_ENABLED,
};
