//! Photo compositing for the photo safari.
//!
//! This module turns an arbitrary guest photo into a framed square:
//! - `geometry` - scale-to-cover placement math
//! - `loader` - async decode of paths, uploads and `data:` URLs
//! - `mask` - pluggable "punch a hole" strategies for the frame
//! - `overlay` - the frame asset, loaded once and shared
//! - `compositor` - rendering, JPEG encoding and the load/join/timeout flow

mod compositor;
mod geometry;
mod loader;
mod mask;
mod overlay;

pub use compositor::{CompositeResult, Compositor, CompositorConfig, COMPOSITE_MEDIA_TYPE};
pub use geometry::{CoverPlacement, PixelRect};
pub use loader::{ImageLoader, ImageSource, DEFAULT_MAX_BYTES};
pub use mask::{MaskSpec, NoPunch, OverlayMask, RadialPunch, RectPunch};
pub use overlay::OverlayStore;
