//! End-to-end: capture a photo, frame it, keep it in the gallery and read
//! it back from disk.

use std::sync::Arc;

use image::{ImageFormat, Rgba, RgbaImage};
use tempfile::tempdir;

use safari::{
    CaptureOutcome, CaptureSession, CompositeResult, Compositor, CompositorConfig, FileStore,
    Gallery, ImageLoader, ImageSource, OverlayStore, Settings,
};

fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

#[tokio::test]
async fn test_capture_to_gallery_roundtrip() {
    let dir = tempdir().unwrap();
    let frame_path = dir.path().join("frame.png");
    RgbaImage::from_fn(64, 64, |x, _| {
        if x < 32 {
            Rgba([10, 100, 10, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
    .save_with_format(&frame_path, ImageFormat::Png)
    .unwrap();

    let compositor = Compositor::new(&CompositorConfig {
        size: 64,
        ..Default::default()
    })
    .unwrap();
    let loader = ImageLoader::new();
    let overlays = OverlayStore::new(&frame_path);

    let photo = RgbaImage::from_pixel(120, 80, Rgba([220, 40, 40, 255]));
    let bytes: Arc<[u8]> = png_bytes(&photo).into();

    let mut session = CaptureSession::new();
    let ticket = session.begin(ImageSource::bytes("guest.png", bytes)).unwrap();
    assert_eq!(session.handles().live(), 1);

    let outcome = compositor.composite(&loader, ticket.source(), &overlays).await;
    assert_eq!(session.finish(ticket, outcome).unwrap(), CaptureOutcome::Ready);
    assert_eq!(session.handles().live(), 0);

    let result = session.take_preview().unwrap();
    assert_eq!((result.width(), result.height()), (64, 64));

    let store_path = dir.path().join("state").join("store.json");
    let mut store = FileStore::open(&store_path).unwrap();
    assert!(Settings::load(&store).unwrap().photo_safari_enabled);

    let mut gallery = Gallery::load(&store).unwrap();
    gallery.push(result.clone(), &mut store).unwrap();

    let reopened = FileStore::open(&store_path).unwrap();
    let reloaded = Gallery::load(&reopened).unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.get(0).unwrap().bytes(), result.bytes());

    let url = reloaded.get(0).unwrap().to_data_url();
    assert!(url.starts_with("data:image/jpeg;base64,"));
    let decoded = CompositeResult::from_data_url(&url).unwrap();
    assert_eq!(decoded.width(), 64);

    // The frame's opaque left band survives the JPEG round trip.
    let framed = image::load_from_memory(decoded.bytes()).unwrap().to_rgb8();
    let left = framed.get_pixel(4, 32);
    let centre = framed.get_pixel(56, 32);
    assert!(left[1] > left[0], "expected frame green, got {:?}", left);
    assert!(centre[0] > 150, "expected photo red, got {:?}", centre);
}

#[tokio::test]
async fn test_undecodable_upload_leaves_no_preview() {
    let dir = tempdir().unwrap();
    let compositor = Compositor::new(&CompositorConfig::default()).unwrap();
    let loader = ImageLoader::new();
    let overlays = OverlayStore::from_image(dir.path().join("frame.png"), RgbaImage::new(4, 4));

    let mut session = CaptureSession::new();
    let ticket = session
        .begin(ImageSource::bytes("note.txt", b"hello".to_vec()))
        .unwrap();
    let outcome = compositor.composite(&loader, ticket.source(), &overlays).await;

    let err = session.finish(ticket, outcome).unwrap_err();
    assert!(err.is_retryable());
    assert!(session.preview().is_none());
    assert!(session.can_capture());
    assert_eq!(session.handles().live(), 0);
}
