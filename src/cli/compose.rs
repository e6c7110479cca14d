//! Compose command implementation.
//!
//! Frames each input photo, writes the JPEG to the output directory and,
//! with `--add`, prepends it to the gallery.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use walkdir::WalkDir;

use crate::capture::{CaptureOutcome, CaptureSession, HandleTable};
use crate::compose::{Compositor, ImageLoader, ImageSource, OverlayStore};
use crate::config::Config;
use crate::error::{Result, SafariError};
use crate::output::{display_path, human_bytes, plural, Printer};
use crate::state::Gallery;

/// Extensions picked up when walking a directory.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"];

/// Frame photos and optionally add them to the gallery
#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Photos, or directories to search for photos
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory (default: `output` from safari.yaml)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Frame overlay to use instead of the configured one
    #[arg(long)]
    pub overlay: Option<PathBuf>,

    /// Add each framed photo to the gallery
    #[arg(long)]
    pub add: bool,
}

pub fn run(args: ComposeArgs, config: &Config, printer: &Printer) -> Result<()> {
    let (mut store, settings) = super::open_state(config)?;
    if !settings.photo_safari_enabled {
        return Err(SafariError::Disabled {
            feature: "Photo safari".to_string(),
            help: Some("Enable it with `safari settings set photo-safari true`".to_string()),
        });
    }

    let photos = collect_inputs(&args.inputs);
    if photos.is_empty() {
        return Err(SafariError::Validation {
            message: "No photos found in the given inputs".to_string(),
            help: Some(format!("Supported extensions: {}", IMAGE_EXTENSIONS.join(", "))),
        });
    }

    let output = args.output.clone().unwrap_or_else(|| config.output.clone());
    fs::create_dir_all(&output).map_err(|e| SafariError::Io {
        path: output.clone(),
        message: format!("Failed to create output directory: {}", e),
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let compositor = Compositor::new(&config.compositor)?;
    let loader = ImageLoader::new();
    let overlays = OverlayStore::new(args.overlay.clone().unwrap_or_else(|| config.overlay.clone()));
    let mut gallery = if args.add {
        Some(Gallery::load(&store)?)
    } else {
        None
    };

    let handles = HandleTable::new();
    let mut written = 0;
    let mut first_error = None;

    for photo in &photos {
        let mut session = CaptureSession::with_handles(handles.clone());
        let ticket = session.begin(ImageSource::path(photo))?;
        printer.status("Compositing", &display_path(photo));

        let outcome = runtime.block_on(compositor.composite(&loader, ticket.source(), &overlays));
        match session.finish(ticket, outcome) {
            Ok(CaptureOutcome::Ready) => {}
            Ok(CaptureOutcome::Stale) => continue,
            // A broken frame fails every photo; stop at the first one.
            Err(e @ SafariError::Config { .. }) => return Err(e),
            Err(e) => {
                printer.error("Failed", &format!("{}: {}", display_path(photo), e));
                first_error.get_or_insert(e);
                continue;
            }
        }

        let Some(result) = session.take_preview() else {
            continue;
        };

        let out_path = output_path(&output, photo);
        result.write_to(&out_path)?;
        printer.info(
            "Wrote",
            &format!("{} ({})", display_path(&out_path), human_bytes(result.len())),
        );

        if let Some(gallery) = gallery.as_mut() {
            gallery.push(result, &mut store)?;
        }
        written += 1;
    }

    tracing::debug!(live_handles = handles.live(), "compose finished");

    if written == 0 {
        if let Some(e) = first_error {
            return Err(e);
        }
    }

    let mut summary = format!("{} to {}", plural(written, "photo", "photos"), display_path(&output));
    if let Some(gallery) = &gallery {
        summary.push_str(&format!(" (gallery now has {})", plural(gallery.len(), "photo", "photos")));
    }
    printer.status("Finished", &summary);

    Ok(())
}

/// Expand directories into the image files beneath them, sorted.
fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut photos = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file() && is_image(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            photos.extend(found);
        } else {
            photos.push(input.clone());
        }
    }

    photos
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// `<output>/<stem>-safari.jpg`
fn output_path(output: &Path, photo: &Path) -> PathBuf {
    let stem = photo
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("photo");
    output.join(format!("{}-safari.jpg", stem))
}
