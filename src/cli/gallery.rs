//! Gallery command implementation.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::config::Config;
use crate::error::{Result, SafariError};
use crate::output::{display_path, human_bytes, plural, Printer};
use crate::state::Gallery;

/// List, delete or export gallery photos
#[derive(Args, Debug)]
pub struct GalleryArgs {
    #[command(subcommand)]
    pub command: GalleryCommand,
}

#[derive(Subcommand, Debug)]
pub enum GalleryCommand {
    /// List photos, newest first
    List {
        /// Print JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Delete the photo at INDEX (admin only)
    Remove {
        /// Position shown by `gallery list`
        index: usize,
    },

    /// Write every photo to a directory
    Export {
        /// Target directory
        #[arg(default_value = "gallery")]
        dir: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct ListedPhoto {
    index: usize,
    width: u32,
    height: u32,
    bytes: usize,
}

pub fn run(args: GalleryArgs, config: &Config, printer: &Printer) -> Result<()> {
    let (mut store, settings) = super::open_state(config)?;
    let mut gallery = Gallery::load(&store)?;

    match args.command {
        GalleryCommand::List { json } => {
            if json {
                let listed: Vec<ListedPhoto> = gallery
                    .entries()
                    .map(|entry| ListedPhoto {
                        index: entry.index,
                        width: entry.photo.width(),
                        height: entry.photo.height(),
                        bytes: entry.photo.len(),
                    })
                    .collect();
                let out = serde_json::to_string_pretty(&listed).map_err(|e| SafariError::Encode {
                    message: format!("Failed to serialize gallery: {}", e),
                })?;
                println!("{}", out);
                return Ok(());
            }

            if gallery.is_empty() {
                printer.info("Gallery", "empty");
                return Ok(());
            }

            for entry in gallery.entries() {
                println!(
                    "  {:>3}  {}x{}  {}",
                    entry.index,
                    entry.photo.width(),
                    entry.photo.height(),
                    printer.dim(&human_bytes(entry.photo.len()))
                );
            }
            printer.info("Gallery", &plural(gallery.len(), "photo", "photos"));
        }

        GalleryCommand::Remove { index } => {
            settings.require_admin("delete gallery photos")?;
            gallery.remove(index, &mut store)?;
            printer.status(
                "Removed",
                &format!("photo {} ({} left)", index, plural(gallery.len(), "photo", "photos")),
            );
        }

        GalleryCommand::Export { dir } => {
            let written = gallery.export(&dir)?;
            printer.status(
                "Exported",
                &format!("{} to {}", plural(written.len(), "photo", "photos"), display_path(&dir)),
            );
        }
    }

    Ok(())
}
