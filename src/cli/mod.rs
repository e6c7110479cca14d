pub mod completions;
pub mod compose;
pub mod gallery;
pub mod info;
pub mod init;
pub mod rsvp;
pub mod settings;
pub mod unlock;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::{Config, CONFIG_FILENAME};
use crate::error::Result;
use crate::state::{FileStore, Settings};

/// safari - photo frames, gallery and RSVPs for the party invitation
#[derive(Parser, Debug)]
#[command(name = "safari")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file
    #[arg(long, short, global = true, default_value = CONFIG_FILENAME)]
    pub config: PathBuf,

    /// More log output (-v, -vv, -vvv)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default safari.yaml
    Init(init::InitArgs),

    /// Show event details and feature status
    Info,

    /// Frame photos and optionally add them to the gallery
    Compose(compose::ComposeArgs),

    /// List, delete or export gallery photos
    Gallery(gallery::GalleryArgs),

    /// Show or change feature toggles
    Settings(settings::SettingsArgs),

    /// Send an RSVP to the event form
    Rsvp(rsvp::RsvpArgs),

    /// Unlock admin mode with the secret gesture
    Unlock(unlock::UnlockArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Load the config named on the command line, falling back to defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    let (config, found) = Config::load_or_default(path)?;
    if found {
        tracing::debug!(path = %path.display(), "loaded config");
    }
    Ok(config)
}

/// Open the persisted store and read the feature toggles.
pub(crate) fn open_state(config: &Config) -> Result<(FileStore, Settings)> {
    let store = FileStore::open(&config.store)?;
    let settings = Settings::load(&store)?;
    Ok((store, settings))
}
