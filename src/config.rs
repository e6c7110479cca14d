//! Project configuration (safari.yaml) parsing.
//!
//! The config names the frame asset, where state is persisted, and the
//! compositor, RSVP, event and admin-gesture settings. Every section has
//! defaults, so an empty or missing file is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::admin::AdminTriggerConfig;
use crate::compose::CompositorConfig;
use crate::error::{Result, SafariError};
use crate::event::EventDetails;
use crate::rsvp::RsvpConfig;

/// The name of the config file.
pub const CONFIG_FILENAME: &str = "safari.yaml";

/// Project configuration loaded from safari.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frame overlay drawn on top of every photo.
    #[serde(default = "default_overlay")]
    pub overlay: PathBuf,

    /// JSON file holding feature toggles and the gallery.
    #[serde(default = "default_store")]
    pub store: PathBuf,

    /// Directory for composited photos.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    pub compositor: CompositorConfig,

    pub rsvp: RsvpConfig,

    pub event: EventDetails,

    pub admin: AdminTriggerConfig,
}

fn default_overlay() -> PathBuf {
    PathBuf::from("assets/dino_frame.png")
}

fn default_store() -> PathBuf {
    PathBuf::from(".safari/store.json")
}

fn default_output() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overlay: default_overlay(),
            store: default_store(),
            output: default_output(),
            compositor: CompositorConfig::default(),
            rsvp: RsvpConfig::default(),
            event: EventDetails::default(),
            admin: AdminTriggerConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a safari.yaml file.
    ///
    /// Relative paths inside the file are resolved against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SafariError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        let config = Self::parse(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolve(base))
    }

    /// Load `path` if it exists, otherwise use defaults.
    ///
    /// Returns whether a file was found.
    pub fn load_or_default(path: &Path) -> Result<(Self, bool)> {
        if path.exists() {
            Ok((Self::load(path)?, true))
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok((Self::default(), false))
        }
    }

    /// Parse and validate config from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| SafariError::Parse {
                message: format!("Invalid config: {}", e),
                help: Some(format!("Check {} syntax", CONFIG_FILENAME)),
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot work.
    pub fn validate(&self) -> Result<()> {
        self.compositor.validate()?;
        self.rsvp.validate()?;
        Ok(())
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| SafariError::Parse {
            message: format!("Failed to serialize config: {}", e),
            help: None,
        })
    }

    fn resolve(mut self, base: &Path) -> Self {
        for path in [&mut self.overlay, &mut self.store, &mut self.output] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }
}
