//! Runtime feature toggles.
//!
//! Flags are read from storage once; every change goes through
//! [`Settings::apply`], which persists the flag and returns the new value.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SafariError};

use super::store::{Storage, KEY_ADMIN, KEY_PHOTO_SAFARI_ENABLED, KEY_RSVP_ENABLED};

/// Persisted feature toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// RSVP form accepts submissions. Closed by default.
    pub rsvp_enabled: bool,
    /// Photo capture and gallery are shown.
    pub photo_safari_enabled: bool,
    /// Admin-only actions such as deleting gallery photos are allowed.
    pub admin: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rsvp_enabled: false,
            photo_safari_enabled: true,
            admin: false,
        }
    }
}

/// Names a single flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Flag {
    Rsvp,
    PhotoSafari,
    Admin,
}

impl Flag {
    pub const ALL: [Flag; 3] = [Flag::Rsvp, Flag::PhotoSafari, Flag::Admin];

    fn key(self) -> &'static str {
        match self {
            Flag::Rsvp => KEY_RSVP_ENABLED,
            Flag::PhotoSafari => KEY_PHOTO_SAFARI_ENABLED,
            Flag::Admin => KEY_ADMIN,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Flag::Rsvp => "rsvp",
            Flag::PhotoSafari => "photo-safari",
            Flag::Admin => "admin",
        };
        f.write_str(name)
    }
}

impl FromStr for Flag {
    type Err = SafariError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rsvp" => Ok(Flag::Rsvp),
            "photo-safari" | "photo_safari" | "photos" => Ok(Flag::PhotoSafari),
            "admin" => Ok(Flag::Admin),
            other => Err(SafariError::Parse {
                message: format!("Unknown setting: {}", other),
                help: Some("Expected one of: rsvp, photo-safari, admin".to_string()),
            }),
        }
    }
}

impl Settings {
    /// Read all flags from `store`, using defaults for missing or malformed
    /// values.
    pub fn load(store: &dyn Storage) -> Result<Self> {
        let defaults = Self::default();
        let mut settings = defaults;
        for flag in Flag::ALL {
            let value = read_flag(store, flag)?.unwrap_or_else(|| defaults.get(flag));
            settings.set(flag, value);
        }
        Ok(settings)
    }

    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::Rsvp => self.rsvp_enabled,
            Flag::PhotoSafari => self.photo_safari_enabled,
            Flag::Admin => self.admin,
        }
    }

    fn set(&mut self, flag: Flag, value: bool) {
        match flag {
            Flag::Rsvp => self.rsvp_enabled = value,
            Flag::PhotoSafari => self.photo_safari_enabled = value,
            Flag::Admin => self.admin = value,
        }
    }

    /// Set `flag` to `value`, persist it, and return the updated settings.
    pub fn apply(self, flag: Flag, value: bool, store: &mut dyn Storage) -> Result<Self> {
        store.set(flag.key(), value.to_string())?;
        tracing::info!(%flag, value, "setting updated");

        let mut next = self;
        next.set(flag, value);
        Ok(next)
    }

    /// Fail unless admin mode is on.
    pub fn require_admin(&self, action: &str) -> Result<()> {
        if self.admin {
            Ok(())
        } else {
            Err(SafariError::Forbidden {
                action: action.to_string(),
            })
        }
    }
}

fn read_flag(store: &dyn Storage, flag: Flag) -> Result<Option<bool>> {
    let Some(raw) = store.get(flag.key())? else {
        return Ok(None);
    };

    match raw.trim() {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        other => {
            tracing::warn!(key = flag.key(), value = other, "ignoring malformed flag");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::store::MemoryStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_when_store_empty() {
        let store = MemoryStore::new();
        let settings = Settings::load(&store).unwrap();

        assert_eq!(
            settings,
            Settings {
                rsvp_enabled: false,
                photo_safari_enabled: true,
                admin: false,
            }
        );
    }

    #[test]
    fn test_apply_persists() {
        let mut store = MemoryStore::new();
        let settings = Settings::load(&store).unwrap();

        let settings = settings.apply(Flag::Rsvp, true, &mut store).unwrap();
        let settings = settings.apply(Flag::PhotoSafari, false, &mut store).unwrap();

        assert!(settings.rsvp_enabled);
        assert!(!settings.photo_safari_enabled);
        assert_eq!(store.get(KEY_RSVP_ENABLED).unwrap().as_deref(), Some("true"));
        assert_eq!(Settings::load(&store).unwrap(), settings);
    }

    #[test]
    fn test_apply_leaves_previous_value_untouched() {
        let mut store = MemoryStore::new();
        let before = Settings::default();
        let after = before.apply(Flag::Admin, true, &mut store).unwrap();

        assert!(!before.admin);
        assert!(after.admin);
    }

    #[test]
    fn test_malformed_flag_uses_default() {
        let mut store = MemoryStore::new();
        store.set(KEY_PHOTO_SAFARI_ENABLED, "yes please".to_string()).unwrap();
        store.set(KEY_ADMIN, "true".to_string()).unwrap();

        let settings = Settings::load(&store).unwrap();
        assert!(settings.photo_safari_enabled);
        assert!(settings.admin);
    }

    #[test]
    fn test_require_admin() {
        let settings = Settings::default();
        assert!(matches!(
            settings.require_admin("Deleting photos"),
            Err(SafariError::Forbidden { .. })
        ));

        let admin = Settings {
            admin: true,
            ..settings
        };
        assert!(admin.require_admin("Deleting photos").is_ok());
    }

    #[test]
    fn test_flag_parse() {
        assert_eq!("photo-safari".parse::<Flag>().unwrap(), Flag::PhotoSafari);
        assert_eq!("ADMIN".parse::<Flag>().unwrap(), Flag::Admin);
        assert!("volume".parse::<Flag>().is_err());
    }
}
