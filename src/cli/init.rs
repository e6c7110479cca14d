//! Init command implementation.
//!
//! Writes a `safari.yaml` holding every default, ready to edit.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::config::{Config, CONFIG_FILENAME};
use crate::error::{Result, SafariError};
use crate::output::{display_path, Printer};

/// Write a default safari.yaml
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing safari.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let config_path = args.path.join(CONFIG_FILENAME);

    if config_path.exists() && !args.force {
        return Err(SafariError::Config {
            message: format!("{} already exists", CONFIG_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    let config = Config::default();
    fs::write(&config_path, config.to_yaml()?).map_err(|e| SafariError::Io {
        path: config_path.clone(),
        message: format!("Failed to write config: {}", e),
    })?;

    printer.status("Created", &display_path(&config_path));
    if !args.path.join(&config.overlay).exists() {
        printer.warning(
            "Missing",
            &format!("frame overlay {} (add it before composing)", config.overlay.display()),
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_config() {
        let dir = tempdir().unwrap();

        let args = InitArgs {
            path: dir.path().to_path_buf(),
            force: false,
        };
        run(args, &Printer::plain()).unwrap();

        let config_path = dir.path().join(CONFIG_FILENAME);
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("overlay: assets/dino_frame.png"));
        assert_eq!(Config::parse(&content).unwrap(), Config::default());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "output: build\n").unwrap();

        let args = InitArgs {
            path: dir.path().to_path_buf(),
            force: false,
        };
        let result = run(args, &Printer::plain());
        assert!(result.is_err());
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "output: build\n").unwrap();

        let args = InitArgs {
            path: dir.path().to_path_buf(),
            force: true,
        };
        run(args, &Printer::plain()).unwrap();

        let content = fs::read_to_string(dir.path().join(CONFIG_FILENAME)).unwrap();
        assert!(content.contains("output: dist"));
    }
}
