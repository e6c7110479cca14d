//! Info command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::{display_path, Printer};
use crate::state::Gallery;

pub fn run(config: &Config, printer: &Printer) -> Result<()> {
    let (store, settings) = super::open_state(config)?;

    println!("{}", printer.bold("Event"));
    for (label, value) in config.event.rows() {
        println!("  {:<10} {}", label, value);
    }

    println!();
    println!("{}", printer.bold("Features"));
    super::settings::show(&settings, printer);

    if settings.photo_safari_enabled {
        let gallery = Gallery::load(&store)?;
        println!();
        println!("{}", printer.bold("Photo safari"));
        println!("  {:<10} {}", "Frame", display_path(&config.overlay));
        println!("  {:<10} {}", "Gallery", gallery.len());
    }

    Ok(())
}
