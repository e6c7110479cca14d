//! Settings command implementation.

use clap::{ArgAction, Args, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::output::Printer;
use crate::state::{Flag, Settings};

/// Show or change feature toggles
#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: Option<SettingsCommand>,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print every flag (default)
    Show,

    /// Turn a flag on or off
    Set {
        #[arg(value_enum)]
        flag: Flag,

        #[arg(action = ArgAction::Set)]
        value: bool,
    },
}

pub fn run(args: SettingsArgs, config: &Config, printer: &Printer) -> Result<()> {
    let (mut store, settings) = super::open_state(config)?;

    match args.command.unwrap_or(SettingsCommand::Show) {
        SettingsCommand::Show => show(&settings, printer),
        SettingsCommand::Set { flag, value } => {
            let updated = settings.apply(flag, value, &mut store)?;
            printer.status("Set", &format!("{} = {}", flag, printer.flag(updated.get(flag))));
        }
    }

    Ok(())
}

pub(crate) fn show(settings: &Settings, printer: &Printer) {
    for flag in Flag::ALL {
        println!("  {:<14} {}", flag.to_string(), printer.flag(settings.get(flag)));
    }
}
