//! RSVP command implementation.

use clap::Args;

use crate::config::Config;
use crate::error::Result;
use crate::output::Printer;
use crate::rsvp::{Attendance, RsvpClient, RsvpForm, MAX_ADULTS, MAX_CHILDREN};

/// Send an RSVP to the event form
#[derive(Args, Debug)]
pub struct RsvpArgs {
    /// Guest name
    #[arg(long)]
    pub name: String,

    /// Reply that the guest can't come
    #[arg(long)]
    pub not_attending: bool,

    /// Number of adults
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=MAX_ADULTS as i64))]
    pub adults: u32,

    /// Number of children
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=MAX_CHILDREN as i64))]
    pub children: u32,

    /// Validate and print the encoded form without sending it
    #[arg(long)]
    pub dry_run: bool,
}

impl RsvpArgs {
    fn form(&self) -> RsvpForm {
        RsvpForm {
            guest_name: self.name.clone(),
            attendance: Attendance::from_attending(!self.not_attending),
            adults: self.adults,
            children: self.children,
        }
    }
}

pub fn run(args: RsvpArgs, config: &Config, printer: &Printer) -> Result<()> {
    let form = args.form();

    if args.dry_run {
        config.rsvp.validate()?;
        form.validate()?;
        println!("{}", form.encode(&config.rsvp.fields));
        printer.info("Dry run", "nothing was sent");
        return Ok(());
    }

    let (_, settings) = super::open_state(config)?;
    let client = RsvpClient::from_config(&config.rsvp)?;
    client.submit(&form, &settings)?;

    printer.status(
        "Sent",
        &format!("{} ({})", form.guest_name.trim(), form.attendance),
    );
    Ok(())
}
