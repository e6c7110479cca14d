//! Unlock command implementation.
//!
//! Each line read from stdin counts as one tap on the hidden trigger;
//! with `--hold`, the first line presses and the next one releases.

use std::io::{self, BufRead};
use std::time::Instant;

use clap::Args;

use crate::admin::{AdminTrigger, Gesture};
use crate::config::Config;
use crate::error::Result;
use crate::output::Printer;
use crate::state::Flag;

/// Unlock admin mode with the secret gesture
#[derive(Args, Debug)]
pub struct UnlockArgs {
    /// Use a long press instead of taps
    #[arg(long, conflicts_with = "lock")]
    pub hold: bool,

    /// Leave admin mode
    #[arg(long)]
    pub lock: bool,
}

pub fn run(args: UnlockArgs, config: &Config, printer: &Printer) -> Result<()> {
    let (mut store, settings) = super::open_state(config)?;

    if args.lock {
        settings.apply(Flag::Admin, false, &mut store)?;
        printer.status("Locked", "admin mode off");
        return Ok(());
    }

    if settings.admin {
        printer.info("Unlocked", "admin mode is already on");
        return Ok(());
    }

    let mut trigger = AdminTrigger::new(&config.admin);
    if args.hold {
        printer.info("Hold", "press Enter, wait, then press Enter again");
    } else {
        printer.info("Tap", &format!("press Enter {} times quickly", config.admin.taps));
    }

    let stdin = io::stdin();
    if watch(stdin.lock(), &mut trigger, args.hold)? {
        settings.apply(Flag::Admin, true, &mut store)?;
        printer.status("Unlocked", "admin mode on");
    } else {
        printer.warning("Locked", "gesture not recognized");
    }

    Ok(())
}

/// Feed lines from `input` to `trigger` until it fires or input ends.
fn watch<R: BufRead>(input: R, trigger: &mut AdminTrigger, hold: bool) -> Result<bool> {
    let mut pressed = false;

    for line in input.lines() {
        line?;
        let now = Instant::now();

        let gesture = if !hold {
            trigger.tap(now)
        } else if pressed {
            pressed = false;
            trigger.release(now)
        } else {
            pressed = true;
            trigger.press(now);
            Gesture::Pending
        };

        if gesture == Gesture::Triggered {
            return Ok(true);
        }
    }

    Ok(false)
}
