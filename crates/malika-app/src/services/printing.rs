// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command handlers: each one drives the printer client and turns the outcome
// into a message for the person at the counter.

use malika_core::human_errors::humanize_error;
use malika_core::error::PrintError;
use malika_print::ThermalPrinter;
use tracing::{error, info};

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Find and connect to a printer, then report it.
    Scan,
    /// Print text read from stdin.
    Print,
}

impl Command {
    /// Parse the first CLI argument. No argument means `print`.
    pub fn parse(arg: Option<&str>) -> Option<Self> {
        match arg {
            None | Some("print") => Some(Self::Print),
            Some("scan") => Some(Self::Scan),
            Some(_) => None,
        }
    }
}

/// Connect and report the printer. Returns whether a printer was found.
pub async fn scan(printer: &ThermalPrinter) -> bool {
    match printer.try_scan_and_connect().await {
        Ok(()) => {
            if let Some(info) = printer.device_info() {
                info!(name = %info.name, id = %info.id, "printer ready");
                println!("Connected to {} ({})", info.name, info.id);
            }
            printer.disconnect().await;
            true
        }
        Err(e) => {
            report(&e);
            false
        }
    }
}

/// Print one receipt. Returns whether it printed.
pub async fn print(printer: &ThermalPrinter, text: &str) -> bool {
    let result = printer.try_print(text).await;
    printer.disconnect().await;
    match result {
        Ok(()) => {
            println!("Printed {} characters", text.chars().count());
            true
        }
        Err(e) => {
            report(&e);
            false
        }
    }
}

fn report(err: &PrintError) {
    let human = humanize_error(err);
    error!(error = %err, retriable = human.retriable, "printing failed");
    eprintln!("{}\n{}", human.message, human.suggestion);
}
