// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Malika Print: receipt printing from the command line.
//
// Entry point. Initialises logging, loads the printer config, and runs the
// requested command against the native Bluetooth bridge.
//
//   malika-print scan           find a printer and report it
//   malika-print [print] < txt  print stdin as one receipt

mod services;

use std::io::Read;
use std::process::ExitCode;

use malika_core::PrinterConfig;
use malika_print::ThermalPrinter;

use services::data_dir;
use services::printing::{self, Command};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let arg = std::env::args().nth(1);
    let Some(command) = Command::parse(arg.as_deref()) else {
        eprintln!("usage: malika-print [scan|print]");
        return ExitCode::from(2);
    };

    let dir = data_dir::data_dir();
    let config = PrinterConfig::load_or_default(&data_dir::printer_config_path(&dir));
    tracing::info!(path = %dir.display(), ?command, "Malika Print starting");

    let printer = ThermalPrinter::for_platform(config);

    let ok = match command {
        Command::Scan => printing::scan(&printer).await,
        Command::Print => {
            let mut text = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut text) {
                tracing::error!(error = %e, "failed to read receipt text from stdin");
                return ExitCode::FAILURE;
            }
            printing::print(&printer, text.trim_end()).await
        }
    };

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
