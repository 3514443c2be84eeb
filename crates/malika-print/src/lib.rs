// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Malika Print: Bluetooth LE thermal printer client.  Finds a nearby receipt
// printer, negotiates a writable characteristic, and sends ESC/POS-wrapped
// text in small packets with one reconnect-and-retry on failure.

pub mod client;
pub mod discovery;
pub mod escpos;
pub mod matcher;
pub mod session;
pub mod transmit;

#[cfg(test)]
mod testing;

pub use client::ThermalPrinter;
pub use escpos::receipt_payload;
pub use matcher::is_probable_printer;
