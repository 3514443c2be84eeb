// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer client configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{PrintError, Result};

/// BLE services commonly exposed by cheap thermal receipt printers, plus the
/// generic serial-over-BLE services many of them reuse.
pub const DEFAULT_PRINTER_SERVICES: [Uuid; 6] = [
    // Generic "18F0" printer service (most 58mm Chinese printers)
    Uuid::from_u128(0x000018f0_0000_1000_8000_00805f9b34fb),
    // Vendor printer service seen on Xprinter / Goojprt units
    Uuid::from_u128(0xe7810a71_73ae_499d_8c15_faa9aef0c3f2),
    // ISSC / Microchip transparent UART
    Uuid::from_u128(0x49535343_fe7d_4ae5_8fa9_9fafd205e455),
    // Serial Port Profile UUID advertised over BLE by dual-mode printers
    Uuid::from_u128(0x00001101_0000_1000_8000_00805f9b34fb),
    // HM-10 style serial module
    Uuid::from_u128(0x0000ffe0_0000_1000_8000_00805f9b34fb),
    // "FF00" vendor service (MTP / PeriPage family)
    Uuid::from_u128(0x0000ff00_0000_1000_8000_00805f9b34fb),
];

/// Advertised-name fragments that mark a peripheral as a probable printer.
pub const DEFAULT_NAME_KEYWORDS: [&str; 8] = [
    "thermal", "printer", "pos", "mtp", "epson", "star", "bixolon", "citizen",
];

/// Persistent printer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// How long the service-filtered scan runs (milliseconds).
    pub named_scan_window_ms: u64,
    /// How long the unfiltered fallback scan runs (milliseconds).
    pub fallback_scan_window_ms: u64,
    /// Service allow-list for the first scan.
    pub printer_services: Vec<Uuid>,
    /// Case-insensitive name fragments accepted by the first scan.
    pub name_keywords: Vec<String>,
    /// Bytes per BLE write.
    pub chunk_size: usize,
    /// Settling delay between consecutive chunk writes (milliseconds).
    pub chunk_delay_ms: u64,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            named_scan_window_ms: 8_000,
            fallback_scan_window_ms: 5_000,
            printer_services: DEFAULT_PRINTER_SERVICES.to_vec(),
            name_keywords: DEFAULT_NAME_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            chunk_size: 20,
            chunk_delay_ms: 20,
        }
    }
}

impl PrinterConfig {
    pub fn named_scan_window(&self) -> Duration {
        Duration::from_millis(self.named_scan_window_ms)
    }

    pub fn fallback_scan_window(&self) -> Duration {
        Duration::from_millis(self.fallback_scan_window_ms)
    }

    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    /// Reject settings the transmitter cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(PrintError::Config("chunk_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file, falling back to defaults when it is missing
    /// or unusable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no printer config, using defaults");
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable printer config");
                Self::default()
            }
        }
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}
