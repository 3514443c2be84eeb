// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the thermal printer client.

use thiserror::Error;

/// Top-level error type for all printer operations.
#[derive(Debug, Error)]
pub enum PrintError {
    // -- Platform --
    #[error("bluetooth printing is only available in the native app")]
    PlatformUnsupported,

    #[error("bluetooth permission request failed: {0}")]
    Permission(String),

    // -- Discovery --
    #[error("bluetooth scan failed: {0}")]
    Scan(String),

    #[error("no bluetooth printer found nearby")]
    NoDeviceFound,

    // -- Connection --
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("device exposes no writable characteristic")]
    NoWritableCharacteristic,

    #[error("no printer connected")]
    NotConnected,

    // -- Transmission --
    #[error("write failed: {0}")]
    Write(String),

    // -- Configuration / persistence --
    #[error("invalid printer configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrintError>;
