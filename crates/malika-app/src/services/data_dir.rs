// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::{Path, PathBuf};

/// File name of the persisted printer settings.
pub const PRINTER_CONFIG_FILE: &str = "printer.json";

/// Return the application data directory, creating it if needed.
///
/// On desktop this uses a conventional location. On mobile the host shell
/// passes its documents directory through `MALIKA_DATA_DIR` instead.
pub fn data_dir() -> PathBuf {
    let dir = match std::env::var("MALIKA_DATA_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => app_dir_in(&dirs_fallback()),
    };
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// Where the printer config lives inside `data_dir`.
pub fn printer_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(PRINTER_CONFIG_FILE)
}

fn app_dir_in(base: &Path) -> PathBuf {
    base.join("malika")
}

fn dirs_fallback() -> PathBuf {
    // Try XDG data dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort
    PathBuf::from("/tmp")
}
