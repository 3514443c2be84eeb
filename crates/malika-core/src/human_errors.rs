// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the staff member holding the phone.
//
// The printer client itself never shows UI. Callers turn a failure into a
// toast; this module gives them the wording.

use crate::error::PrintError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Radio blip or printer asleep; trying again usually works.
    Transient,
    /// The user has to do something (turn the printer on, grant permission).
    ActionRequired,
    /// Retrying will not help on this device.
    Permanent,
}

/// A plain-language error with a suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Short summary (toast title).
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether pressing "print" again is worth it.
    pub retriable: bool,
    pub severity: Severity,
}

impl HumanError {
    fn new(message: &str, suggestion: &str, retriable: bool, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            retriable,
            severity,
        }
    }
}

/// Convert a `PrintError` into wording a tour guide can act on.
pub fn humanize_error(err: &PrintError) -> HumanError {
    match err {
        PrintError::PlatformUnsupported => HumanError::new(
            "Printing isn't available here.",
            "Open the Malika Tour app on your phone to print receipts.",
            false,
            Severity::Permanent,
        ),
        PrintError::Permission(_) => HumanError::new(
            "Bluetooth permission is needed.",
            "Allow Bluetooth and nearby devices for Malika Tour in your phone settings.",
            true,
            Severity::ActionRequired,
        ),
        PrintError::Scan(_) => HumanError::new(
            "We couldn't search for printers.",
            "Make sure Bluetooth is switched on, then try again.",
            true,
            Severity::ActionRequired,
        ),
        PrintError::NoDeviceFound => HumanError::new(
            "No printer found nearby.",
            "Turn the printer on and keep it within a few metres of your phone.",
            true,
            Severity::ActionRequired,
        ),
        PrintError::NoWritableCharacteristic => HumanError::new(
            "This device can't receive print jobs.",
            "Check that the nearby device is a Bluetooth thermal printer.",
            false,
            Severity::Permanent,
        ),
        PrintError::Connect(_) => HumanError::new(
            "Couldn't connect to the printer.",
            "Turn the printer off and on again, then retry.",
            true,
            Severity::Transient,
        ),
        PrintError::NotConnected => HumanError::new(
            "No printer connected.",
            "Press print again to search for a printer.",
            true,
            Severity::Transient,
        ),
        PrintError::Write(_) => HumanError::new(
            "The printer stopped responding while printing.",
            "Check the paper roll and battery, then print again.",
            true,
            Severity::Transient,
        ),
        PrintError::Config(_) | PrintError::Io(_) | PrintError::Serialization(_) => {
            HumanError::new(
                "Printer settings are damaged.",
                "Reset the printer settings to their defaults.",
                false,
                Severity::Permanent,
            )
        }
    }
}
