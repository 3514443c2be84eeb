// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the BLE thermal printer client.
//
// Transport identifiers are opaque newtypes so that a device id can never be
// passed where a characteristic is expected, and neither mixes with free text.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque platform identifier of a BLE peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// GATT service handle on a connected peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(pub Uuid);

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// GATT characteristic handle on a connected peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacteristicId(pub Uuid);

impl fmt::Display for CharacteristicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A peripheral seen during a scan. Never retained past the connect decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDevice {
    pub id: DeviceId,
    /// Advertised local name, if the peripheral broadcasts one.
    pub name: Option<String>,
}

impl CandidateDevice {
    /// Name for logs and [`DeviceInfo`]; falls back to the id.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.to_string())
    }
}

/// Properties advertised by a GATT characteristic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacteristicProperties {
    pub read: bool,
    pub write: bool,
    pub write_without_response: bool,
    pub notify: bool,
}

impl CharacteristicProperties {
    /// A characteristic is usable for printing if it accepts either write kind.
    pub fn is_writable(&self) -> bool {
        self.write || self.write_without_response
    }
}

/// A characteristic as reported by service enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattCharacteristic {
    pub id: CharacteristicId,
    pub properties: CharacteristicProperties,
}

/// A service and its characteristics, in the order the transport reported them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattService {
    pub id: ServiceId,
    pub characteristics: Vec<GattCharacteristic>,
}

/// Which advertisements a scan should report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanFilter {
    /// Only report peripherals advertising one of these services.
    /// Empty means no service filter.
    pub services: Vec<Uuid>,
}

impl ScanFilter {
    pub fn unfiltered() -> Self {
        Self::default()
    }

    pub fn services(services: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            services: services.into_iter().collect(),
        }
    }
}

/// Caller-facing snapshot of the connected printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub id: DeviceId,
    pub connected_at: DateTime<Utc>,
}
