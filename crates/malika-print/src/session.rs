// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The single active printer binding.
//
// Device, service and characteristic are stored together in one `Option`, so
// the session is either fully bound or empty; there is no state where only
// some of the three are set.

use chrono::{DateTime, Utc};
use tracing::debug;

use malika_core::types::{CharacteristicId, DeviceId, DeviceInfo, ServiceId};

/// The negotiated write path on a connected printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveBinding {
    pub device: DeviceId,
    pub device_name: String,
    pub service: ServiceId,
    pub characteristic: CharacteristicId,
    pub connected_at: DateTime<Utc>,
}

/// Connection state owned by one client.
#[derive(Debug, Default)]
pub struct PrinterSession {
    binding: Option<ActiveBinding>,
}

impl PrinterSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.binding.is_some()
    }

    pub fn binding(&self) -> Option<&ActiveBinding> {
        self.binding.as_ref()
    }

    pub fn device_info(&self) -> Option<DeviceInfo> {
        self.binding.as_ref().map(|b| DeviceInfo {
            name: b.device_name.clone(),
            id: b.device.clone(),
            connected_at: b.connected_at,
        })
    }

    /// Install a freshly negotiated binding, replacing any previous one.
    pub fn bind(&mut self, binding: ActiveBinding) {
        self.binding = Some(binding);
    }

    /// Forget the binding. Returns what was bound, if anything.
    pub fn clear(&mut self) -> Option<ActiveBinding> {
        self.binding.take()
    }

    /// Forget the binding only if it belongs to `device`.
    ///
    /// Used by transport disconnect callbacks: a late callback from an older
    /// connection must not tear down the current one.
    pub fn clear_if_device(&mut self, device: &DeviceId) -> bool {
        match &self.binding {
            Some(binding) if &binding.device == device => {
                self.binding = None;
                true
            }
            _ => {
                debug!(device = %device, "disconnect callback for inactive device ignored");
                false
            }
        }
    }
}
