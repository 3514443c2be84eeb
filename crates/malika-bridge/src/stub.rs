// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for web builds where no native BLE stack exists.
//
// Every transport method returns `PlatformUnsupported`; the printer client
// checks `is_native_app` first and never gets this far in practice.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use malika_core::error::{PrintError, Result};
use malika_core::types::{
    CandidateDevice, CharacteristicId, DeviceId, GattService, ScanFilter, ServiceId,
};

use crate::traits::*;

/// Bridge returned on targets without native Bluetooth.
pub struct StubBridge {
    transport: Arc<StubTransport>,
}

impl StubBridge {
    pub fn new() -> Self {
        Self {
            transport: Arc::new(StubTransport),
        }
    }
}

impl Default for StubBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "web (stub)"
    }

    fn is_native_app(&self) -> bool {
        false
    }

    fn bluetooth(&self) -> Arc<dyn BleTransport> {
        self.transport.clone()
    }
}

/// Transport that refuses everything.
pub struct StubTransport;

#[async_trait]
impl BleTransport for StubTransport {
    async fn initialize(&self) -> Result<()> {
        tracing::warn!("BleTransport::initialize called on stub bridge");
        Err(PrintError::PlatformUnsupported)
    }

    async fn request_permission(&self) -> Result<()> {
        Err(PrintError::PlatformUnsupported)
    }

    async fn start_scan(
        &self,
        _filter: &ScanFilter,
    ) -> Result<mpsc::UnboundedReceiver<CandidateDevice>> {
        tracing::warn!("BleTransport::start_scan called on stub bridge");
        Err(PrintError::PlatformUnsupported)
    }

    async fn stop_scan(&self) -> Result<()> {
        Ok(())
    }

    async fn connect(&self, _device: &DeviceId, _on_disconnect: DisconnectCallback) -> Result<()> {
        Err(PrintError::PlatformUnsupported)
    }

    async fn services(&self, _device: &DeviceId) -> Result<Vec<GattService>> {
        Err(PrintError::PlatformUnsupported)
    }

    async fn write(
        &self,
        _device: &DeviceId,
        _service: &ServiceId,
        _characteristic: &CharacteristicId,
        _data: &[u8],
    ) -> Result<()> {
        Err(PrintError::PlatformUnsupported)
    }

    async fn disconnect(&self, _device: &DeviceId) -> Result<()> {
        Ok(())
    }
}
