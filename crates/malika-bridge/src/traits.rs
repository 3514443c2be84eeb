// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.
//
// The printer client only needs two things from the host: a yes/no answer to
// "are we running as the native app", and a Bluetooth LE transport.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use malika_core::error::Result;
use malika_core::types::{
    CandidateDevice, CharacteristicId, DeviceId, GattService, ScanFilter, ServiceId,
};

/// Invoked by the transport when a connected peripheral drops the link
/// without being asked to. May be called more than once.
pub type DisconnectCallback = Arc<dyn Fn() + Send + Sync>;

/// Unified bridge that groups the native capabilities the client uses.
pub trait PlatformBridge: Send + Sync {
    /// Human-readable platform name (e.g. "android", "web (stub)").
    fn platform_name(&self) -> &str;

    /// Whether we are running inside the native app shell. Browser contexts
    /// have no usable BLE stack and must answer `false`.
    fn is_native_app(&self) -> bool;

    /// The Bluetooth LE transport for this platform.
    fn bluetooth(&self) -> Arc<dyn BleTransport>;
}

/// Central-role Bluetooth LE operations.
#[async_trait]
pub trait BleTransport: Send + Sync {
    /// Bring up the radio / adapter. Safe to call repeatedly.
    async fn initialize(&self) -> Result<()>;

    /// Ask the OS for Bluetooth scan/connect permission.
    ///
    /// Implementations whose host grants permission outside Rust (desktop
    /// stacks, an Android activity that asked before loading us) return `Ok`
    /// without showing any prompt. Callers treat a failure as advisory and
    /// scan anyway.
    async fn request_permission(&self) -> Result<()>;

    /// Start scanning. Every advertisement matching `filter` is sent on the
    /// returned channel until [`stop_scan`](Self::stop_scan) is called. The
    /// same device may be reported more than once.
    async fn start_scan(&self, filter: &ScanFilter)
    -> Result<mpsc::UnboundedReceiver<CandidateDevice>>;

    /// Stop a running scan. A no-op when nothing is scanning.
    async fn stop_scan(&self) -> Result<()>;

    /// Open a link to `device`. `on_disconnect` fires on unsolicited drops,
    /// including ones that happen before [`services`](Self::services) returns.
    async fn connect(&self, device: &DeviceId, on_disconnect: DisconnectCallback) -> Result<()>;

    /// Discover and enumerate services and their characteristics in transport
    /// order. Callers disconnect the device themselves when this fails.
    async fn services(&self, device: &DeviceId) -> Result<Vec<GattService>>;

    /// Write one packet and wait for the transport to accept it.
    async fn write(
        &self,
        device: &DeviceId,
        service: &ServiceId,
        characteristic: &CharacteristicId,
        data: &[u8],
    ) -> Result<()>;

    /// Close the link to `device`.
    async fn disconnect(&self, device: &DeviceId) -> Result<()>;
}
