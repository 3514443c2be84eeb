// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Thermal printer client: the caller-facing API.
//
// Lifecycle: Disconnected -> (scan + connect) -> Connected. A print while
// disconnected scans first. A failed transmission gets exactly one recovery
// (disconnect, rescan, retry the whole receipt); there is no resume from the
// failed packet and no backoff.
//
// Every operation that changes the session holds `op_lock` for its whole
// duration, so concurrent callers queue. The session itself sits behind a
// plain mutex that is only held for field access, which lets the transport's
// disconnect callback and `is_connected` run while a print is in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{info, warn};

use malika_bridge::{BleTransport, DisconnectCallback, PlatformBridge, platform_bridge};
use malika_core::PrinterConfig;
use malika_core::error::{PrintError, Result};
use malika_core::types::{CandidateDevice, CharacteristicId, DeviceInfo, GattService, ServiceId};

use crate::discovery::discover_candidates;
use crate::escpos::receipt_payload;
use crate::session::{ActiveBinding, PrinterSession};
use crate::transmit::send_chunked;

/// First attempt plus one retry after reconnecting.
pub const MAX_PRINT_ATTEMPTS: u32 = 2;

/// BLE thermal printer client. Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct ThermalPrinter {
    inner: Arc<Inner>,
}

struct Inner {
    bridge: Box<dyn PlatformBridge>,
    transport: Arc<dyn BleTransport>,
    config: PrinterConfig,
    session: Arc<Mutex<PrinterSession>>,
    op_lock: tokio::sync::Mutex<()>,
}

impl ThermalPrinter {
    /// Build a client. A config that fails [`PrinterConfig::validate`] is
    /// replaced by the defaults.
    pub fn new(bridge: Box<dyn PlatformBridge>, config: PrinterConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(error = %e, "invalid printer config, using defaults");
                PrinterConfig::default()
            }
        };
        let transport = bridge.bluetooth();
        Self {
            inner: Arc::new(Inner {
                bridge,
                transport,
                config,
                session: Arc::new(Mutex::new(PrinterSession::new())),
                op_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Client on this target's native bridge.
    pub fn for_platform(config: PrinterConfig) -> Self {
        Self::new(platform_bridge(), config)
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.inner.config
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.inner.session).is_connected()
    }

    /// Name and id of the connected printer.
    pub fn device_info(&self) -> Option<DeviceInfo> {
        lock(&self.inner.session).device_info()
    }

    /// Find a printer and connect to it. Never fails loudly: every error is
    /// logged and reported as `false`.
    pub async fn scan_and_connect(&self) -> bool {
        match self.try_scan_and_connect().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "printer discovery failed");
                false
            }
        }
    }

    /// Like [`scan_and_connect`](Self::scan_and_connect) but keeps the error
    /// for callers that want to explain the failure.
    ///
    /// An existing session is released first.
    pub async fn try_scan_and_connect(&self) -> Result<()> {
        let _op = self.inner.op_lock.lock().await;
        self.disconnect_locked().await;
        self.scan_and_connect_locked().await
    }

    /// Print `text` as a centred receipt. Returns `false` on any failure.
    pub async fn print(&self, text: &str) -> bool {
        match self.try_print(text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "print failed");
                false
            }
        }
    }

    /// Like [`print`](Self::print) but returns the final error.
    pub async fn try_print(&self, text: &str) -> Result<()> {
        let _op = self.inner.op_lock.lock().await;
        let payload = receipt_payload(text);

        let mut attempt = 1;
        loop {
            let binding = match self.binding() {
                Some(binding) => binding,
                None => {
                    self.scan_and_connect_locked().await?;
                    self.binding().ok_or(PrintError::NotConnected)?
                }
            };

            match send_chunked(
                self.inner.transport.as_ref(),
                &binding,
                &payload,
                self.inner.config.chunk_size,
                self.inner.config.chunk_delay(),
            )
            .await
            {
                Ok(chunks) => {
                    info!(
                        device = %binding.device,
                        bytes = payload.len(),
                        chunks,
                        attempt,
                        "receipt printed"
                    );
                    return Ok(());
                }
                Err(e) if attempt < MAX_PRINT_ATTEMPTS => {
                    warn!(device = %binding.device, error = %e, "transmission failed, reconnecting");
                    attempt += 1;
                    self.disconnect_locked().await;
                    self.scan_and_connect_locked().await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Drop the current session, if any.
    pub async fn disconnect(&self) {
        let _op = self.inner.op_lock.lock().await;
        self.disconnect_locked().await;
    }

    // -- internal helpers (caller holds op_lock) ------------------------------

    fn binding(&self) -> Option<ActiveBinding> {
        lock(&self.inner.session).binding().cloned()
    }

    async fn disconnect_locked(&self) {
        let Some(binding) = lock(&self.inner.session).clear() else {
            return;
        };
        if let Err(e) = self.inner.transport.disconnect(&binding.device).await {
            warn!(device = %binding.device, error = %e, "disconnect failed");
        }
        info!(device = %binding.device, "printer session closed");
    }

    async fn scan_and_connect_locked(&self) -> Result<()> {
        if !self.inner.bridge.is_native_app() {
            return Err(PrintError::PlatformUnsupported);
        }
        let transport = self.inner.transport.as_ref();

        if let Err(e) = transport.request_permission().await {
            warn!(error = %e, "bluetooth permission request failed, scanning anyway");
        }
        transport.initialize().await?;

        let candidates = discover_candidates(transport, &self.inner.config).await?;
        if candidates.is_empty() {
            return Err(PrintError::NoDeviceFound);
        }

        let mut last_error = PrintError::NoDeviceFound;
        for candidate in &candidates {
            match self.connect(candidate).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(device = %candidate.id, error = %e, "candidate rejected");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    /// Connect to `device` and negotiate a writable characteristic.
    ///
    /// A drop reported before the session is bound fails the candidate, so a
    /// link that died during negotiation is never installed.
    async fn connect(&self, device: &CandidateDevice) -> Result<()> {
        let transport = self.inner.transport.as_ref();

        let dropped = Arc::new(AtomicBool::new(false));
        let on_disconnect: DisconnectCallback = {
            let session = Arc::clone(&self.inner.session);
            let dropped = Arc::clone(&dropped);
            let watched = device.id.clone();
            Arc::new(move || {
                dropped.store(true, Ordering::SeqCst);
                if lock(&session).clear_if_device(&watched) {
                    info!(device = %watched, "printer disconnected");
                }
            })
        };

        transport.connect(&device.id, on_disconnect).await?;

        let services = match transport.services(&device.id).await {
            Ok(services) => services,
            Err(e) => {
                self.rollback(device).await;
                return Err(e);
            }
        };

        let Some((service, characteristic)) = first_writable(&services) else {
            self.rollback(device).await;
            return Err(PrintError::NoWritableCharacteristic);
        };

        // The callback sets the flag before taking the session lock, so a
        // drop is either seen here or clears the binding right after.
        let bound = {
            let mut session = lock(&self.inner.session);
            let alive = !dropped.load(Ordering::SeqCst);
            if alive {
                session.bind(ActiveBinding {
                    device: device.id.clone(),
                    device_name: device.display_name(),
                    service,
                    characteristic,
                    connected_at: Utc::now(),
                });
            }
            alive
        };
        if !bound {
            self.rollback(device).await;
            return Err(PrintError::Connect(format!(
                "{}: link dropped during negotiation",
                device.id
            )));
        }

        info!(
            device = %device.id,
            name = %device.display_name(),
            %service,
            %characteristic,
            "printer connected"
        );
        Ok(())
    }

    /// Undo a half-finished connect.
    async fn rollback(&self, device: &CandidateDevice) {
        if let Err(e) = self.inner.transport.disconnect(&device.id).await {
            warn!(device = %device.id, error = %e, "teardown after failed negotiation failed");
        }
        lock(&self.inner.session).clear_if_device(&device.id);
    }
}

/// First characteristic, in enumeration order, that accepts writes.
pub fn first_writable(services: &[GattService]) -> Option<(ServiceId, CharacteristicId)> {
    services.iter().find_map(|service| {
        service
            .characteristics
            .iter()
            .find(|c| c.properties.is_writable())
            .map(|c| (service.id, c.id))
    })
}

fn lock(session: &Mutex<PrinterSession>) -> MutexGuard<'_, PrinterSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}
