// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native Bluetooth LE transport backed by `btleplug`.
//
// btleplug covers BlueZ, CoreBluetooth, WinRT and the Android JNI bridge, so
// one implementation serves every native target. Peripherals seen during a
// scan are cached by id because btleplug needs the `Peripheral` handle (not
// just its id) for every later call. Each new scan drops the cached handles
// of devices we are not connected to.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use btleplug::api::{
    Central, CentralEvent, CharPropFlags, Characteristic, Manager as _, Peripheral as _,
    ScanFilter as BtScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use futures::StreamExt;
use tokio::sync::{OnceCell, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use malika_core::error::{PrintError, Result};
use malika_core::types::{
    CandidateDevice, CharacteristicId, CharacteristicProperties, DeviceId, GattCharacteristic,
    GattService, ScanFilter, ServiceId,
};

use crate::traits::*;

/// Bridge for native app builds.
pub struct NativeBridge {
    transport: Arc<BtleplugTransport>,
}

impl NativeBridge {
    pub fn new() -> Self {
        Self {
            transport: Arc::new(BtleplugTransport::new()),
        }
    }
}

impl Default for NativeBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for NativeBridge {
    fn platform_name(&self) -> &str {
        std::env::consts::OS
    }

    fn is_native_app(&self) -> bool {
        true
    }

    fn bluetooth(&self) -> Arc<dyn BleTransport> {
        self.transport.clone()
    }
}

/// Manager and the adapter we use. The manager is kept alive alongside the
/// adapter for the lifetime of the transport.
struct Radio {
    _manager: Manager,
    adapter: Adapter,
}

/// `BleTransport` over the first Bluetooth adapter btleplug reports.
pub struct BtleplugTransport {
    radio: OnceCell<Radio>,
    /// Peripherals seen by the current scan plus connected ones, keyed by our
    /// opaque id.
    peripherals: Arc<Mutex<HashMap<DeviceId, Peripheral>>>,
    /// Task forwarding scan events to the caller's channel.
    scan_task: Mutex<Option<JoinHandle<()>>>,
    /// One disconnect watcher per connected device.
    watchers: Mutex<HashMap<DeviceId, JoinHandle<()>>>,
}

impl BtleplugTransport {
    pub fn new() -> Self {
        Self {
            radio: OnceCell::new(),
            peripherals: Arc::new(Mutex::new(HashMap::new())),
            scan_task: Mutex::new(None),
            watchers: Mutex::new(HashMap::new()),
        }
    }

    async fn adapter(&self) -> Result<&Adapter> {
        let radio = self
            .radio
            .get_or_try_init(|| async {
                let manager = Manager::new()
                    .await
                    .map_err(|e| PrintError::Scan(format!("bluetooth manager: {e}")))?;
                let adapter = manager
                    .adapters()
                    .await
                    .map_err(|e| PrintError::Scan(format!("list adapters: {e}")))?
                    .into_iter()
                    .next()
                    .ok_or_else(|| PrintError::Scan("no bluetooth adapter found".into()))?;
                info!("bluetooth adapter ready");
                Ok::<_, PrintError>(Radio {
                    _manager: manager,
                    adapter,
                })
            })
            .await?;
        Ok(&radio.adapter)
    }

    fn peripheral(&self, device: &DeviceId) -> Result<Peripheral> {
        lock(&self.peripherals)
            .get(device)
            .cloned()
            .ok_or_else(|| PrintError::Connect(format!("unknown device {device}")))
    }
}

impl Default for BtleplugTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BleTransport for BtleplugTransport {
    async fn initialize(&self) -> Result<()> {
        self.adapter().await.map(|_| ())
    }

    /// Never prompts. Desktop stacks grant access at the OS level and the
    /// Android host activity requests BLUETOOTH_SCAN/CONNECT before Rust is
    /// loaded.
    async fn request_permission(&self) -> Result<()> {
        debug!("no runtime bluetooth permission to request");
        Ok(())
    }

    async fn start_scan(
        &self,
        filter: &ScanFilter,
    ) -> Result<mpsc::UnboundedReceiver<CandidateDevice>> {
        let adapter = self.adapter().await?.clone();

        {
            let watchers = lock(&self.watchers);
            prune_unconnected(&mut lock(&self.peripherals), &watchers);
        }

        let mut events = adapter
            .events()
            .await
            .map_err(|e| PrintError::Scan(format!("event stream: {e}")))?;
        adapter
            .start_scan(BtScanFilter {
                services: filter.services.clone(),
            })
            .await
            .map_err(|e| PrintError::Scan(format!("start scan: {e}")))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let peripherals = Arc::clone(&self.peripherals);
        let task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let id = match event {
                    CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
                    _ => continue,
                };
                let Ok(peripheral) = adapter.peripheral(&id).await else {
                    continue;
                };
                let name = peripheral
                    .properties()
                    .await
                    .ok()
                    .flatten()
                    .and_then(|props| props.local_name);
                let device_id = device_id(&id);
                lock(&peripherals).insert(device_id.clone(), peripheral);
                if tx.send(CandidateDevice { id: device_id, name }).is_err() {
                    break;
                }
            }
        });

        if let Some(previous) = lock(&self.scan_task).replace(task) {
            previous.abort();
        }
        Ok(rx)
    }

    async fn stop_scan(&self) -> Result<()> {
        if let Some(task) = lock(&self.scan_task).take() {
            task.abort();
        }
        if let Some(radio) = self.radio.get() {
            radio
                .adapter
                .stop_scan()
                .await
                .map_err(|e| PrintError::Scan(format!("stop scan: {e}")))?;
        }
        Ok(())
    }

    async fn connect(&self, device: &DeviceId, on_disconnect: DisconnectCallback) -> Result<()> {
        let adapter = self.adapter().await?.clone();
        let peripheral = self.peripheral(device)?;

        // Subscribe before connecting so a drop during negotiation is not
        // missed.
        let mut events = adapter
            .events()
            .await
            .map_err(|e| PrintError::Connect(format!("event stream: {e}")))?;

        peripheral
            .connect()
            .await
            .map_err(|e| PrintError::Connect(format!("{device}: {e}")))?;

        let watched = peripheral.id();
        let watched_device = device.clone();
        let watcher = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let CentralEvent::DeviceDisconnected(id) = event {
                    if id == watched {
                        info!(device = %watched_device, "peripheral dropped the link");
                        on_disconnect();
                        break;
                    }
                }
            }
        });
        if let Some(previous) = lock(&self.watchers).insert(device.clone(), watcher) {
            previous.abort();
        }

        info!(device = %device, "connected");
        Ok(())
    }

    async fn services(&self, device: &DeviceId) -> Result<Vec<GattService>> {
        let peripheral = self.peripheral(device)?;
        peripheral
            .discover_services()
            .await
            .map_err(|e| PrintError::Connect(format!("{device}: service discovery: {e}")))?;
        Ok(peripheral
            .services()
            .into_iter()
            .map(|service| GattService {
                id: ServiceId(service.uuid),
                characteristics: service
                    .characteristics
                    .into_iter()
                    .map(|c| GattCharacteristic {
                        id: CharacteristicId(c.uuid),
                        properties: properties(c.properties),
                    })
                    .collect(),
            })
            .collect())
    }

    async fn write(
        &self,
        device: &DeviceId,
        service: &ServiceId,
        characteristic: &CharacteristicId,
        data: &[u8],
    ) -> Result<()> {
        let peripheral = self.peripheral(device)?;
        let target = find_characteristic(&peripheral, service, characteristic)?;

        // Prefer acknowledged writes so packet N+1 never overtakes packet N.
        let write_type = if target.properties.contains(CharPropFlags::WRITE) {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };

        peripheral
            .write(&target, data, write_type)
            .await
            .map_err(|e| PrintError::Write(format!("{device}: {e}")))
    }

    async fn disconnect(&self, device: &DeviceId) -> Result<()> {
        if let Some(watcher) = lock(&self.watchers).remove(device) {
            watcher.abort();
        }
        let peripheral = self.peripheral(device)?;
        peripheral
            .disconnect()
            .await
            .map_err(|e| PrintError::Connect(format!("disconnect {device}: {e}")))?;
        info!(device = %device, "disconnected");
        Ok(())
    }
}

fn find_characteristic(
    peripheral: &Peripheral,
    service: &ServiceId,
    characteristic: &CharacteristicId,
) -> Result<Characteristic> {
    peripheral
        .characteristics()
        .into_iter()
        .find(|c| c.uuid == characteristic.0 && c.service_uuid == service.0)
        .ok_or_else(|| {
            warn!(%service, %characteristic, "characteristic vanished after negotiation");
            PrintError::Write(format!("characteristic {characteristic} not found"))
        })
}

/// Forget cached peripherals that have no live connection.
fn prune_unconnected<P, W>(
    peripherals: &mut HashMap<DeviceId, P>,
    connected: &HashMap<DeviceId, W>,
) {
    peripherals.retain(|id, _| connected.contains_key(id));
}

fn properties(flags: CharPropFlags) -> CharacteristicProperties {
    CharacteristicProperties {
        read: flags.contains(CharPropFlags::READ),
        write: flags.contains(CharPropFlags::WRITE),
        write_without_response: flags.contains(CharPropFlags::WRITE_WITHOUT_RESPONSE),
        notify: flags.contains(CharPropFlags::NOTIFY),
    }
}

/// btleplug ids differ per backend; the debug form is stable within a run,
/// which is all an opaque id needs.
fn device_id(id: &PeripheralId) -> DeviceId {
    DeviceId::new(format!("{id:?}"))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
