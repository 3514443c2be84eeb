// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scriptable in-memory `BleTransport` for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

use malika_bridge::{BleTransport, DisconnectCallback, PlatformBridge};
use malika_core::error::{PrintError, Result};
use malika_core::types::{
    CandidateDevice, CharacteristicId, CharacteristicProperties, DeviceId, GattCharacteristic,
    GattService, ScanFilter, ServiceId,
};

use crate::session::ActiveBinding;

pub const PRINTER_SERVICE: Uuid = Uuid::from_u128(0x000018f0_0000_1000_8000_00805f9b34fb);
pub const PRINTER_WRITE_CHAR: Uuid = Uuid::from_u128(0x00002af1_0000_1000_8000_00805f9b34fb);

pub fn candidate(id: &str, name: Option<&str>) -> CandidateDevice {
    CandidateDevice {
        id: DeviceId::new(id),
        name: name.map(String::from),
    }
}

pub fn test_binding(device: &str) -> ActiveBinding {
    ActiveBinding {
        device: DeviceId::new(device),
        device_name: device.to_string(),
        service: ServiceId(PRINTER_SERVICE),
        characteristic: CharacteristicId(PRINTER_WRITE_CHAR),
        connected_at: Utc::now(),
    }
}

pub fn characteristic(id: u128, properties: CharacteristicProperties) -> GattCharacteristic {
    GattCharacteristic {
        id: CharacteristicId(Uuid::from_u128(id)),
        properties,
    }
}

pub fn writable() -> CharacteristicProperties {
    CharacteristicProperties {
        write_without_response: true,
        ..Default::default()
    }
}

pub fn read_only() -> CharacteristicProperties {
    CharacteristicProperties {
        read: true,
        notify: true,
        ..Default::default()
    }
}

/// The service layout of a typical 58mm printer.
pub fn printer_services() -> Vec<GattService> {
    vec![GattService {
        id: ServiceId(PRINTER_SERVICE),
        characteristics: vec![GattCharacteristic {
            id: CharacteristicId(PRINTER_WRITE_CHAR),
            properties: writable(),
        }],
    }]
}

#[derive(Default)]
struct MockState {
    scans: VecDeque<Vec<CandidateDevice>>,
    keep_scan_open: bool,
    open_scan: Option<mpsc::UnboundedSender<CandidateDevice>>,
    scan_filters: Vec<ScanFilter>,
    stop_scan_calls: usize,
    initialize_calls: usize,
    permission_fails: bool,
    services: HashMap<DeviceId, Vec<GattService>>,
    failing_connects: HashSet<DeviceId>,
    failing_disconnects: bool,
    failing_services: HashSet<DeviceId>,
    drop_during_services: HashSet<DeviceId>,
    connects: Vec<DeviceId>,
    disconnects: Vec<DeviceId>,
    callbacks: HashMap<DeviceId, DisconnectCallback>,
    write_attempts: usize,
    failing_writes: HashSet<usize>,
    writes: Vec<Vec<u8>>,
}

/// Every call is recorded; scan results, failures and services are scripted.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Queue the devices reported by the next `start_scan`.
    pub fn push_scan(&self, devices: Vec<CandidateDevice>) {
        self.state().scans.push_back(devices);
    }

    /// Keep scan channels open so scans run until their window elapses.
    pub fn keep_scan_open(&self) {
        self.state().keep_scan_open = true;
    }

    pub fn fail_permission(&self) {
        self.state().permission_fails = true;
    }

    pub fn set_services(&self, device: &str, services: Vec<GattService>) {
        self.state().services.insert(DeviceId::new(device), services);
    }

    pub fn fail_connect(&self, device: &str) {
        self.state().failing_connects.insert(DeviceId::new(device));
    }

    pub fn fail_services(&self, device: &str) {
        self.state().failing_services.insert(DeviceId::new(device));
    }

    /// Fire `device`'s disconnect callback while its services are enumerated.
    pub fn drop_link_during_services(&self, device: &str) {
        self.state().drop_during_services.insert(DeviceId::new(device));
    }

    pub fn fail_disconnects(&self) {
        self.state().failing_disconnects = true;
    }

    /// Make the n-th write attempt (1-based, counted across the mock's life) fail.
    pub fn fail_write_number(&self, n: usize) {
        self.state().failing_writes.insert(n);
    }

    /// Make every write from attempt `n` onwards fail.
    pub fn fail_writes_from(&self, n: usize) {
        let mut state = self.state();
        for i in n..n + 1_000 {
            state.failing_writes.insert(i);
        }
    }

    /// Simulate the peripheral dropping the link.
    pub fn fire_disconnect(&self, device: &str) {
        let callback = self.state().callbacks.get(&DeviceId::new(device)).cloned();
        if let Some(callback) = callback {
            callback();
        }
    }

    pub fn scan_filters(&self) -> Vec<ScanFilter> {
        self.state().scan_filters.clone()
    }

    pub fn scan_count(&self) -> usize {
        self.state().scan_filters.len()
    }

    pub fn stop_scan_calls(&self) -> usize {
        self.state().stop_scan_calls
    }

    pub fn initialize_calls(&self) -> usize {
        self.state().initialize_calls
    }

    pub fn connects(&self) -> Vec<DeviceId> {
        self.state().connects.clone()
    }

    pub fn disconnects(&self) -> Vec<DeviceId> {
        self.state().disconnects.clone()
    }

    /// Successfully written packets, in order.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state().writes.clone()
    }

    pub fn write_attempts(&self) -> usize {
        self.state().write_attempts
    }
}

#[async_trait]
impl BleTransport for MockTransport {
    async fn initialize(&self) -> Result<()> {
        self.state().initialize_calls += 1;
        Ok(())
    }

    async fn request_permission(&self) -> Result<()> {
        if self.state().permission_fails {
            return Err(PrintError::Permission("denied by user".into()));
        }
        Ok(())
    }

    async fn start_scan(
        &self,
        filter: &ScanFilter,
    ) -> Result<mpsc::UnboundedReceiver<CandidateDevice>> {
        let mut state = self.state();
        state.scan_filters.push(filter.clone());
        let devices = state.scans.pop_front().unwrap_or_default();

        let (tx, rx) = mpsc::unbounded_channel();
        for device in devices {
            let _ = tx.send(device);
        }
        if state.keep_scan_open {
            state.open_scan = Some(tx);
        }
        Ok(rx)
    }

    async fn stop_scan(&self) -> Result<()> {
        let mut state = self.state();
        state.stop_scan_calls += 1;
        state.open_scan = None;
        Ok(())
    }

    async fn connect(&self, device: &DeviceId, on_disconnect: DisconnectCallback) -> Result<()> {
        let mut state = self.state();
        state.connects.push(device.clone());
        if state.failing_connects.contains(device) {
            return Err(PrintError::Connect(format!("{device}: gatt error 133")));
        }
        state.callbacks.insert(device.clone(), on_disconnect);
        Ok(())
    }

    async fn services(&self, device: &DeviceId) -> Result<Vec<GattService>> {
        let (services, dropped) = {
            let state = self.state();
            if state.failing_services.contains(device) {
                return Err(PrintError::Connect(format!("{device}: service discovery failed")));
            }
            let services = state
                .services
                .get(device)
                .cloned()
                .unwrap_or_else(printer_services);
            let dropped = if state.drop_during_services.contains(device) {
                state.callbacks.get(device).cloned()
            } else {
                None
            };
            (services, dropped)
        };
        if let Some(callback) = dropped {
            callback();
        }
        Ok(services)
    }

    async fn write(
        &self,
        device: &DeviceId,
        _service: &ServiceId,
        _characteristic: &CharacteristicId,
        data: &[u8],
    ) -> Result<()> {
        let mut state = self.state();
        state.write_attempts += 1;
        let attempt = state.write_attempts;
        if state.failing_writes.contains(&attempt) {
            return Err(PrintError::Write(format!("{device}: write {attempt} rejected")));
        }
        state.writes.push(data.to_vec());
        Ok(())
    }

    async fn disconnect(&self, device: &DeviceId) -> Result<()> {
        let mut state = self.state();
        state.disconnects.push(device.clone());
        if state.failing_disconnects {
            return Err(PrintError::Connect(format!("disconnect {device}: link lost")));
        }
        Ok(())
    }
}

/// Bridge wrapping a [`MockTransport`].
pub struct MockBridge {
    pub native: bool,
    pub transport: MockTransport,
}

impl MockBridge {
    pub fn native(transport: MockTransport) -> Self {
        Self {
            native: true,
            transport,
        }
    }
}

impl PlatformBridge for MockBridge {
    fn platform_name(&self) -> &str {
        "mock"
    }

    fn is_native_app(&self) -> bool {
        self.native
    }

    fn bluetooth(&self) -> Arc<dyn BleTransport> {
        Arc::new(self.transport.clone())
    }
}
