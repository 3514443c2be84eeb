// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Malika: native platform bridge abstractions.
//
// Defines the platform gate and the Bluetooth LE transport trait the printer
// client is written against, plus the per-target implementations.

pub mod traits;

#[cfg(not(target_arch = "wasm32"))]
pub mod native;

pub mod stub;

pub use traits::{BleTransport, DisconnectCallback, PlatformBridge};

/// Returns the bridge implementation for the target we were built for.
pub fn platform_bridge() -> Box<dyn PlatformBridge> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        // Native app: btleplug drives the platform BLE stack.
        Box::new(native::NativeBridge::new())
    }
    #[cfg(target_arch = "wasm32")]
    {
        // Browser: no BLE; the client refuses to operate.
        Box::new(stub::StubBridge::new())
    }
}
