// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Chunked transmission over a negotiated BLE characteristic.
//
// Cheap printers drop anything larger than the default ATT payload, so the
// receipt goes out in small packets, strictly in order, with a short pause
// between packets for the printer's buffer to drain. There is no resume: a
// failed packet aborts the whole transmission.

use std::time::Duration;

use tracing::debug;

use malika_bridge::BleTransport;
use malika_core::error::{PrintError, Result};

use crate::session::ActiveBinding;

/// Number of packets needed for `len` bytes.
pub fn chunk_count(len: usize, chunk_size: usize) -> usize {
    len.div_ceil(chunk_size)
}

/// Write `payload` to the bound characteristic in `chunk_size` packets.
///
/// Sleeps `delay` between packets (never before the first or after the
/// last). Returns the number of packets written. A zero `chunk_size` is
/// refused before anything is sent.
pub async fn send_chunked(
    transport: &dyn BleTransport,
    binding: &ActiveBinding,
    payload: &[u8],
    chunk_size: usize,
    delay: Duration,
) -> Result<usize> {
    if chunk_size == 0 {
        return Err(PrintError::Config("chunk_size must be at least 1".into()));
    }
    let total = chunk_count(payload.len(), chunk_size);

    for (index, chunk) in payload.chunks(chunk_size).enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        transport
            .write(
                &binding.device,
                &binding.service,
                &binding.characteristic,
                chunk,
            )
            .await?;
        debug!(chunk = index + 1, total, "chunk written");
    }

    Ok(total)
}
