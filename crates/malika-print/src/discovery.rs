// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bluetooth LE discovery of nearby thermal printers.
//
// Two passes. The first scans only for the known printer services and keeps
// devices whose advertised name looks like a printer. If that finds nothing,
// a shorter unfiltered scan accepts every device it sees, because plenty of
// printers advertise neither a known service nor a helpful name. Each pass is
// time-boxed and the scan is always stopped afterwards.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use malika_bridge::BleTransport;
use malika_core::PrinterConfig;
use malika_core::error::Result;
use malika_core::types::{CandidateDevice, ScanFilter};

use crate::matcher::is_probable_printer;

/// Run one scan for up to `window`, keeping devices accepted by `accept`.
///
/// Duplicate sightings are collapsed; order is first-seen. The scan is
/// stopped whether collection ran to the deadline or the stream closed early.
pub async fn scan_window<F>(
    transport: &dyn BleTransport,
    filter: &ScanFilter,
    window: Duration,
    mut accept: F,
) -> Result<Vec<CandidateDevice>>
where
    F: FnMut(&CandidateDevice) -> bool,
{
    let mut found = transport.start_scan(filter).await?;
    let deadline = Instant::now() + window;
    let mut devices: Vec<CandidateDevice> = Vec::new();

    loop {
        match tokio::time::timeout_at(deadline, found.recv()).await {
            Ok(Some(device)) => {
                if devices.iter().any(|d| d.id == device.id) {
                    continue;
                }
                if accept(&device) {
                    debug!(device = %device.id, name = ?device.name, "candidate found");
                    devices.push(device);
                }
            }
            // channel closed or window elapsed
            Ok(None) | Err(_) => break,
        }
    }

    if let Err(e) = transport.stop_scan().await {
        warn!(error = %e, "failed to stop scan");
    }
    Ok(devices)
}

/// Find candidate printers: named scan first, unfiltered fallback second.
///
/// An empty result is not an error here; the caller decides.
pub async fn discover_candidates(
    transport: &dyn BleTransport,
    config: &PrinterConfig,
) -> Result<Vec<CandidateDevice>> {
    let named_filter = ScanFilter::services(config.printer_services.iter().copied());
    let named = scan_window(transport, &named_filter, config.named_scan_window(), |device| {
        device
            .name
            .as_deref()
            .is_some_and(|name| is_probable_printer(name, &config.name_keywords))
    })
    .await?;

    if !named.is_empty() {
        info!(count = named.len(), "printers found by name");
        return Ok(named);
    }

    info!("no named printers, falling back to unfiltered scan");
    let any = scan_window(
        transport,
        &ScanFilter::unfiltered(),
        config.fallback_scan_window(),
        |_| true,
    )
    .await?;
    info!(count = any.len(), "devices found by fallback scan");
    Ok(any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTransport, candidate};

    #[tokio::test(start_paused = true)]
    async fn named_scan_keeps_only_printer_names() {
        let transport = MockTransport::new();
        transport.push_scan(vec![
            candidate("a", Some("Galaxy Buds")),
            candidate("b", Some("MTP-II")),
            candidate("c", None),
            candidate("d", Some("Thermal Printer")),
        ]);

        let found = discover_candidates(&transport, &PrinterConfig::default())
            .await
            .unwrap();

        let ids: Vec<_> = found.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["b", "d"]);
        assert_eq!(transport.scan_filters().len(), 1);
        assert!(!transport.scan_filters()[0].services.is_empty());
        assert_eq!(transport.stop_scan_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_accepts_everything_when_no_names_match() {
        let transport = MockTransport::new();
        transport.push_scan(vec![candidate("a", Some("Galaxy Buds"))]);
        transport.push_scan(vec![candidate("x", None), candidate("y", Some("Mi Band"))]);

        let found = discover_candidates(&transport, &PrinterConfig::default())
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        let filters = transport.scan_filters();
        assert_eq!(filters.len(), 2);
        assert!(filters[1].services.is_empty());
        assert_eq!(transport.stop_scan_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_sightings_collapse() {
        let transport = MockTransport::new();
        transport.push_scan(vec![
            candidate("b", Some("POS-58")),
            candidate("b", Some("POS-58")),
            candidate("a", Some("Star TSP")),
        ]);

        let found = discover_candidates(&transport, &PrinterConfig::default())
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn scan_runs_to_window_when_stream_stays_open() {
        let transport = MockTransport::new();
        transport.keep_scan_open();
        transport.push_scan(vec![candidate("b", Some("printer"))]);
        let start = Instant::now();

        let found = discover_candidates(&transport, &PrinterConfig::default())
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(start.elapsed(), Duration::from_secs(8));
        assert_eq!(transport.stop_scan_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_runs_its_own_window_after_empty_named_scan() {
        let transport = MockTransport::new();
        transport.keep_scan_open();
        transport.push_scan(Vec::new());
        transport.push_scan(vec![candidate("x", Some("Mi Band"))]);
        let start = Instant::now();

        let found = discover_candidates(&transport, &PrinterConfig::default())
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        // 8 s named window, then 5 s unfiltered window
        assert_eq!(start.elapsed(), Duration::from_secs(13));
        assert_eq!(transport.scan_count(), 2);
        assert_eq!(transport.stop_scan_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn both_scans_empty_yields_nothing() {
        let transport = MockTransport::new();
        let found = discover_candidates(&transport, &PrinterConfig::default())
            .await
            .unwrap();
        assert!(found.is_empty());
        assert_eq!(transport.stop_scan_calls(), 2);
    }
}
