// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ESC/POS command envelope for text receipts.
//
// Only the handful of commands the receipt layout needs: reset, centre the
// text, feed two lines, partial cut. The text itself is sent as UTF-8, which
// the common 58mm printers render correctly for the Latin range used in
// Indonesian receipts.

/// ESC: command prefix.
pub const ESC: u8 = 0x1B;

/// GS: extended command prefix.
pub const GS: u8 = 0x1D;

/// LF: print buffer and feed one line.
pub const LF: u8 = 0x0A;

/// `ESC @`: reset the printer to its power-on state.
pub const INIT: [u8; 2] = [ESC, b'@'];

/// `ESC a 1`: centre justification.
pub const ALIGN_CENTER: [u8; 3] = [ESC, b'a', 0x01];

/// `GS V 1`: partial cut (one point left uncut).
pub const CUT_PARTIAL: [u8; 3] = [GS, b'V', 0x01];

/// Build the full byte payload for one text receipt:
/// init, centre, text, two line feeds, partial cut.
pub fn receipt_payload(text: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(
        INIT.len() + ALIGN_CENTER.len() + text.len() + 2 + CUT_PARTIAL.len(),
    );
    payload.extend_from_slice(&INIT);
    payload.extend_from_slice(&ALIGN_CENTER);
    payload.extend_from_slice(text.as_bytes());
    payload.extend_from_slice(&[LF, LF]);
    payload.extend_from_slice(&CUT_PARTIAL);
    payload
}
