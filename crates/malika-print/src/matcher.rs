// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// "Is this advertisement a printer?" heuristic.
//
// Kept as a single pure function so a better classifier can replace it
// without touching scan or connect control flow.

/// True if `name` contains any of `keywords`, ignoring ASCII case.
pub fn is_probable_printer<S: AsRef<str>>(name: &str, keywords: &[S]) -> bool {
    let name = name.to_ascii_lowercase();
    keywords
        .iter()
        .map(|k| k.as_ref().to_ascii_lowercase())
        .any(|k| !k.is_empty() && name.contains(&k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use malika_core::config::DEFAULT_NAME_KEYWORDS;

    fn matches(name: &str) -> bool {
        is_probable_printer(name, &DEFAULT_NAME_KEYWORDS)
    }

    #[test]
    fn vendor_names_match() {
        assert!(matches("EPSON TM-m30"));
        assert!(matches("Star mC-Print3"));
        assert!(matches("BIXOLON SPP-R200III"));
        assert!(matches("MTP-II"));
        assert!(matches("Citizen CMP-20"));
    }

    #[test]
    fn generic_names_match_case_insensitively() {
        assert!(matches("BlueTooth Printer"));
        assert!(matches("thermal58"));
        assert!(matches("POS-5802"));
    }

    #[test]
    fn substring_anywhere_matches() {
        // "pos" inside another word still counts; the heuristic is loose on purpose.
        assert!(matches("Compose Speaker"));
    }

    #[test]
    fn unrelated_devices_do_not_match() {
        assert!(!matches("Galaxy Buds2"));
        assert!(!matches("Mi Band 6"));
        assert!(!matches(""));
    }

    #[test]
    fn empty_keyword_never_matches() {
        assert!(!is_probable_printer("anything", &[""]));
    }
}
