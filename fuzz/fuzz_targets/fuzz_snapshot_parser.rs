//! Fuzz target for configuration snapshot parsing.
//!
//! Goal: The parser should **never panic** on any input.
//! Malformed snapshots must come back as input errors.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_snapshot_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = trailguard_evidence::fuzz::parse_snapshot_text(text);
    }
});
