//! Fuzz target for streaming audit record readers (JSON Lines and TSV).
//!
//! Goal: The readers should **never panic**, whatever bytes the export holds.
//! Invalid UTF-8, bad hex and short rows are all input errors.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_record_parser
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use trailguard_domain::policy::ChainPolicy;
use trailguard_evidence::{RecordFormat, RecordStream};

#[derive(Arbitrary, Debug)]
struct Input {
    tsv: bool,
    allow_gaps: bool,
    bytes: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let format = if input.tsv {
        RecordFormat::Tsv
    } else {
        RecordFormat::Jsonl
    };

    let _ = trailguard_evidence::fuzz::parse_records(&input.bytes, format);

    // The chain walker must also survive whatever the reader yields.
    let policy = ChainPolicy {
        allow_gaps: input.allow_gaps,
        ..ChainPolicy::default()
    };
    let records = RecordStream::from_reader(input.bytes.as_slice(), format);
    let _ = trailguard_domain::verify_chain(records, &policy);
});
