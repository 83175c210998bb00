//! Fuzz target for the importer.
//!
//! This fuzzer tests that the CSV/JSON importer:
//! 1. Never panics on malformed input
//! 2. Handles all delimiter combinations
//! 3. Leaves the session untouched when an import fails

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Write;
use wrangler::Wrangler;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    // Write to temp file so extension-less sniffing runs too
    if let Ok(mut temp_file) = tempfile::NamedTempFile::new() {
        if temp_file.write_all(data).is_ok() {
            let mut wrangler = Wrangler::new();
            if wrangler.import_file(temp_file.path()).is_ok() {
                let _ = wrangler.analyze();
            } else {
                assert!(wrangler.data().is_empty());
            }
        }
    }
});
