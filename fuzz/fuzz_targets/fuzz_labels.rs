//! Fuzz target for label list parsing.
//!
//! Arbitrary bytes must either be rejected as non-UTF-8 or produce a label
//! list, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vision_bridge::models::Labels;

fuzz_target!(|data: &[u8]| {
    if let Ok(labels) = Labels::read_from(data) {
        for i in 0..=labels.len() {
            let _ = labels.label_for(i);
        }
    }
});
