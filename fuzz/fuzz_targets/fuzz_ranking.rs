//! Fuzz target for score ranking.
//!
//! Checks the ranking contract on arbitrary score vectors: every result
//! clears the threshold, results are ordered and the limit is respected.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vision_bridge::engine::top_above_threshold;
use vision_bridge::models::Labels;

#[derive(Debug, Arbitrary)]
struct Input {
    scores: Vec<u8>,
    labels: Vec<String>,
    limit: u8,
    threshold: f32,
}

fuzz_target!(|input: Input| {
    let labels = Labels::new(input.labels);
    let threshold = f64::from(input.threshold);
    let results = top_above_threshold(&input.scores, &labels, input.limit as usize, threshold);

    assert!(results.len() <= input.limit as usize);
    for pair in results.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
    for r in &results {
        assert!(r.confidence > threshold);
    }
});
