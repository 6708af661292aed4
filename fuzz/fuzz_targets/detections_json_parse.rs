//! Fuzz target for detections sidecar JSON and the ranking built from it.

#![no_main]

use libfuzzer_sys::fuzz_target;
use phototagger::detection::{aggregate, rank, RawDetection};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(detections) = serde_json::from_slice::<Vec<RawDetection>>(data) {
        if let Some(set) = aggregate(detections, 640, 480) {
            let _ = rank(&set);
        }
    }
});
