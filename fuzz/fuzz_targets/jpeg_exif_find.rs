//! Fuzz target for the JPEG segment walker and EXIF segment replacement.

#![no_main]

use libfuzzer_sys::fuzz_target;
use phototagger::exif::jpeg::{find_exif, replace_exif};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = find_exif(data);
    let _ = replace_exif(data, b"II*\0\x08\0\0\0\0\0\0\0\0\0");
});
