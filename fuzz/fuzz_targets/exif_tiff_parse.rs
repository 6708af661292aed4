//! Fuzz target for the TIFF/EXIF container parser.
//!
//! Anything that parses must also serialize, and the serialized form must
//! parse back to the same container.

#![no_main]

use libfuzzer_sys::fuzz_target;
use phototagger::exif::ExifData;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    if let Ok(exif) = ExifData::from_tiff(data) {
        let written = exif.to_tiff();
        let reread = ExifData::from_tiff(&written).expect("serialized container parses");
        assert_eq!(reread.to_tiff(), written);
    }
});
