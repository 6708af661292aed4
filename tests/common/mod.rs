#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// A minimal baseline JPEG: SOI, JFIF APP0, SOF0 with the given size, a
/// short scan, EOI. Enough for header readers; not decodable pixels.
pub fn jpeg_bytes(width: u16, height: u16) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8];

    bytes.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    bytes.extend_from_slice(b"JFIF\0");
    bytes.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);

    bytes.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08]);
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&[0x01, 0x01, 0x11, 0x00]);

    bytes.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    bytes.extend_from_slice(&[0xA5, 0x5A, 0x00, 0x7F]);
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

/// A big-endian TIFF block as a camera might write it: IFD0 with Make and
/// Orientation, an Exif IFD with DateTimeOriginal.
pub fn camera_tiff() -> Vec<u8> {
    let mut t = Vec::new();
    t.extend_from_slice(b"MM\x00\x2A");
    t.extend_from_slice(&8u32.to_be_bytes());

    // IFD0 at 8: 3 entries -> 2 + 36 + 4 = 42 bytes, data starts at 50.
    t.extend_from_slice(&3u16.to_be_bytes());
    // Make, ASCII, 6, offset 50
    t.extend_from_slice(&[0x01, 0x0F, 0x00, 0x02, 0, 0, 0, 6]);
    t.extend_from_slice(&50u32.to_be_bytes());
    // Orientation, SHORT, 1, value 6
    t.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0, 0, 0, 1, 0x00, 0x06, 0, 0]);
    // ExifIFD pointer, LONG, 1, offset 56
    t.extend_from_slice(&[0x87, 0x69, 0x00, 0x04, 0, 0, 0, 1]);
    t.extend_from_slice(&56u32.to_be_bytes());
    t.extend_from_slice(&0u32.to_be_bytes());
    t.extend_from_slice(b"Canon\0");

    // Exif IFD at 56: 1 entry -> 18 bytes, data starts at 74.
    t.extend_from_slice(&1u16.to_be_bytes());
    t.extend_from_slice(&[0x90, 0x03, 0x00, 0x02, 0, 0, 0, 20]);
    t.extend_from_slice(&74u32.to_be_bytes());
    t.extend_from_slice(&0u32.to_be_bytes());
    t.extend_from_slice(b"2021:06:01 12:00:00\0");

    t
}

/// `jpeg_bytes` with an EXIF APP1 segment holding `tiff` after the JFIF segment.
pub fn jpeg_with_exif(width: u16, height: u16, tiff: &[u8]) -> Vec<u8> {
    let plain = jpeg_bytes(width, height);
    let app0_end = 2 + 2 + 16;

    let mut bytes = plain[..app0_end].to_vec();
    bytes.extend_from_slice(&[0xFF, 0xE1]);
    bytes.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    bytes.extend_from_slice(b"Exif\0\0");
    bytes.extend_from_slice(tiff);
    bytes.extend_from_slice(&plain[app0_end..]);
    bytes
}

pub fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bytes).expect("write file");
}

/// Writes a camera-style JPEG at `path` and returns the path.
pub fn write_photo(path: &Path, width: u16, height: u16) -> PathBuf {
    write_file(path, &jpeg_with_exif(width, height, &camera_tiff()));
    path.to_path_buf()
}

/// Writes the detections sidecar for `photo` using the default suffix.
pub fn write_detections(photo: &Path, json: &str) {
    let stem = photo.file_stem().expect("photo stem").to_string_lossy();
    write_file(
        &photo.with_file_name(format!("{}.detections.json", stem)),
        json.as_bytes(),
    );
}
