//! Locating and replacing the EXIF APP1 segment of a JPEG file.

use super::ParseError;

const SOI: [u8; 2] = [0xFF, 0xD8];
const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;
const SOS: u8 = 0xDA;
const EOI: u8 = 0xD9;

/// Identifier that starts the payload of an EXIF APP1 segment.
pub const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";

/// Largest TIFF block that fits in one APP1 segment after the length field
/// and [`EXIF_HEADER`].
pub const MAX_TIFF_LEN: usize = u16::MAX as usize - 2 - EXIF_HEADER.len();

/// A marker segment: `start` is the offset of its `0xFF`, `end` is one past
/// its last payload byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Segment {
    marker: u8,
    start: usize,
    end: usize,
}

impl Segment {
    fn payload<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        let header = if self.end - self.start > 2 { 4 } else { 2 };
        &bytes[self.start + header..self.end]
    }

    fn is_exif(&self, bytes: &[u8]) -> bool {
        self.marker == APP1 && self.payload(bytes).starts_with(EXIF_HEADER)
    }
}

/// Returns true if `bytes` starts with a JPEG start-of-image marker.
pub fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&SOI)
}

/// Walks the header segments from SOI up to (not including) SOS or EOI.
fn segments(bytes: &[u8]) -> Result<Vec<Segment>, ParseError> {
    if !is_jpeg(bytes) {
        return Err(ParseError::new("missing JPEG start-of-image marker"));
    }

    let mut segments = Vec::new();
    let mut index = 2usize;

    while index + 1 < bytes.len() {
        if bytes[index] != 0xFF {
            return Err(ParseError::new(format!(
                "expected JPEG marker at offset {}, found 0x{:02X}",
                index, bytes[index]
            )));
        }

        // Fill bytes may precede a marker.
        let mut marker_at = index;
        while marker_at + 1 < bytes.len() && bytes[marker_at + 1] == 0xFF {
            marker_at += 1;
        }
        if marker_at + 1 >= bytes.len() {
            break;
        }
        let marker = bytes[marker_at + 1];

        if marker == SOS || marker == EOI {
            break;
        }

        // TEM and RSTn have no length field.
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            segments.push(Segment {
                marker,
                start: marker_at,
                end: marker_at + 2,
            });
            index = marker_at + 2;
            continue;
        }

        if marker_at + 4 > bytes.len() {
            return Err(ParseError::new("JPEG segment header truncated"));
        }
        let length = u16::from_be_bytes([bytes[marker_at + 2], bytes[marker_at + 3]]) as usize;
        if length < 2 {
            return Err(ParseError::new(format!(
                "JPEG segment 0x{:02X} has invalid length {}",
                marker, length
            )));
        }
        let end = marker_at + 2 + length;
        if end > bytes.len() {
            return Err(ParseError::new(format!(
                "JPEG segment 0x{:02X} at offset {} runs past end of file",
                marker, marker_at
            )));
        }

        segments.push(Segment {
            marker,
            start: marker_at,
            end,
        });
        index = end;
    }

    Ok(segments)
}

/// Returns the TIFF block of the first EXIF APP1 segment, if there is one.
pub fn find_exif(bytes: &[u8]) -> Result<Option<&[u8]>, ParseError> {
    let found = segments(bytes)?
        .into_iter()
        .find(|segment| segment.is_exif(bytes))
        .map(|segment| &segment.payload(bytes)[EXIF_HEADER.len()..]);
    Ok(found)
}

/// Returns a copy of `bytes` whose EXIF APP1 segment holds `tiff`.
///
/// An existing EXIF segment is replaced in place. Otherwise a new one is
/// inserted right after SOI, or after a leading APP0 (JFIF) segment.
/// Callers must keep `tiff` within [`MAX_TIFF_LEN`].
pub fn replace_exif(bytes: &[u8], tiff: &[u8]) -> Result<Vec<u8>, ParseError> {
    if tiff.len() > MAX_TIFF_LEN {
        return Err(ParseError::new(format!(
            "EXIF block of {} bytes exceeds one APP1 segment",
            tiff.len()
        )));
    }

    let segments = segments(bytes)?;
    let (splice_start, splice_end) = match segments.iter().find(|s| s.is_exif(bytes)) {
        Some(existing) => (existing.start, existing.end),
        None => match segments.first() {
            Some(first) if first.marker == APP0 => (first.end, first.end),
            _ => (2, 2),
        },
    };

    let length = (2 + EXIF_HEADER.len() + tiff.len()) as u16;
    let mut out = Vec::with_capacity(bytes.len() + tiff.len() + 10);
    out.extend_from_slice(&bytes[..splice_start]);
    out.extend_from_slice(&[0xFF, APP1]);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(EXIF_HEADER);
    out.extend_from_slice(tiff);
    out.extend_from_slice(&bytes[splice_end..]);
    Ok(out)
}
