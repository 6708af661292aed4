//! EXIF container access for JPEG files.
//!
//! The container is treated as a tag → raw value mapping per IFD:
//! [`jpeg`] finds and splices the APP1 segment, [`ExifData`] reads and
//! writes the TIFF structure inside it.

pub mod jpeg;
pub mod tags;
mod tiff;

use thiserror::Error;

pub use tags::{ByteOrder, FieldType, IfdKind};
pub use tiff::{Entry, ExifData, Ifd};

/// A malformed JPEG segment layout or TIFF structure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parses the EXIF container embedded in JPEG `bytes`.
///
/// Returns `Ok(None)` when the file has no EXIF segment.
pub fn read_from_jpeg(bytes: &[u8]) -> Result<Option<ExifData>, ParseError> {
    match jpeg::find_exif(bytes)? {
        Some(tiff) => ExifData::from_tiff(tiff).map(Some),
        None => Ok(None),
    }
}
