//! Writing keywords into a photo's EXIF metadata.
//!
//! [`apply`] is a read-modify-write of the file itself: the EXIF container
//! is loaded, the keyword field (and optionally the user comment) is
//! overwritten, every other tag is carried through, and the result replaces
//! the original file in one rename.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::PhotoTaggerError;
use crate::exif::tags::{USER_COMMENT, XP_KEYWORDS};
use crate::exif::{self, jpeg, ByteOrder, ExifData, FieldType, IfdKind};
use crate::keywords::decode_metadata_field;

/// New values for the tagged fields of one file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataUpdate {
    /// Encoded `XPKeywords` bytes (UTF-16LE, double-NUL terminated).
    pub keywords: Vec<u8>,
    /// Encoded `UserComment` bytes; the existing comment is kept when `None`.
    pub user_comment: Option<Vec<u8>>,
}

/// Applies `update` to the JPEG at `path`, in place.
///
/// With `create_missing_exif`, a file without an EXIF segment gets a new
/// one; otherwise such a file is rejected. On error the file is left as it
/// was.
pub fn apply(
    path: &Path,
    update: &MetadataUpdate,
    create_missing_exif: bool,
) -> Result<(), PhotoTaggerError> {
    let bytes = fs::read(path)?;
    let updated = update_jpeg(path, &bytes, update, create_missing_exif)?;
    persist(path, &updated)?;
    debug!(
        "{}: wrote {} keyword byte(s), file now {} bytes",
        path.display(),
        update.keywords.len(),
        updated.len()
    );
    Ok(())
}

/// Returns `bytes` with `update` applied to its EXIF container.
///
/// `path` is only used for error messages.
pub fn update_jpeg(
    path: &Path,
    bytes: &[u8],
    update: &MetadataUpdate,
    create_missing_exif: bool,
) -> Result<Vec<u8>, PhotoTaggerError> {
    if !jpeg::is_jpeg(bytes) {
        return Err(PhotoTaggerError::UnsupportedFormat(format!(
            "{} is not a JPEG file",
            path.display()
        )));
    }

    let parse_error = |err: exif::ParseError| PhotoTaggerError::MetadataParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    let mut container = match exif::read_from_jpeg(bytes).map_err(parse_error)? {
        Some(container) => container,
        None if create_missing_exif => {
            debug!("{}: creating EXIF segment", path.display());
            ExifData::new(ByteOrder::LittleEndian)
        }
        None => {
            return Err(PhotoTaggerError::MissingExif {
                path: path.to_path_buf(),
            })
        }
    };

    container.set(
        IfdKind::Primary,
        XP_KEYWORDS,
        FieldType::Byte,
        update.keywords.clone(),
    );
    if let Some(comment) = &update.user_comment {
        container.set(IfdKind::Exif, USER_COMMENT, FieldType::Undefined, comment.clone());
    }

    let tiff = container.to_tiff();
    if tiff.len() > jpeg::MAX_TIFF_LEN {
        return Err(PhotoTaggerError::ExifTooLarge {
            path: path.to_path_buf(),
            size: tiff.len(),
        });
    }

    jpeg::replace_exif(bytes, &tiff).map_err(parse_error)
}

/// Reads the keywords currently stored in the JPEG at `path`.
///
/// Returns `None` if the file has no EXIF segment or no keyword field.
pub fn read_keywords(path: &Path) -> Result<Option<String>, PhotoTaggerError> {
    let bytes = fs::read(path)?;
    if !jpeg::is_jpeg(&bytes) {
        return Err(PhotoTaggerError::UnsupportedFormat(format!(
            "{} is not a JPEG file",
            path.display()
        )));
    }

    let container = exif::read_from_jpeg(&bytes).map_err(|err| PhotoTaggerError::MetadataParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    Ok(container
        .as_ref()
        .and_then(|c| c.get(IfdKind::Primary, XP_KEYWORDS))
        .map(|entry| decode_metadata_field(&entry.raw)))
}

/// Replaces `path` with `bytes` via a sibling temporary file and a rename.
fn persist(path: &Path, bytes: &[u8]) -> Result<(), PhotoTaggerError> {
    let temp = temp_path(path);
    let persist_error = |source| PhotoTaggerError::Persist {
        path: path.to_path_buf(),
        source,
    };

    let result = fs::write(&temp, bytes)
        .and_then(|()| fs::metadata(path))
        .and_then(|meta| fs::set_permissions(&temp, meta.permissions()))
        .and_then(|()| fs::rename(&temp, path));

    if let Err(source) = result {
        let _ = fs::remove_file(&temp);
        return Err(persist_error(source));
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.phototagger-tmp", name))
}
