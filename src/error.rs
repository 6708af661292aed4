use std::path::PathBuf;
use thiserror::Error;

/// The main error type for phototagger operations.
#[derive(Debug, Error)]
pub enum PhotoTaggerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Invalid image dimensions {width}x{height} for {path} (each must be 1 to 4294967295)")]
    InvalidImageDimensions {
        path: PathBuf,
        width: u64,
        height: u64,
    },

    #[error("No detections found for {image}: expected sidecar file {expected}")]
    DetectionsMissing { image: PathBuf, expected: PathBuf },

    #[error("Failed to parse detections from {path}: {source}")]
    DetectionsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("No EXIF metadata segment in {path}")]
    MissingExif { path: PathBuf },

    #[error("Invalid EXIF metadata in {path}: {message}")]
    MetadataParse { path: PathBuf, message: String },

    #[error("EXIF metadata for {path} is {size} bytes, which does not fit in one APP1 segment")]
    ExifTooLarge { path: PathBuf, size: usize },

    #[error("Failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode detection comment: {0}")]
    CommentEncode(#[source] serde_json::Error),

    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Tagging failed for {failed} of {total} file(s)")]
    BatchFailed { failed: usize, total: usize },

    #[error("Could not read keywords from {failed} of {total} file(s)")]
    ShowFailed { failed: usize, total: usize },
}
