//! Detector and image-loader boundaries.
//!
//! Object detection itself happens outside this crate. A
//! [`DetectionProvider`] hands back whatever the detector reported for one
//! image; [`SidecarDetections`] reads that output from a JSON file stored
//! next to the image.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::debug;

use super::set::RawDetection;
use crate::error::PhotoTaggerError;

/// Default suffix of the sidecar file holding an image's detections.
pub const DEFAULT_DETECTIONS_SUFFIX: &str = ".detections.json";

/// An image on disk and its pixel dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Reads the pixel dimensions of an image from its header.
///
/// # Errors
/// Returns an error if the header cannot be read or either dimension is zero.
pub fn load_image_info(path: &Path) -> Result<ImageInfo, PhotoTaggerError> {
    let size = imagesize::size(path).map_err(|source| PhotoTaggerError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;

    let (width, height) = checked_dimensions(path, size.width, size.height)?;

    debug!("{}: {}x{}", path.display(), width, height);

    Ok(ImageInfo {
        path: path.to_path_buf(),
        width,
        height,
    })
}

/// Accepts dimensions that are positive and fit in `u32`.
fn checked_dimensions(
    path: &Path,
    width: usize,
    height: usize,
) -> Result<(u32, u32), PhotoTaggerError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(PhotoTaggerError::InvalidImageDimensions {
            path: path.to_path_buf(),
            width: width as u64,
            height: height as u64,
        }),
    }
}

/// Source of object detections for an image.
pub trait DetectionProvider {
    /// Returns every detection for `image`, in the order the detector emitted them.
    ///
    /// An empty result is valid and means nothing was detected.
    fn detect(&mut self, image: &ImageInfo) -> Result<Vec<RawDetection>, PhotoTaggerError>;
}

/// Reads detections from a JSON sidecar file next to each image.
///
/// For `photos/beach.jpg` and the default suffix, the sidecar is
/// `photos/beach.detections.json`. It holds a JSON array of
/// `{"bbox": [x0, y0, x1, y1], "label": "...", "confidence": 0.9}` objects.
#[derive(Clone, Debug)]
pub struct SidecarDetections {
    suffix: String,
}

impl SidecarDetections {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// Path of the sidecar file for `image`.
    pub fn sidecar_path(&self, image: &Path) -> PathBuf {
        let stem = image
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        image.with_file_name(format!("{}{}", stem, self.suffix))
    }
}

impl Default for SidecarDetections {
    fn default() -> Self {
        Self::new(DEFAULT_DETECTIONS_SUFFIX)
    }
}

impl DetectionProvider for SidecarDetections {
    fn detect(&mut self, image: &ImageInfo) -> Result<Vec<RawDetection>, PhotoTaggerError> {
        let sidecar = self.sidecar_path(&image.path);
        if !sidecar.is_file() {
            return Err(PhotoTaggerError::DetectionsMissing {
                image: image.path.clone(),
                expected: sidecar,
            });
        }

        let reader = BufReader::new(File::open(&sidecar)?);
        let detections: Vec<RawDetection> =
            serde_json::from_reader(reader).map_err(|source| PhotoTaggerError::DetectionsParse {
                path: sidecar.clone(),
                source,
            })?;

        debug!(
            "{}: {} detection(s) from {}",
            image.path.display(),
            detections.len(),
            sidecar.display()
        );
        Ok(detections)
    }
}
