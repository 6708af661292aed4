//! Tagging options, loadable from a JSON file.
//!
//! Every field has a default, so a config file only needs the keys it wants
//! to change. Command-line flags are applied on top of the loaded values.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detection::provider::DEFAULT_DETECTIONS_SUFFIX;
use crate::error::PhotoTaggerError;
use crate::keywords::DEFAULT_DELIMITER;

/// Options controlling how files are tagged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagOptions {
    /// Separator placed between keywords.
    pub delimiter: String,
    /// Also write a JSON dump of every detection to the EXIF `UserComment`.
    pub include_raw_detection_comment: bool,
    /// Detections below this confidence are ignored.
    pub min_confidence: f64,
    /// Keep only the N most prominent labels.
    pub max_keywords: Option<usize>,
    /// Suffix of the JSON file holding each image's detections.
    pub detections_suffix: String,
    /// Create an EXIF segment in files that have none, instead of failing.
    pub create_missing_exif: bool,
    /// Stop a batch at the first failing file.
    pub fail_fast: bool,
    /// Compute keywords but leave files untouched.
    pub dry_run: bool,
}

impl Default for TagOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            include_raw_detection_comment: false,
            min_confidence: 0.0,
            max_keywords: None,
            detections_suffix: DEFAULT_DETECTIONS_SUFFIX.to_string(),
            create_missing_exif: false,
            fail_fast: false,
            dry_run: false,
        }
    }
}

impl TagOptions {
    /// Loads options from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid options object.
    pub fn load(path: &Path) -> Result<Self, PhotoTaggerError> {
        let text = fs::read_to_string(path).map_err(|source| PhotoTaggerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text).map_err(|source| PhotoTaggerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses options from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
