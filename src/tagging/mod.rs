//! The per-file tagging pipeline and its batch driver.
//!
//! For each file: read the image dimensions, ask the detector for
//! detections, aggregate and rank them, encode the keyword string and write
//! it into the file's EXIF metadata. Files are processed one at a time, in
//! the order they are given.

mod report;

pub use report::{BatchReport, FileResult, TagOutcome};

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::TagOptions;
use crate::detection::{aggregate, load_image_info, DetectionProvider};
use crate::error::PhotoTaggerError;
use crate::keywords::{
    encode_for_metadata_field, encode_user_comment, raw_detection_comment, to_delimited_string,
};
use crate::metadata::{self, MetadataUpdate};

/// Extensions picked up in directory mode (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

/// Runs the full pipeline for one image.
///
/// # Errors
/// Any failure aborts this file: unreadable image, missing or malformed
/// detections, unusable metadata, or a failed write. Zero detections is not
/// a failure; the keyword field is then written empty.
pub fn tag_file<P>(
    path: &Path,
    provider: &mut P,
    opts: &TagOptions,
) -> Result<TagOutcome, PhotoTaggerError>
where
    P: DetectionProvider + ?Sized,
{
    let image = load_image_info(path)?;
    let raw = provider.detect(&image)?;
    let detected = raw.len();

    let kept = raw.into_iter().filter(|d| {
        if d.label.is_empty() {
            warn!("{}: ignoring detection without a label", path.display());
            return false;
        }
        if !d.bbox.is_ordered() {
            debug!(
                "{}: inverted box {:?} for '{}' counts as zero area",
                path.display(),
                d.bbox.to_array(),
                d.label
            );
        }
        d.confidence >= opts.min_confidence
    });
    let set = aggregate(kept, image.width, image.height).ok_or_else(|| {
        PhotoTaggerError::InvalidImageDimensions {
            path: path.to_path_buf(),
            width: image.width.into(),
            height: image.height.into(),
        }
    })?;
    if set.len() < detected {
        debug!(
            "{}: dropped {} detection(s) unlabeled or below confidence {}",
            path.display(),
            detected - set.len(),
            opts.min_confidence
        );
    }

    let ranked = set.ranked_labels(opts.max_keywords);
    let keywords = to_delimited_string(&ranked, &opts.delimiter);
    debug!("{}: ranked labels {:?}", path.display(), ranked);

    let user_comment = if opts.include_raw_detection_comment {
        let json = raw_detection_comment(&set).map_err(PhotoTaggerError::CommentEncode)?;
        Some(encode_user_comment(&json))
    } else {
        None
    };

    let update = MetadataUpdate {
        keywords: encode_for_metadata_field(&keywords),
        user_comment,
    };

    if opts.dry_run {
        info!("{}: dry run, not writing '{}'", path.display(), keywords);
    } else {
        metadata::apply(path, &update, opts.create_missing_exif)?;
        info!("{}: tagged '{}'", path.display(), keywords);
    }

    Ok(TagOutcome {
        path: path.to_path_buf(),
        keywords,
        detections: set.len(),
        written: !opts.dry_run,
    })
}

/// Tags each file in `paths`, in order.
///
/// A failing file is recorded in the report and the batch moves on, so one
/// bad file never affects another file's result. With `fail_fast`, the batch
/// stops at the first failure instead.
pub fn tag_paths<P>(paths: &[PathBuf], provider: &mut P, opts: &TagOptions) -> BatchReport
where
    P: DetectionProvider + ?Sized,
{
    let mut report = BatchReport::new();

    for path in paths {
        let result = tag_file(path, provider, opts);
        if let Err(err) = &result {
            warn!("{}: {}", path.display(), err);
        }
        let failed = result.is_err();
        report.add(path.clone(), result);

        if failed && opts.fail_fast {
            report.aborted = true;
            break;
        }
    }

    report
}

/// Finds JPEG files under `root`, recursively, in traversal order.
pub fn discover_images(root: &Path) -> Result<Vec<PathBuf>, PhotoTaggerError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|err| {
            let message = err.to_string();
            PhotoTaggerError::Io(
                err.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other(message)),
            )
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), &IMAGE_EXTENSIONS) {
            files.push(entry.path().to_path_buf());
        }
    }

    debug!("{}: found {} image(s)", root.display(), files.len());
    Ok(files)
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}
