//! Per-file outcomes of a tagging run.

use std::fmt;
use std::path::PathBuf;

use crate::error::PhotoTaggerError;

/// What happened to one successfully processed file.
#[derive(Clone, Debug, PartialEq)]
pub struct TagOutcome {
    /// The image that was processed.
    pub path: PathBuf,
    /// Keyword string, most prominent label first.
    pub keywords: String,
    /// Number of detections that went into the ranking.
    pub detections: usize,
    /// False for dry runs.
    pub written: bool,
}

impl fmt::Display for TagOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.keywords)
    }
}

/// One file's entry in a [`BatchReport`].
#[derive(Debug)]
pub struct FileResult {
    pub path: PathBuf,
    pub result: Result<TagOutcome, PhotoTaggerError>,
}

/// The result of tagging a batch of files.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Results in processing order.
    pub files: Vec<FileResult>,
    /// True if the batch stopped early because of a failure.
    pub aborted: bool,
}

impl BatchReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome for one file.
    pub fn add(&mut self, path: PathBuf, result: Result<TagOutcome, PhotoTaggerError>) {
        self.files.push(FileResult { path, result });
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    /// Returns the number of files processed without error.
    pub fn tagged_count(&self) -> usize {
        self.files.iter().filter(|f| f.result.is_ok()).count()
    }

    /// Returns the number of files that failed.
    pub fn failed_count(&self) -> usize {
        self.files.iter().filter(|f| f.result.is_err()).count()
    }

    /// Returns true if every file succeeded.
    pub fn is_ok(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &TagOutcome> {
        self.files.iter().filter_map(|f| f.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &PhotoTaggerError)> {
        self.files
            .iter()
            .filter_map(|f| f.result.as_ref().err().map(|err| (&f.path, err)))
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failed_count();
        if failed == 0 {
            writeln!(f, "Tagged {} file(s)", self.tagged_count())?;
            return Ok(());
        }

        writeln!(
            f,
            "Tagged {} file(s), {} failed:",
            self.tagged_count(),
            failed
        )?;
        for (path, err) in self.failures() {
            writeln!(f, "  {}: {}", path.display(), err)?;
        }
        if self.aborted {
            writeln!(f, "Stopped after the first failure")?;
        }

        Ok(())
    }
}
