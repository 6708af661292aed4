//! Phototagger: keyword photos by what the camera saw.
//!
//! Phototagger takes the objects a detector found in a photo, ranks their
//! labels by how much of the frame they cover, and writes the ranking into
//! the photo's EXIF `XPKeywords` field so photo managers can search by it.
//!
//! # Modules
//!
//! - [`detection`]: Detection records, per-image aggregation and ranking
//! - [`keywords`]: Keyword strings and their EXIF byte encodings
//! - [`exif`]: JPEG EXIF container reading and writing
//! - [`metadata`]: In-place keyword updates of photo files
//! - [`tagging`]: The per-file pipeline and batch driver
//! - [`config`]: Tagging options
//! - [`error`]: Error types for phototagger operations

pub mod config;
pub mod detection;
pub mod error;
pub mod exif;
pub mod keywords;
pub mod metadata;
pub mod tagging;

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser};
use log::{warn, LevelFilter};

pub use config::TagOptions;
pub use error::PhotoTaggerError;

use detection::SidecarDetections;

/// The phototagger CLI application.
#[derive(Parser)]
#[command(name = "phototagger")]
#[command(version, about)]
#[command(group(ArgGroup::new("target").required(true).args(["filename", "directory"])))]
struct Cli {
    /// Photo to tag.
    #[arg(short = 'f', long = "filename", value_name = "FILE")]
    filename: Option<PathBuf>,

    /// Directory to search recursively for .jpg/.jpeg photos.
    #[arg(short = 'd', long = "directory", value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// JSON file with tagging options.
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Separator between keywords.
    #[arg(long)]
    delimiter: Option<String>,

    /// Also store every detection as JSON in the EXIF user comment.
    #[arg(long)]
    raw_comment: bool,

    /// Ignore detections below this confidence.
    #[arg(long, value_name = "SCORE")]
    min_confidence: Option<f64>,

    /// Keep only the N most prominent labels.
    #[arg(long, value_name = "N")]
    max_keywords: Option<usize>,

    /// Suffix of the JSON file next to each photo that holds its detections.
    #[arg(long, value_name = "SUFFIX")]
    detections_suffix: Option<String>,

    /// Add an EXIF segment to photos that have none instead of failing.
    #[arg(long)]
    create_missing_exif: bool,

    /// Stop a directory run at the first failing photo.
    #[arg(long)]
    fail_fast: bool,

    /// Print the keywords without writing them.
    #[arg(long)]
    dry_run: bool,

    /// Print the keywords already stored in the photos and exit.
    #[arg(long)]
    show: bool,
}

impl Cli {
    /// Loads the config file (if any) and applies flag overrides.
    fn tag_options(&self) -> Result<TagOptions, PhotoTaggerError> {
        let mut opts = match &self.config {
            Some(path) => TagOptions::load(path)?,
            None => TagOptions::default(),
        };

        if let Some(delimiter) = &self.delimiter {
            opts.delimiter = delimiter.clone();
        }
        if let Some(min_confidence) = self.min_confidence {
            opts.min_confidence = min_confidence;
        }
        if let Some(max_keywords) = self.max_keywords {
            opts.max_keywords = Some(max_keywords);
        }
        if let Some(suffix) = &self.detections_suffix {
            opts.detections_suffix = suffix.clone();
        }
        opts.include_raw_detection_comment |= self.raw_comment;
        opts.create_missing_exif |= self.create_missing_exif;
        opts.fail_fast |= self.fail_fast;
        opts.dry_run |= self.dry_run;

        Ok(opts)
    }
}

/// Maps the `-v` count to a log level.
fn verbosity_filter(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initialize logging once for the process.
///
/// `RUST_LOG` takes precedence over `default_filter` when it is set.
pub fn init_logging(default_filter: LevelFilter) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );

    if builder.try_init().is_err() {
        // Logger already initialized; nothing to do.
    }
}

/// Run the phototagger CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), PhotoTaggerError> {
    let cli = Cli::parse();
    init_logging(verbosity_filter(cli.verbose));

    let opts = cli.tag_options()?;

    if cli.show {
        return run_show(&cli);
    }

    let mut provider = SidecarDetections::new(opts.detections_suffix.clone());

    if let Some(file) = &cli.filename {
        let outcome = tagging::tag_file(file, &mut provider, &opts)?;
        println!("{}", outcome);
        return Ok(());
    }

    let Some(dir) = &cli.directory else {
        return Ok(());
    };
    let paths = tagging::discover_images(dir)?;
    let report = tagging::tag_paths(&paths, &mut provider, &opts);

    for outcome in report.outcomes() {
        println!("{}", outcome);
    }
    print!("{}", report);

    if report.is_ok() {
        Ok(())
    } else {
        Err(PhotoTaggerError::BatchFailed {
            failed: report.failed_count(),
            total: report.total(),
        })
    }
}

/// Print the keywords currently stored in each target.
fn run_show(cli: &Cli) -> Result<(), PhotoTaggerError> {
    let paths = match (&cli.filename, &cli.directory) {
        (Some(file), _) => vec![file.clone()],
        (None, Some(dir)) => tagging::discover_images(dir)?,
        (None, None) => Vec::new(),
    };

    let mut failed = 0;
    for path in &paths {
        match metadata::read_keywords(path) {
            Ok(Some(keywords)) => println!("{}: {}", path.display(), keywords),
            Ok(None) => println!("{}: <no keywords>", path.display()),
            Err(err) => {
                warn!("{}: {}", path.display(), err);
                println!("{}: <unreadable: {}>", path.display(), err);
                failed += 1;
            }
        }
    }

    if failed == 0 {
        Ok(())
    } else {
        Err(PhotoTaggerError::ShowFailed {
            failed,
            total: paths.len(),
        })
    }
}
