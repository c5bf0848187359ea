//! Track extraction
//!
//! Walks the split list once, producing one numbered output per track. Two
//! writers implement the per-track work:
//!
//! - [`BufferedCopy`]: streams samples from an [`AudioSource`] into a WAV
//!   sink through a fixed buffer
//! - [`ExternalTrim`]: hands each track to an external tool (`sox`)
//!
//! The input cursor only moves forward. It is positioned at the first split
//! before track 1; afterwards every track, written or skipped, advances it by
//! exactly the track length.
//!
//! [`AudioSource`]: crate::audio::AudioSource

pub mod buffered;
pub mod external;

pub use buffered::BufferedCopy;
pub use external::ExternalTrim;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::splits::{tracks_from_splits, Track};
use crate::Result;

/// What happened to one track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Samples copied by the built-in writer
    Written,
    /// Cut by the external tool
    Delegated,
    /// Output already existed and overwrite was off
    Skipped,
}

/// Per-track output strategy
pub trait TrackWriter {
    /// Called once before the first track with the first split offset.
    fn begin(&mut self, first_split: u64) -> Result<()>;

    /// Produce `track` at `dest`, replacing any existing file.
    fn write_track(&mut self, track: &Track, dest: &Path) -> Result<TrackOutcome>;

    /// Move past `track` without producing output.
    fn skip_track(&mut self, track: &Track) -> Result<()>;
}

/// Where and how outputs are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub output_dir: PathBuf,
    /// Appended to the two-digit track number, including the dot
    pub extension: String,
    pub overwrite: bool,
}

impl ExtractOptions {
    /// Output path for a 1-based track number: `NN<ext>` in the output dir
    pub fn output_path(&self, number: usize) -> PathBuf {
        self.output_dir.join(format!("{:02}{}", number, self.extension))
    }
}

/// One processed track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackReport {
    pub track: Track,
    pub path: PathBuf,
    pub outcome: TrackOutcome,
}

/// Result of an extraction run, in track order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub tracks: Vec<TrackReport>,
}

impl ExtractReport {
    pub fn count(&self, outcome: TrackOutcome) -> usize {
        self.tracks.iter().filter(|t| t.outcome == outcome).count()
    }

    /// Paths that were left untouched because they already existed
    pub fn skipped_paths(&self) -> Vec<&Path> {
        self.tracks
            .iter()
            .filter(|t| t.outcome == TrackOutcome::Skipped)
            .map(|t| t.path.as_path())
            .collect()
    }
}

/// Cut the tracks between consecutive `splits` using `writer`.
///
/// The output directory is created if missing. Errors from the writer abort
/// the run; outputs already produced stay on disk.
pub fn extract_tracks<W>(
    writer: &mut W,
    splits: &[u64],
    options: &ExtractOptions,
) -> Result<ExtractReport>
where
    W: TrackWriter + ?Sized,
{
    fs::create_dir_all(&options.output_dir)?;

    let tracks = tracks_from_splits(splits);
    let mut report = ExtractReport::default();
    let Some(&first) = splits.first() else {
        return Ok(report);
    };
    writer.begin(first)?;

    for track in tracks {
        let path = options.output_path(track.number);

        let outcome = if !options.overwrite && path.exists() {
            warn!("{} already exists, skipping", path.display());
            writer.skip_track(&track)?;
            TrackOutcome::Skipped
        } else {
            info!("Writing {} starting at {}...", path.display(), track.start);
            writer.write_track(&track, &path)?
        };

        report.tracks.push(TrackReport {
            track,
            path,
            outcome,
        });
    }

    info!(
        "Extracted {} tracks: {} written, {} delegated, {} skipped",
        report.tracks.len(),
        report.count(TrackOutcome::Written),
        report.count(TrackOutcome::Delegated),
        report.count(TrackOutcome::Skipped)
    );

    Ok(report)
}
