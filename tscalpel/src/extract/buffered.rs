//! Built-in track writer: buffered sample copy into WAV files

use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use super::{TrackOutcome, TrackWriter};
use crate::audio::wav::WavSink;
use crate::audio::{AudioSource, OutputFormat, SampleBuffer};
use crate::splits::Track;
use crate::{Error, Result};

/// Copies each track from one shared input cursor through a reused buffer
pub struct BufferedCopy<S> {
    source: S,
    buffer: SampleBuffer,
    buffer_frames: usize,
}

impl<S: AudioSource> BufferedCopy<S> {
    /// Wrap `source` for copying into `format` outputs.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if `format` is not WAV or `buffer_frames` is zero;
    /// [`Error::Audio`] if the source cannot report its sample subtype.
    pub fn new(source: S, format: &OutputFormat, buffer_frames: usize) -> Result<Self> {
        format.ensure_wav()?;
        if buffer_frames == 0 {
            return Err(Error::Config("copy buffer must hold at least one frame".to_string()));
        }
        let info = source.info();
        let subtype = info
            .subtype
            .ok_or_else(|| Error::Audio("input sample subtype is unknown".to_string()))?;
        let buffer = SampleBuffer::new(subtype, info.channels, buffer_frames);

        Ok(Self {
            source,
            buffer,
            buffer_frames,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: AudioSource> TrackWriter for BufferedCopy<S> {
    fn begin(&mut self, first_split: u64) -> Result<()> {
        self.source.seek(first_split)
    }

    /// Samples go to a temporary file beside `dest`, renamed into place once
    /// the WAV header is finalized. A failed copy leaves no `NN.wav` behind.
    fn write_track(&mut self, track: &Track, dest: &Path) -> Result<TrackOutcome> {
        let part = partial_file(dest)?;
        let mut sink = WavSink::create(part.path(), self.source.info())?;
        let mut remaining = track.length;

        while remaining > 0 {
            let want = remaining.min(self.buffer_frames as u64) as usize;
            let got = self.source.read(&mut self.buffer, want)?;
            if got == 0 {
                return Err(Error::Audio(format!(
                    "input ended at frame {} with {} frames of track {} left",
                    self.source.position(),
                    remaining,
                    track.number
                )));
            }
            sink.write(&self.buffer)?;
            remaining -= got as u64;
        }

        sink.finalize()?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // scratch files are created owner-only
            std::fs::set_permissions(part.path(), std::fs::Permissions::from_mode(0o644))?;
        }
        part.persist(dest).map_err(|e| Error::Io(e.error))?;
        debug!("Copied {} frames to {}", track.length, dest.display());
        Ok(TrackOutcome::Written)
    }

    fn skip_track(&mut self, track: &Track) -> Result<()> {
        self.source.skip(track.length)
    }
}

/// Hidden scratch file in the directory of `dest`, removed when dropped
fn partial_file(dest: &Path) -> Result<NamedTempFile> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let part = tempfile::Builder::new()
        .prefix(".tscalpel-")
        .suffix(".part")
        .tempfile_in(dir)?;
    Ok(part)
}
