//! External track writer: delegates each cut to a trimming tool
//!
//! Runs `<tool> SRC DST trim <start>s <length>s` (sox syntax, offsets in
//! samples) once per track and waits for it to finish.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, error};

use super::{TrackOutcome, TrackWriter};
use crate::splits::Track;
use crate::{Error, Result};

/// Delegates every track to an external trimming tool
#[derive(Debug)]
pub struct ExternalTrim {
    input: PathBuf,
    tool_name: String,
    tool_path: Option<PathBuf>,
    resolved: Option<PathBuf>,
}

impl ExternalTrim {
    /// Cut tracks from `input` with the tool called `tool_name`.
    ///
    /// `tool_path` takes precedence when it exists; otherwise the tool is
    /// looked up on `PATH`. Lookup happens on the first written track.
    pub fn new(input: &Path, tool_name: &str, tool_path: Option<&Path>) -> Self {
        Self {
            input: input.to_path_buf(),
            tool_name: tool_name.to_string(),
            tool_path: tool_path.map(Path::to_path_buf),
            resolved: None,
        }
    }

    fn tool(&mut self) -> Result<PathBuf> {
        if let Some(path) = &self.resolved {
            return Ok(path.clone());
        }

        let path = match &self.tool_path {
            Some(p) if p.exists() => p.clone(),
            _ => which::which(&self.tool_name).map_err(|e| {
                error!("Cannot locate {}: {}", self.tool_name, e);
                Error::ExternalToolMissing(self.tool_name.clone())
            })?,
        };

        debug!("Using {} at {}", self.tool_name, path.display());
        self.resolved = Some(path.clone());
        Ok(path)
    }

    /// Argument list after the program name
    pub fn trim_args(&self, track: &Track, dest: &Path) -> Vec<String> {
        vec![
            self.input.to_string_lossy().into_owned(),
            dest.to_string_lossy().into_owned(),
            "trim".to_string(),
            format!("{}s", track.start),
            format!("{}s", track.length),
        ]
    }
}

impl TrackWriter for ExternalTrim {
    /// Every cut names its own start, so there is no cursor to place.
    fn begin(&mut self, _first_split: u64) -> Result<()> {
        Ok(())
    }

    fn write_track(&mut self, track: &Track, dest: &Path) -> Result<TrackOutcome> {
        let program = self.tool()?;
        let args = self.trim_args(track, dest);
        debug!("Running {} {}", program.display(), args.join(" "));

        let output = Command::new(&program).args(&args).output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::ExternalToolMissing(self.tool_name.clone())
            } else {
                Error::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ExternalTool {
                path: dest.to_path_buf(),
                message: format!(
                    "{} exited with {}: {}",
                    self.tool_name,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        Ok(TrackOutcome::Delegated)
    }

    fn skip_track(&mut self, track: &Track) -> Result<()> {
        debug!("Leaving track {} to the existing output", track.number);
        Ok(())
    }
}
