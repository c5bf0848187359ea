//! Audio backend
//!
//! The extraction engine needs four things from the audio layer: stream
//! introspection (rate, channels, length, sample subtype), a seekable read
//! cursor, typed sample buffers and a writer that preserves the source
//! layout. Samples are copied verbatim; nothing is converted or resampled.
//!
//! - [`wav`]: hound-backed WAV source and sink used by the built-in copy
//! - [`probe`]: symphonia-backed introspection for inputs that only the
//!   external tool reads

pub mod probe;
pub mod wav;

use std::fmt;
use std::path::Path;

use crate::{Error, Result};

/// Sample encoding of a PCM stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subtype {
    /// 8-bit integer (unsigned on disk in WAV)
    PcmU8,
    Pcm16,
    Pcm24,
    Pcm32,
    /// 32-bit IEEE float
    Float,
}

impl Subtype {
    /// Subtype for integer PCM of the given width, or float when `float` is set
    pub fn from_layout(bits_per_sample: u16, float: bool) -> Option<Self> {
        match (float, bits_per_sample) {
            (true, 32) => Some(Subtype::Float),
            (false, 8) => Some(Subtype::PcmU8),
            (false, 16) => Some(Subtype::Pcm16),
            (false, 24) => Some(Subtype::Pcm24),
            (false, 32) => Some(Subtype::Pcm32),
            _ => None,
        }
    }

    pub fn bits_per_sample(self) -> u16 {
        match self {
            Subtype::PcmU8 => 8,
            Subtype::Pcm16 => 16,
            Subtype::Pcm24 => 24,
            Subtype::Pcm32 | Subtype::Float => 32,
        }
    }

    pub fn is_float(self) -> bool {
        self == Subtype::Float
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Subtype::PcmU8 => "PCM_U8",
            Subtype::Pcm16 => "PCM_16",
            Subtype::Pcm24 => "PCM_24",
            Subtype::Pcm32 => "PCM_32",
            Subtype::Float => "FLOAT",
        })
    }
}

/// Stream properties of an input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInfo {
    /// Container format name, upper case (e.g. "WAV", "FLAC")
    pub format: String,
    pub sample_rate: u32,
    pub channels: u16,
    /// Total length in frames (samples per channel)
    pub frames: u64,
    /// Sample encoding, when the backend can report it
    pub subtype: Option<Subtype>,
}

/// Interleaved sample storage matching a [`Subtype`]
///
/// Integer PCM of every width is carried as `i32`, float as `f32`.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleBuffer {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl SampleBuffer {
    /// Allocate a buffer holding `frames` frames of `channels` channels.
    pub fn new(subtype: Subtype, channels: u16, frames: usize) -> Self {
        let capacity = frames * channels as usize;
        if subtype.is_float() {
            SampleBuffer::Float(Vec::with_capacity(capacity))
        } else {
            SampleBuffer::Int(Vec::with_capacity(capacity))
        }
    }

    /// Number of individual samples held (all channels)
    pub fn len(&self) -> usize {
        match self {
            SampleBuffer::Int(v) => v.len(),
            SampleBuffer::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        match self {
            SampleBuffer::Int(v) => v.clear(),
            SampleBuffer::Float(v) => v.clear(),
        }
    }
}

/// A seekable input stream with a single read cursor
///
/// Positions and lengths are in frames.
pub trait AudioSource {
    fn info(&self) -> &AudioInfo;

    /// Current cursor position
    fn position(&self) -> u64;

    /// Move the cursor to an absolute frame.
    fn seek(&mut self, frame: u64) -> Result<()>;

    /// Replace the contents of `buf` with up to `frames` frames from the
    /// cursor, advancing it. Returns the number of frames read, which is
    /// short only at end of stream.
    fn read(&mut self, buf: &mut SampleBuffer, frames: usize) -> Result<usize>;

    /// Advance the cursor by `frames` without reading.
    fn skip(&mut self, frames: u64) -> Result<()> {
        let target = self.position() + frames;
        self.seek(target)
    }
}

/// Output container format and file extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFormat {
    name: String,
    extension: String,
}

impl OutputFormat {
    /// Choose the output format for a run.
    ///
    /// With no override the input's format is kept and the extension is
    /// copied from the input file name (empty if it has none). An override
    /// names the format and gives the extension `.` + lower-cased name.
    pub fn resolve(input_path: &Path, input_format: &str, requested: Option<&str>) -> Self {
        match requested {
            Some(name) => Self {
                name: name.to_ascii_uppercase(),
                extension: format!(".{}", name.to_ascii_lowercase()),
            },
            None => Self {
                name: input_format.to_ascii_uppercase(),
                extension: input_path
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default(),
            },
        }
    }

    /// Upper-case format name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extension including the leading dot, or empty
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_wav(&self) -> bool {
        self.name == "WAV" || self.name == "WAVE"
    }

    /// Fail unless the built-in writer can produce this format.
    pub fn ensure_wav(&self) -> Result<()> {
        if self.is_wav() {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "the built-in writer only produces WAV, not {}; \
                 use --external to delegate to an external tool",
                self.name
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_subtype_layout_roundtrip() {
        for subtype in [
            Subtype::PcmU8,
            Subtype::Pcm16,
            Subtype::Pcm24,
            Subtype::Pcm32,
            Subtype::Float,
        ] {
            assert_eq!(
                Subtype::from_layout(subtype.bits_per_sample(), subtype.is_float()),
                Some(subtype)
            );
        }
        assert_eq!(Subtype::from_layout(64, true), None);
        assert_eq!(Subtype::from_layout(12, false), None);
        assert_eq!(Subtype::Pcm24.to_string(), "PCM_24");
    }

    #[test]
    fn test_sample_buffer_kind_follows_subtype() {
        assert!(matches!(
            SampleBuffer::new(Subtype::Float, 2, 16),
            SampleBuffer::Float(_)
        ));
        let buf = SampleBuffer::new(Subtype::Pcm16, 2, 16);
        assert!(matches!(buf, SampleBuffer::Int(_)));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_output_format_defaults_to_input() {
        let format = OutputFormat::resolve(&PathBuf::from("/rips/disc.wav"), "wav", None);
        assert_eq!(format.name(), "WAV");
        assert_eq!(format.extension(), ".wav");
        assert!(format.is_wav());
        assert!(format.ensure_wav().is_ok());
    }

    #[test]
    fn test_output_format_keeps_input_extension_case() {
        let format = OutputFormat::resolve(&PathBuf::from("disc.WAV"), "WAV", None);
        assert_eq!(format.extension(), ".WAV");

        let bare = OutputFormat::resolve(&PathBuf::from("disc"), "WAV", None);
        assert_eq!(bare.extension(), "");
    }

    #[test]
    fn test_output_format_override() {
        let format = OutputFormat::resolve(&PathBuf::from("disc.wav"), "WAV", Some("Flac"));
        assert_eq!(format.name(), "FLAC");
        assert_eq!(format.extension(), ".flac");
        assert!(matches!(format.ensure_wav(), Err(Error::Config(_))));
    }
}
