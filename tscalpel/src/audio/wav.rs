//! WAV source and sink using hound

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use super::{AudioInfo, AudioSource, SampleBuffer, Subtype};
use crate::{Error, Result};

/// Map a hound spec onto a [`Subtype`].
fn subtype_of(spec: &WavSpec) -> Result<Subtype> {
    Subtype::from_layout(spec.bits_per_sample, spec.sample_format == SampleFormat::Float)
        .ok_or_else(|| {
            Error::Audio(format!(
                "unsupported WAV sample layout: {} bits, {:?}",
                spec.bits_per_sample, spec.sample_format
            ))
        })
}

/// hound spec for writing `info`'s layout
fn spec_for(info: &AudioInfo) -> Result<WavSpec> {
    let subtype = info
        .subtype
        .ok_or_else(|| Error::Audio("source sample subtype is unknown".to_string()))?;
    Ok(WavSpec {
        channels: info.channels,
        sample_rate: info.sample_rate,
        bits_per_sample: subtype.bits_per_sample(),
        sample_format: if subtype.is_float() {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    })
}

/// WAV file opened for reading, with a tracked cursor
pub struct WavSource {
    reader: WavReader<BufReader<File>>,
    info: AudioInfo,
    position: u64,
}

impl WavSource {
    /// Open a WAV file and read its header.
    pub fn open(path: &Path) -> Result<Self> {
        let reader = WavReader::open(path)?;
        let spec = reader.spec();
        let info = AudioInfo {
            format: "WAV".to_string(),
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            frames: reader.duration() as u64,
            subtype: Some(subtype_of(&spec)?),
        };

        debug!(
            "Opened {}: {} Hz, {} channels, {} frames, {}",
            path.display(),
            info.sample_rate,
            info.channels,
            info.frames,
            spec.bits_per_sample
        );

        Ok(Self {
            reader,
            info,
            position: 0,
        })
    }
}

impl AudioSource for WavSource {
    fn info(&self) -> &AudioInfo {
        &self.info
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn seek(&mut self, frame: u64) -> Result<()> {
        if frame > self.info.frames {
            return Err(Error::Audio(format!(
                "seek to frame {} past end of stream ({} frames)",
                frame, self.info.frames
            )));
        }
        // frames <= duration(), which hound reports as u32
        self.reader.seek(frame as u32)?;
        self.position = frame;
        Ok(())
    }

    fn read(&mut self, buf: &mut SampleBuffer, frames: usize) -> Result<usize> {
        let channels = self.info.channels as usize;
        let wanted = frames * channels;

        match buf {
            SampleBuffer::Int(samples) => {
                samples.clear();
                for sample in self.reader.samples::<i32>().take(wanted) {
                    samples.push(sample?);
                }
            }
            SampleBuffer::Float(samples) => {
                samples.clear();
                for sample in self.reader.samples::<f32>().take(wanted) {
                    samples.push(sample?);
                }
            }
        }

        let read = buf.len() / channels;
        self.position += read as u64;
        Ok(read)
    }
}

/// WAV file opened for writing
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
}

impl WavSink {
    /// Create (or truncate) `path` with the sample layout of `info`.
    pub fn create(path: &Path, info: &AudioInfo) -> Result<Self> {
        let spec = spec_for(info)?;
        let writer = WavWriter::create(path, spec)?;
        Ok(Self { writer })
    }

    /// Append every sample held in `buf`.
    pub fn write(&mut self, buf: &SampleBuffer) -> Result<()> {
        match buf {
            SampleBuffer::Int(samples) => {
                for &sample in samples {
                    self.writer.write_sample(sample)?;
                }
            }
            SampleBuffer::Float(samples) => {
                for &sample in samples {
                    self.writer.write_sample(sample)?;
                }
            }
        }
        Ok(())
    }

    /// Flush and patch the header lengths.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize()?;
        Ok(())
    }
}
