//! Run orchestration
//!
//! Ties the stages together for one invocation: decode the playlist, resolve
//! chapters, compute split points, then either list them (sample-rate input)
//! or cut the audio file into tracks.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;
use tscalpel_common::config::TomlConfig;
use tscalpel_common::RoundMode;

use crate::audio::probe::probe_file;
use crate::audio::wav::WavSource;
use crate::audio::{AudioSource, OutputFormat};
use crate::chapters::resolve_chapters;
use crate::extract::{
    extract_tracks, BufferedCopy, ExtractOptions, ExtractReport, ExternalTrim, TrackWriter,
};
use crate::mpls::read_playlist;
use crate::splits::{align_splits, fit_to_length, DroppedSplit, SplitConfig};
use crate::{Error, Result};

/// The sound-file argument: an audio file, or just a sample rate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundInput {
    File(PathBuf),
    /// No audio; split offsets are only listed
    SampleRate(u32),
}

impl SoundInput {
    /// Interpret the argument as an existing file, else as a sample rate.
    pub fn parse(arg: &str) -> Result<Self> {
        let path = Path::new(arg);
        if path.is_file() {
            return Ok(SoundInput::File(path.to_path_buf()));
        }
        match arg.trim().parse::<u32>() {
            Ok(rate) if rate > 0 => Ok(SoundInput::SampleRate(rate)),
            _ => Err(Error::Config(format!(
                "'{}' is neither an existing file nor a sample rate",
                arg
            ))),
        }
    }
}

/// Values given on the command line, applied over the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub overwrite: bool,
    pub format: Option<String>,
    pub align: Option<u32>,
    pub round: Option<RoundMode>,
    pub external: bool,
    pub verbose: bool,
}

/// Fully merged settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub input: SoundInput,
    pub playlist: PathBuf,
    pub output_dir: PathBuf,
    pub overwrite: bool,
    pub format: Option<String>,
    pub align: Option<u32>,
    pub round: RoundMode,
    pub external: bool,
    pub verbose: bool,
    pub buffer_frames: usize,
    pub external_tool: String,
    pub external_tool_path: Option<PathBuf>,
}

impl RunSettings {
    pub fn new(input: SoundInput, playlist: PathBuf, config: &TomlConfig, cli: Overrides) -> Self {
        Self {
            input,
            playlist,
            output_dir: cli
                .output_dir
                .or_else(|| config.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from(".")),
            overwrite: cli.overwrite || config.overwrite,
            format: cli.format.or_else(|| config.format.clone()),
            align: cli.align.or(config.align),
            round: cli.round.unwrap_or(config.round),
            external: cli.external || config.external,
            verbose: cli.verbose,
            buffer_frames: config.buffer_frames,
            external_tool: config.external_tool.name.clone(),
            external_tool_path: config.external_tool.path.clone(),
        }
    }
}

/// What a run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Sample-rate input: split offsets that were printed
    Listed { splits: Vec<u64> },
    /// File input: per-track results and splits dropped past the end
    Extracted {
        report: ExtractReport,
        dropped: Vec<DroppedSplit>,
    },
}

/// Execute one run, writing user-facing listings to `out`.
///
/// With `verbose` set, chapter timecodes are printed before anything else.
/// Sample-rate input prints one split offset per line and touches no audio.
pub fn run<W: Write>(settings: &RunSettings, out: &mut W) -> Result<RunOutcome> {
    let mpls = read_playlist(&settings.playlist)?;
    let chapters = resolve_chapters(&mpls.play_list, &mpls.marks)?;
    info!(
        "{}: {} chapters",
        settings.playlist.display(),
        chapters.len()
    );

    if settings.verbose {
        for line in chapters.timecode_lines() {
            writeln!(out, "{}", line)?;
        }
    }

    let path = match &settings.input {
        SoundInput::SampleRate(rate) => {
            let config = SplitConfig::new(*rate, settings.align, settings.round)?;
            let splits = align_splits(chapters.ticks(), chapters.resolution(), &config)?;
            for split in &splits {
                writeln!(out, "{}", split)?;
            }
            return Ok(RunOutcome::Listed { splits });
        }
        SoundInput::File(path) => path,
    };

    let (info, source) = if settings.external {
        (probe_file(path)?, None)
    } else {
        let source = open_wav_input(path)?;
        (source.info().clone(), Some(source))
    };

    let config = SplitConfig::new(info.sample_rate, settings.align, settings.round)?;
    let format = OutputFormat::resolve(path, &info.format, settings.format.as_deref());

    let mut writer: Box<dyn TrackWriter> = match source {
        Some(source) => Box::new(BufferedCopy::new(source, &format, settings.buffer_frames)?),
        None => Box::new(ExternalTrim::new(
            path,
            &settings.external_tool,
            settings.external_tool_path.as_deref(),
        )),
    };

    let splits = align_splits(chapters.ticks(), chapters.resolution(), &config)?;
    let fitted = fit_to_length(splits, info.frames);

    let options = ExtractOptions {
        output_dir: settings.output_dir.clone(),
        extension: format.extension().to_string(),
        overwrite: settings.overwrite,
    };
    let report = extract_tracks(writer.as_mut(), &fitted.splits, &options)?;

    Ok(RunOutcome::Extracted {
        report,
        dropped: fitted.dropped,
    })
}

/// Open the input for the built-in copy, which only reads WAV.
fn open_wav_input(path: &Path) -> Result<WavSource> {
    let reason = match WavSource::open(path) {
        Err(Error::Wav(hound::Error::FormatError(reason))) => reason,
        Err(Error::Wav(hound::Error::Unsupported)) => "unsupported WAV encoding",
        other => return other,
    };
    Err(Error::Config(format!(
        "{} cannot be read by the built-in WAV copy ({}); \
         use --external to cut it with an external tool",
        path.display(),
        reason
    )))
}
