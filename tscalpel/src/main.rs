//! trackscalpel - split an audio rip into tracks at playlist chapter marks
//!
//! Reads chapter marks from a Blu-ray movie playlist (`.mpls`) and cuts the
//! matching audio file into `01.wav`, `02.wav`, ... in the output directory.
//! Given a sample rate instead of a file, prints the split offsets only.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tscalpel::app::{self, Overrides, RunOutcome, RunSettings, SoundInput};
use tscalpel::extract::TrackOutcome;
use tscalpel_common::config::TomlConfig;
use tscalpel_common::timing::CD_SECTORS_PER_SECOND;
use tscalpel_common::RoundMode;

/// Command-line arguments for trackscalpel
#[derive(Parser, Debug)]
#[command(name = "trackscalpel")]
#[command(about = "Split an audio file into tracks at Blu-ray playlist chapter marks")]
#[command(version)]
struct Args {
    /// Audio file to split, or a sample rate to only print split offsets
    soundfile: String,

    /// MPLS playlist holding the chapter marks
    playlist: PathBuf,

    /// Directory for the track files [default: current directory]
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Replace existing track files instead of skipping them
    #[arg(short = 'O', long)]
    overwrite: bool,

    /// Output format [default: same as input]
    #[arg(short, long, value_name = "NAME")]
    format: Option<String>,

    /// Put split points on 1/N second boundaries
    #[arg(short, long, value_name = "N", conflicts_with = "cd")]
    align: Option<u32>,

    /// Align to CD sectors (same as --align 75)
    #[arg(long)]
    cd: bool,

    /// Rounding for chapters between boundaries: down, nearest or up [default: down]
    #[arg(short, long, value_name = "MODE")]
    round: Option<RoundMode>,

    /// Print chapter timecodes and per-track progress
    #[arg(short, long)]
    verbose: bool,

    /// Cut with an external tool (sox) instead of the built-in WAV copy
    #[arg(short = 'x', long)]
    external: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            output_dir: self.output.clone(),
            overwrite: self.overwrite,
            format: self.format.clone(),
            align: if self.cd {
                Some(CD_SECTORS_PER_SECOND)
            } else {
                self.align
            },
            round: self.round,
            external: self.external,
            verbose: self.verbose,
        }
    }
}

fn init_tracing(verbose: bool, configured: Option<&str>) {
    let default_filter = if verbose {
        "tscalpel=info,trackscalpel=info".to_string()
    } else if let Some(level) = configured {
        level.to_string()
    } else {
        "tscalpel=warn,trackscalpel=warn".to_string()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn try_main(args: Args, config: TomlConfig) -> Result<()> {
    let input = SoundInput::parse(&args.soundfile)?;
    let settings = RunSettings::new(input, args.playlist.clone(), &config, args.overrides());

    let stdout = io::stdout();
    let outcome = app::run(&settings, &mut stdout.lock())
        .with_context(|| format!("Failed to split using {}", settings.playlist.display()))?;

    match outcome {
        RunOutcome::Listed { splits } => {
            info!("Listed {} split points", splits.len());
        }
        RunOutcome::Extracted { report, dropped } => {
            if !dropped.is_empty() {
                warn!("{} chapters started past the end of the input", dropped.len());
            }
            info!(
                "Done: {} written, {} delegated, {} skipped",
                report.count(TrackOutcome::Written),
                report.count(TrackOutcome::Delegated),
                report.count(TrackOutcome::Skipped)
            );
        }
    }

    Ok(())
}

/// Configuration errors exit with 2, everything else with 1.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    let is_config = err.chain().any(|cause| {
        matches!(cause.downcast_ref::<tscalpel::Error>(), Some(tscalpel::Error::Config(_)))
            || matches!(
                cause.downcast_ref::<tscalpel_common::Error>(),
                Some(tscalpel_common::Error::Config(_) | tscalpel_common::Error::InvalidInput(_))
            )
    });
    if is_config {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = TomlConfig::load();

    let configured_level = config
        .as_ref()
        .ok()
        .and_then(|c| c.logging.level.as_deref());
    init_tracing(args.verbose, configured_level);

    let result = config
        .context("Failed to load configuration")
        .and_then(|config| try_main(args, config));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            exit_code(&err)
        }
    }
}
