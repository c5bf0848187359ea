//! Configuration file loading
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments (applied by the binary on top of this file)
//! 2. File named by the `TRACKSCALPEL_CONFIG` environment variable
//! 3. `<config dir>/trackscalpel/config.toml`
//! 4. Built-in defaults
//!
//! A missing file is not an error. A file that exists but cannot be read or
//! parsed is reported as [`Error::Config`].

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::timing::RoundMode;
use crate::{Error, Result};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "TRACKSCALPEL_CONFIG";

/// Frames held by the copy buffer unless configured otherwise
pub const DEFAULT_BUFFER_FRAMES: usize = 16_384;

/// Default external trimming tool
pub const DEFAULT_EXTERNAL_TOOL: &str = "sox";

/// Settings loaded from the TOML configuration file
///
/// Every field is optional in the file; unset fields take the built-in
/// defaults.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Output directory for track files
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Overwrite existing track files instead of skipping them
    #[serde(default)]
    pub overwrite: bool,

    /// Output container format name (e.g. "WAV", "FLAC")
    #[serde(default)]
    pub format: Option<String>,

    /// Alignment divisor: split points fall on 1/align second boundaries
    #[serde(default)]
    pub align: Option<u32>,

    /// Rounding used when a chapter is not on an alignment boundary
    #[serde(default)]
    pub round: RoundMode,

    /// Delegate trimming to the external tool
    #[serde(default)]
    pub external: bool,

    /// Frames per read/write chunk in the built-in copy
    #[serde(default = "default_buffer_frames")]
    pub buffer_frames: usize,

    /// External trimming tool
    #[serde(default)]
    pub external_tool: ExternalToolConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            overwrite: false,
            format: None,
            align: None,
            round: RoundMode::default(),
            external: false,
            buffer_frames: DEFAULT_BUFFER_FRAMES,
            external_tool: ExternalToolConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// External trimming tool configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExternalToolConfig {
    /// Executable name searched on `PATH`
    #[serde(default = "default_tool_name")]
    pub name: String,

    /// Explicit executable path, used instead of the `PATH` search
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for ExternalToolConfig {
    fn default() -> Self {
        Self {
            name: default_tool_name(),
            path: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log filter directive used when `RUST_LOG` is unset
    #[serde(default)]
    pub level: Option<String>,
}

fn default_buffer_frames() -> usize {
    DEFAULT_BUFFER_FRAMES
}

fn default_tool_name() -> String {
    DEFAULT_EXTERNAL_TOOL.to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Load configuration from the highest-priority file that exists
    ///
    /// Falls back to [`TomlConfig::default`] when no file is found.
    pub fn load() -> Result<Self> {
        match config_file_path() {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            None => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.buffer_frames == 0 {
            return Err(Error::Config("buffer_frames must be greater than zero".to_string()));
        }
        if self.align == Some(0) {
            return Err(Error::Config("align must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Locate the configuration file, if any
///
/// A file named by `TRACKSCALPEL_CONFIG` is returned even if it does not
/// exist; loading it then fails with a read error.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("trackscalpel").join("config.toml"))
        .filter(|p| p.exists())
}
