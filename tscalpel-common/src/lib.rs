//! # trackscalpel common library
//!
//! Shared code for the trackscalpel crates:
//! - Error types
//! - Playlist tick timing, alignment and rounding arithmetic
//! - Chapter timecode formatting
//! - Configuration file loading

pub mod config;
pub mod error;
pub mod timing;

pub use error::{Error, Result};
pub use timing::RoundMode;
