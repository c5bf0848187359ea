//! # tscalpel
//!
//! Splits one long audio rip into numbered per-track files at the chapter
//! marks of a Blu-ray movie playlist (`.mpls`).
//!
//! Pipeline:
//! 1. [`mpls`]: decode play items and marks from the playlist
//! 2. [`chapters`]: move chapter marks onto one absolute 45 kHz tick axis
//! 3. [`splits`]: convert ticks to sample offsets on alignment-block
//!    boundaries and fit them to the audio length
//! 4. [`extract`]: cut the tracks, either by buffered copy or through an
//!    external tool
//!
//! [`app::run`] drives the whole pipeline for one invocation.

pub mod app;
pub mod audio;
pub mod chapters;
pub mod error;
pub mod extract;
pub mod mpls;
pub mod splits;

pub use error::{Error, Result};
