//! Tick-based timing for playlist chapter marks
//!
//! Blu-ray playlists express every instant in ticks of a 45 kHz clock. This
//! module holds the conversions from that clock into the sample domain of the
//! recording being split.
//!
//! # Architecture
//!
//! Three time representations are involved:
//!
//! 1. **Ticks (Playlist)**: i64 values at 45,000 Hz, as decoded and resolved
//! 2. **Blocks (Alignment)**: whole alignment units of `1/align` second
//! 3. **Samples (Audio)**: u64 frame offsets at the input sample rate
//!
//! ## Alignment
//!
//! A split is placed on a block boundary, where a block is
//! `sample_rate / align` samples long. With no alignment override the divisor
//! equals the sample rate, so a block is a single sample. Audio CD sectors are
//! 1/75 second, giving 588-sample blocks at 44.1 kHz.
//!
//! Rounding is applied to the *block count*, never to a raw sample value, so
//! every split lands on a block boundary whatever the rounding mode.
//!
//! # Examples
//!
//! ```rust
//! use tscalpel_common::timing::*;
//!
//! // Half a second, aligned to CD sectors at 44.1 kHz, rounded down
//! let block = block_size(44_100, CD_SECTORS_PER_SECOND).unwrap();
//! assert_eq!(block, 588);
//!
//! let blocks = RoundMode::Down.round_ratio(22_500 * 75, TICK_RATE as i128);
//! assert_eq!(blocks, 37);
//! assert_eq!(blocks as u64 * block as u64, 21_756);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Playlist clock rate: 45,000 ticks per second
pub const TICK_RATE: i64 = 45_000;

/// Audio CD sectors per second, the `--cd` alignment shorthand
pub const CD_SECTORS_PER_SECOND: u32 = 75;

// ============================================================================
// Rounding
// ============================================================================

/// Rounding policy used when a chapter does not fall on a block boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundMode {
    /// Round toward negative infinity (floor)
    #[default]
    Down,
    /// Round to the nearest block, exact halves to the even block
    Nearest,
    /// Round toward positive infinity (ceiling)
    Up,
}

impl RoundMode {
    /// All modes, in increasing order of the block they select
    pub const ALL: [RoundMode; 3] = [RoundMode::Down, RoundMode::Nearest, RoundMode::Up];

    /// Round the exact rational `num / den` to an integer
    ///
    /// The arithmetic is exact and done in `i128`, so the product of any
    /// `i64` tick and `u32` alignment is representable.
    ///
    /// `den` must be positive; callers pass the playlist clock rate. This is
    /// checked in debug builds only.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tscalpel_common::RoundMode;
    ///
    /// // 37.5
    /// assert_eq!(RoundMode::Down.round_ratio(75, 2), 37);
    /// assert_eq!(RoundMode::Nearest.round_ratio(75, 2), 38);
    /// assert_eq!(RoundMode::Up.round_ratio(75, 2), 38);
    ///
    /// // 36.5 goes to the even neighbour
    /// assert_eq!(RoundMode::Nearest.round_ratio(73, 2), 36);
    /// ```
    pub fn round_ratio(self, num: i128, den: i128) -> i128 {
        debug_assert!(den > 0, "denominator must be > 0");

        let floor = num.div_euclid(den);
        let rem = num.rem_euclid(den);

        match self {
            RoundMode::Down => floor,
            RoundMode::Up => {
                if rem == 0 {
                    floor
                } else {
                    floor + 1
                }
            }
            RoundMode::Nearest => match (2 * rem).cmp(&den) {
                std::cmp::Ordering::Less => floor,
                std::cmp::Ordering::Greater => floor + 1,
                std::cmp::Ordering::Equal => floor + floor.rem_euclid(2),
            },
        }
    }

    /// Lowercase name as accepted on the command line and in config files
    pub fn as_str(self) -> &'static str {
        match self {
            RoundMode::Down => "down",
            RoundMode::Nearest => "nearest",
            RoundMode::Up => "up",
        }
    }
}

impl fmt::Display for RoundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "down" => Ok(RoundMode::Down),
            "nearest" => Ok(RoundMode::Nearest),
            "up" => Ok(RoundMode::Up),
            other => Err(Error::InvalidInput(format!(
                "unknown rounding mode '{}' (expected down, nearest or up)",
                other
            ))),
        }
    }
}

// ============================================================================
// Alignment
// ============================================================================

/// Samples per alignment block: `sample_rate / align`
///
/// # Errors
///
/// Returns [`Error::Config`] if either value is zero or `align` does not
/// divide `sample_rate` evenly.
///
/// ```rust
/// use tscalpel_common::timing::block_size;
///
/// assert_eq!(block_size(48_000, 48_000).unwrap(), 1);
/// assert_eq!(block_size(44_100, 75).unwrap(), 588);
/// assert!(block_size(44_100, 64).is_err());
/// ```
pub fn block_size(sample_rate: u32, align: u32) -> Result<u32> {
    if sample_rate == 0 {
        return Err(Error::Config("Sample rate must be greater than zero".to_string()));
    }
    if align == 0 || sample_rate % align != 0 {
        return Err(Error::Config(format!(
            "Input sample rate {} is not evenly divisible into {} blocks per second",
            sample_rate, align
        )));
    }
    Ok(sample_rate / align)
}

// ============================================================================
// Display
// ============================================================================

/// Convert ticks to seconds (f64), for display and logging only
pub fn ticks_to_seconds(ticks: i64) -> f64 {
    ticks as f64 / TICK_RATE as f64
}

/// Format a tick value as `MMM:SS.ffffff`
///
/// Minutes are right-aligned to three columns and not wrapped into hours.
/// The fractional part is truncated to whole microseconds.
///
/// ```rust
/// use tscalpel_common::timing::format_timecode;
///
/// assert_eq!(format_timecode(0), "  0:00.000000");
/// assert_eq!(format_timecode(22_500), "  0:00.500000");
/// assert_eq!(format_timecode(45_000 * 61 + 1), "  1:01.000022");
/// ```
pub fn format_timecode(ticks: i64) -> String {
    let whole_seconds = ticks.div_euclid(TICK_RATE);
    let minutes = whole_seconds.div_euclid(60);
    let seconds = whole_seconds.rem_euclid(60);
    let micros = (ticks as i128 * 1_000_000 / TICK_RATE as i128).rem_euclid(1_000_000);
    format!("{:>3}:{:02}.{:06}", minutes, seconds, micros)
}

// ============================================================================
// Tests Module
// ============================================================================

#[cfg(test)]
#[path = "timing_tests.rs"]
mod tests;
