//! Split point calculation
//!
//! Converts chapter ticks into sample offsets on alignment-block boundaries,
//! then fits the offsets to the length of the audio being split.
//!
//! # Conversion
//!
//! For a chapter at tick `t` with resolution `R`, alignment `N` and sample
//! rate `S`:
//!
//! ```text
//! block size   = S / N
//! block count  = round(t * N / R)      (exact rational, rounded once)
//! split offset = block count * block size
//! ```
//!
//! # End of file
//!
//! Splits past the end of the audio are dropped from the back of the list,
//! one warning each, and the audio length is appended unless the list already
//! ends exactly there. The last track therefore always ends at the end of
//! the file.

use tscalpel_common::timing::block_size;
use tscalpel_common::RoundMode;
use tracing::warn;

use crate::{Error, Result};

/// Sample rate, alignment and rounding for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConfig {
    sample_rate: u32,
    align: u32,
    block_size: u32,
    round: RoundMode,
}

impl SplitConfig {
    /// Validate the alignment against the sample rate.
    ///
    /// `align` defaults to the sample rate, which makes a block one sample.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if `align` does not evenly divide `sample_rate`.
    pub fn new(sample_rate: u32, align: Option<u32>, round: RoundMode) -> Result<Self> {
        let align = align.unwrap_or(sample_rate);
        let block_size = block_size(sample_rate, align)?;
        Ok(Self {
            sample_rate,
            align,
            block_size,
            round,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn align(&self) -> u32 {
        self.align
    }

    /// Samples per alignment block
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn round(&self) -> RoundMode {
        self.round
    }

    /// Sample offset of the block boundary chosen for `tick`.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedPlaylist`] if the tick is negative or the offset
    /// does not fit in a `u64`.
    pub fn split_at(&self, tick: i64, resolution: i64) -> Result<u64> {
        if tick < 0 {
            return Err(Error::MalformedPlaylist(format!(
                "chapter at negative tick {}",
                tick
            )));
        }
        let blocks = self
            .round
            .round_ratio(tick as i128 * self.align as i128, resolution as i128);
        let offset = blocks * self.block_size as i128;
        u64::try_from(offset).map_err(|_| {
            Error::MalformedPlaylist(format!(
                "chapter at tick {} is beyond the addressable range at {} Hz",
                tick, self.sample_rate
            ))
        })
    }
}

/// Convert chapter ticks into aligned sample offsets, one per chapter.
pub fn align_splits(ticks: &[i64], resolution: i64, config: &SplitConfig) -> Result<Vec<u64>> {
    ticks
        .iter()
        .map(|&t| config.split_at(t, resolution))
        .collect()
}

/// A split point removed because it lies past the end of the audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroppedSplit {
    /// 1-based number of the track that would have started here
    pub track: usize,
    pub offset: u64,
}

/// Split points fitted to the audio length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FittedSplits {
    /// Non-decreasing offsets, all `<= total`, ending at `total`
    pub splits: Vec<u64>,
    /// Removed splits, in removal order (last split first)
    pub dropped: Vec<DroppedSplit>,
}

/// Apply the end-of-file policy to non-decreasing split offsets.
pub fn fit_to_length(mut splits: Vec<u64>, total: u64) -> FittedSplits {
    let mut dropped = Vec::new();

    while let Some(&last) = splits.last() {
        if last <= total {
            break;
        }
        let track = splits.len();
        warn!(
            "Track {} starts after the end of the input file ({} > {} samples), dropping it",
            track, last, total
        );
        dropped.push(DroppedSplit {
            track,
            offset: last,
        });
        splits.pop();
    }

    if splits.last().map_or(true, |&last| last < total) {
        splits.push(total);
    }

    FittedSplits { splits, dropped }
}

/// One output track: a half-open sample range `[start, start + length)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    /// 1-based ordinal used to name the output
    pub number: usize,
    pub start: u64,
    pub length: u64,
}

impl Track {
    pub fn end(&self) -> u64 {
        self.start + self.length
    }
}

/// Tracks between consecutive split points.
///
/// `k` splits give `k - 1` tracks; audio before the first split is not part
/// of any track.
pub fn tracks_from_splits(splits: &[u64]) -> Vec<Track> {
    splits
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            debug_assert!(pair[0] <= pair[1], "split points must be non-decreasing");
            Track {
                number: i + 1,
                start: pair[0],
                length: pair[1].saturating_sub(pair[0]),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tscalpel_common::timing::{CD_SECTORS_PER_SECOND, TICK_RATE};

    #[test]
    fn test_whole_second_chapters_at_48k() {
        let ticks = [0, 45_000, 135_000];
        for mode in RoundMode::ALL {
            let config = SplitConfig::new(48_000, None, mode).unwrap();
            assert_eq!(config.block_size(), 1);
            assert_eq!(
                align_splits(&ticks, TICK_RATE, &config).unwrap(),
                vec![0, 48_000, 144_000],
                "mode {}",
                mode
            );
        }
    }

    #[test]
    fn test_cd_alignment_half_second() {
        let down = SplitConfig::new(44_100, Some(CD_SECTORS_PER_SECOND), RoundMode::Down).unwrap();
        assert_eq!(down.block_size(), 588);
        assert_eq!(down.split_at(22_500, TICK_RATE).unwrap(), 21_756);

        // 37.5 blocks: nearest goes to the even block (38), up to 38
        let nearest =
            SplitConfig::new(44_100, Some(CD_SECTORS_PER_SECOND), RoundMode::Nearest).unwrap();
        assert_eq!(nearest.split_at(22_500, TICK_RATE).unwrap(), 38 * 588);
        let up = SplitConfig::new(44_100, Some(CD_SECTORS_PER_SECOND), RoundMode::Up).unwrap();
        assert_eq!(up.split_at(22_500, TICK_RATE).unwrap(), 38 * 588);
    }

    #[test]
    fn test_uneven_alignment_is_config_error() {
        assert!(matches!(
            SplitConfig::new(44_100, Some(64), RoundMode::Down),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_splits_are_block_multiples_and_ordered() {
        let ticks: Vec<i64> = (0..200).map(|i| i * 7_919 + i * i).collect();
        for (rate, align) in [(44_100, 75), (48_000, 100), (96_000, 1_000), (44_100, 44_100)] {
            let mut per_mode = Vec::new();
            for mode in RoundMode::ALL {
                let config = SplitConfig::new(rate, Some(align), mode).unwrap();
                let splits = align_splits(&ticks, TICK_RATE, &config).unwrap();
                for s in &splits {
                    assert_eq!(s % config.block_size() as u64, 0);
                }
                per_mode.push(splits);
            }
            for i in 0..ticks.len() {
                assert!(per_mode[0][i] <= per_mode[1][i]);
                assert!(per_mode[1][i] <= per_mode[2][i]);
            }
        }
    }

    #[test]
    fn test_negative_tick_rejected() {
        let config = SplitConfig::new(48_000, None, RoundMode::Down).unwrap();
        assert!(matches!(
            config.split_at(-45_000, TICK_RATE),
            Err(Error::MalformedPlaylist(_))
        ));
    }

    #[test]
    fn test_large_tick_at_huge_rate_does_not_overflow() {
        let config = SplitConfig::new(4_000_000_000, None, RoundMode::Down).unwrap();
        let tick = u32::MAX as i64;
        let expected = (tick as u128 * 4_000_000_000 / TICK_RATE as u128) as u64;
        assert_eq!(config.split_at(tick, TICK_RATE).unwrap(), expected);
    }

    #[test]
    fn test_offset_past_u64_is_malformed() {
        let config = SplitConfig::new(4_000_000_000, None, RoundMode::Up).unwrap();
        assert!(matches!(
            config.split_at(i64::MAX, TICK_RATE),
            Err(Error::MalformedPlaylist(_))
        ));
    }

    #[test]
    fn test_fit_appends_total() {
        let fitted = fit_to_length(vec![0, 48_000], 100_000);
        assert_eq!(fitted.splits, vec![0, 48_000, 100_000]);
        assert!(fitted.dropped.is_empty());
    }

    #[test]
    fn test_fit_keeps_exact_end() {
        let fitted = fit_to_length(vec![0, 48_000, 100_000], 100_000);
        assert_eq!(fitted.splits, vec![0, 48_000, 100_000]);
    }

    #[test]
    fn test_fit_drops_past_end() {
        let fitted = fit_to_length(vec![0, 48_000, 144_000, 200_000], 100_000);
        assert_eq!(fitted.splits, vec![0, 48_000, 100_000]);
        assert_eq!(
            fitted.dropped,
            vec![
                DroppedSplit {
                    track: 4,
                    offset: 200_000
                },
                DroppedSplit {
                    track: 3,
                    offset: 144_000
                },
            ]
        );
    }

    #[test]
    fn test_fit_empty_and_all_dropped() {
        assert_eq!(fit_to_length(vec![], 500).splits, vec![500]);

        let fitted = fit_to_length(vec![600, 700], 500);
        assert_eq!(fitted.splits, vec![500]);
        assert_eq!(fitted.dropped.len(), 2);
    }

    #[test]
    fn test_fit_invariants() {
        let inputs: Vec<Vec<u64>> = vec![
            vec![],
            vec![0],
            vec![0, 10, 20],
            vec![5, 5, 5],
            vec![0, 50, 99, 100, 101, 150],
            vec![100],
            vec![200, 300],
        ];
        for input in inputs {
            let fitted = fit_to_length(input.clone(), 100);
            let s = &fitted.splits;
            assert_eq!(*s.last().unwrap(), 100, "input {:?}", input);
            assert!(s.iter().all(|&x| x <= 100), "input {:?}", input);
            assert!(s.windows(2).all(|w| w[0] <= w[1]), "input {:?}", input);
        }
    }

    #[test]
    fn test_tracks_from_splits() {
        let tracks = tracks_from_splits(&[0, 48_000, 100_000]);
        assert_eq!(
            tracks,
            vec![
                Track {
                    number: 1,
                    start: 0,
                    length: 48_000
                },
                Track {
                    number: 2,
                    start: 48_000,
                    length: 52_000
                },
            ]
        );
        assert_eq!(tracks[1].end(), 100_000);
        assert!(tracks_from_splits(&[100]).is_empty());
        assert!(tracks_from_splits(&[]).is_empty());
    }

    #[test]
    fn test_track_lengths_cover_audio() {
        let fitted = fit_to_length(vec![0, 1_176, 21_756, 99_960], 88_200);
        let tracks = tracks_from_splits(&fitted.splits);
        let total: u64 = tracks.iter().map(|t| t.length).sum();
        assert_eq!(total, 88_200);
        assert_eq!(tracks.len(), 3);
    }
}
