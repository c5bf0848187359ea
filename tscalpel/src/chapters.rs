//! Chapter timestamp resolution
//!
//! Each play item keeps its own clip-local clock. Chaining the item
//! durations in playlist order gives one absolute axis where the playlist
//! starts at tick 0; chapter marks are then moved from their item's clock
//! onto that axis.

use tscalpel_common::timing::{format_timecode, ticks_to_seconds, TICK_RATE};
use tracing::debug;

use crate::mpls::{PlayItem, PlayList, PlayMark};
use crate::{Error, Result};

/// Per-item offsets from clip-local ticks to absolute playlist ticks
///
/// `absolute = local + offset(item)`, where `offset(item)` is the running
/// playlist duration before the item minus the item's IN time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBase {
    offsets: Vec<i64>,
    total_duration: i64,
}

impl TimeBase {
    /// Chain play item durations in playlist order.
    pub fn new(items: &[PlayItem]) -> Self {
        let mut offsets = Vec::with_capacity(items.len());
        let mut elapsed = 0i64;
        for item in items {
            offsets.push(elapsed - item.in_time as i64);
            elapsed += item.duration();
        }
        Self {
            offsets,
            total_duration: elapsed,
        }
    }

    /// Offset for the item at `index`, if it exists
    pub fn offset(&self, index: usize) -> Option<i64> {
        self.offsets.get(index).copied()
    }

    /// Sum of all play item durations, in ticks
    pub fn total_duration(&self) -> i64 {
        self.total_duration
    }

    pub fn item_count(&self) -> usize {
        self.offsets.len()
    }
}

/// Resolved chapter start times on the absolute playlist axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapters {
    ticks: Vec<i64>,
    resolution: i64,
}

impl Chapters {
    /// Chapter starts in ticks, in mark order
    pub fn ticks(&self) -> &[i64] {
        &self.ticks
    }

    /// Ticks per second of [`Chapters::ticks`]
    pub fn resolution(&self) -> i64 {
        self.resolution
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// One `NN: MMM:SS.ffffff` line per chapter, numbered from 1
    pub fn timecode_lines(&self) -> Vec<String> {
        self.ticks
            .iter()
            .enumerate()
            .map(|(i, &t)| format!("{:>2}: {}", i + 1, format_timecode(t)))
            .collect()
    }
}

/// Resolve chapter marks onto the absolute playlist axis.
///
/// Only chapter (entry) marks are used; other mark types are ignored. Marks
/// are taken in file order without sorting.
///
/// # Errors
///
/// - [`Error::Reference`] if a chapter mark names a play item that does not
///   exist
/// - [`Error::MalformedPlaylist`] if the resolved chapters are negative or
///   out of order
pub fn resolve_chapters(play_list: &PlayList, marks: &[PlayMark]) -> Result<Chapters> {
    let time_base = TimeBase::new(&play_list.play_items);
    debug!(
        "Playlist duration: {:.3}s over {} play items",
        ticks_to_seconds(time_base.total_duration()),
        time_base.item_count()
    );

    let mut ticks = Vec::new();
    for (index, mark) in marks.iter().enumerate() {
        if !mark.is_chapter() {
            continue;
        }
        let item = mark.play_item_ref as usize;
        let offset = time_base.offset(item).ok_or(Error::Reference {
            mark: index,
            item,
            item_count: time_base.item_count(),
        })?;
        ticks.push(mark.time_stamp as i64 + offset);
    }

    ensure_monotonic(&ticks)?;

    Ok(Chapters {
        ticks,
        resolution: TICK_RATE,
    })
}

/// Check resolved chapter ticks are non-negative and non-decreasing.
pub fn ensure_monotonic(ticks: &[i64]) -> Result<()> {
    if let Some(&first) = ticks.first() {
        if first < 0 {
            return Err(Error::MalformedPlaylist(format!(
                "chapter 1 resolves to tick {}, before the start of the playlist",
                first
            )));
        }
    }
    for (i, pair) in ticks.windows(2).enumerate() {
        if pair[1] < pair[0] {
            return Err(Error::MalformedPlaylist(format!(
                "chapter {} (tick {}) starts before chapter {} (tick {})",
                i + 2,
                pair[1],
                i + 1,
                pair[0]
            )));
        }
    }
    Ok(())
}
