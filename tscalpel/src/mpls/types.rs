//! Decoded playlist records
//!
//! Plain data produced by [`MplsReader`](super::MplsReader). Records are
//! built once per decode pass and never mutated afterward; derived timing
//! lives in [`crate::chapters`].

/// File type indicator at offset 0 of every playlist
pub const TYPE_INDICATOR: &[u8; 4] = b"MPLS";

/// Size of the fixed header prefix in bytes
pub const HEADER_LEN: u64 = 40;

/// Playlist header: version and block offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Version string, e.g. "0200" or "0300"
    pub version: String,
    /// Byte offset of the PlayList block
    pub play_list_start: u32,
    /// Byte offset of the PlayListMark block
    pub play_list_mark_start: u32,
    /// Byte offset of the extension data block (0 when absent, never decoded)
    pub extension_data_start: u32,
}

/// One clip reference within the playlist
///
/// `in_time` and `out_time` are ticks on the clip's own timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayItem {
    /// Clip information file name, e.g. "00055"
    pub clip_name: String,
    /// Clip codec identifier, normally "M2TS"
    pub codec_id: String,
    pub is_multi_angle: bool,
    pub connection_condition: u8,
    pub stc_id: u8,
    pub in_time: u32,
    pub out_time: u32,
}

impl PlayItem {
    /// Length of the item on the playlist timeline, in ticks
    pub fn duration(&self) -> i64 {
        self.out_time as i64 - self.in_time as i64
    }
}

/// The PlayList block
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayList {
    /// Number of sub paths declared (sub paths themselves are not decoded)
    pub sub_path_count: u16,
    pub play_items: Vec<PlayItem>,
}

/// Mark type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkType {
    /// Entry mark: the start of a chapter
    Chapter,
    /// Link point, used by navigation commands
    LinkPoint,
    Other(u8),
}

impl From<u8> for MarkType {
    fn from(value: u8) -> Self {
        match value {
            1 => MarkType::Chapter,
            2 => MarkType::LinkPoint,
            other => MarkType::Other(other),
        }
    }
}

impl From<MarkType> for u8 {
    fn from(value: MarkType) -> Self {
        match value {
            MarkType::Chapter => 1,
            MarkType::LinkPoint => 2,
            MarkType::Other(other) => other,
        }
    }
}

/// One PlayListMark record
///
/// `time_stamp` is in ticks on the timeline of the referenced play item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayMark {
    pub mark_type: MarkType,
    /// Index into [`PlayList::play_items`]
    pub play_item_ref: u16,
    pub time_stamp: u32,
    pub entry_es_pid: u16,
    pub duration: u32,
}

impl PlayMark {
    pub fn is_chapter(&self) -> bool {
        self.mark_type == MarkType::Chapter
    }
}

/// A fully decoded playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mpls {
    pub header: Header,
    pub play_list: PlayList,
    pub marks: Vec<PlayMark>,
}
