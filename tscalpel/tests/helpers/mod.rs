//! Test helpers for tscalpel integration tests
//!
//! - `PlaylistBuilder`: synthesize MPLS playlists with chosen items and marks
//! - `write_ramp_wav` / `read_wav`: WAV fixtures whose sample values encode
//!   their frame index, so cut positions can be checked from content

#![allow(dead_code)]

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Chapter mark type
pub const CHAPTER: u8 = 1;
/// Link point mark type
pub const LINK_POINT: u8 = 2;

/// Builds MPLS playlist bytes
#[derive(Debug, Default, Clone)]
pub struct PlaylistBuilder {
    items: Vec<(u32, u32)>,
    marks: Vec<(u8, u16, u32)>,
}

impl PlaylistBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a play item covering `[in_time, out_time)` ticks.
    pub fn item(mut self, in_time: u32, out_time: u32) -> Self {
        self.items.push((in_time, out_time));
        self
    }

    /// Append a chapter mark at clip-local `time_stamp` of item `item`.
    pub fn chapter(self, item: u16, time_stamp: u32) -> Self {
        self.mark(CHAPTER, item, time_stamp)
    }

    pub fn mark(mut self, mark_type: u8, item: u16, time_stamp: u32) -> Self {
        self.marks.push((mark_type, item, time_stamp));
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut play_list = Vec::new();
        play_list.extend_from_slice(&0u16.to_be_bytes()); // reserved
        play_list.extend_from_slice(&(self.items.len() as u16).to_be_bytes());
        play_list.extend_from_slice(&0u16.to_be_bytes()); // sub paths
        for (i, &(in_time, out_time)) in self.items.iter().enumerate() {
            let mut item = Vec::new();
            item.extend_from_slice(format!("{:05}", i + 1).as_bytes());
            item.extend_from_slice(b"M2TS");
            item.extend_from_slice(&0x0001u16.to_be_bytes());
            item.push(0);
            item.extend_from_slice(&in_time.to_be_bytes());
            item.extend_from_slice(&out_time.to_be_bytes());
            // Trailing fields the decoder must skip
            item.extend_from_slice(&[0u8; 12]);

            play_list.extend_from_slice(&(item.len() as u16).to_be_bytes());
            play_list.extend_from_slice(&item);
        }

        let mut marks = Vec::new();
        marks.extend_from_slice(&(self.marks.len() as u16).to_be_bytes());
        for &(mark_type, item, time_stamp) in &self.marks {
            marks.push(0);
            marks.push(mark_type);
            marks.extend_from_slice(&item.to_be_bytes());
            marks.extend_from_slice(&time_stamp.to_be_bytes());
            marks.extend_from_slice(&0xFFFFu16.to_be_bytes());
            marks.extend_from_slice(&0u32.to_be_bytes());
        }

        let play_list_start = 40u32;
        let marks_start = play_list_start + 4 + play_list.len() as u32;

        let mut out = Vec::new();
        out.extend_from_slice(b"MPLS0200");
        out.extend_from_slice(&play_list_start.to_be_bytes());
        out.extend_from_slice(&marks_start.to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&[0u8; 20]);
        out.extend_from_slice(&(play_list.len() as u32).to_be_bytes());
        out.extend_from_slice(&play_list);
        out.extend_from_slice(&(marks.len() as u32).to_be_bytes());
        out.extend_from_slice(&marks);
        out
    }

    pub fn write(&self, path: &Path) {
        std::fs::write(path, self.bytes()).unwrap();
    }
}

/// Playlist with one item starting at tick 0 and chapters at whole seconds
pub fn chapters_at_seconds(seconds: &[u32], length_seconds: u32) -> PlaylistBuilder {
    let mut builder = PlaylistBuilder::new().item(0, length_seconds * 45_000);
    for &s in seconds {
        builder = builder.chapter(0, s * 45_000);
    }
    builder
}

/// 32-bit integer WAV where every channel of frame `i` holds `i`
pub fn write_ramp_wav(path: &Path, sample_rate: u32, channels: u16, frames: u32) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        for _ in 0..channels {
            writer.write_sample(i as i32).unwrap();
        }
    }
    writer.finalize().unwrap();
}

/// 32-bit float WAV where frame `i` holds `i / frames`
pub fn write_float_wav(path: &Path, sample_rate: u32, channels: u16, frames: u32) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        for _ in 0..channels {
            writer.write_sample(i as f32 / frames as f32).unwrap();
        }
    }
    writer.finalize().unwrap();
}

/// Spec and samples of an integer WAV file
pub fn read_wav(path: &Path) -> (WavSpec, Vec<i32>) {
    let mut reader = WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i32>().map(|s| s.unwrap()).collect();
    (spec, samples)
}
