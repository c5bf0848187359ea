//! Playlist reader with block parsing.

use std::io::{Read, Seek, SeekFrom};

use tracing::debug;

use super::types::{
    Header, MarkType, Mpls, PlayItem, PlayList, PlayMark, HEADER_LEN, TYPE_INDICATOR,
};
use crate::{Error, Result};

/// Bytes of a PlayItem after its length field that this reader decodes
const PLAY_ITEM_FIXED_LEN: usize = 20;

/// Bytes of one PlayListMark record
const MARK_LEN: usize = 14;

/// Playlist reader.
///
/// Offsets in the header are relative to the stream position at the time the
/// reader was created.
pub struct MplsReader<R> {
    reader: R,
    base: u64,
    stream_len: u64,
}

impl<R: Read + Seek> MplsReader<R> {
    /// Create a reader for a playlist starting at the current stream position.
    pub fn new(mut reader: R) -> Result<Self> {
        let base = reader.stream_position()?;
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(base))?;
        Ok(Self {
            reader,
            base,
            stream_len: end.saturating_sub(base),
        })
    }

    /// Decode header, play items and marks.
    pub fn parse(&mut self) -> Result<Mpls> {
        let header = self.read_header()?;
        let play_list = self.read_play_list(&header)?;
        let marks = self.read_marks(&header)?;

        debug!(
            "Decoded playlist v{}: {} play items, {} marks",
            header.version,
            play_list.play_items.len(),
            marks.len()
        );

        Ok(Mpls {
            header,
            play_list,
            marks,
        })
    }

    /// Decode the fixed header prefix.
    pub fn read_header(&mut self) -> Result<Header> {
        if self.stream_len < HEADER_LEN {
            return Err(Error::MalformedPlaylist(format!(
                "file is {} bytes, shorter than the {}-byte header",
                self.stream_len, HEADER_LEN
            )));
        }

        self.reader.seek(SeekFrom::Start(self.base))?;
        let mut raw = [0u8; HEADER_LEN as usize];
        self.reader.read_exact(&mut raw)?;

        let mut cur = BlockCursor::new(&raw, "header");
        let type_indicator = cur.bytes(4)?;
        if type_indicator != TYPE_INDICATOR {
            return Err(Error::MalformedPlaylist(format!(
                "type indicator {:?} is not MPLS",
                String::from_utf8_lossy(type_indicator)
            )));
        }

        let header = Header {
            version: cur.ascii(4)?,
            play_list_start: cur.u32()?,
            play_list_mark_start: cur.u32()?,
            extension_data_start: cur.u32()?,
        };

        self.check_block_offset(header.play_list_start, "PlayList")?;
        self.check_block_offset(header.play_list_mark_start, "PlayListMark")?;

        Ok(header)
    }

    /// Decode the PlayList block located by `header`.
    pub fn read_play_list(&mut self, header: &Header) -> Result<PlayList> {
        let block = self.read_block(header.play_list_start, "PlayList")?;
        let mut cur = BlockCursor::new(&block, "PlayList");

        cur.skip(2)?; // reserved
        let item_count = cur.u16()? as usize;
        let sub_path_count = cur.u16()?;

        if item_count * (2 + PLAY_ITEM_FIXED_LEN) > cur.remaining() {
            return Err(Error::MalformedPlaylist(format!(
                "{} play items cannot fit in {} remaining bytes of the PlayList block",
                item_count,
                cur.remaining()
            )));
        }

        let mut play_items = Vec::with_capacity(item_count);
        for index in 0..item_count {
            let length = cur.u16()? as usize;
            if length < PLAY_ITEM_FIXED_LEN {
                return Err(Error::MalformedPlaylist(format!(
                    "play item {} declares {} bytes, fewer than the {} required",
                    index, length, PLAY_ITEM_FIXED_LEN
                )));
            }
            let body = cur.bytes(length).map_err(|_| {
                Error::MalformedPlaylist(format!(
                    "play item {} runs past the end of the PlayList block",
                    index
                ))
            })?;
            play_items.push(parse_play_item(body)?);
        }

        Ok(PlayList {
            sub_path_count,
            play_items,
        })
    }

    /// Decode the PlayListMark block located by `header`.
    pub fn read_marks(&mut self, header: &Header) -> Result<Vec<PlayMark>> {
        let block = self.read_block(header.play_list_mark_start, "PlayListMark")?;
        let mut cur = BlockCursor::new(&block, "PlayListMark");

        let mark_count = cur.u16()? as usize;
        if mark_count * MARK_LEN > cur.remaining() {
            return Err(Error::MalformedPlaylist(format!(
                "{} marks cannot fit in {} remaining bytes of the PlayListMark block",
                mark_count,
                cur.remaining()
            )));
        }

        let mut marks = Vec::with_capacity(mark_count);
        for _ in 0..mark_count {
            cur.skip(1)?; // reserved
            marks.push(PlayMark {
                mark_type: MarkType::from(cur.u8()?),
                play_item_ref: cur.u16()?,
                time_stamp: cur.u32()?,
                entry_es_pid: cur.u16()?,
                duration: cur.u32()?,
            });
        }

        Ok(marks)
    }

    fn check_block_offset(&self, offset: u32, name: &str) -> Result<()> {
        let offset = offset as u64;
        if offset < HEADER_LEN || offset >= self.stream_len {
            return Err(Error::MalformedPlaylist(format!(
                "{} block offset {} lies outside the file body ({}..{})",
                name, offset, HEADER_LEN, self.stream_len
            )));
        }
        Ok(())
    }

    /// Seek to a length-prefixed block and read its body.
    fn read_block(&mut self, offset: u32, name: &str) -> Result<Vec<u8>> {
        self.check_block_offset(offset, name)?;
        let offset = offset as u64;
        if offset + 4 > self.stream_len {
            return Err(Error::MalformedPlaylist(format!(
                "{} block length field at {} runs past end of file",
                name, offset
            )));
        }

        self.reader.seek(SeekFrom::Start(self.base + offset))?;
        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf)?;
        let length = u32::from_be_bytes(len_buf) as u64;

        if offset + 4 + length > self.stream_len {
            return Err(Error::MalformedPlaylist(format!(
                "{} block at {} declares {} bytes, past end of file ({} bytes)",
                name, offset, length, self.stream_len
            )));
        }

        let mut data = vec![0u8; length as usize];
        self.reader.read_exact(&mut data)?;
        Ok(data)
    }
}

fn parse_play_item(body: &[u8]) -> Result<PlayItem> {
    let mut cur = BlockCursor::new(body, "PlayItem");
    let clip_name = cur.ascii(5)?;
    let codec_id = cur.ascii(4)?;
    let flags = cur.u16()?;
    Ok(PlayItem {
        clip_name,
        codec_id,
        is_multi_angle: flags & 0x0010 != 0,
        connection_condition: (flags & 0x000F) as u8,
        stc_id: cur.u8()?,
        in_time: cur.u32()?,
        out_time: cur.u32()?,
    })
}

/// Bounds-checked big-endian reads over an in-memory block
struct BlockCursor<'a> {
    data: &'a [u8],
    pos: usize,
    block: &'static str,
}

impl<'a> BlockCursor<'a> {
    fn new(data: &'a [u8], block: &'static str) -> Self {
        Self { data, pos: 0, block }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::MalformedPlaylist(format!(
                "{} block truncated: needed {} bytes at offset {}, {} left",
                self.block,
                n,
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        self.bytes(n).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn ascii(&mut self, n: usize) -> Result<String> {
        Ok(String::from_utf8_lossy(self.bytes(n)?).into_owned())
    }
}
