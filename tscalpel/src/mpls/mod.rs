//! Blu-ray movie playlist (MPLS) decoding
//!
//! Only the parts needed to place chapters are decoded: the header, the
//! PlayItem timing records and the PlayListMark records. Sub paths, STN
//! tables and extension data are skipped.

mod reader;
mod types;

pub use reader::MplsReader;
pub use types::*;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::Result;

/// Open and decode a playlist file.
pub fn read_playlist(path: &Path) -> Result<Mpls> {
    let file = File::open(path)?;
    MplsReader::new(BufReader::new(file))?.parse()
}
