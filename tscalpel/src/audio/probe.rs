//! Stream introspection via symphonia
//!
//! Used when an external tool does the cutting: only the sample rate and
//! length are needed to compute split points, and symphonia can report them
//! for containers the built-in WAV reader cannot open.

use std::fs::File;
use std::path::Path;

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::SampleFormat;
use tracing::debug;

use super::{AudioInfo, Subtype};
use crate::{Error, Result};

/// Read stream properties of the first audio track in `path`.
pub fn probe_file(path: &Path) -> Result<AudioInfo> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    let extension = path.extension().and_then(|e| e.to_str());
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Audio(format!("no audio track in {}", path.display())))?;
    let params = &track.codec_params;

    let sample_rate = params
        .sample_rate
        .ok_or_else(|| Error::Audio(format!("no sample rate reported for {}", path.display())))?;
    let frames = params
        .n_frames
        .ok_or_else(|| Error::Audio(format!("cannot determine length of {}", path.display())))?;
    let channels = params.channels.map(|c| c.count() as u16).unwrap_or(0);

    let subtype = match (params.sample_format, params.bits_per_sample) {
        (Some(SampleFormat::F32), _) => Some(Subtype::Float),
        (_, Some(bits)) => Subtype::from_layout(bits as u16, false),
        _ => None,
    };

    let info = AudioInfo {
        format: extension
            .map(|e| e.to_ascii_uppercase())
            .unwrap_or_else(|| "UNKNOWN".to_string()),
        sample_rate,
        channels,
        frames,
        subtype,
    };

    debug!(
        "Probed {}: {} Hz, {} channels, {} frames",
        path.display(),
        info.sample_rate,
        info.channels,
        info.frames
    );

    Ok(info)
}
