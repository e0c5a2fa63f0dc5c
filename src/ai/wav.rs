//! WAV container for the raw PCM the speech model returns.

use crate::Result;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

// RIFF size fields are u32 and cover the 36 header bytes after them.
const MAX_DATA_LEN: usize = (u32::MAX - 36) as usize;

pub fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WAVE"
}

/// Encode 16-bit little-endian mono PCM as a WAV file.
pub fn wrap_pcm16_mono(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>> {
    if pcm.len() > MAX_DATA_LEN {
        return Err(hound::Error::FormatError("PCM payload exceeds the WAV size limit").into());
    }
    if pcm.len() % 2 != 0 {
        tracing::warn!("PCM payload has an odd byte count, dropping the trailing byte");
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::with_capacity(pcm.len() + 44));
    let mut writer = WavWriter::new(&mut cursor, spec)?;
    for chunk in pcm.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([chunk[0], chunk[1]]))?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}
