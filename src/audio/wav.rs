use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{RecorderError, Result};

/// Size of the canonical RIFF/WAVE header written by [`encode_wav`]
pub const WAV_HEADER_LEN: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: u16 = BITS_PER_SAMPLE / 8;
const PCM_FORMAT_TAG: u16 = 1;

/// Encode interleaved float samples as a 16-bit PCM WAV byte stream
///
/// Samples are scaled by `i16::MAX` and clamped to the signed 16-bit range.
/// A trailing partial frame (fewer samples than `channels`) is dropped.
/// Returns [`RecorderError::EmptyAudio`] when there is nothing to encode.
pub fn encode_wav(samples: &[f32], channels: u16, sample_rate: u32) -> Result<Vec<u8>> {
    if channels == 0 {
        return Err(RecorderError::InvalidInput("channel count must be at least 1".into()));
    }

    let usable = samples.len() - samples.len() % channels as usize;
    if usable != samples.len() {
        warn!(
            "Dropping {} trailing samples that do not fill a {}-channel frame",
            samples.len() - usable,
            channels
        );
    }
    if usable == 0 {
        return Err(RecorderError::EmptyAudio);
    }

    let block_align = channels.checked_mul(BYTES_PER_SAMPLE).ok_or_else(|| {
        RecorderError::InvalidInput(format!("{} channels do not fit a WAV header", channels))
    })?;
    let byte_rate = sample_rate.checked_mul(block_align as u32).ok_or_else(|| {
        RecorderError::InvalidInput(format!(
            "{}Hz with {} channels overflows the WAV byte rate",
            sample_rate, channels
        ))
    })?;
    let data_size = u32::try_from(usable)
        .ok()
        .and_then(|n| n.checked_mul(BYTES_PER_SAMPLE as u32))
        .filter(|size| *size <= u32::MAX - 36)
        .ok_or_else(|| {
            RecorderError::InvalidInput(format!("{} samples exceed the WAV size limit", usable))
        })?;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_size as usize);

    // RIFF chunk
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(data_size + 36).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt subchunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT_TAG.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data subchunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    for &sample in &samples[..usable] {
        out.extend_from_slice(&to_pcm16(sample).to_le_bytes());
    }

    debug!(
        "Encoded {} samples ({}Hz, {} channels) into {} WAV bytes",
        usable,
        sample_rate,
        channels,
        out.len()
    );

    Ok(out)
}

fn to_pcm16(sample: f32) -> i16 {
    let scaled = sample * i16::MAX as f32;
    scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Write an encoded WAV buffer, creating parent directories as needed
pub fn write_wav(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| RecorderError::storage(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| RecorderError::storage(path, e))
}
