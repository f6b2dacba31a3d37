// Integration tests for WAV encoding
//
// These tests check the encoder output against a standard WAV reader.

use anyhow::Result;
use artifact_recorder::audio::{encode_wav, write_wav, AudioFile, WAV_HEADER_LEN};
use artifact_recorder::RecorderError;
use hound::{SampleFormat, WavReader};
use std::io::Cursor;
use tempfile::TempDir;

#[test]
fn test_one_second_of_silence() -> Result<()> {
    let bytes = encode_wav(&vec![0.0; 44100], 1, 44100)?;

    assert_eq!(bytes.len(), 44144);
    assert_eq!(u32::from_le_bytes(bytes[40..44].try_into()?), 88200);
    assert_eq!(u32::from_le_bytes(bytes[4..8].try_into()?), 88200 + 36);

    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, SampleFormat::Int);
    assert_eq!(reader.len(), 44100);

    Ok(())
}

#[test]
fn test_stereo_samples_round_through_reader() -> Result<()> {
    let samples = [0.0, 1.0, -1.0, 0.5, 2.0, -2.0];
    let bytes = encode_wav(&samples, 2, 22050)?;
    assert_eq!(bytes.len(), WAV_HEADER_LEN + samples.len() * 2);

    let mut reader = WavReader::new(Cursor::new(bytes))?;
    assert_eq!(reader.spec().channels, 2);
    let decoded: Vec<i16> = reader.samples::<i16>().collect::<Result<_, _>>()?;
    assert_eq!(decoded, vec![0, 32767, -32767, 16383, 32767, -32768]);

    Ok(())
}

#[test]
fn test_empty_buffer_is_rejected() {
    let result = encode_wav(&[], 1, 44100);
    assert!(matches!(result, Err(RecorderError::EmptyAudio)));
}

#[test]
fn test_written_file_loads_as_audio_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("nested").join("tone.wav");

    let samples: Vec<f32> = (0..8000).map(|i| if i % 2 == 0 { 0.25 } else { -0.25 }).collect();
    write_wav(&path, &encode_wav(&samples, 1, 8000)?)?;

    let audio = AudioFile::open(&path)?;
    assert_eq!(audio.sample_rate, 8000);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.samples.len(), 8000);
    assert!((audio.duration_seconds - 1.0).abs() < 1e-9);
    assert!((audio.samples[0] - 0.25).abs() < 1e-3);
    assert!((audio.samples[1] + 0.25).abs() < 1e-3);

    Ok(())
}

#[test]
fn test_audio_file_downmixes_to_mono() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("stereo.wav");
    write_wav(&path, &encode_wav(&[0.5, 0.0, 0.25, 0.25], 2, 8000)?)?;

    let audio = AudioFile::open(&path)?;
    let mono = audio.to_channels(1)?;
    assert_eq!(mono.len(), 2);
    assert!((mono[0] - 0.25).abs() < 1e-3);
    assert!((mono[1] - 0.25).abs() < 1e-3);

    Ok(())
}

#[test]
fn test_audio_file_nonexistent() {
    assert!(AudioFile::open("/nonexistent/path/to/audio.wav").is_err());
}
