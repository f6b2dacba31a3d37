// Integration tests for chunked audio recording
//
// These tests verify that capture windows are rotated into numbered WAV
// chunks and that the manifest lists them in order.

use anyhow::Result;
use artifact_recorder::audio::{AudioFrame, ChannelMicrophone, ChunkConfig, ChunkedRecorder};
use hound::WavReader;
use std::time::Duration;
use tempfile::TempDir;

fn config(chunk_duration_secs: u32, sample_rate: u32) -> ChunkConfig {
    ChunkConfig {
        chunk_duration_secs,
        sample_rate,
        device: None,
    }
}

fn second_of(value: f32, sample_rate: u32) -> AudioFrame {
    AudioFrame {
        samples: vec![value; sample_rate as usize],
        sample_rate,
        channels: 1,
    }
}

#[test]
fn test_single_chunk_within_window() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (mut mic, feed) = ChannelMicrophone::new(1);
    let mut recorder = ChunkedRecorder::new(config(10, 1000));

    recorder.begin(&mut mic)?;
    for _ in 0..5 {
        feed.push(second_of(0.1, 1000));
        assert!(recorder
            .advance(Duration::from_secs(1), &mut mic, temp_dir.path())?
            .is_none());
    }

    let chunk = recorder
        .finish(&mut mic, temp_dir.path())?
        .expect("chunk should be written");

    assert_eq!(chunk.chunk_index, 0);
    assert_eq!(chunk.file_name, "session_audio_0.wav");
    assert_eq!(chunk.sample_count, 5000);
    assert!((chunk.duration_secs() - 5.0).abs() < 1e-9);
    assert!(chunk.file_path.exists());
    assert!(!recorder.is_capturing());

    let reader = WavReader::open(&chunk.file_path)?;
    assert_eq!(reader.spec().sample_rate, 1000);
    assert_eq!(reader.len(), 5000);

    Ok(())
}

#[test]
fn test_window_rotation_creates_multiple_chunks() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (mut mic, feed) = ChannelMicrophone::new(1);
    let mut recorder = ChunkedRecorder::new(config(2, 100));

    recorder.begin(&mut mic)?;
    let mut rotated = Vec::new();
    for _ in 0..5 {
        feed.push(second_of(0.2, 100));
        if let Some(chunk) = recorder.advance(Duration::from_secs(1), &mut mic, temp_dir.path())? {
            rotated.push(chunk);
        }
    }
    recorder.finish(&mut mic, temp_dir.path())?;

    assert_eq!(rotated.len(), 2);
    assert_eq!(recorder.chunks().len(), 3);

    let names: Vec<&str> = recorder.chunks().file_names().collect();
    assert_eq!(
        names,
        vec!["session_audio_0.wav", "session_audio_1.wav", "session_audio_2.wav"]
    );
    assert_eq!(
        recorder.chunks().manifest(),
        "file 'session_audio_0.wav'\nfile 'session_audio_1.wav'\nfile 'session_audio_2.wav'\n"
    );

    // Full windows hold two seconds, the tail one
    let counts: Vec<usize> = recorder.chunks().chunks().iter().map(|c| c.sample_count).collect();
    assert_eq!(counts, vec![200, 200, 100]);

    Ok(())
}

#[test]
fn test_silent_window_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (mut mic, _feed) = ChannelMicrophone::new(1);
    let mut recorder = ChunkedRecorder::new(config(60, 44100));

    recorder.begin(&mut mic)?;
    let flushed = recorder.finish(&mut mic, temp_dir.path())?;

    assert!(flushed.is_none());
    assert!(recorder.chunks().is_empty());
    assert!(!temp_dir.path().join("session_audio_0.wav").exists());

    Ok(())
}

#[test]
fn test_begin_clears_previous_chunks() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (mut mic, feed) = ChannelMicrophone::new(1);
    let mut recorder = ChunkedRecorder::new(config(60, 100));

    recorder.begin(&mut mic)?;
    feed.push(second_of(0.3, 100));
    recorder.finish(&mut mic, temp_dir.path())?;
    assert_eq!(recorder.chunks().len(), 1);

    recorder.begin(&mut mic)?;
    assert!(recorder.chunks().is_empty());
    feed.push(second_of(0.3, 100));
    let chunk = recorder.finish(&mut mic, temp_dir.path())?;
    assert_eq!(chunk.map(|c| c.chunk_index), Some(0));

    Ok(())
}

#[test]
fn test_finish_without_begin_is_noop() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (mut mic, _feed) = ChannelMicrophone::new(1);
    let mut recorder = ChunkedRecorder::new(ChunkConfig::default());

    assert!(recorder.finish(&mut mic, temp_dir.path())?.is_none());
    assert!(recorder
        .advance(Duration::from_secs(120), &mut mic, temp_dir.path())?
        .is_none());

    Ok(())
}
