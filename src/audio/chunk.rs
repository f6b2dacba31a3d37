use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::microphone::{CaptureHandle, MicrophoneCapture};
use super::wav::{encode_wav, write_wav};
use crate::error::{RecorderError, Result};

/// Chunk configuration
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Length of one capture window in seconds (default: 60)
    pub chunk_duration_secs: u32,
    /// Capture sample rate in Hz
    pub sample_rate: u32,
    /// Input device, `None` for the default microphone
    pub device: Option<String>,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_duration_secs: 60,
            sample_rate: 44100,
            device: None,
        }
    }
}

/// Metadata for a single saved chunk
#[derive(Debug, Clone)]
pub struct ChunkMetadata {
    /// Chunk number (0-indexed)
    pub chunk_index: usize,
    /// File name inside the artifact directory
    pub file_name: String,
    /// Full path to the chunk
    pub file_path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
    /// Interleaved sample count written
    pub sample_count: usize,
}

impl ChunkMetadata {
    pub fn duration_secs(&self) -> f64 {
        let frames = self.sample_count as f64 / self.channels.max(1) as f64;
        frames / self.sample_rate.max(1) as f64
    }
}

/// Ordered list of chunk files saved during the Speaking phase
#[derive(Debug, Clone, Default)]
pub struct AudioChunkSet {
    chunks: Vec<ChunkMetadata>,
}

impl AudioChunkSet {
    pub fn push(&mut self, chunk: ChunkMetadata) {
        self.chunks.push(chunk);
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[ChunkMetadata] {
        &self.chunks
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(|c| c.file_name.as_str())
    }

    /// Concatenation list, one `file '<name>'` line per chunk
    ///
    /// `ffmpeg -f concat -safe 0 -i filelist.txt -c copy output.wav`
    pub fn manifest(&self) -> String {
        self.file_names()
            .map(|name| format!("file '{}'\n", name))
            .collect()
    }
}

/// Chunked audio recorder
///
/// Opens fixed-length capture windows on the microphone collaborator and
/// saves each finished window as `session_audio_{n}.wav`.
pub struct ChunkedRecorder {
    config: ChunkConfig,
    current: Option<ActiveChunk>,
    chunk_index: usize,
    saved: AudioChunkSet,
}

struct ActiveChunk {
    handle: CaptureHandle,
    elapsed: Duration,
}

impl ChunkedRecorder {
    pub fn new(config: ChunkConfig) -> Self {
        info!(
            "Chunked recorder initialized (chunks: {}s each at {}Hz)",
            config.chunk_duration_secs, config.sample_rate
        );

        Self {
            config,
            current: None,
            chunk_index: 0,
            saved: AudioChunkSet::default(),
        }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    pub fn is_capturing(&self) -> bool {
        self.current.is_some()
    }

    pub fn chunks(&self) -> &AudioChunkSet {
        &self.saved
    }

    /// Clear chunk bookkeeping and open the first capture window
    pub fn begin(&mut self, mic: &mut dyn MicrophoneCapture) -> Result<()> {
        if self.current.is_some() {
            warn!("Audio capture already running, restarting chunk bookkeeping");
            mic.stop(self.config.device.as_deref());
            self.current = None;
        }

        self.chunk_index = 0;
        self.saved.clear();
        self.open_window(mic)
    }

    /// Advance the active window; rotates to a new chunk once it has run its full length
    pub fn advance(
        &mut self,
        dt: Duration,
        mic: &mut dyn MicrophoneCapture,
        dir: &Path,
    ) -> Result<Option<ChunkMetadata>> {
        let window = Duration::from_secs(self.config.chunk_duration_secs as u64);
        let Some(chunk) = self.current.as_mut() else {
            return Ok(None);
        };

        chunk.elapsed += dt;
        if chunk.elapsed < window {
            return Ok(None);
        }

        let saved = self.finish(mic, dir)?;
        self.open_window(mic)?;
        Ok(saved)
    }

    /// Stop capture and flush whatever the window holds
    ///
    /// An empty buffer is skipped rather than written. Returns `None` when
    /// nothing was capturing or nothing was captured.
    pub fn finish(
        &mut self,
        mic: &mut dyn MicrophoneCapture,
        dir: &Path,
    ) -> Result<Option<ChunkMetadata>> {
        let Some(chunk) = self.current.take() else {
            return Ok(None);
        };

        mic.stop(self.config.device.as_deref());
        let samples = mic.read_samples(&chunk.handle);

        let bytes = match encode_wav(&samples, chunk.handle.channels, chunk.handle.sample_rate) {
            Ok(bytes) => bytes,
            Err(RecorderError::EmptyAudio) => {
                warn!("Audio chunk {} captured no samples, skipping write", self.chunk_index);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let file_name = format!("session_audio_{}.wav", self.chunk_index);
        let file_path = dir.join(&file_name);
        write_wav(&file_path, &bytes)?;

        let meta = ChunkMetadata {
            chunk_index: self.chunk_index,
            file_name,
            file_path,
            sample_rate: chunk.handle.sample_rate,
            channels: chunk.handle.channels,
            sample_count: samples.len() - samples.len() % chunk.handle.channels.max(1) as usize,
        };

        info!(
            "Audio chunk {} saved: {} ({:.1}s)",
            meta.chunk_index,
            meta.file_path.display(),
            meta.duration_secs()
        );

        self.saved.push(meta.clone());
        self.chunk_index += 1;

        Ok(Some(meta))
    }

    fn open_window(&mut self, mic: &mut dyn MicrophoneCapture) -> Result<()> {
        let handle = mic.start(
            self.config.device.as_deref(),
            false,
            self.config.chunk_duration_secs,
            self.config.sample_rate,
        )?;

        info!(
            "Started audio capture for chunk {} ({}s window)",
            self.chunk_index, self.config.chunk_duration_secs
        );

        self.current = Some(ActiveChunk {
            handle,
            elapsed: Duration::ZERO,
        });
        Ok(())
    }
}
