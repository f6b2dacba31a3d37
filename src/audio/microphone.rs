use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{RecorderError, Result};

/// Block of interleaved float PCM delivered by the capture hardware
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Interleaved samples in [-1, 1]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
}

/// Buffer handle returned when a capture window starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureHandle {
    pub id: u64,
    pub device: Option<String>,
    pub sample_rate: u32,
    pub channels: u16,
    pub max_duration_secs: u32,
}

impl CaptureHandle {
    /// Interleaved sample capacity of the capture window
    pub fn capacity(&self) -> usize {
        self.max_duration_secs as usize * self.sample_rate as usize * self.channels as usize
    }
}

/// Microphone capture collaborator
///
/// Capture runs in the background once started; the engine polls it with
/// `read_samples` and ends it with `stop`, it never blocks on it.
/// `None` as device selects the default input.
pub trait MicrophoneCapture: Send {
    /// Start filling a new buffer of at most `max_duration_secs`
    fn start(
        &mut self,
        device: Option<&str>,
        looping: bool,
        max_duration_secs: u32,
        sample_rate: u32,
    ) -> Result<CaptureHandle>;

    /// End capture on the device; the last buffer stays readable
    fn stop(&mut self, device: Option<&str>);

    /// Samples captured so far into the handle's buffer (interleaved)
    fn read_samples(&mut self, handle: &CaptureHandle) -> Vec<f32>;

    /// Whether the device is still capturing
    fn is_recording(&self, device: Option<&str>) -> bool;
}

/// Sending half used by whatever produces audio (hardware callback, replay)
#[derive(Debug, Clone)]
pub struct MicrophoneFeed {
    tx: mpsc::UnboundedSender<AudioFrame>,
}

impl MicrophoneFeed {
    /// Push a frame; returns false once the microphone has been dropped
    pub fn push(&self, frame: AudioFrame) -> bool {
        self.tx.send(frame).is_ok()
    }
}

struct CaptureBuffer {
    handle: CaptureHandle,
    samples: Vec<f32>,
    looping: bool,
    write_pos: usize,
}

impl CaptureBuffer {
    fn append(&mut self, samples: &[f32]) {
        let capacity = self.handle.capacity();
        if capacity == 0 {
            return;
        }

        if self.looping {
            // Ring buffer: wrap and overwrite the oldest samples
            for &s in samples {
                if self.samples.len() < capacity {
                    self.samples.push(s);
                } else {
                    self.samples[self.write_pos] = s;
                }
                self.write_pos = (self.write_pos + 1) % capacity;
            }
        } else {
            let room = capacity.saturating_sub(self.samples.len());
            self.samples.extend_from_slice(&samples[..samples.len().min(room)]);
        }
    }

    fn is_full(&self) -> bool {
        !self.looping && self.samples.len() >= self.handle.capacity()
    }
}

/// Microphone fed through an in-process channel
///
/// Frames that arrive while no capture is active are discarded, as are
/// frames whose format does not match the capture request.
pub struct ChannelMicrophone {
    rx: mpsc::UnboundedReceiver<AudioFrame>,
    channels: u16,
    next_id: u64,
    buffer: Option<CaptureBuffer>,
    recording: bool,
}

impl ChannelMicrophone {
    pub fn new(channels: u16) -> (Self, MicrophoneFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mic = Self {
            rx,
            channels: channels.max(1),
            next_id: 0,
            buffer: None,
            recording: false,
        };
        (mic, MicrophoneFeed { tx })
    }

    /// Move pending frames into the active buffer
    fn drain(&mut self) {
        while let Ok(frame) = self.rx.try_recv() {
            if !self.recording {
                continue;
            }
            let Some(buffer) = self.buffer.as_mut() else {
                continue;
            };

            if frame.sample_rate != buffer.handle.sample_rate
                || frame.channels != buffer.handle.channels
            {
                warn!(
                    "Frame format mismatch: expected {}Hz/{}ch, got {}Hz/{}ch. Dropping frame.",
                    buffer.handle.sample_rate,
                    buffer.handle.channels,
                    frame.sample_rate,
                    frame.channels
                );
                continue;
            }

            buffer.append(&frame.samples);
            if buffer.is_full() {
                debug!("Capture window {} full, capture ends", buffer.handle.id);
                self.recording = false;
            }
        }
    }
}

impl MicrophoneCapture for ChannelMicrophone {
    fn start(
        &mut self,
        device: Option<&str>,
        looping: bool,
        max_duration_secs: u32,
        sample_rate: u32,
    ) -> Result<CaptureHandle> {
        if sample_rate == 0 || max_duration_secs == 0 {
            return Err(RecorderError::InvalidInput(format!(
                "capture needs a positive duration and rate, got {}s at {}Hz",
                max_duration_secs, sample_rate
            )));
        }

        // Anything queued before this point belongs to no capture
        self.recording = false;
        self.drain();

        let handle = CaptureHandle {
            id: self.next_id,
            device: device.map(str::to_string),
            sample_rate,
            channels: self.channels,
            max_duration_secs,
        };
        self.next_id += 1;

        info!(
            "Microphone capture {} started: {}s window at {}Hz",
            handle.id, max_duration_secs, sample_rate
        );

        self.buffer = Some(CaptureBuffer {
            handle: handle.clone(),
            samples: Vec::with_capacity(handle.capacity()),
            looping,
            write_pos: 0,
        });
        self.recording = true;

        Ok(handle)
    }

    fn stop(&mut self, _device: Option<&str>) {
        self.drain();
        if self.recording {
            info!("Microphone capture stopped");
        }
        self.recording = false;
    }

    fn read_samples(&mut self, handle: &CaptureHandle) -> Vec<f32> {
        self.drain();
        match &self.buffer {
            Some(buffer) if buffer.handle.id == handle.id => {
                if buffer.looping && buffer.samples.len() == buffer.handle.capacity() {
                    // Oldest sample sits at the write position once the ring has wrapped
                    let mut ordered = buffer.samples[buffer.write_pos..].to_vec();
                    ordered.extend_from_slice(&buffer.samples[..buffer.write_pos]);
                    ordered
                } else {
                    buffer.samples.clone()
                }
            }
            _ => Vec::new(),
        }
    }

    fn is_recording(&self, _device: Option<&str>) -> bool {
        self.recording
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(samples: Vec<f32>) -> AudioFrame {
        AudioFrame {
            samples,
            sample_rate: 10,
            channels: 1,
        }
    }

    #[test]
    fn test_frames_before_start_are_discarded() {
        let (mut mic, feed) = ChannelMicrophone::new(1);
        feed.push(frame(vec![0.9; 5]));

        let handle = mic.start(None, false, 1, 10).unwrap();
        feed.push(frame(vec![0.1; 3]));

        assert_eq!(mic.read_samples(&handle), vec![0.1; 3]);
    }

    #[test]
    fn test_non_looping_capture_stops_at_capacity() {
        let (mut mic, feed) = ChannelMicrophone::new(1);
        let handle = mic.start(None, false, 1, 10).unwrap();
        feed.push(frame(vec![0.2; 25]));

        assert_eq!(mic.read_samples(&handle).len(), 10);
        assert!(!mic.is_recording(None));
    }

    #[test]
    fn test_looping_capture_keeps_latest_samples() {
        let (mut mic, feed) = ChannelMicrophone::new(1);
        let handle = mic.start(None, true, 1, 4).unwrap();
        feed.push(AudioFrame {
            samples: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            sample_rate: 4,
            channels: 1,
        });

        assert_eq!(mic.read_samples(&handle), vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_buffer_survives_stop() {
        let (mut mic, feed) = ChannelMicrophone::new(1);
        let handle = mic.start(None, false, 1, 10).unwrap();
        feed.push(frame(vec![0.5; 4]));
        mic.stop(None);
        feed.push(frame(vec![0.7; 4]));

        assert_eq!(mic.read_samples(&handle), vec![0.5; 4]);
    }

    #[test]
    fn test_mismatched_format_is_dropped() {
        let (mut mic, feed) = ChannelMicrophone::new(1);
        let handle = mic.start(None, false, 1, 10).unwrap();
        feed.push(AudioFrame {
            samples: vec![0.5; 4],
            sample_rate: 44100,
            channels: 1,
        });

        assert!(mic.read_samples(&handle).is_empty());
    }
}
