use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::prompt::PromptSettings;
use crate::audio::ChunkConfig;

/// Configuration for a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session directory name under `data_root` (e.g., "session-2025-06-02-p01")
    pub session_name: String,

    /// Base directory for all sessions
    pub data_root: PathBuf,

    /// Length of the Gazing phase
    /// Default: 60 seconds
    pub gaze_duration: Duration,

    /// Length of the Speaking phase
    /// Default: 45 seconds
    pub voice_duration: Duration,

    /// Microphone sample rate
    pub sample_rate: u32,

    /// Length of one audio capture window in seconds
    /// Default: 60, deliberately independent of `voice_duration`
    pub chunk_duration_secs: u32,

    /// Input device, `None` for the default microphone
    pub audio_device: Option<String>,

    /// Answer labels, answer number n selects `answer_choices[n - 1]`
    pub answer_choices: Vec<String>,

    /// Keypad digit for each answer number, in answer order
    pub keypad: Vec<u8>,

    /// Shown while idle
    pub idle_prompt: String,

    /// Shown during the Speaking phase, before the countdown
    pub voice_question: String,

    pub prompt: PromptSettings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_name: format!("session-{}", uuid::Uuid::new_v4()),
            data_root: PathBuf::from("recordings"),
            gaze_duration: Duration::from_secs(60),
            voice_duration: Duration::from_secs(45),
            sample_rate: 44100,
            chunk_duration_secs: 60,
            audio_device: None,
            answer_choices: vec![
                "Interesting shape".to_string(),
                "Mysterious".to_string(),
                "Nothing in particular".to_string(),
                "Eerie".to_string(),
                "Beautiful".to_string(),
            ],
            keypad: vec![4, 6, 8, 2, 5],
            idle_prompt: "Press Enter to begin".to_string(),
            voice_question: "Describe your overall or partial impression of this artifact \
                             as concretely as you can within 45 seconds. "
                .to_string(),
            prompt: PromptSettings::default(),
        }
    }
}

impl SessionConfig {
    /// `{data_root}/{session_name}`
    pub fn session_dir(&self) -> PathBuf {
        self.data_root.join(&self.session_name)
    }

    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig {
            chunk_duration_secs: self.chunk_duration_secs,
            sample_rate: self.sample_rate,
            device: self.audio_device.clone(),
        }
    }
}
