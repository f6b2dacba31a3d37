use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::session::{PromptSettings, SessionConfig};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub prompt: PromptSettings,
    #[serde(default)]
    pub questionnaire: QuestionnaireConfig,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    pub data_root: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub gaze_secs: f64,
    pub voice_secs: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            gaze_secs: 60.0,
            voice_secs: 45.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub chunk_secs: u32,
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            chunk_secs: 60,
            device: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuestionnaireConfig {
    /// Replaces the built-in answer labels when non-empty
    pub choices: Vec<String>,
    /// Replaces the built-in keypad layout when non-empty
    pub keypad: Vec<u8>,
    pub idle_prompt: Option<String>,
    pub voice_question: Option<String>,
}

impl Config {
    /// Load `{path}.toml` (or any format the extension names), with
    /// `ARTIFACT_RECORDER_*` environment overrides (e.g. `ARTIFACT_RECORDER_TIMING__GAZE_SECS`)
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("ARTIFACT_RECORDER").separator("__"))
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }

    /// Session configuration for a named session under `storage.data_root`
    pub fn session_config(&self, session_name: Option<String>) -> Result<SessionConfig> {
        let defaults = SessionConfig::default();

        let gaze_duration = Duration::try_from_secs_f64(self.timing.gaze_secs)
            .context("timing.gaze_secs must be a non-negative number of seconds")?;
        let voice_duration = Duration::try_from_secs_f64(self.timing.voice_secs)
            .context("timing.voice_secs must be a non-negative number of seconds")?;

        if !self.questionnaire.keypad.is_empty()
            && !self.questionnaire.choices.is_empty()
            && self.questionnaire.keypad.len() != self.questionnaire.choices.len()
        {
            anyhow::bail!(
                "questionnaire.keypad has {} keys for {} choices",
                self.questionnaire.keypad.len(),
                self.questionnaire.choices.len()
            );
        }

        Ok(SessionConfig {
            session_name: session_name.unwrap_or(defaults.session_name),
            data_root: PathBuf::from(&self.storage.data_root),
            gaze_duration,
            voice_duration,
            sample_rate: self.audio.sample_rate,
            chunk_duration_secs: self.audio.chunk_secs,
            audio_device: self.audio.device.clone(),
            answer_choices: non_empty_or(&self.questionnaire.choices, defaults.answer_choices),
            keypad: non_empty_or(&self.questionnaire.keypad, defaults.keypad),
            idle_prompt: self
                .questionnaire
                .idle_prompt
                .clone()
                .unwrap_or(defaults.idle_prompt),
            voice_question: self
                .questionnaire
                .voice_question
                .clone()
                .unwrap_or(defaults.voice_question),
            prompt: self.prompt.clone(),
        })
    }
}

fn non_empty_or<T: Clone>(configured: &[T], fallback: Vec<T>) -> Vec<T> {
    if configured.is_empty() {
        fallback
    } else {
        configured.to_vec()
    }
}
