use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::environment::SessionEnvironment;
use super::prompt::{PromptFollower, PromptPose};
use super::questionnaire::{AnswerChoices, AnswerInput};
use super::state::{Phase, PointCloud, Session};
use super::stats::SessionStats;
use crate::audio::{AudioChunkSet, ChunkedRecorder, MicrophoneCapture};
use crate::error::{RecorderError, Result};
use crate::export::{ExportReport, SessionExporter};
use crate::tracking::{ArtifactSource, EyeTracker, GazeSampler};

/// Drives one artifact's session through Gazing, Speaking and Complete
///
/// Single-threaded and tick-driven: the host calls [`tick`](Self::tick)
/// once per frame with the frame's elapsed time. Collaborators are handed
/// over once and held for the controller's lifetime; the artifact is bound
/// separately whenever a new one is loaded for viewing.
pub struct PhaseController {
    config: SessionConfig,
    tracker: Box<dyn EyeTracker>,
    microphone: Box<dyn MicrophoneCapture>,
    environment: Box<dyn SessionEnvironment>,
    artifact: Option<Box<dyn ArtifactSource>>,
    exporter: SessionExporter,
    session: Session,
    sampler: GazeSampler,
    recorder: ChunkedRecorder,
    prompt: PromptFollower,
    choices: AnswerChoices,
    inputs: VecDeque<AnswerInput>,
    /// Engine time, advanced by every tick
    clock: Duration,
    last_export: Option<ExportReport>,
}

impl PhaseController {
    pub fn new(
        config: SessionConfig,
        tracker: Box<dyn EyeTracker>,
        microphone: Box<dyn MicrophoneCapture>,
        environment: Box<dyn SessionEnvironment>,
    ) -> Self {
        info!(
            "Session controller ready: {} (gaze {:?}, voice {:?})",
            config.session_dir().display(),
            config.gaze_duration,
            config.voice_duration
        );

        Self {
            exporter: SessionExporter::new(config.session_dir()),
            recorder: ChunkedRecorder::new(config.chunk_config()),
            prompt: PromptFollower::new(config.prompt.clone(), PromptPose::default()),
            choices: AnswerChoices::new(config.answer_choices.clone(), config.keypad.clone()),
            config,
            tracker,
            microphone,
            environment,
            artifact: None,
            session: Session::default(),
            sampler: GazeSampler::new(),
            inputs: VecDeque::new(),
            clock: Duration::ZERO,
            last_export: None,
        }
    }

    /// Where the prompt rests before and after each Speaking phase
    pub fn with_prompt_pose(mut self, initial: PromptPose) -> Self {
        self.prompt = PromptFollower::new(self.config.prompt.clone(), initial);
        self
    }

    /// Load a new artifact for viewing; the previous session is reset
    pub fn bind_artifact(&mut self, artifact: Box<dyn ArtifactSource>) {
        self.reset_all();
        info!("Bound artifact: {}", artifact.id());
        self.session = Session::new(artifact.id());
        self.artifact = Some(artifact);
    }

    // ------------------------------------------------------------------
    // Read-only state for the UI
    // ------------------------------------------------------------------

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn remaining(&self) -> Duration {
        self.session.remaining
    }

    pub fn is_recording(&self) -> bool {
        self.session.phase.is_active()
    }

    pub fn prompt_pose(&self) -> PromptPose {
        self.prompt.pose()
    }

    pub fn last_export(&self) -> Option<&ExportReport> {
        self.last_export.as_ref()
    }

    /// Chunks saved for the current session, `None` before Speaking
    pub fn audio_chunks(&self) -> Option<&AudioChunkSet> {
        self.session.audio_chunks.as_ref()
    }

    /// Output directory for the bound artifact
    pub fn artifact_dir(&self) -> Option<PathBuf> {
        self.artifact
            .as_ref()
            .map(|a| self.exporter.artifact_dir(a.id()))
    }

    /// Text for the floating prompt
    pub fn prompt_text(&self) -> String {
        let remaining = self.session.remaining.as_secs_f32();
        match self.session.phase {
            Phase::Idle => self.config.idle_prompt.clone(),
            Phase::Gazing => format!("VIEWING TIME: {:.1}", remaining),
            Phase::Speaking => format!("{}TIME: {:.1}", self.config.voice_question, remaining),
            Phase::Complete => String::new(),
        }
    }

    pub fn stats(&self) -> SessionStats {
        let elapsed = self
            .session
            .start_time
            .map(|start| self.clock.saturating_sub(start))
            .unwrap_or_default();

        SessionStats {
            artifact_id: self.session.artifact_id.clone(),
            phase: self.session.phase,
            is_recording: self.is_recording(),
            started_at: self.session.started_at,
            elapsed_secs: elapsed.as_secs_f64(),
            remaining_secs: self.session.remaining.as_secs_f64(),
            samples_taken: self.sampler.samples_taken(),
            samples_accepted: self.session.point_cloud.as_ref().map_or(0, PointCloud::len),
            answers_count: self.session.answers.len(),
            chunks_count: self.session.audio_chunks.as_ref().map_or(0, AudioChunkSet::len),
            exported: self.session.exported,
        }
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Start (`true`) or abort (`false`) recording
    ///
    /// Starting while a session is active, or while a finished session
    /// waits for [`reset_all`](Self::reset_all), does nothing. Aborting
    /// flushes audio and writes the manifest; point cloud, mesh and answers
    /// are only written by [`save_all_data`](Self::save_all_data).
    pub fn set_recording(&mut self, recording: bool) -> Result<()> {
        if recording {
            self.start()
        } else {
            self.abort()
        }
    }

    fn start(&mut self) -> Result<()> {
        match self.session.phase {
            Phase::Gazing | Phase::Speaking => {
                debug!("Recording already active, ignoring start");
                return Ok(());
            }
            Phase::Complete => {
                debug!("Finished session awaits reset, ignoring start");
                return Ok(());
            }
            Phase::Idle => {}
        }

        let artifact = self
            .artifact
            .as_ref()
            .ok_or_else(|| RecorderError::MissingDependency("no artifact bound".into()))?;
        let bounds = artifact.local_bounds().ok_or_else(|| {
            RecorderError::MissingDependency(format!("renderer bounds for {}", artifact.id()))
        })?;

        let mut session = Session::new(artifact.id());
        session.local_bounds = Some(bounds);
        session.start_time = Some(self.clock);
        session.started_at = Some(Utc::now());
        session.point_cloud = Some(PointCloud::default());
        session.advance(Phase::Gazing, self.config.gaze_duration);
        self.session = session;

        self.sampler.reset();
        self.inputs.clear();
        self.last_export = None;
        self.environment.set_view_blocked(false);

        info!(
            "Recording started for {} ({:?} gazing)",
            self.session.artifact_id, self.config.gaze_duration
        );
        Ok(())
    }

    fn abort(&mut self) -> Result<()> {
        if !self.session.abort() {
            debug!("Recording not active, ignoring stop");
            return Ok(());
        }

        warn!("Recording stopped early for {}", self.session.artifact_id);
        self.environment.set_view_blocked(true);
        self.prompt.reset();
        self.inputs.clear();

        self.finish_audio()
    }

    /// Reset to a fresh idle session for the bound artifact
    ///
    /// Aborts an active recording first. Safe to call repeatedly.
    pub fn reset_all(&mut self) {
        if self.is_recording() {
            if let Err(e) = self.abort() {
                error!("Failed to flush audio while resetting: {}", e);
            }
        }

        let artifact_id = self
            .artifact
            .as_ref()
            .map(|a| a.id().to_string())
            .unwrap_or_default();
        self.session = Session::new(artifact_id);
        self.sampler.reset();
        self.inputs.clear();
        self.last_export = None;
        self.prompt.reset();
        self.environment.clear_heatmap();

        debug!("Session reset");
    }

    /// Write point cloud, mesh and answers for the current session
    ///
    /// Each file kind succeeds or fails on its own, see [`ExportReport`].
    /// A session is exported at most once between resets.
    pub fn save_all_data(&mut self) -> Result<&ExportReport> {
        let artifact = self
            .artifact
            .as_ref()
            .ok_or_else(|| RecorderError::MissingDependency("no artifact bound".into()))?;

        if self.session.start_time.is_none() {
            return Err(RecorderError::InvalidInput(
                "no recorded session to save".into(),
            ));
        }
        if self.session.exported {
            return Err(RecorderError::AlreadyExported(self.session.artifact_id.clone()));
        }

        let empty = PointCloud::default();
        let cloud = self.session.point_cloud.as_ref().unwrap_or(&empty);
        let mesh = artifact.mesh();

        let report = self.exporter.export_all(
            artifact.id(),
            &artifact.euler_angles(),
            cloud,
            mesh.as_ref(),
            self.session.answers.answers(),
        );

        self.session.exported = true;
        Ok(self.last_export.insert(report))
    }

    /// Queue an answer selection; consumed on the next tick while Gazing
    pub fn push_input(&mut self, input: AnswerInput) {
        self.inputs.push_back(input);
    }

    /// Record an answer now, at the last accepted gaze hit
    ///
    /// Ignored outside the Gazing phase.
    pub fn record_answer(&mut self, label: &str) -> bool {
        let now = self.relative_time();
        let position = self.sampler.last_local_hit();
        self.session
            .answers
            .record(self.session.phase, label, position, now)
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance by one frame of `dt`
    ///
    /// Returns the final statistics on the tick that completes the session.
    pub fn tick(&mut self, dt: Duration) -> Option<SessionStats> {
        let completed = match self.session.phase {
            Phase::Idle | Phase::Complete => {
                if !self.inputs.is_empty() {
                    debug!("Discarding {} answer inputs while {}", self.inputs.len(), self.session.phase);
                    self.inputs.clear();
                }
                false
            }
            Phase::Gazing => {
                self.tick_gazing(dt);
                false
            }
            Phase::Speaking => self.tick_speaking(dt),
        };

        self.clock = self.clock.saturating_add(dt);

        if self.session.phase == Phase::Gazing && self.session.remaining.is_zero() {
            self.enter_speaking();
        }

        if completed {
            Some(self.complete())
        } else {
            None
        }
    }

    fn tick_gazing(&mut self, dt: Duration) {
        if self.session.remaining.is_zero() {
            return;
        }

        let now = self.relative_time();

        if let (Some(artifact), Some(bounds)) = (self.artifact.as_deref(), self.session.local_bounds) {
            if let Some(point) = self
                .sampler
                .sample(self.tracker.as_ref(), artifact, &bounds, now)
            {
                if let Some(cloud) = self.session.point_cloud.as_mut() {
                    cloud.push(point);
                }
            }
        }

        while let Some(input) = self.inputs.pop_front() {
            if let Some(label) = self.choices.resolve(&input) {
                let position = self.sampler.last_local_hit();
                self.session
                    .answers
                    .record(Phase::Gazing, &label, position, now);
            }
        }

        self.session.remaining = self.session.remaining.saturating_sub(dt);
    }

    fn tick_speaking(&mut self, dt: Duration) -> bool {
        if !self.inputs.is_empty() {
            debug!("Discarding {} answer inputs while speaking", self.inputs.len());
            self.inputs.clear();
        }

        let viewer = self.tracker.head_pose();
        self.prompt.follow(&viewer, dt.as_secs_f32());

        if let Some(dir) = self.artifact_dir() {
            match self.recorder.advance(dt, self.microphone.as_mut(), &dir) {
                Ok(Some(chunk)) => {
                    if let Some(chunks) = self.session.audio_chunks.as_mut() {
                        chunks.push(chunk);
                    }
                }
                Ok(None) => {}
                Err(e) => error!("Failed to rotate audio chunk: {}", e),
            }
        }

        self.session.remaining = self.session.remaining.saturating_sub(dt);
        self.session.remaining.is_zero()
    }

    fn enter_speaking(&mut self) {
        if !self
            .session
            .advance(Phase::Speaking, self.config.voice_duration)
        {
            return;
        }

        info!(
            "Gazing finished for {} ({} points, {} answers), speaking for {:?}",
            self.session.artifact_id,
            self.session.point_cloud.as_ref().map_or(0, PointCloud::len),
            self.session.answers.len(),
            self.config.voice_duration
        );

        self.environment.set_live_heatmap(false);
        self.environment.present_voice_prompt();

        self.session.audio_chunks = Some(AudioChunkSet::default());
        if let Err(e) = self.recorder.begin(self.microphone.as_mut()) {
            error!("Failed to start audio recording: {}", e);
        }
    }

    fn complete(&mut self) -> SessionStats {
        self.session.advance(Phase::Complete, Duration::ZERO);
        info!("Recording finished for {}", self.session.artifact_id);

        self.environment.set_view_blocked(true);

        if let Err(e) = self.save_all_data() {
            error!("Failed to save session data: {}", e);
        }
        if let Err(e) = self.finish_audio() {
            error!("Failed to finish audio: {}", e);
        }

        self.prompt.reset();

        let stats = self.stats();
        self.environment.recording_finished(&stats);
        stats
    }

    /// Stop capture if running, flush the last chunk and write the manifest
    ///
    /// The manifest is written even when no audio was captured.
    fn finish_audio(&mut self) -> Result<()> {
        let Some(dir) = self.artifact_dir() else {
            return Err(RecorderError::MissingDependency("no artifact bound".into()));
        };

        let flushed = self.recorder.finish(self.microphone.as_mut(), &dir);
        if let Some(chunks) = self.session.audio_chunks.as_mut() {
            *chunks = self.recorder.chunks().clone();
        }

        let empty = AudioChunkSet::default();
        let chunks = self.session.audio_chunks.as_ref().unwrap_or(&empty);
        let manifest = self.exporter.write_manifest(&self.session.artifact_id, chunks);

        flushed?;
        manifest?;
        Ok(())
    }

    fn relative_time(&self) -> f64 {
        self.session
            .start_time
            .map(|start| self.clock.saturating_sub(start).as_secs_f64())
            .unwrap_or(0.0)
    }
}
