//! Trace replay: drive a session from a recorded gaze trace
//!
//! A trace is a JSON file describing the artifact and one entry per
//! rendered frame (tracking validity, head pose, gaze ray, hit, answers).
//! The driver binds the artifact, starts recording, feeds frames to the
//! scripted tracker and audio to the channel microphone, and ticks the
//! controller until the session completes.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::audio::{AudioFrame, MicrophoneFeed};
use crate::geometry::{Bounds, MeshData, Transform, Vec2, Vec3};
use crate::session::{AnswerInput, PhaseController, SessionStats};
use crate::tracking::{GazeFrame, GazeHit, HeadPose, ScriptedTracker, StaticArtifact};

#[derive(Debug, Deserialize)]
pub struct Trace {
    pub artifact: TraceArtifact,
    /// Default frame length when a frame has no `dt`
    #[serde(default = "default_tick_secs")]
    pub tick_secs: f64,
    pub frames: Vec<TraceFrame>,
}

#[derive(Debug, Deserialize)]
pub struct TraceArtifact {
    pub id: String,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub euler_degrees: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    /// Local bounds; omitted means the artifact has no renderer
    pub bounds: Option<TraceBounds>,
    pub mesh: Option<TraceMesh>,
}

#[derive(Debug, Deserialize)]
pub struct TraceBounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

#[derive(Debug, Deserialize)]
pub struct TraceMesh {
    pub vertices: Vec<[f32; 3]>,
    #[serde(default)]
    pub uvs: Vec<[f32; 2]>,
    pub submeshes: Vec<Vec<u32>>,
}

#[derive(Debug, Deserialize)]
pub struct TraceFrame {
    pub dt: Option<f64>,
    #[serde(default = "default_valid")]
    pub valid: bool,
    #[serde(default)]
    pub head_position: [f32; 3],
    #[serde(default = "default_forward")]
    pub head_forward: [f32; 3],
    #[serde(default)]
    pub origin: [f32; 3],
    #[serde(default = "default_forward")]
    pub direction: [f32; 3],
    pub hit: Option<TraceHit>,
    #[serde(default)]
    pub answers: Vec<TraceAnswer>,
}

#[derive(Debug, Deserialize)]
pub struct TraceHit {
    pub target: String,
    pub position: [f32; 3],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceAnswer {
    Key(u8),
    Number(usize),
    Label(String),
}

fn default_tick_secs() -> f64 {
    1.0 / 60.0
}

fn default_valid() -> bool {
    true
}

fn default_forward() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl Trace {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open trace: {}", path.display()))?;
        let trace: Trace = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse trace: {}", path.display()))?;

        trace.tick()?;
        info!(
            "Loaded trace for {}: {} frames",
            trace.artifact.id,
            trace.frames.len()
        );
        Ok(trace)
    }

    /// Default frame length; must be a representable, non-zero duration
    pub fn tick(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.tick_secs)
            .ok()
            .filter(|tick| !tick.is_zero())
            .with_context(|| {
                format!("tick_secs must be a positive duration, got {}", self.tick_secs)
            })
    }

    pub fn artifact(&self) -> StaticArtifact {
        let a = &self.artifact;
        let euler = Vec3::from(a.euler_degrees);

        StaticArtifact {
            id: a.id.clone(),
            euler_degrees: euler,
            transform: Transform::from_euler(Vec3::from(a.position), euler, Vec3::from(a.scale)),
            bounds: a
                .bounds
                .as_ref()
                .map(|b| Bounds::from_min_max(Vec3::from(b.min), Vec3::from(b.max))),
            mesh: a.mesh.as_ref().map(|m| MeshData {
                vertices: m.vertices.iter().copied().map(Vec3::from).collect(),
                normals: Vec::new(),
                uvs: m.uvs.iter().copied().map(Vec2::from).collect(),
                submeshes: m.submeshes.clone(),
            }),
        }
    }
}

impl TraceFrame {
    fn gaze_frame(&self) -> GazeFrame {
        let forward = Vec3::from(self.head_forward)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::z);
        let right = Vec3::y()
            .cross(&forward)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::x);

        GazeFrame {
            valid: self.valid,
            head: HeadPose {
                position: Vec3::from(self.head_position),
                forward,
                right,
                up: forward.cross(&right),
            },
            origin: Vec3::from(self.origin),
            direction: Vec3::from(self.direction),
            hit: self.hit.as_ref().map(|h| GazeHit {
                target_id: h.target.clone(),
                world_position: Vec3::from(h.position),
            }),
        }
    }
}

impl From<&TraceAnswer> for AnswerInput {
    fn from(answer: &TraceAnswer) -> Self {
        match answer {
            TraceAnswer::Key(k) => AnswerInput::Key(*k),
            TraceAnswer::Number(n) => AnswerInput::Number(*n),
            TraceAnswer::Label(l) => AnswerInput::Label(l.clone()),
        }
    }
}

/// Feeds a trace through a controller
pub struct ReplayDriver {
    tracker: ScriptedTracker,
    feed: MicrophoneFeed,
    sample_rate: u32,
    channels: u16,
    audio: Vec<f32>,
    emitted_frames: u64,
    elapsed: Duration,
    realtime: bool,
}

impl ReplayDriver {
    /// `tracker` and `feed` must be the other halves of what the controller was built with
    pub fn new(tracker: ScriptedTracker, feed: MicrophoneFeed, sample_rate: u32, channels: u16) -> Self {
        Self {
            tracker,
            feed,
            sample_rate,
            channels: channels.max(1),
            audio: Vec::new(),
            emitted_frames: 0,
            elapsed: Duration::ZERO,
            realtime: false,
        }
    }

    /// Interleaved samples at the driver's rate and channel count; silence when absent
    pub fn with_audio(mut self, samples: Vec<f32>) -> Self {
        self.audio = samples;
        self
    }

    /// Pace ticks with a wall-clock interval instead of running flat out
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub async fn run(&mut self, trace: &Trace, controller: &mut PhaseController) -> Result<SessionStats> {
        let tick = trace.tick()?;
        controller.bind_artifact(Box::new(trace.artifact()));
        controller
            .set_recording(true)
            .context("Failed to start recording")?;

        let config = controller.config();
        let session_len = config.gaze_duration.saturating_add(config.voice_duration);
        let padding = (session_len.as_secs_f64() / tick.as_secs_f64()).ceil() as usize + 2;
        let mut interval = self.realtime.then(|| tokio::time::interval(tick));

        let padded = std::iter::repeat(None).take(padding);
        for (i, frame) in trace.frames.iter().map(Some).chain(padded).enumerate() {
            let dt = match frame {
                Some(frame) => {
                    self.tracker.set_frame(frame.gaze_frame());
                    for answer in &frame.answers {
                        controller.push_input(answer.into());
                    }
                    frame
                        .dt
                        .and_then(|s| Duration::try_from_secs_f64(s).ok())
                        .unwrap_or(tick)
                }
                None => {
                    self.tracker.invalidate();
                    tick
                }
            };

            if let Some(interval) = interval.as_mut() {
                interval.tick().await;
            }

            self.feed_audio(dt);
            if let Some(stats) = controller.tick(dt) {
                info!("Replay finished after {} ticks", i + 1);
                return Ok(stats);
            }
        }

        anyhow::bail!(
            "Session did not complete (phase {}, {:.1}s remaining)",
            controller.phase(),
            controller.remaining().as_secs_f64()
        )
    }

    /// Push the audio that plays during the next `dt`
    fn feed_audio(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
        let due = (self.elapsed.as_secs_f64() * self.sample_rate as f64).round() as u64;
        let frames = due.saturating_sub(self.emitted_frames) as usize;
        if frames == 0 {
            return;
        }

        let width = self.channels as usize;
        let start = self.emitted_frames as usize * width;
        let end = start + frames * width;
        let mut samples: Vec<f32> = self
            .audio
            .get(start.min(self.audio.len())..end.min(self.audio.len()))
            .unwrap_or_default()
            .to_vec();
        samples.resize(frames * width, 0.0);

        self.emitted_frames = due;
        if !self.feed.push(AudioFrame {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
        }) {
            debug!("Microphone dropped, audio feed discarded");
        }
    }
}
