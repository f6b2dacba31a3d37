pub mod audio;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod replay;
pub mod session;
pub mod tracking;

pub use audio::{
    encode_wav, AudioChunkSet, AudioFile, AudioFrame, ChannelMicrophone, ChunkConfig,
    ChunkMetadata, ChunkedRecorder, MicrophoneCapture, MicrophoneFeed,
};
pub use config::Config;
pub use error::{RecorderError, Result};
pub use export::{ExportReport, SessionExporter};
pub use geometry::{apply_rotation, unapply_rotation, Bounds, MeshData, Transform, Vec3};
pub use session::{
    AnswerInput, NullEnvironment, Phase, PhaseController, SessionConfig, SessionEnvironment,
    SessionStats,
};
pub use tracking::{
    ArtifactSource, EyeTracker, GazeHit, GazeSampler, HeadPose, ScriptedTracker, StaticArtifact,
};
