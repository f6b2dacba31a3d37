pub mod chunk;
pub mod file;
pub mod microphone;
pub mod wav;

pub use chunk::{AudioChunkSet, ChunkConfig, ChunkMetadata, ChunkedRecorder};
pub use file::AudioFile;
pub use microphone::{
    AudioFrame, CaptureHandle, ChannelMicrophone, MicrophoneCapture, MicrophoneFeed,
};
pub use wav::{encode_wav, write_wav, WAV_HEADER_LEN};
