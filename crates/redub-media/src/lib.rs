//! Redub Media - FFmpeg integration for container I/O
//!
//! The compositor itself only touches WAV PCM; everything container- or
//! codec-shaped goes through FFmpeg subprocesses here:
//! - Probing duration and stream layout (`MediaProbe`)
//! - Extracting program audio out of a video file
//! - Decoding compressed synthesized clips into `AudioBuffer`s
//! - Muxing the composited track back into the video

pub mod decode;
pub mod extract;
pub mod mux;
pub mod probe;

pub use decode::decode_audio_file;
pub use extract::extract_audio;
pub use mux::mux_audio_into_video;
pub use probe::MediaProbe;
