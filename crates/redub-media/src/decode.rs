//! Clip decoding for the compositor.
//!
//! Synthesized clips usually arrive as WAV, but some engines emit MP3 or
//! other compressed formats. WAV goes straight through hound; anything
//! else is transcoded to a temporary WAV by FFmpeg first.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use ffmpeg_sidecar::command::FfmpegCommand;
use redub_audio::AudioBuffer;
use redub_core::{RedubError, Result};
use tracing::debug;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Decode an audio file of any FFmpeg-supported format into a buffer.
pub fn decode_audio_file<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RedubError::Decode(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let is_wav = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);
    if is_wav {
        return AudioBuffer::from_wav_file(path);
    }

    let temp = std::env::temp_dir().join(format!(
        "redub-decode-{}-{}.wav",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    debug!(src = %path.display(), temp = %temp.display(), "transcoding clip to wav");

    let status = FfmpegCommand::new()
        .overwrite()
        .input(path.to_string_lossy())
        .args(["-vn", "-acodec", "pcm_s16le"])
        .output(temp.to_string_lossy())
        .spawn()
        .map_err(|e| RedubError::Decode(format!("failed to spawn ffmpeg: {e}")))?
        .wait()
        .map_err(|e| RedubError::Decode(format!("failed to wait for ffmpeg: {e}")))?;

    if !status.success() {
        std::fs::remove_file(&temp).ok();
        return Err(RedubError::Decode(format!(
            "ffmpeg failed decoding {}: {status}",
            path.display()
        )));
    }

    let buffer = AudioBuffer::from_wav_file(&temp);
    std::fs::remove_file(&temp).ok();
    buffer
}
