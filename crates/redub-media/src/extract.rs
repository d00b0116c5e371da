//! Program-audio extraction.

use std::path::Path;

use ffmpeg_sidecar::command::FfmpegCommand;
use redub_core::{RedubError, Result};
use tracing::info;

/// Pull the audio track out of `video` into a mono PCM WAV at
/// `sample_rate`, ready to become the background bed.
pub fn extract_audio<P: AsRef<Path>, Q: AsRef<Path>>(
    video: P,
    out_wav: Q,
    sample_rate: u32,
) -> Result<()> {
    let video = video.as_ref();
    let out_wav = out_wav.as_ref();
    if let Some(dir) = out_wav.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    info!(video = %video.display(), out = %out_wav.display(), "extracting program audio");

    let status = FfmpegCommand::new()
        .overwrite()
        .input(video.to_string_lossy())
        .args(["-vn", "-acodec", "pcm_s16le"])
        .args(["-ar", &sample_rate.to_string(), "-ac", "1"])
        .output(out_wav.to_string_lossy())
        .spawn()
        .map_err(|e| RedubError::Decode(format!("failed to spawn ffmpeg: {e}")))?
        .wait()
        .map_err(|e| RedubError::Decode(format!("failed to wait for ffmpeg: {e}")))?;

    if !status.success() {
        return Err(RedubError::Decode(format!(
            "ffmpeg failed extracting audio from {}: {status}",
            video.display()
        )));
    }
    let size = std::fs::metadata(out_wav).map(|m| m.len()).unwrap_or(0);
    if size == 0 {
        return Err(RedubError::Decode(format!(
            "extraction produced an empty file: {}",
            out_wav.display()
        )));
    }
    Ok(())
}
