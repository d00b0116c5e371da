//! Audio-into-video muxing.

use std::path::Path;

use ffmpeg_sidecar::command::FfmpegCommand;
use redub_core::{RedubError, Result};
use tracing::info;

/// Replace `video`'s audio track with `audio`, stream-copying the video
/// and encoding the new track as AAC.
pub fn mux_audio_into_video<P, Q, R>(video: P, audio: Q, out_video: R) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let video = video.as_ref();
    let audio = audio.as_ref();
    let out_video = out_video.as_ref();
    if let Some(dir) = out_video.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    info!(
        video = %video.display(),
        audio = %audio.display(),
        out = %out_video.display(),
        "muxing composited audio into video"
    );

    let status = FfmpegCommand::new()
        .overwrite()
        .input(video.to_string_lossy())
        .input(audio.to_string_lossy())
        .args(["-map", "0:v", "-map", "1:a"])
        .args(["-c:v", "copy", "-c:a", "aac", "-shortest"])
        .output(out_video.to_string_lossy())
        .spawn()
        .map_err(|e| RedubError::Mux(format!("failed to spawn ffmpeg: {e}")))?
        .wait()
        .map_err(|e| RedubError::Mux(format!("failed to wait for ffmpeg: {e}")))?;

    if !status.success() {
        return Err(RedubError::Mux(format!(
            "ffmpeg failed muxing {} + {}: {status}",
            video.display(),
            audio.display()
        )));
    }
    Ok(())
}
