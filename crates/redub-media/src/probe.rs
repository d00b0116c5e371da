//! Media file probing to get metadata without a full decode.

use std::path::Path;
use std::process::Command;

use redub_core::{RedubError, Result};
use serde::{Deserialize, Serialize};

/// Duration and stream layout of a media file, read with ffprobe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaProbe {
    /// File path.
    pub path: String,
    /// Container duration in seconds.
    pub duration_secs: f64,
    /// Whether the file carries a video stream.
    pub has_video: bool,
    /// Whether the file carries an audio stream.
    pub has_audio: bool,
}

impl MediaProbe {
    /// Probe a media file.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RedubError::Probe(format!(
                "file not found: {}",
                path.display()
            )));
        }
        let path_str = path.to_string_lossy().to_string();

        let duration_secs = Self::ffprobe_value(&path_str, &["-show_entries", "format=duration"])?
            .trim()
            .parse::<f64>()
            .map_err(|e| RedubError::Probe(format!("{path_str}: bad duration: {e}")))?;

        let codec_types =
            Self::ffprobe_value(&path_str, &["-show_entries", "stream=codec_type"])?;

        Ok(Self {
            path: path_str,
            duration_secs,
            has_video: codec_types.lines().any(|l| l.trim() == "video"),
            has_audio: codec_types.lines().any(|l| l.trim() == "audio"),
        })
    }

    fn ffprobe_value(path: &str, entries: &[&str]) -> Result<String> {
        let output = Command::new("ffprobe")
            .args(["-v", "error"])
            .args(entries)
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(path)
            .output()
            .map_err(|e| RedubError::Probe(format!("failed to run ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(RedubError::Probe(format!(
                "ffprobe failed on {path}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
