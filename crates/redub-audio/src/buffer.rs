//! PCM audio buffer primitive.
//!
//! `AudioBuffer` holds decoded samples as interleaved `f32` at a known
//! sample rate and channel count. WAV files are read and written with
//! `hound`; compressed containers are transcoded by `redub-media` before
//! they reach this type.

use std::path::Path;

use redub_core::{RedubError, Result};

use crate::resample;

/// Convert a decibel value to a linear amplitude factor. 0 dB is identity.
pub fn db_to_amplitude(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Interleaved f32 PCM samples at a fixed sample rate and channel count.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioBuffer {
    /// Wrap existing interleaved samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        debug_assert!(channels > 0);
        debug_assert_eq!(samples.len() % channels.max(1) as usize, 0);
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// An all-zero buffer of the given duration.
    pub fn silence(duration_secs: f64, sample_rate: u32, channels: u16) -> Self {
        let frames = (duration_secs * sample_rate as f64).round().max(0.0) as usize;
        Self {
            samples: vec![0.0; frames * channels as usize],
            sample_rate,
            channels,
        }
    }

    /// Decode a WAV file. Integer and float sample formats are supported.
    pub fn from_wav_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = hound::WavReader::open(path)
            .map_err(|e| RedubError::Decode(format!("{}: {}", path.display(), e)))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| RedubError::Decode(format!("{}: {}", path.display(), e)))?,
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / full_scale))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| RedubError::Decode(format!("{}: {}", path.display(), e)))?
            }
        };

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }

    /// Write the buffer as 16-bit PCM WAV, creating parent directories.
    pub fn export_wav<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| RedubError::Export(format!("{}: {}", dir.display(), e)))?;
            }
        }

        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)
            .map_err(|e| RedubError::Export(format!("{}: {}", path.display(), e)))?;
        for &sample in &self.samples {
            let clamped = sample.clamp(-1.0, 1.0);
            writer
                .write_sample((clamped * i16::MAX as f32) as i16)
                .map_err(|e| RedubError::Export(format!("{}: {}", path.display(), e)))?;
        }
        writer
            .finalize()
            .map_err(|e| RedubError::Export(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// The interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// True if the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Copy out the frame range `[start, end)`.
    pub fn slice(&self, start_frame: usize, end_frame: usize) -> Result<Self> {
        if start_frame > end_frame || end_frame > self.frames() {
            return Err(RedubError::Range(format!(
                "slice [{start_frame}, {end_frame}) exceeds buffer of {} frames",
                self.frames()
            )));
        }
        let ch = self.channels as usize;
        Ok(Self {
            samples: self.samples[start_frame * ch..end_frame * ch].to_vec(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        })
    }

    /// A copy scaled by the given decibel amount.
    pub fn gain(&self, db: f32) -> Self {
        let factor = db_to_amplitude(db);
        Self {
            samples: self.samples.iter().map(|s| s * factor).collect(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Extend with silence so the buffer holds at least `frames` frames.
    pub fn pad_to(&mut self, frames: usize) {
        let want = frames * self.channels as usize;
        if want > self.samples.len() {
            self.samples.resize(want, 0.0);
        }
    }

    /// Append another buffer of the same format.
    pub fn append(&mut self, other: &AudioBuffer) -> Result<()> {
        self.check_format(other)?;
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }

    /// Additively mix `other` into `self` starting at `at_frame`.
    ///
    /// The buffer is zero-extended when the incoming clip runs past the end;
    /// an overlay never truncates what it is given. Summation happens in f32
    /// without clamping — clipping is handled once, at export.
    pub fn overlay(&mut self, other: &AudioBuffer, at_frame: usize) -> Result<()> {
        self.check_format(other)?;
        let needed = at_frame + other.frames();
        self.pad_to(needed);
        let ch = self.channels as usize;
        let base = at_frame * ch;
        for (i, &s) in other.samples.iter().enumerate() {
            self.samples[base + i] += s;
        }
        Ok(())
    }

    /// Mean-square level in dBFS. Silence measures negative infinity.
    pub fn rms_dbfs(&self) -> f32 {
        if self.samples.is_empty() {
            return f32::NEG_INFINITY;
        }
        let mean_square = self
            .samples
            .iter()
            .map(|&s| s as f64 * s as f64)
            .sum::<f64>()
            / self.samples.len() as f64;
        if mean_square <= 0.0 {
            return f32::NEG_INFINITY;
        }
        (10.0 * mean_square.log10()) as f32
    }

    /// A copy resampled to a new sample rate.
    pub fn resampled_to(&self, sample_rate: u32) -> Result<Self> {
        if sample_rate == self.sample_rate {
            return Ok(self.clone());
        }
        let ratio = sample_rate as f64 / self.sample_rate as f64;
        let samples = resample::resample_frames(&self.samples, self.channels, ratio)?;
        Ok(Self {
            samples,
            sample_rate,
            channels: self.channels,
        })
    }

    /// A copy conformed to the given channel count.
    ///
    /// Anything other than a same-count copy goes through a mono mixdown:
    /// channels are averaged, then duplicated out to the target count.
    pub fn with_channels(&self, channels: u16) -> Self {
        if channels == self.channels {
            return self.clone();
        }
        let src_ch = self.channels as usize;
        let dst_ch = channels as usize;
        let mut samples = Vec::with_capacity(self.frames() * dst_ch);
        for frame in self.samples.chunks_exact(src_ch) {
            let mono = frame.iter().sum::<f32>() / src_ch as f32;
            samples.extend(std::iter::repeat(mono).take(dst_ch));
        }
        Self {
            samples,
            sample_rate: self.sample_rate,
            channels,
        }
    }

    fn check_format(&self, other: &AudioBuffer) -> Result<()> {
        if self.sample_rate != other.sample_rate || self.channels != other.channels {
            return Err(RedubError::Range(format!(
                "buffer format mismatch: {} Hz x{} vs {} Hz x{}",
                self.sample_rate, self.channels, other.sample_rate, other.channels
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn constant(value: f32, frames: usize) -> AudioBuffer {
        AudioBuffer::new(vec![value; frames], 16_000, 1)
    }

    #[test]
    fn test_silence_length() {
        let buf = AudioBuffer::silence(2.0, 16_000, 1);
        assert_eq!(buf.frames(), 32_000);
        assert!((buf.duration_secs() - 2.0).abs() < 1e-9);
        assert!(buf.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_gain_zero_db_is_identity() {
        let buf = constant(0.5, 100);
        let out = buf.gain(0.0);
        assert_eq!(out, buf);
    }

    #[test]
    fn test_gain_minus_six_db_halves() {
        let buf = constant(0.8, 10);
        let out = buf.gain(-6.0206);
        for &s in out.samples() {
            assert!((s - 0.4).abs() < 1e-3);
        }
    }

    #[test]
    fn test_slice_out_of_range() {
        let buf = constant(0.1, 10);
        assert!(buf.slice(0, 11).is_err());
        assert!(buf.slice(8, 4).is_err());
        assert_eq!(buf.slice(2, 6).unwrap().frames(), 4);
    }

    #[test]
    fn test_overlay_sums() {
        let mut base = constant(0.25, 10);
        let clip = constant(0.5, 4);
        base.overlay(&clip, 2).unwrap();
        assert!((base.samples()[1] - 0.25).abs() < 1e-6);
        assert!((base.samples()[2] - 0.75).abs() < 1e-6);
        assert!((base.samples()[5] - 0.75).abs() < 1e-6);
        assert!((base.samples()[6] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_overlay_extends_past_end() {
        let mut base = constant(0.1, 4);
        let clip = constant(0.2, 4);
        base.overlay(&clip, 3).unwrap();
        assert_eq!(base.frames(), 7);
        assert!((base.samples()[6] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_overlay_format_mismatch_rejected() {
        let mut base = constant(0.1, 4);
        let clip = AudioBuffer::new(vec![0.0; 4], 44_100, 1);
        assert!(base.overlay(&clip, 0).is_err());
    }

    #[test]
    fn test_rms_dbfs_full_scale() {
        let buf = constant(1.0, 1000);
        assert!(buf.rms_dbfs().abs() < 1e-3);
    }

    #[test]
    fn test_rms_dbfs_silence_is_neg_infinity() {
        let buf = AudioBuffer::silence(0.5, 16_000, 1);
        assert_eq!(buf.rms_dbfs(), f32::NEG_INFINITY);
    }

    #[test]
    fn test_stereo_mixdown() {
        let buf = AudioBuffer::new(vec![1.0, 0.0, 1.0, 0.0], 16_000, 2);
        let mono = buf.with_channels(1);
        assert_eq!(mono.frames(), 2);
        assert!((mono.samples()[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_wav_roundtrip() {
        let dir = std::env::temp_dir().join("redub-buffer-tests");
        let path = dir.join("roundtrip.wav");
        let buf = AudioBuffer::new(
            (0..1600).map(|i| (i as f32 * 0.01).sin() * 0.5).collect(),
            16_000,
            1,
        );
        buf.export_wav(&path).unwrap();
        let loaded = AudioBuffer::from_wav_file(&path).unwrap();
        assert_eq!(loaded.sample_rate(), 16_000);
        assert_eq!(loaded.channels(), 1);
        assert_eq!(loaded.frames(), buf.frames());
        for (a, b) in buf.samples().iter().zip(loaded.samples()) {
            assert!((a - b).abs() < 1e-3);
        }
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_from_wav_missing_file() {
        let err = AudioBuffer::from_wav_file("/nonexistent/clip.wav").unwrap_err();
        assert!(matches!(err, RedubError::Decode(_)));
    }

    proptest! {
        // Non-overlapping overlays commute: applying them in any order
        // yields the same samples.
        #[test]
        fn overlay_order_independent(
            a in proptest::collection::vec(-1.0f32..1.0, 1..64),
            b in proptest::collection::vec(-1.0f32..1.0, 1..64),
            gap in 0usize..32,
        ) {
            let clip_a = AudioBuffer::new(a.clone(), 16_000, 1);
            let clip_b = AudioBuffer::new(b.clone(), 16_000, 1);
            let b_at = a.len() + gap;

            let mut fwd = AudioBuffer::silence(0.0, 16_000, 1);
            fwd.overlay(&clip_a, 0).unwrap();
            fwd.overlay(&clip_b, b_at).unwrap();

            let mut rev = AudioBuffer::silence(0.0, 16_000, 1);
            rev.overlay(&clip_b, b_at).unwrap();
            rev.overlay(&clip_a, 0).unwrap();

            prop_assert_eq!(fwd.samples(), rev.samples());
        }
    }
}
