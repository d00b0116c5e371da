//! Sample-stream resampling via rubato.
//!
//! One shared routine feeds an interleaved buffer through a `SincFixedIn`
//! resampler in fixed-size chunks, then trims the sinc filter's delay off
//! the front so the output lines up with the input. Used by both the rate
//! converter and the time-stretch engine.

use redub_core::{RedubError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

const CHUNK_FRAMES: usize = 1024;

/// Resample interleaved frames by `fs_ratio` (output rate / input rate).
///
/// Output length is `round(input_frames * fs_ratio)` frames.
pub(crate) fn resample_frames(samples: &[f32], channels: u16, fs_ratio: f64) -> Result<Vec<f32>> {
    let ch = channels as usize;
    if samples.is_empty() || ch == 0 {
        return Ok(Vec::new());
    }
    let in_frames = samples.len() / ch;
    let expected = (in_frames as f64 * fs_ratio).round() as usize;
    if expected == 0 {
        return Ok(Vec::new());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(fs_ratio, 2.0, params, CHUNK_FRAMES, ch)
        .map_err(|e| RedubError::Resample(e.to_string()))?;
    let delay = resampler.output_delay();

    // Deinterleave into per-channel planes.
    let mut planes: Vec<Vec<f32>> = (0..ch).map(|_| Vec::with_capacity(in_frames)).collect();
    for frame in samples.chunks_exact(ch) {
        for (plane, &s) in planes.iter_mut().zip(frame) {
            plane.push(s);
        }
    }

    let mut out: Vec<Vec<f32>> = (0..ch).map(|_| Vec::with_capacity(expected + delay)).collect();
    fn push_chunk(chunk: Vec<Vec<f32>>, out: &mut [Vec<f32>]) {
        for (dst, src) in out.iter_mut().zip(chunk) {
            dst.extend(src);
        }
    }

    let full_chunks = in_frames / CHUNK_FRAMES;
    for i in 0..full_chunks {
        let start = i * CHUNK_FRAMES;
        let input: Vec<&[f32]> = planes
            .iter()
            .map(|p| &p[start..start + CHUNK_FRAMES])
            .collect();
        let chunk = resampler
            .process(input.as_slice(), None)
            .map_err(|e| RedubError::Resample(e.to_string()))?;
        push_chunk(chunk, &mut out);
    }

    let tail_start = full_chunks * CHUNK_FRAMES;
    if tail_start < in_frames {
        let input: Vec<&[f32]> = planes.iter().map(|p| &p[tail_start..]).collect();
        let chunk = resampler
            .process_partial(Some(input.as_slice()), None)
            .map_err(|e| RedubError::Resample(e.to_string()))?;
        push_chunk(chunk, &mut out);
    }

    // Flush the filter delay line until the trimmed output is complete.
    let flushes = delay / CHUNK_FRAMES + 2;
    for _ in 0..flushes {
        if out[0].len() >= delay + expected {
            break;
        }
        let empty: Option<&[&[f32]]> = None;
        let chunk = resampler
            .process_partial(empty, None)
            .map_err(|e| RedubError::Resample(e.to_string()))?;
        if chunk[0].is_empty() {
            break;
        }
        push_chunk(chunk, &mut out);
    }

    // Trim the leading delay, clamp to the expected length, re-interleave.
    let mut interleaved = vec![0.0f32; expected * ch];
    for (c, plane) in out.iter().enumerate() {
        for (frame, &s) in plane.iter().skip(delay).take(expected).enumerate() {
            interleaved[frame * ch + c] = s;
        }
    }
    Ok(interleaved)
}
