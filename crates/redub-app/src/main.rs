//! Redub - dubbed-audio compositor CLI
//!
//! Drives the composition pipeline from the command line: probe media,
//! extract program audio, compose the dubbed track over the background
//! bed, and mux the result back into the video.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use redub_compose::Compositor;
use redub_core::MixConfig;
use redub_media::{decode_audio_file, extract_audio, mux_audio_into_video, MediaProbe};
use redub_timeline::SegmentTimeline;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Redub - overlay translated speech onto the original program audio.
#[derive(Parser, Debug)]
#[command(name = "redub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compose the dubbed track from a segment side-table and program audio
    Compose {
        /// Segment side-table (JSON array with start/end/audio_path)
        #[arg(long)]
        segments: PathBuf,
        /// Original program audio (any FFmpeg-decodable file)
        #[arg(long)]
        audio: PathBuf,
        /// Output WAV path
        #[arg(short, long)]
        output: PathBuf,
        /// Background volume fraction (0.0-1.0)
        #[arg(long, default_value_t = 0.25)]
        background_volume: f32,
        /// Foreground reference level in dBFS
        #[arg(long, default_value_t = -16.0)]
        target_dbfs: f32,
        /// Duration-mismatch tolerance band (fraction)
        #[arg(long, default_value_t = 0.10)]
        tolerance: f64,
        /// Also write the per-segment report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Extract the program audio out of a video file
    Extract {
        /// Input video
        #[arg(long)]
        video: PathBuf,
        /// Output WAV path
        #[arg(short, long)]
        output: PathBuf,
        /// Output sample rate in Hz
        #[arg(long, default_value_t = 16_000)]
        sample_rate: u32,
    },
    /// Mux a composited audio track back into the video
    Mux {
        /// Input video (video stream is copied untouched)
        #[arg(long)]
        video: PathBuf,
        /// Composited audio track
        #[arg(long)]
        audio: PathBuf,
        /// Output video path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print duration and stream layout of a media file
    Probe {
        /// Media file to probe
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Compose {
            segments,
            audio,
            output,
            background_volume,
            target_dbfs,
            tolerance,
            report,
        } => {
            let config = MixConfig {
                background_volume,
                target_dbfs,
                stretch_tolerance: tolerance,
                ..Default::default()
            };
            let timeline = SegmentTimeline::load_json_file(&segments)?;
            // A broken source track is fatal: no background, no run.
            let source = decode_audio_file(&audio)?;
            info!(
                segments = timeline.len(),
                source_secs = source.duration_secs(),
                "starting composition"
            );

            let compositor = Compositor::new(config)?;
            let run = compositor.compose_to_file(&timeline, &source, &output)?;
            println!("{}", run.summary());

            if let Some(report_path) = report {
                std::fs::write(&report_path, serde_json::to_vec_pretty(&run)?)?;
                info!(report = %report_path.display(), "segment report written");
            }
        }
        Commands::Extract {
            video,
            output,
            sample_rate,
        } => {
            extract_audio(&video, &output, sample_rate)?;
            println!("extracted {} -> {}", video.display(), output.display());
        }
        Commands::Mux {
            video,
            audio,
            output,
        } => {
            mux_audio_into_video(&video, &audio, &output)?;
            println!("muxed {} -> {}", audio.display(), output.display());
        }
        Commands::Probe { path } => {
            let probe = MediaProbe::probe(&path)?;
            println!("{}", serde_json::to_string_pretty(&probe)?);
        }
    }
    Ok(())
}
