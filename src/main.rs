use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use jumpcut::analysis::{frame_flags, peak_magnitude, segment_chunks};
use jumpcut::media::extract::{extract_audio, extract_frames};
use jumpcut::media::frames::{altered_output_path, FrameStore};
use jumpcut::media::mux::{mux_output, write_wav, OUTPUT_AUDIO_FILE};
use jumpcut::media::probe::probe_frame_rate;
use jumpcut::media::{decode, is_ffmpeg_on_path};
use jumpcut::retime::pipeline::{estimated_output_seconds, format_minutes_seconds};
use jumpcut::retime::retime;
use jumpcut::stretch::SignalsmithStretcher;
use jumpcut::types::{RetimeParams, SpeedTable, DEFAULT_FADE_LEN, DEFAULT_FRAME_MARGIN};

/// Jumpcut - loudness-driven video retiming
///
/// Detects loud and quiet intervals in a recording and replays each at its
/// own speed, compressing silence while keeping audible content intact.
#[derive(Parser, Debug)]
#[command(name = "jumpcut")]
#[command(version = "0.1.0")]
#[command(about = "Speed up the quiet parts of a video", long_about = None)]
struct Args {
    /// Input video file to retime
    #[arg(value_name = "INPUT")]
    input_file: PathBuf,

    /// Output file name (default: input name with an _ALTERED suffix)
    #[arg(long, value_name = "PATH")]
    output_file: Option<PathBuf>,

    /// Peak ratio in [0, 1] a frame's audio must exceed to count as loud
    #[arg(long, default_value_t = 0.03)]
    loud_threshold: f32,

    /// Playback speed for loud intervals
    #[arg(long, default_value_t = 1.0)]
    loud_speed: f64,

    /// Playback speed for quiet intervals
    #[arg(long, default_value_t = 5.0)]
    quiet_speed: f64,

    /// Frame rate of input and output; probed from the input when omitted
    #[arg(long, value_name = "FPS")]
    frame_rate: Option<u32>,

    /// Print more data
    #[arg(long)]
    verbose: bool,
}

impl Args {
    /// Validate CLI arguments
    fn validate(&self) -> Result<()> {
        if !self.input_file.exists() {
            anyhow::bail!("Input file does not exist: {:?}", self.input_file);
        }

        if !self.input_file.is_file() {
            anyhow::bail!("Input path is not a file: {:?}", self.input_file);
        }

        self.retime_params(self.frame_rate.unwrap_or(30)).validate()
    }

    fn retime_params(&self, frame_rate: u32) -> RetimeParams {
        RetimeParams {
            loud_threshold: self.loud_threshold,
            speeds: SpeedTable {
                quiet: self.quiet_speed,
                loud: self.loud_speed,
            },
            frame_margin: DEFAULT_FRAME_MARGIN,
            fade_len: DEFAULT_FADE_LEN,
            frame_rate,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    args.validate()
        .context("Failed to validate command-line arguments")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(if args.verbose { "debug" } else { "warn" })
            }),
        )
        .init();

    if !is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg is required but was not found on PATH");
    }

    let output_file = args
        .output_file
        .clone()
        .unwrap_or_else(|| altered_output_path(&args.input_file));
    let frame_rate = args
        .frame_rate
        .unwrap_or_else(|| probe_frame_rate(&args.input_file));
    let params = args.retime_params(frame_rate);

    if args.verbose {
        println!("output file name: {:?}", output_file);
        println!("framerate: {}", frame_rate);
    }

    let workspace = tempfile::tempdir().context("Failed to create temporary working directory")?;
    let mut store = FrameStore::new(workspace.path());

    println!("\n1. Extracting frames and audio...");
    extract_frames(&args.input_file, &store)?;
    let wav = extract_audio(&args.input_file, workspace.path())?;

    println!("\n2. Decoding audio track...");
    let track = decode::decode_audio(&wav).context("Failed to decode extracted audio")?;
    println!(
        "   Loaded {} sample frames x {} channels at {} Hz",
        track.frame_len(),
        track.channels,
        track.sample_rate
    );

    println!("\n3. Classifying loudness...");
    let global_peak = peak_magnitude(&track.samples);
    let flags = frame_flags(&track, frame_rate, params.loud_threshold, global_peak);
    let chunks = segment_chunks(&flags, params.frame_margin);
    println!(
        "   {} frame periods -> {} chunks",
        flags.len(),
        chunks.len()
    );

    if args.verbose {
        // Upper bound; chunks shorter than the fade window are emitted as
        // silence but still counted at full length
        let estimate = estimated_output_seconds(&chunks, &params.speeds, frame_rate);
        println!(
            "estimated video length: {}",
            format_minutes_seconds(estimate)
        );
    }

    println!("\n4. Retiming audio and video...");
    let result = retime(
        &track,
        &chunks,
        &params,
        global_peak,
        &SignalsmithStretcher,
        &mut store,
    )
    .context("Retiming pass failed")?;
    println!(
        "   {} output frames, {:.3}s of audio",
        result.output_frames,
        result.audio.duration_seconds()
    );

    println!("\n5. Encoding output...");
    let audio_new = workspace.path().join(OUTPUT_AUDIO_FILE);
    write_wav(&result.audio, &audio_new).context("Failed to write retimed audio")?;
    mux_output(
        &store,
        &audio_new,
        frame_rate,
        workspace.path(),
        &output_file,
    )?;

    println!("\n✓ Wrote {:?}", output_file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            input_file: PathBuf::from("test.mp4"),
            output_file: None,
            loud_threshold: 0.03,
            loud_speed: 1.0,
            quiet_speed: 5.0,
            frame_rate: None,
            verbose: false,
        }
    }

    #[test]
    fn params_carry_cli_speeds() {
        let mut a = args();
        a.loud_speed = 1.5;
        a.quiet_speed = 8.0;
        let params = a.retime_params(30);
        assert_eq!(params.speeds.loud, 1.5);
        assert_eq!(params.speeds.quiet, 8.0);
        assert_eq!(params.frame_rate, 30);
    }

    #[test]
    fn missing_input_fails_validation() {
        let mut a = args();
        a.input_file = PathBuf::from("/nonexistent/clip.mp4");
        assert!(a.validate().is_err());
    }
}
