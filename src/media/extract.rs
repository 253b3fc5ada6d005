//! Demux the input into raw frames and a raw sample buffer

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::frames::FrameStore;
use super::run_ffmpeg;

/// Sample rate the audio track is resampled to on extraction.
pub const EXTRACT_SAMPLE_RATE: u32 = 44_100;

/// Channel count of the extracted track.
pub const EXTRACT_CHANNELS: u16 = 2;

/// JPEG quality band for dumped frames (1 best, 32 worst; 3 matches the
/// encoder default).
const FRAME_QUALITY: &str = "3";

pub const AUDIO_FILE: &str = "full_audio.wav";

/// Dump every video frame of `input` as a JPEG into the working directory.
pub fn extract_frames(input: &Path, store: &FrameStore) -> Result<()> {
    info!(input = %input.display(), "extracting video frames");
    let args: Vec<OsString> = vec![
        "-i".into(),
        input.into(),
        "-qscale:v".into(),
        FRAME_QUALITY.into(),
        store.source_pattern().into(),
    ];
    run_ffmpeg(args).context("frame extraction failed")
}

/// Extract the audio track as a fixed-rate stereo WAV; returns its path.
pub fn extract_audio(input: &Path, workspace: &Path) -> Result<PathBuf> {
    info!(input = %input.display(), "extracting audio track");
    let wav = workspace.join(AUDIO_FILE);
    let args: Vec<OsString> = vec![
        "-i".into(),
        input.into(),
        "-ab".into(),
        "160k".into(),
        "-ac".into(),
        EXTRACT_CHANNELS.to_string().into(),
        "-ar".into(),
        EXTRACT_SAMPLE_RATE.to_string().into(),
        (&wav).into(),
    ];
    run_ffmpeg(args).context("audio extraction failed")?;
    Ok(wav)
}
