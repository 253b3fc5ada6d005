//! Encode the retimed audio and mux the final output

use std::ffi::OsString;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::frames::FrameStore;
use super::run_ffmpeg;
use crate::types::AudioTrack;

pub const OUTPUT_AUDIO_FILE: &str = "audio_new.wav";

/// Write an interleaved track as 16-bit PCM WAV.
pub fn write_wav(track: &AudioTrack, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: track.channels,
        sample_rate: track.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    for &sample in &track.samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer
            .write_sample((clamped * 32767.0) as i16)
            .context("Failed to write audio sample")?;
    }

    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}

/// Mux the retimed frame sequence and audio into the output container.
///
/// ffmpeg writes into the working directory first; the finished file is
/// moved to its destination only on success. A failed encode leaves no
/// partial output at the destination.
pub fn mux_output(
    store: &FrameStore,
    audio_wav: &Path,
    frame_rate: u32,
    workspace: &Path,
    output: &Path,
) -> Result<()> {
    let file_name = output
        .file_name()
        .with_context(|| format!("Output path {} has no file name", output.display()))?;
    let staged = workspace.join(file_name);

    info!(output = %output.display(), frame_rate, "muxing output");
    let args: Vec<OsString> = vec![
        "-framerate".into(),
        frame_rate.to_string().into(),
        "-i".into(),
        store.output_pattern().into(),
        "-i".into(),
        audio_wav.into(),
        "-c:v".into(),
        "libx264".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-c:a".into(),
        "aac".into(),
        (&staged).into(),
    ];
    run_ffmpeg(args).context("output muxing failed")?;

    persist(&staged, output)
}

/// Move the staged file to its final path; falls back to copy + remove when
/// the destination sits on a different filesystem than the temp dir.
fn persist(staged: &Path, output: &Path) -> Result<()> {
    if std::fs::rename(staged, output).is_ok() {
        return Ok(());
    }
    std::fs::copy(staged, output).with_context(|| {
        format!(
            "failed to move output from {} to {}",
            staged.display(),
            output.display()
        )
    })?;
    let _ = std::fs::remove_file(staged);
    Ok(())
}
