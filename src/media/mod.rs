//! Media collaborators around the retiming core
//!
//! Demuxing, probing, and muxing shell out to the system `ffmpeg`/`ffprobe`
//! binaries rather than linking FFmpeg natively, which keeps the build free
//! of native dev headers. Audio decoding of the extracted WAV is done
//! in-process with symphonia.

pub mod decode;
pub mod extract;
pub mod frames;
pub mod mux;
pub mod probe;

use std::ffi::OsString;
use std::process::{Command, Stdio};

use anyhow::{ensure, Context, Result};

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run ffmpeg to completion, surfacing its stderr on failure.
pub(crate) fn run_ffmpeg(args: Vec<OsString>) -> Result<()> {
    let output = Command::new("ffmpeg")
        .args(["-y", "-hide_banner", "-loglevel", "error"])
        .args(args)
        .stdin(Stdio::null())
        .output()
        .context("failed to run ffmpeg (is it installed and on PATH?)")?;

    ensure!(
        output.status.success(),
        "ffmpeg exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr).trim()
    );
    Ok(())
}
