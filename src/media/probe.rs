//! Best-effort frame-rate probing via ffprobe

use std::path::Path;
use std::process::Command;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

/// Frame rate assumed when probing fails.
pub const FALLBACK_FRAME_RATE: u32 = 30;

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    r_frame_rate: Option<String>,
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

/// Probe the input's video frame rate, falling back to 30 fps.
///
/// Probe failures are never fatal: the error is logged and the fallback
/// rate is used.
pub fn probe_frame_rate(input: &Path) -> u32 {
    match try_probe_frame_rate(input) {
        Ok(rate) => {
            debug!(rate, "probed frame rate");
            rate
        }
        Err(err) => {
            warn!(
                "frame-rate probe failed ({err:#}); assuming {} fps",
                FALLBACK_FRAME_RATE
            );
            FALLBACK_FRAME_RATE
        }
    }
}

fn try_probe_frame_rate(input: &Path) -> Result<u32> {
    let output = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(input)
        .output()
        .context("failed to run ffprobe (is it installed and on PATH?)")?;
    ensure!(
        output.status.success(),
        "ffprobe exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr).trim()
    );

    let parsed: ProbeOutput =
        serde_json::from_slice(&output.stdout).context("ffprobe output was not valid JSON")?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .context("no video stream found")?;
    let rate = stream
        .r_frame_rate
        .as_deref()
        .context("video stream carries no r_frame_rate")?;
    parse_frame_rate(rate).with_context(|| format!("invalid r_frame_rate '{}'", rate))
}

/// Parse ffprobe's `num/den` rational into a rounded integer frame rate.
fn parse_frame_rate(raw: &str) -> Result<u32> {
    let (num, den) = match raw.split_once('/') {
        Some((num, den)) => (num.parse::<f64>()?, den.parse::<f64>()?),
        None => (raw.parse::<f64>()?, 1.0),
    };
    ensure!(den > 0.0 && num > 0.0, "frame rate must be positive");
    let rate = (num / den).round();
    ensure!(rate >= 1.0, "frame rate rounds to zero");
    Ok(rate as u32)
}
