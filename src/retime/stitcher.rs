//! Per-chunk audio stitching: stretch, normalize, crossfade
//!
//! Speed changes between chunks leave phase and amplitude discontinuities at
//! every splice point. Fading each stretched block in and out masks the
//! clicks without any cross-chunk-aware resynthesis; blocks too short to
//! fade safely contribute silence instead.

use anyhow::Result;

use crate::stretch::TimeStretcher;
use crate::types::{AudioTrack, FrameChunk};

/// Stretch one chunk's raw sub-range and prepare it for splicing.
///
/// The chunk's sample-frame range is `[trunc(start_frame * spf),
/// trunc(end_frame * spf))`, clamped to the buffer. The stretched block is
/// normalized against `global_peak` (the same peak the analyzer classified
/// with) and faded at both edges.
pub fn stitch_chunk(
    track: &AudioTrack,
    chunk: &FrameChunk,
    speed: f64,
    spf: f64,
    global_peak: f32,
    fade_len: usize,
    stretcher: &dyn TimeStretcher,
) -> Result<Vec<f32>> {
    let channels = track.channels as usize;
    let total = track.frame_len();
    let start = ((chunk.start_frame as f64 * spf) as usize).min(total);
    let end = ((chunk.end_frame as f64 * spf) as usize).min(total);
    let raw = &track.samples[start * channels..end * channels];

    let mut stretched = stretcher.stretch(raw, track.channels, track.sample_rate, speed)?;
    normalize(&mut stretched, global_peak);
    apply_edge_fade(&mut stretched, channels, fade_len);
    Ok(stretched)
}

/// Rescale into the canonical amplitude range. A zero peak means the whole
/// input was silent; the block is left untouched instead of dividing by zero.
fn normalize(samples: &mut [f32], global_peak: f32) {
    if global_peak > 0.0 {
        for sample in samples.iter_mut() {
            *sample /= global_peak;
        }
    }
}

/// Linear fade-in over the first `fade_len` sample frames and fade-out over
/// the last `fade_len`, applied identically across channels. Blocks shorter
/// than the fade are zeroed outright.
pub fn apply_edge_fade(samples: &mut [f32], channels: usize, fade_len: usize) {
    if channels == 0 {
        return;
    }
    let frames = samples.len() / channels;
    if frames < fade_len {
        samples.fill(0.0);
        return;
    }

    for i in 0..fade_len {
        let ramp = i as f32 / fade_len as f32;
        for c in 0..channels {
            samples[i * channels + c] *= ramp;
            samples[(frames - fade_len + i) * channels + c] *= 1.0 - ramp;
        }
    }
}
