//! Loudness classification of the video-frame timeline
//!
//! Pure function module:
//! - Takes the raw sample buffer and the stream's global peak as input
//! - Returns one loudness flag per video-frame period
//! - No side effects

use crate::types::{samples_per_frame, AudioTrack};

/// Largest absolute sample magnitude in a buffer.
///
/// Applied to the whole track this yields the global peak that both the
/// analyzer and the stitcher normalize against.
pub fn peak_magnitude(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |peak, &s| peak.max(s.abs()))
}

/// Classify every video-frame period of the track as loud or quiet.
///
/// Frame period `i` covers the sample-frame range
/// `[round(i * spf), min(round((i + 1) * spf), total))` where
/// `spf = sample_rate / frame_rate`. The period is loud when its peak
/// magnitude relative to `global_peak` exceeds `threshold`.
///
/// A zero `global_peak` (silent input) defines every peak ratio as 0, so the
/// whole timeline classifies as quiet instead of dividing by zero.
pub fn frame_flags(
    track: &AudioTrack,
    frame_rate: u32,
    threshold: f32,
    global_peak: f32,
) -> Vec<bool> {
    let spf = samples_per_frame(track.sample_rate, frame_rate);
    let total = track.frame_len();
    let channels = track.channels as usize;
    let periods = (total as f64 / spf).ceil() as usize;

    let mut flags = Vec::with_capacity(periods);
    for i in 0..periods {
        let start = ((i as f64 * spf).round() as usize).min(total);
        let end = (((i + 1) as f64 * spf).round() as usize).min(total);
        let peak = peak_magnitude(&track.samples[start * channels..end * channels]);
        let ratio = if global_peak > 0.0 {
            peak / global_peak
        } else {
            0.0
        };
        flags.push(ratio > threshold);
    }
    flags
}
