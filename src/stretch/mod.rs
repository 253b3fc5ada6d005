//! Pitch-preserving time-stretch behind a narrow functional seam
//!
//! The retiming core only ever needs `raw samples + speed -> time-scaled
//! samples`, so the transform sits behind [`TimeStretcher`] and alternative
//! stretch algorithms can be substituted without touching the core. The
//! default implementation uses ssstretch (Signalsmith Stretch).

use anyhow::{ensure, Result};
use ssstretch::Stretch;

/// Time-stretch transform: interleaved samples in, time-scaled interleaved
/// samples out. One call per chunk, stateless across calls.
///
/// `speed` is a playback-rate multiplier: 2.0 halves the duration, 0.5
/// doubles it. Implementations must preserve channel count and sample rate.
pub trait TimeStretcher {
    fn stretch(&self, samples: &[f32], channels: u16, sample_rate: u32, speed: f64)
        -> Result<Vec<f32>>;
}

/// Signalsmith Stretch phase-vocoder transform.
pub struct SignalsmithStretcher;

impl TimeStretcher for SignalsmithStretcher {
    fn stretch(
        &self,
        samples: &[f32],
        channels: u16,
        sample_rate: u32,
        speed: f64,
    ) -> Result<Vec<f32>> {
        ensure!(channels > 0, "time-stretch requires at least one channel");
        ensure!(speed > 0.0, "time-stretch speed must be positive, got {}", speed);
        ensure!(
            samples.len() % channels as usize == 0,
            "interleaved buffer length {} is not a multiple of {} channels",
            samples.len(),
            channels
        );

        if is_identity_speed(speed) {
            return Ok(samples.to_vec());
        }
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let planes = deinterleave(samples, channels as usize);
        let frames = planes[0].len();

        let mut stretch = configured_stretch(channels, sample_rate);
        let desired_output = ((frames as f64 / speed).ceil() as usize).max(1);
        let latency = stretch.output_latency().max(0) as usize;
        let mut outputs = vec![Vec::new(); channels as usize];
        stretch.process_vec(
            &planes,
            frames as i32,
            &mut outputs,
            (desired_output + latency) as i32,
        );

        let mut flushed = vec![Vec::new(); channels as usize];
        stretch.flush_vec(&mut flushed, latency as i32);
        for (output, mut tail) in outputs.iter_mut().zip(flushed) {
            output.append(&mut tail);
        }

        Ok(interleave(&outputs))
    }
}

fn is_identity_speed(speed: f64) -> bool {
    (speed - 1.0).abs() < 1e-6
}

fn configured_stretch(channels: u16, sample_rate: u32) -> Stretch {
    let mut stretch = Stretch::new();
    stretch.preset_default(channels as i32, sample_rate as f32);
    stretch
}

fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = samples.len() / channels;
    let mut planes = vec![Vec::with_capacity(frames); channels];
    for frame in samples.chunks_exact(channels) {
        for (plane, &sample) in planes.iter_mut().zip(frame) {
            plane.push(sample);
        }
    }
    planes
}

fn interleave(planes: &[Vec<f32>]) -> Vec<f32> {
    let frames = planes.iter().map(Vec::len).min().unwrap_or(0);
    let mut samples = Vec::with_capacity(frames * planes.len());
    for i in 0..frames {
        for plane in planes {
            samples.push(plane[i]);
        }
    }
    samples
}
