//! Sequential retiming pass over the chunk list
//!
//! Chunk `i + 1` depends on chunk `i` twice over: its stitched audio lands
//! at the pointer the previous chunk advanced to, and its frame copies may
//! freeze on the previous chunk's last valid frame. Both pieces of state are
//! threaded explicitly through one fold; everything else per chunk is
//! self-contained.

use anyhow::{Context, Result};
use tracing::debug;

use crate::retime::remap::{copy_chunk_frames, output_frame_span, FrameCopier};
use crate::retime::stitcher::stitch_chunk;
use crate::stretch::TimeStretcher;
use crate::types::{samples_per_frame, AudioTrack, FrameChunk, RetimeParams, SpeedTable};

/// Result of one retiming pass: the spliced audio and the number of output
/// video frames the copier was asked to fill.
pub struct RetimeOutput {
    pub audio: AudioTrack,
    pub output_frames: usize,
}

/// Retime the stream chunk by chunk.
///
/// Any chunk failure aborts the whole pass; there is no partial-output
/// recovery.
pub fn retime(
    track: &AudioTrack,
    chunks: &[FrameChunk],
    params: &RetimeParams,
    global_peak: f32,
    stretcher: &dyn TimeStretcher,
    copier: &mut dyn FrameCopier,
) -> Result<RetimeOutput> {
    let spf = samples_per_frame(track.sample_rate, params.frame_rate);
    let channels = track.channels as usize;

    let mut output = Vec::new();
    let mut output_ptr = 0usize;
    let mut last_valid: Option<usize> = None;
    let mut output_frames = 0usize;

    for (index, chunk) in chunks.iter().enumerate() {
        let speed = params.speeds.for_loudness(chunk.is_loud);
        let stretched = stitch_chunk(
            track,
            chunk,
            speed,
            spf,
            global_peak,
            params.fade_len,
            stretcher,
        )
        .with_context(|| {
            format!(
                "failed to stitch chunk {} (frames {}..{})",
                index, chunk.start_frame, chunk.end_frame
            )
        })?;

        let end_ptr = output_ptr + stretched.len() / channels.max(1);
        let (start_out, end_out) = output_frame_span(output_ptr, end_ptr, spf);
        copy_chunk_frames(copier, chunk, speed, start_out, end_out, &mut last_valid)
            .with_context(|| format!("failed to remap frames for chunk {}", index))?;

        debug!(
            chunk = index,
            loud = chunk.is_loud,
            speed,
            input_frames = chunk.frame_count(),
            output_frames = end_out - start_out,
            "retimed chunk"
        );

        output.extend_from_slice(&stretched);
        output_ptr = end_ptr;
        output_frames = end_out;
    }

    Ok(RetimeOutput {
        audio: AudioTrack {
            samples: output,
            channels: track.channels,
            sample_rate: track.sample_rate,
        },
        output_frames,
    })
}

/// Retimed length estimate in whole seconds, rounded up.
///
/// An upper bound: chunks whose stretched block is shorter than the fade
/// window still count at full length even though they are emitted as
/// silence.
pub fn estimated_output_seconds(
    chunks: &[FrameChunk],
    speeds: &SpeedTable,
    frame_rate: u32,
) -> u64 {
    let frames: f64 = chunks
        .iter()
        .map(|c| c.frame_count() as f64 / speeds.for_loudness(c.is_loud))
        .sum();
    (frames / frame_rate as f64).ceil() as u64
}

/// `M:SS` rendering of a duration in seconds.
pub fn format_minutes_seconds(total_seconds: u64) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DEFAULT_FADE_LEN, DEFAULT_FRAME_MARGIN};
    use std::collections::BTreeSet;

    /// Nearest-sample resampler: output length is exactly
    /// `floor(frames / speed)`, which makes pointer math predictable.
    struct NearestResampler;

    impl TimeStretcher for NearestResampler {
        fn stretch(
            &self,
            samples: &[f32],
            channels: u16,
            _sample_rate: u32,
            speed: f64,
        ) -> Result<Vec<f32>> {
            let ch = channels as usize;
            let frames = samples.len() / ch;
            let out_frames = (frames as f64 / speed).floor() as usize;
            let mut out = Vec::with_capacity(out_frames * ch);
            for j in 0..out_frames {
                let src = ((j as f64 * speed) as usize).min(frames.saturating_sub(1));
                out.extend_from_slice(&samples[src * ch..(src + 1) * ch]);
            }
            Ok(out)
        }
    }

    struct CountingFrames {
        available: BTreeSet<usize>,
        outputs: Vec<usize>,
    }

    impl CountingFrames {
        fn new(count: usize) -> Self {
            Self {
                available: (0..count).collect(),
                outputs: Vec::new(),
            }
        }
    }

    impl FrameCopier for CountingFrames {
        fn copy(&mut self, input: usize, output: usize) -> Result<bool> {
            if !self.available.contains(&input) {
                return Ok(false);
            }
            self.outputs.push(output);
            Ok(true)
        }
    }

    fn params(frame_rate: u32) -> RetimeParams {
        RetimeParams {
            loud_threshold: 0.03,
            speeds: SpeedTable {
                quiet: 5.0,
                loud: 1.0,
            },
            frame_margin: DEFAULT_FRAME_MARGIN,
            fade_len: DEFAULT_FADE_LEN,
            frame_rate,
        }
    }

    #[test]
    fn pass_concatenates_chunk_audio_contiguously() {
        // 20 frame periods of 100 mono sample frames at 3000 Hz / 30 fps
        let track = AudioTrack {
            samples: vec![0.5; 2000],
            channels: 1,
            sample_rate: 3000,
        };
        let chunks = [
            FrameChunk {
                start_frame: 0,
                end_frame: 10,
                is_loud: true,
            },
            FrameChunk {
                start_frame: 10,
                end_frame: 20,
                is_loud: false,
            },
        ];

        let mut copier = CountingFrames::new(20);
        let mut p = params(30);
        p.fade_len = 10;
        let out = retime(
            &track,
            &chunks,
            &p,
            0.5,
            &NearestResampler,
            &mut copier,
        )
        .unwrap();

        // Loud chunk keeps its 1000 frames, quiet chunk shrinks to 200
        assert_eq!(out.audio.frame_len(), 1200);
        assert_eq!(out.output_frames, 12);
        // Every output slot 0..12 filled exactly once, in order
        assert_eq!(copier.outputs, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn silent_degenerate_input_runs_entirely_at_quiet_speed() {
        let track = AudioTrack {
            samples: vec![0.0; 3000],
            channels: 1,
            sample_rate: 3000,
        };
        // Single quiet chunk, as the segmenter produces for silent input
        let chunks = [FrameChunk {
            start_frame: 0,
            end_frame: 30,
            is_loud: false,
        }];

        let mut copier = CountingFrames::new(30);
        let mut p = params(30);
        p.fade_len = 10;
        let out = retime(
            &track,
            &chunks,
            &p,
            0.0,
            &NearestResampler,
            &mut copier,
        )
        .unwrap();

        assert_eq!(out.audio.frame_len(), 600);
        assert_eq!(out.output_frames, 6);
        assert!(out.audio.samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn missing_every_frame_aborts_the_pass() {
        let track = AudioTrack {
            samples: vec![0.5; 1000],
            channels: 1,
            sample_rate: 1000,
        };
        let chunks = [FrameChunk {
            start_frame: 0,
            end_frame: 10,
            is_loud: true,
        }];

        let mut copier = CountingFrames::new(0);
        let result = retime(
            &track,
            &chunks,
            &params(10),
            0.5,
            &NearestResampler,
            &mut copier,
        );
        assert!(result.is_err());
    }

    #[test]
    fn estimate_divides_each_chunk_by_its_speed() {
        let chunks = [
            FrameChunk {
                start_frame: 0,
                end_frame: 91,
                is_loud: true,
            },
            FrameChunk {
                start_frame: 91,
                end_frame: 300,
                is_loud: false,
            },
        ];
        let speeds = SpeedTable {
            quiet: 5.0,
            loud: 1.0,
        };
        // 91 + 209/5 = 132.8 frames -> ceil(132.8 / 30) = 5 seconds
        assert_eq!(estimated_output_seconds(&chunks, &speeds, 30), 5);
    }

    #[test]
    fn minutes_seconds_formatting_pads_seconds() {
        assert_eq!(format_minutes_seconds(0), "0:00");
        assert_eq!(format_minutes_seconds(65), "1:05");
        assert_eq!(format_minutes_seconds(600), "10:00");
    }
}
