//! Video-frame index remapping under per-chunk playback speed
//!
//! For every output frame the remapper names the source frame to show. The
//! mapping is pure; the freeze-frame fallback for missing source frames
//! lives in the copy fold so its "last valid frame" state can span the
//! whole pass, not one chunk.

use anyhow::{bail, Result};

use crate::types::FrameChunk;

/// Destination for remapped frames.
///
/// `copy` places the source frame `input` into output slot `output` and
/// reports `false` when the source frame does not exist. Indices are
/// zero-based; implementations map them onto their own storage layout.
pub trait FrameCopier {
    fn copy(&mut self, input: usize, output: usize) -> Result<bool>;
}

/// Source frame index for each output frame of one chunk.
///
/// Output frame `f` in `[start_out, end_out)` maps to
/// `floor(start_frame + speed * (f - start_out))`. Non-decreasing in `f`
/// for any `speed >= 0`.
pub fn remap_chunk(
    chunk: &FrameChunk,
    speed: f64,
    start_out: usize,
    end_out: usize,
) -> impl Iterator<Item = usize> + '_ {
    let base = chunk.start_frame as f64;
    (start_out..end_out).map(move |f| (base + speed * (f - start_out) as f64) as usize)
}

/// Output-frame interval covered by a stitched sample-pointer range.
///
/// Both ends round up; the resulting half-open intervals tile the output
/// timeline exactly because each chunk starts where the previous pointer
/// ended.
pub fn output_frame_span(start_ptr: usize, end_ptr: usize, spf: f64) -> (usize, usize) {
    let start = (start_ptr as f64 / spf).ceil() as usize;
    let end = (end_ptr as f64 / spf).ceil() as usize;
    (start, end)
}

/// Copy one chunk's remapped frames, threading the freeze-frame state.
///
/// A missing source frame falls back to the most recently copied frame.
/// `last_valid` persists across chunks; when no frame was ever copied the
/// input is unusable and the pass fails.
pub fn copy_chunk_frames(
    copier: &mut dyn FrameCopier,
    chunk: &FrameChunk,
    speed: f64,
    start_out: usize,
    end_out: usize,
    last_valid: &mut Option<usize>,
) -> Result<()> {
    for (output, input) in (start_out..end_out).zip(remap_chunk(chunk, speed, start_out, end_out)) {
        if copier.copy(input, output)? {
            *last_valid = Some(input);
        } else {
            match *last_valid {
                Some(fallback) => {
                    copier.copy(fallback, output)?;
                }
                None => bail!(
                    "source frame {} is missing and no earlier frame exists to freeze on \
                     (empty or corrupt frame set)",
                    input + 1
                ),
            }
        }
    }
    Ok(())
}
