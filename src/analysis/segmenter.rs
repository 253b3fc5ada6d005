//! Run-length segmentation of the loudness timeline into alternating chunks
//!
//! Raw per-frame flags flicker: one-frame transients and short gaps inside
//! speech would otherwise produce chunks too small to retime audibly. The
//! segmenter first dilates loud regions by a margin window, then collapses
//! the smoothed timeline into a contiguous, gap-free list of alternating
//! loud/quiet chunks.

use crate::types::FrameChunk;

/// Dilate raw loudness flags with a margin window.
///
/// `smoothed[i]` is the OR of the raw flags over
/// `[max(0, i - margin), min(len, i + margin + 1))`, evaluated from index 1
/// onward. Index 0 is pinned quiet and never evaluated; a loud frame at
/// index 0 is therefore only captured when the margin lets index 1's window
/// reach it. Downstream consumers depend on this boundary behavior, so it is
/// kept as-is rather than smoothed over.
pub fn smooth_flags(flags: &[bool], margin: usize) -> Vec<bool> {
    let len = flags.len();
    let mut smoothed = vec![false; len];
    for i in 1..len {
        let lo = i.saturating_sub(margin);
        let hi = (i + margin + 1).min(len);
        smoothed[i] = flags[lo..hi].iter().any(|&f| f);
    }
    smoothed
}

/// Collapse raw flags into an ordered, contiguous chunk list.
///
/// A chunk boundary is placed wherever consecutive evaluated smoothed flags
/// differ; the chunk closed at boundary `b` carries the flag left of the
/// boundary, the first chunk always starts at frame 0, and the final chunk
/// closes at `len` with the last smoothed flag. The pinned index-0 flag
/// takes no part in the walk, so a timeline whose smoothed flags never
/// change yields exactly one chunk spanning everything.
///
/// The result partitions `[0, len)` with strictly alternating loudness and
/// no zero-length chunks.
pub fn segment_chunks(flags: &[bool], margin: usize) -> Vec<FrameChunk> {
    let len = flags.len();
    if len == 0 {
        return Vec::new();
    }

    let smoothed = smooth_flags(flags, margin);
    let mut chunks = Vec::new();
    let mut open_start = 0usize;

    for i in 2..len {
        if smoothed[i] != smoothed[i - 1] {
            chunks.push(FrameChunk {
                start_frame: open_start,
                end_frame: i,
                is_loud: smoothed[i - 1],
            });
            open_start = i;
        }
    }

    chunks.push(FrameChunk {
        start_frame: open_start,
        end_frame: len,
        is_loud: smoothed[len - 1],
    });
    chunks
}
