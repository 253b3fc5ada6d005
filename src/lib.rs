//! jumpcut - loudness-driven video retiming
//!
//! Classifies every video-frame period of a recording as loud or quiet,
//! collapses the timeline into alternating chunks, then replays each chunk
//! at its own speed: audible content stays intact while silence flies by.
//! Audio is time-stretched per chunk and crossfaded at splice points; video
//! frames are index-remapped to stay in sync, freezing on the last good
//! frame when a source frame is missing.

pub mod analysis;
pub mod media;
pub mod retime;
pub mod stretch;
pub mod types;
