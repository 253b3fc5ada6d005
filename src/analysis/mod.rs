pub mod loudness;
pub mod segmenter;

pub use loudness::{frame_flags, peak_magnitude};
pub use segmenter::segment_chunks;
