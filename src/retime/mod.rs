pub mod pipeline;
pub mod remap;
pub mod stitcher;

pub use pipeline::{retime, RetimeOutput};
pub use remap::FrameCopier;
