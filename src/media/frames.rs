//! On-disk frame image store
//!
//! The extractor dumps source frames as `frame%09d.jpg` (1-based, ffmpeg's
//! image2 numbering) into the working directory; retimed frames are written
//! next to them as `new_frame%09d.jpg` so the muxer can pick up the output
//! sequence by pattern.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::retime::FrameCopier;

pub const SOURCE_PATTERN: &str = "frame%09d.jpg";
pub const OUTPUT_PATTERN: &str = "new_frame%09d.jpg";

pub struct FrameStore {
    dir: PathBuf,
}

impl FrameStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// ffmpeg image2 pattern for the extracted source frames.
    pub fn source_pattern(&self) -> PathBuf {
        self.dir.join(SOURCE_PATTERN)
    }

    /// ffmpeg image2 pattern for the retimed output frames.
    pub fn output_pattern(&self) -> PathBuf {
        self.dir.join(OUTPUT_PATTERN)
    }

    fn source_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("frame{:09}.jpg", index + 1))
    }

    fn output_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("new_frame{:09}.jpg", index + 1))
    }
}

impl FrameCopier for FrameStore {
    fn copy(&mut self, input: usize, output: usize) -> Result<bool> {
        let src = self.source_path(input);
        if !src.is_file() {
            return Ok(false);
        }
        let dst = self.output_path(output);
        std::fs::copy(&src, &dst)
            .with_context(|| format!("failed to copy {} to {}", src.display(), dst.display()))?;
        Ok(true)
    }
}

/// Derive the default output path: `clip.mp4` becomes `clip_ALTERED.mp4`.
pub fn altered_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let altered = match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_ALTERED.{}", stem, ext),
        None => format!("{}_ALTERED", stem),
    };
    input.with_file_name(altered)
}
