//! Sequence writers.
//!
//! Sinks consume a finished [`FrameSequence`](crate::FrameSequence) in frame order.

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::MorphResult;

/// MP4 output through the system `ffmpeg` binary.
pub(crate) mod ffmpeg;
/// Looping animated GIF output.
pub(crate) mod gif;
/// One PNG file per frame.
pub(crate) mod png;
/// Sink trait, in-memory sink and the sequence driver.
pub(crate) mod sink;

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> MorphResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
