use std::path::{Path, PathBuf};

use crate::assets::decode::save_png;
use crate::encode::sink::{FrameOrder, FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MorphError, MorphResult};
use crate::render::frame::RasterImage;

/// Writes each frame to `<dir>/frame_<idx>.png` (index zero-padded to three digits).
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    order: FrameOrder,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            order: FrameOrder::default(),
            written: Vec::new(),
        }
    }

    pub fn frame_path(dir: &Path, idx: FrameIndex) -> PathBuf {
        dir.join(format!("frame_{:03}.png", idx.0))
    }

    /// Files written so far, in frame order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> MorphResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.order.reset();
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RasterImage) -> MorphResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| MorphError::encode("png sink not started"))?;
        cfg.check_frame(frame)?;
        self.order.advance(idx, "png")?;

        let path = Self::frame_path(&self.dir, idx);
        save_png(frame, &path)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> MorphResult<()> {
        self.cfg
            .take()
            .ok_or_else(|| MorphError::encode("png sink not started"))?;
        tracing::debug!(dir = %self.dir.display(), files = self.written.len(), "png sequence written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
