use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{MorphError, MorphResult};
use crate::render::frame::RasterImage;
use crate::render::pipeline::FrameSequence;

/// Configuration handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    /// Playback rate.
    pub fps: Fps,
}

impl SinkConfig {
    pub fn validate(&self) -> MorphResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MorphError::validation("sink width/height must be non-zero"));
        }
        self.fps.validate()
    }

    pub(crate) fn check_frame(&self, frame: &RasterImage) -> MorphResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(MorphError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Consumer of rendered frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order, between
/// one `begin` and one `end`.
pub trait FrameSink: Send {
    fn begin(&mut self, cfg: SinkConfig) -> MorphResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &RasterImage) -> MorphResult<()>;
    fn end(&mut self) -> MorphResult<()>;
}

/// Rejects frame indices that do not strictly increase.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FrameOrder {
    last: Option<FrameIndex>,
}

impl FrameOrder {
    pub(crate) fn reset(&mut self) {
        self.last = None;
    }

    pub(crate) fn advance(&mut self, idx: FrameIndex, sink: &str) -> MorphResult<()> {
        if let Some(last) = self.last
            && idx.0 <= last.0
        {
            return Err(MorphError::encode(format!(
                "{sink} sink received out-of-order frame index {} after {}",
                idx.0, last.0
            )));
        }
        self.last = Some(idx);
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    order: FrameOrder,
    frames: Vec<(FrameIndex, RasterImage)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    pub fn frames(&self) -> &[(FrameIndex, RasterImage)] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> MorphResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.order.reset();
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RasterImage) -> MorphResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| MorphError::encode("in-memory sink not started"))?;
        cfg.check_frame(frame)?;
        self.order.advance(idx, "in-memory")?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> MorphResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Push every frame of `seq` into `sink` with indices `0..seq.len()`.
#[tracing::instrument(skip(seq, sink), fields(frames = seq.len()))]
pub fn write_sequence(seq: &FrameSequence, sink: &mut dyn FrameSink, fps: Fps) -> MorphResult<()> {
    let first = seq
        .frames()
        .first()
        .ok_or_else(|| MorphError::validation("cannot write an empty frame sequence"))?;
    sink.begin(SinkConfig {
        width: first.width,
        height: first.height,
        fps,
    })?;
    for (i, frame) in seq.frames().iter().enumerate() {
        sink.push_frame(FrameIndex(i as u64), frame)?;
    }
    sink.end()?;
    tracing::debug!("sequence written");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
