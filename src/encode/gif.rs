use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::PathBuf;

use anyhow::Context as _;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};

use crate::encode::ensure_parent_dir;
use crate::encode::sink::{FrameOrder, FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MorphError, MorphResult};
use crate::render::frame::RasterImage;

/// Writes a looping animated GIF with one fixed delay per frame (from `SinkConfig::fps`).
///
/// Frames are quantized and written when the sink ends, so nothing is created on disk for a
/// sink that never reaches `end`.
#[derive(Debug)]
pub struct GifSink {
    out_path: PathBuf,
    /// 1 is best quality, 30 fastest.
    speed: i32,
    cfg: Option<SinkConfig>,
    order: FrameOrder,
    frames: Vec<image::RgbaImage>,
}

impl GifSink {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            speed: 10,
            cfg: None,
            order: FrameOrder::default(),
            frames: Vec::new(),
        }
    }

    /// Quantization speed, clamped to `1..=30`.
    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = speed.clamp(1, 30);
        self
    }

    fn delay(cfg: &SinkConfig) -> Delay {
        let (num, den) = cfg.fps.frame_delay_ms();
        Delay::from_numer_denom_ms(num, den)
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> MorphResult<()> {
        cfg.validate()?;
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(MorphError::validation(format!(
                "gif dimensions are limited to 65535, got {}x{}",
                cfg.width, cfg.height
            )));
        }
        self.cfg = Some(cfg);
        self.order.reset();
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RasterImage) -> MorphResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| MorphError::encode("gif sink not started"))?;
        cfg.check_frame(frame)?;
        self.order.advance(idx, "gif")?;
        self.frames.push(frame.to_rgba_image()?);
        Ok(())
    }

    fn end(&mut self) -> MorphResult<()> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| MorphError::encode("gif sink not started"))?;
        ensure_parent_dir(&self.out_path)?;

        let file = File::create(&self.out_path)
            .with_context(|| format!("create gif '{}'", self.out_path.display()))?;
        let mut writer = BufWriter::new(file);
        let delay = Self::delay(&cfg);
        let frames = self
            .frames
            .drain(..)
            .map(|buf| Frame::from_parts(buf, 0, 0, delay));
        {
            let mut encoder = GifEncoder::new_with_speed(&mut writer, self.speed);
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| MorphError::encode(format!("gif repeat setup failed: {e}")))?;
            encoder
                .encode_frames(frames)
                .map_err(|e| MorphError::encode(format!("gif encoding failed: {e}")))?;
        }
        writer
            .flush()
            .with_context(|| format!("flush gif '{}'", self.out_path.display()))?;

        tracing::debug!(
            path = %self.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            "gif written"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
