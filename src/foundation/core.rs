use crate::foundation::error::{MorphError, MorphResult};

pub use kurbo::Point;

/// Position of a frame within an output sequence (0 is the source bookend).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Playback rate used by sequence writers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> MorphResult<Self> {
        let fps = Self { num, den };
        fps.validate()?;
        Ok(fps)
    }

    pub fn validate(self) -> MorphResult<()> {
        if self.den == 0 {
            return Err(MorphError::validation("Fps den must be > 0"));
        }
        if self.num == 0 {
            return Err(MorphError::validation("Fps num must be > 0"));
        }
        Ok(())
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Frame duration as a `(numerator, denominator)` pair of milliseconds.
    pub fn frame_delay_ms(self) -> (u32, u32) {
        (self.den.saturating_mul(1000), self.num)
    }
}

impl Default for Fps {
    // 200 ms per frame.
    fn default() -> Self {
        Self { num: 5, den: 1 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> MorphResult<Self> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    pub fn validate(self) -> MorphResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MorphError::validation(format!(
                "canvas must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Corner anchors in insertion order: (0,0), (0,H), (W,0), (W,H).
    pub fn corners(self) -> [Point; 4] {
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        [
            Point::new(0.0, 0.0),
            Point::new(0.0, h),
            Point::new(w, 0.0),
            Point::new(w, h),
        ]
    }
}

/// One 3-channel color sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub const fn from_array(rgb: [u8; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
