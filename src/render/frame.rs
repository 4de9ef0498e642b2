use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{MorphError, MorphResult};
use crate::foundation::math::Fnv1a64;

/// An RGB8 raster: `width * height * 3` bytes, row-major, tightly packed.
///
/// This is both the input type (source/target images) and the output type (every frame of a
/// [`FrameSequence`](crate::FrameSequence)).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RasterImage {
    /// Bytes per pixel.
    pub const CHANNELS: usize = 3;

    /// Wrap an existing RGB8 buffer, checking that its length matches the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> MorphResult<Self> {
        let expected = (width as usize) * (height as usize) * Self::CHANNELS;
        if data.len() != expected {
            return Err(MorphError::validation(format!(
                "raster data length {} does not match {width}x{height} rgb8 ({expected} bytes)",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A raster filled with a single color.
    pub fn filled(width: u32, height: u32, color: Rgb8) -> Self {
        let px = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(px * Self::CHANNELS);
        for _ in 0..px {
            data.extend_from_slice(&color.to_array());
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Non-empty, with a buffer of exactly `width * height * 3` bytes.
    pub fn is_well_formed(&self) -> bool {
        !self.is_empty()
            && self.data.len() == (self.width as usize) * (self.height as usize) * Self::CHANNELS
    }

    pub fn row_stride(&self) -> usize {
        self.width as usize * Self::CHANNELS
    }

    /// Read one pixel. Callers clamp coordinates first; out-of-bounds reads panic like slice
    /// indexing does.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb8 {
        let i = self.offset(x, y);
        Rgb8::new(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgb8) {
        let i = self.offset(x, y);
        self.data[i..i + Self::CHANNELS].copy_from_slice(&color.to_array());
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.row_stride() + x as usize * Self::CHANNELS
    }

    /// Stable 64-bit FNV-1a digest over dimensions and pixel bytes.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        self.hash_into(&mut h);
        h.finish()
    }

    pub(crate) fn hash_into(&self, h: &mut Fnv1a64) {
        h.write_u32(self.width);
        h.write_u32(self.height);
        h.write_bytes(&self.data);
    }

    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }

    pub fn to_rgb_image(&self) -> MorphResult<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            MorphError::validation("raster buffer is too small for its dimensions")
        })
    }

    /// Expand to opaque RGBA8 (alpha 255), as needed by animated-GIF frames.
    pub fn to_rgba_image(&self) -> MorphResult<image::RgbaImage> {
        let mut rgba = Vec::with_capacity(self.data.len() / Self::CHANNELS * 4);
        for px in self.data.chunks_exact(Self::CHANNELS) {
            rgba.extend_from_slice(px);
            rgba.push(255);
        }
        image::RgbaImage::from_raw(self.width, self.height, rgba).ok_or_else(|| {
            MorphError::validation("raster buffer is too small for its dimensions")
        })
    }
}

impl From<image::RgbImage> for RasterImage {
    fn from(img: image::RgbImage) -> Self {
        Self::from_rgb_image(img)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
