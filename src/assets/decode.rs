use std::path::Path;

use anyhow::Context;
use image::imageops::FilterType;

use crate::{
    foundation::core::Canvas,
    foundation::error::{MorphError, MorphResult},
    render::frame::RasterImage,
};

/// Decode encoded image bytes (PNG, JPEG, ...) and convert to RGB8, dropping alpha.
pub fn decode_image(bytes: &[u8]) -> MorphResult<RasterImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(RasterImage::from_rgb_image(dyn_img.to_rgb8()))
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> MorphResult<RasterImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes).map_err(|e| match e {
        MorphError::Other(err) => {
            MorphError::Other(err.context(format!("decode image '{}'", path.display())))
        }
        other => other,
    })
}

/// Resample to `canvas` with a bicubic (Catmull-Rom) filter. Same-size input is returned as is.
pub fn resize_image(img: &RasterImage, canvas: Canvas) -> MorphResult<RasterImage> {
    canvas.validate()?;
    if img.is_empty() {
        return Err(MorphError::validation("cannot resize an empty image"));
    }
    if img.canvas() == canvas {
        return Ok(img.clone());
    }
    let rgb = img.to_rgb_image()?;
    let resized = image::imageops::resize(&rgb, canvas.width, canvas.height, FilterType::CatmullRom);
    Ok(RasterImage::from_rgb_image(resized))
}

/// Bring a source/target pair onto one canvas so that pixel coordinates correspond.
pub fn normalize_pair(
    source: &RasterImage,
    target: &RasterImage,
    canvas: Canvas,
) -> MorphResult<(RasterImage, RasterImage)> {
    Ok((resize_image(source, canvas)?, resize_image(target, canvas)?))
}

/// Write `img` as a PNG, creating the parent directory if needed.
pub fn save_png(img: &RasterImage, path: &Path) -> MorphResult<()> {
    crate::encode::ensure_parent_dir(path)?;
    image::save_buffer_with_format(
        path,
        &img.data,
        img.width,
        img.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
