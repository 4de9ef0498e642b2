use std::io::Cursor;

use super::*;
use crate::foundation::core::Rgb8;

fn encode_png(img: image::DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_drops_alpha() {
    let rgba = image::RgbaImage::from_raw(1, 1, vec![100u8, 50, 200, 128]).unwrap();
    let decoded = decode_image(&encode_png(image::DynamicImage::ImageRgba8(rgba))).unwrap();
    assert_eq!(decoded.width, 1);
    assert_eq!(decoded.height, 1);
    assert_eq!(decoded.data, vec![100u8, 50, 200]);
}

#[test]
fn decode_garbage_is_an_error() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn resize_to_canvas_and_identity() {
    let img = RasterImage::filled(8, 4, Rgb8::new(10, 20, 30));
    let same = resize_image(&img, img.canvas()).unwrap();
    assert_eq!(same, img);

    let resized = resize_image(&img, Canvas::new(4, 6).unwrap()).unwrap();
    assert_eq!((resized.width, resized.height), (4, 6));
    // A flat image stays flat under any interpolating filter.
    assert_eq!(resized.pixel(2, 3), Rgb8::new(10, 20, 30));
}

#[test]
fn normalize_pair_shares_canvas() {
    let a = RasterImage::filled(10, 10, Rgb8::BLACK);
    let b = RasterImage::filled(6, 12, Rgb8::WHITE);
    let (a2, b2) = normalize_pair(&a, &b, Canvas::new(8, 8).unwrap()).unwrap();
    assert_eq!(a2.canvas(), b2.canvas());
    assert!(resize_image(&a, Canvas { width: 0, height: 3 }).is_err());
}

#[test]
fn load_missing_file_names_path() {
    let err = load_image(Path::new("definitely/missing.png")).unwrap_err();
    assert!(err.to_string().contains("missing.png"));
}
