//! Tests for PNG encoding functionality.
//!
//! Encoded images are decoded again with the `image` crate to check that the
//! indexed and RGBA paths both produce valid files with the original pixels.

use renderer::png::{encode_auto, encode_rgba, SIGNATURE};

/// Color type byte from the IHDR chunk.
fn color_type(png: &[u8]) -> u8 {
    // signature(8) + length(4) + "IHDR"(4) + width(4) + height(4) + depth(1)
    png[25]
}

fn banded_pixels(width: usize, height: usize, bands: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let band = (x * bands / width + y) % bands;
            pixels.extend_from_slice(&[(band * 13) as u8, 200, (255 - band * 7) as u8, 255]);
        }
    }
    pixels
}

#[test]
fn test_signature_and_ihdr() {
    let pixels = banded_pixels(40, 30, 5);
    let png = encode_auto(&pixels, 40, 30).unwrap();

    assert_eq!(&png[0..8], &SIGNATURE);
    assert_eq!(&png[12..16], b"IHDR");
    assert_eq!(u32::from_be_bytes([png[16], png[17], png[18], png[19]]), 40);
    assert_eq!(u32::from_be_bytes([png[20], png[21], png[22], png[23]]), 30);
    assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
}

#[test]
fn test_few_colors_use_palette() {
    let pixels = banded_pixels(64, 64, 15);
    let png = encode_auto(&pixels, 64, 64).unwrap();
    assert_eq!(color_type(&png), 3);
}

#[test]
fn test_many_colors_fall_back_to_rgba() {
    let mut pixels = Vec::with_capacity(300 * 4);
    for i in 0..300usize {
        pixels.extend_from_slice(&[(i % 256) as u8, (i / 256) as u8, 7, 255]);
    }
    let png = encode_auto(&pixels, 300, 1).unwrap();
    assert_eq!(color_type(&png), 6);
}

#[test]
fn test_indexed_png_decodes_to_same_pixels() {
    let pixels = banded_pixels(100, 80, 12);
    let png = encode_auto(&pixels, 100, 80).unwrap();

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (100, 80));
    assert_eq!(decoded.as_raw(), &pixels);
}

#[test]
fn test_rgba_png_decodes_to_same_pixels() {
    let pixels = banded_pixels(20, 10, 4);
    let png = encode_rgba(&pixels, 20, 10).unwrap();

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.as_raw(), &pixels);
}

#[test]
fn test_transparency_survives_palette() {
    let pixels = [
        255, 0, 0, 255, //
        0, 0, 0, 0, //
        0, 255, 0, 128, //
        0, 0, 255, 255,
    ];
    let png = encode_auto(&pixels, 2, 2).unwrap();

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(1, 0).0[3], 0);
    assert_eq!(decoded.get_pixel(0, 1).0[3], 128);
}
