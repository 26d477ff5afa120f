use std::io::Cursor;

use super::*;

fn png_bytes(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_layer_png_dimensions_and_premul() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50u8, 200u8, 128u8]).unwrap();
    let layer = decode_layer(&png_bytes(img), "mem").unwrap();
    assert_eq!(layer.width(), 1);
    assert_eq!(layer.height(), 1);
    assert_eq!(
        layer.data(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_garbage_is_an_asset_load_error_naming_the_source() {
    let err = decode_layer(b"definitely not an image", "tool.png").unwrap_err();
    match err {
        SawcutError::AssetLoad { source_id, .. } => assert_eq!(source_id, "tool.png"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unpremultiply_inverts_premultiply_for_opaque_and_clear_pixels() {
    let mut px = vec![10u8, 20, 30, 255, 90, 90, 90, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![10, 20, 30, 255, 0, 0, 0, 0]);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![10, 20, 30, 255, 0, 0, 0, 0]);

    let mut half = vec![200u8, 100, 0, 128];
    premultiply_rgba8_in_place(&mut half);
    unpremultiply_rgba8_in_place(&mut half);
    assert!((i32::from(half[0]) - 200).abs() <= 2);
    assert!((i32::from(half[1]) - 100).abs() <= 2);
}
