use super::*;

#[test]
fn straight_copy_unpremultiplies_only_when_flagged() {
    let mut frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![64, 32, 0, 128],
        premultiplied: true,
    };
    assert_eq!(frame.to_straight_rgba8(), vec![128, 64, 0, 128]);
    frame.premultiplied = false;
    assert_eq!(frame.to_straight_rgba8(), vec![64, 32, 0, 128]);
}

#[test]
fn save_png_writes_straight_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("f.png");
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![255, 0, 0, 255, 64, 32, 0, 128],
        premultiplied: true,
    };
    frame.save_png(&path).unwrap();

    let img = image::open(&path).unwrap().into_rgba8();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(1, 0).0, [128, 64, 0, 128]);
}
