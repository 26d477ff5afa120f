use super::*;

fn write_png(dir: &Path, name: &str, w: u32, h: u32, px: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    img.save_with_format(&path, image::ImageFormat::Png).unwrap();
    path
}

#[test]
fn size_targets_preserve_aspect_or_stretch() {
    assert_eq!(SizeTarget::Width { px: 50 }.resolve(100, 40).unwrap(), (50, 20));
    assert_eq!(SizeTarget::Height { px: 360 }.resolve(400, 400).unwrap(), (360, 360));
    assert_eq!(SizeTarget::Height { px: 10 }.resolve(1, 1000).unwrap(), (1, 10));
    assert_eq!(
        SizeTarget::Exact {
            width: 500,
            height: 500
        }
        .resolve(3, 7)
        .unwrap(),
        (500, 500)
    );
    assert!(SizeTarget::Width { px: 0 }.validate().is_err());
}

#[test]
fn size_target_json_is_tagged_by_fit() {
    let t: SizeTarget = serde_json::from_str(r#"{ "fit": "width", "px": 1024 }"#).unwrap();
    assert_eq!(t, SizeTarget::Width { px: 1024 });
    let t: SizeTarget =
        serde_json::from_str(r#"{ "fit": "exact", "width": 2, "height": 3 }"#).unwrap();
    assert_eq!(
        t,
        SizeTarget::Exact {
            width: 2,
            height: 3
        }
    );
}

#[test]
fn load_layer_resizes_to_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "bg.png", 100, 40, [0, 128, 0, 255]);
    let layer = load_layer(&path, &SizeTarget::Width { px: 50 }).unwrap();
    assert_eq!((layer.width(), layer.height()), (50, 20));
    assert_eq!(layer.pixel(25, 10), Some([0, 128, 0, 255]));
}

#[test]
fn missing_file_is_an_asset_load_error_naming_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.png");
    let err = load_layer(&path, &SizeTarget::Width { px: 10 }).unwrap_err();
    match err {
        SawcutError::AssetLoad { source_id, .. } => {
            assert_eq!(source_id, path.display().to_string())
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn glow_lifts_transparent_pixels_to_faint_white() {
    let layer = Layer::solid(2, 2, Rgba8Premul::transparent()).unwrap();
    let glowing = apply_glow(&layer, 10).unwrap();
    assert_eq!(glowing.pixel(1, 1), Some([10, 10, 10, 10]));

    let untouched = apply_glow(&layer, 0).unwrap();
    assert_eq!(untouched, layer);
}

#[test]
fn load_asset_applies_glow_after_resizing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "tool.png", 8, 4, [0, 0, 0, 255]);
    let spec = AssetSpec {
        source: path,
        size: SizeTarget::Width { px: 4 },
        glow_alpha: 40,
    };
    let layer = load_asset(&spec).unwrap();
    assert_eq!((layer.width(), layer.height()), (4, 2));
    assert_eq!(layer.pixel(0, 0), Some([40, 40, 40, 255]));
}

#[test]
fn resize_layer_round_trips_opaque_colors() {
    let layer = Layer::solid(10, 10, Rgba8Premul::opaque(30, 60, 90)).unwrap();
    let small = resize_layer(&layer, &SizeTarget::Exact { width: 5, height: 4 }).unwrap();
    assert_eq!((small.width(), small.height()), (5, 4));
    assert_eq!(small.pixel(2, 2), Some([30, 60, 90, 255]));
}
