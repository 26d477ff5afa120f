use super::*;

const SQUARE: SizeTarget = SizeTarget::Exact {
    width: 60,
    height: 60,
};

#[test]
fn placeholder_has_border_ring_and_blue_fill() {
    let layer = placeholder_image(60, 60).unwrap();
    assert_eq!((layer.width(), layer.height()), (60, 60));
    assert_eq!(layer.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(layer.pixel(59, 30), Some([255, 255, 255, 255]));
    assert_eq!(layer.pixel(10, 10), Some([29, 161, 242, 255]));
    // Ring radius is 15 around (30, 30); its stroke sits just inside that.
    assert_eq!(layer.pixel(30, 16), Some([255, 255, 255, 255]));
    assert_eq!(layer.pixel(30, 30), Some([29, 161, 242, 255]));
}

#[test]
fn missing_path_falls_back_to_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let src = SubjectSource::from_arg(&dir.path().join("someone").display().to_string());
    let layer = src.resolve(&SQUARE).unwrap();
    assert_eq!(layer, placeholder_image(60, 60).unwrap());
}

#[test]
fn existing_but_corrupt_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("face.png");
    std::fs::write(&path, b"not a png").unwrap();
    let err = SubjectSource::Path(path).resolve(&SQUARE).unwrap_err();
    assert!(matches!(
        err,
        crate::foundation::error::SawcutError::AssetLoad { .. }
    ));
}

#[test]
fn image_source_is_resized_to_target() {
    let layer = Layer::solid(10, 20, Rgba8Premul::opaque(1, 2, 3)).unwrap();
    let out = SubjectSource::Image(layer).resolve(&SQUARE).unwrap();
    assert_eq!((out.width(), out.height()), (60, 60));
}

#[test]
fn placeholder_source_uses_square_for_fit_targets() {
    let src = SubjectSource::Placeholder {
        label: "@nobody".to_string(),
    };
    let out = src.resolve(&SizeTarget::Width { px: 32 }).unwrap();
    assert_eq!((out.width(), out.height()), (32, 32));
}
