use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SawcutError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SawcutError::geometry("x")
            .to_string()
            .contains("geometry error:")
    );
    assert!(
        SawcutError::video_encode("x")
            .to_string()
            .contains("video encode error:")
    );
    let load = SawcutError::asset_load("bg.png", "no such file");
    assert!(load.to_string().contains("bg.png"));
}

#[test]
fn at_frame_wraps_once() {
    let err = SawcutError::geometry("bad angle").at_frame(87);
    match &err {
        SawcutError::Composition { frame, message } => {
            assert_eq!(*frame, 87);
            assert!(message.contains("bad angle"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let again = err.at_frame(3);
    assert!(matches!(again, SawcutError::Composition { frame: 87, .. }));

    let cancelled = SawcutError::Cancelled { frame: 4 }.at_frame(9);
    assert!(matches!(cancelled, SawcutError::Cancelled { frame: 4 }));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SawcutError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
