use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn uniform_glow_lightens_opaque_black_but_keeps_it_opaque() {
    let mut buf = [0u8, 0, 0, 255].repeat(3);
    over_uniform_in_place(&mut buf, [10, 10, 10, 10]).unwrap();
    for px in buf.chunks_exact(4) {
        assert_eq!(px, &[10, 10, 10, 255]);
    }
}

#[test]
fn uniform_over_rejects_ragged_buffers() {
    let mut buf = vec![0u8; 5];
    assert!(over_uniform_in_place(&mut buf, [1, 1, 1, 1]).is_err());
}
