use super::*;

#[test]
fn zero_sigma_is_identity() {
    assert_eq!(GaussianKernel::new(0.0).unwrap(), None);
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(blur_rgba8_premul(&src, 1, 2, 0.0).unwrap(), src);
}

#[test]
fn kernel_is_symmetric_and_sums_to_one() {
    let kernel = GaussianKernel::new(1.2).unwrap().unwrap();
    assert_eq!(kernel.radius(), 4);
    let taps = kernel.taps();
    assert_eq!(taps.iter().sum::<u32>(), 1 << 16);
    for i in 0..taps.len() / 2 {
        assert_eq!(taps[i], taps[taps.len() - 1 - i]);
    }
    assert!(taps.windows(2).take(4).all(|p| p[0] <= p[1]));
}

#[test]
fn bad_sigma_is_a_geometry_error() {
    for sigma in [-0.5, f32::NAN, f32::INFINITY] {
        assert!(matches!(
            blur_rgba8_premul(&[0u8; 4], 1, 1, sigma),
            Err(SawcutError::Geometry(_))
        ));
    }
}

#[test]
fn constant_image_is_unchanged() {
    let (w, h) = (4u32, 3u32);
    let src = [10u8, 20, 30, 40].repeat((w * h) as usize);
    assert_eq!(blur_rgba8_premul(&src, w, h, 1.0).unwrap(), src);
}

#[test]
fn single_pixel_spreads_and_keeps_its_energy() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blur_rgba8_premul(&src, w, h, 0.6).unwrap();

    let lit = out.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(lit > 1);
    let sum_a: i32 = out.chunks_exact(4).map(|px| i32::from(px[3])).sum();
    assert!((sum_a - 255).abs() <= 4, "{sum_a}");
    let at = |x: u32, y: u32| out[((y * w + x) * 4 + 3) as usize];
    assert_eq!(at(1, 2), at(3, 2));
    assert_eq!(at(2, 1), at(2, 3));
    assert!(at(2, 2) > at(1, 2));
}

#[test]
fn droplet_sigma_barely_moves_a_hard_edge() {
    let (w, h) = (4u32, 1u32);
    let mut src = Vec::new();
    for x in 0..w {
        let v = if x < 2 { 0 } else { 255 };
        src.extend_from_slice(&[v, v, v, 255]);
    }
    let out = blur_rgba8_premul(&src, w, h, 0.3).unwrap();
    assert!(out[4] <= 2, "dark side bled too much: {}", out[4]);
    assert!(out[8] >= 253, "bright side dimmed too much: {}", out[8]);
}

#[test]
fn mismatched_buffers_are_rejected() {
    assert!(blur_rgba8_premul(&[0u8; 4], 2, 2, 0.5).is_err());
}
