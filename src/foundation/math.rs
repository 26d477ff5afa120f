/// Products closer than this to an integer are treated as that integer.
const SNAP_EPS: f64 = 1e-9;

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// `floor(v)`, snapping to the nearest integer first when `v` is within float noise of it.
pub(crate) fn snapped_floor(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP_EPS { r } else { v.floor() }
}

/// `ceil(v)`, snapping to the nearest integer first when `v` is within float noise of it.
pub(crate) fn snapped_ceil(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP_EPS { r } else { v.ceil() }
}

/// Derive an independent RNG seed for `frame` from a run-wide base seed (SplitMix64 finalizer).
pub fn frame_seed(base: u64, frame: u64) -> u64 {
    let mut z = base ^ frame.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
