//! Pure geometric transforms over [`Layer`]s.
//!
//! None of these mutate their input; each returns a fresh layer so a frame never inherits a
//! rotation or crop from an earlier frame.

use kurbo::{Affine, Point, Vec2};

use crate::foundation::error::{SawcutError, SawcutResult};
use crate::render::layer::{Layer, buffer_len};

/// Slack subtracted before rounding expanded bounds up, so exact multiples of 90° stay tight.
const EXPAND_EPS: f64 = 1e-6;

/// Linear interpolation between `start` and `end`.
pub fn lerp(progress: f64, start: f64, end: f64) -> f64 {
    start + (end - start) * progress
}

/// Component-wise [`lerp`] between two points.
pub fn lerp_point(progress: f64, start: Point, end: Point) -> Point {
    Point::new(
        lerp(progress, start.x, end.x),
        lerp(progress, start.y, end.y),
    )
}

/// Rotate `layer` about its centre by `angle_degrees` (positive is counter-clockwise on screen).
///
/// With `expand`, the output grows to contain every rotated corner; exposed pixels are
/// transparent. Without it the output keeps the input size and corners are clipped. The result is
/// anchored so its centre matches the input centre.
pub fn rotate(layer: &Layer, angle_degrees: f64, expand: bool) -> SawcutResult<Layer> {
    if !angle_degrees.is_finite() {
        return Err(SawcutError::geometry(format!(
            "rotation angle must be finite, got {angle_degrees}"
        )));
    }
    if layer.is_empty() || angle_degrees % 360.0 == 0.0 {
        return Ok(layer.clone());
    }

    let (w, h) = (f64::from(layer.width()), f64::from(layer.height()));
    // y points down, so a visually counter-clockwise turn is a negative math angle.
    let theta = -angle_degrees.to_radians();
    let (out_w, out_h) = if expand {
        let (s, c) = theta.sin_cos();
        let ew = (w * c.abs() + h * s.abs() - EXPAND_EPS).ceil().max(1.0);
        let eh = (w * s.abs() + h * c.abs() - EXPAND_EPS).ceil().max(1.0);
        (ew, eh)
    } else {
        (w, h)
    };
    if out_w > f64::from(u16::MAX) || out_h > f64::from(u16::MAX) {
        return Err(SawcutError::geometry("rotated layer bounds are too large"));
    }

    let forward = Affine::translate(Vec2::new(out_w / 2.0, out_h / 2.0))
        * Affine::rotate(theta)
        * Affine::translate(Vec2::new(-w / 2.0, -h / 2.0));
    let inverse = forward.inverse();

    let (ow, oh) = (out_w as u32, out_h as u32);
    let mut out = vec![0u8; buffer_len(ow, oh)?];
    for y in 0..oh {
        for x in 0..ow {
            let src = inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let px = sample_bilinear(layer, src.x - 0.5, src.y - 0.5);
            let di = ((y as usize) * (ow as usize) + (x as usize)) * 4;
            out[di..di + 4].copy_from_slice(&px);
        }
    }

    Ok(Layer::from_premul(ow, oh, out)?.centered_on(layer.center()))
}

/// Copy the sub-rectangle `[x, x + width) × [y, y + height)`, clipped to the layer bounds.
///
/// The result is anchored where the cropped pixels sat on the canvas.
pub fn crop(layer: &Layer, x: u32, y: u32, width: u32, height: u32) -> SawcutResult<Layer> {
    let x0 = x.min(layer.width());
    let y0 = y.min(layer.height());
    let x1 = x.saturating_add(width).min(layer.width());
    let y1 = y.saturating_add(height).min(layer.height());
    let (cw, ch) = (x1 - x0, y1 - y0);

    let mut out = Vec::with_capacity(buffer_len(cw, ch)?);
    let src = layer.data();
    let stride = layer.width() as usize * 4;
    for row in y0..y1 {
        let start = row as usize * stride + x0 as usize * 4;
        out.extend_from_slice(&src[start..start + cw as usize * 4]);
    }

    let anchor = layer.anchor().offset(x0 as i32, y0 as i32);
    Ok(Layer::from_premul(cw, ch, out)?.placed_at(anchor))
}

/// Split into left columns `[0, W/2)` and right columns `[W/2, W)`.
///
/// Odd widths give the right half the extra column. Both halves keep the full height.
pub fn split_vertical_halves(layer: &Layer) -> SawcutResult<(Layer, Layer)> {
    let half = layer.width() / 2;
    let left = crop(layer, 0, 0, half, layer.height())?;
    let right = crop(layer, half, 0, layer.width() - half, layer.height())?;
    Ok((left, right))
}

fn sample_bilinear(layer: &Layer, sx: f64, sy: f64) -> [u8; 4] {
    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ];

    let mut acc = [0.0f64; 4];
    for (tx, ty, weight) in taps {
        if weight <= 0.0
            || tx < 0
            || ty < 0
            || tx >= i64::from(layer.width())
            || ty >= i64::from(layer.height())
        {
            continue;
        }
        let Some(px) = layer.pixel(tx as u32, ty as u32) else {
            continue;
        };
        for c in 0..4 {
            acc[c] += weight * f64::from(px[c]);
        }
    }

    let mut out = [0u8; 4];
    for c in 0..4 {
        out[c] = acc[c].round().clamp(0.0, 255.0) as u8;
    }
    // Rounding can leave a color channel a hair above alpha; keep the premultiplied invariant.
    for c in 0..3 {
        out[c] = out[c].min(out[3]);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/transform.rs"]
mod tests;
