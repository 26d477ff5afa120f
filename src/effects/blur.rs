use crate::foundation::error::{SawcutError, SawcutResult};
use crate::render::layer::buffer_len;

const Q16_ONE: u32 = 1 << 16;

/// Normalized 1-D gaussian taps in Q16 fixed point, covering `ceil(3σ)` on each side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GaussianKernel {
    taps: Vec<u32>,
}

impl GaussianKernel {
    /// Build the kernel for `sigma`. A zero sigma yields no kernel (blurring is a no-op).
    pub fn new(sigma: f32) -> SawcutResult<Option<Self>> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(SawcutError::geometry(format!(
                "blur sigma must be finite and >= 0, got {sigma}"
            )));
        }
        let radius = (3.0 * sigma).ceil() as i32;
        if radius == 0 {
            return Ok(None);
        }

        let two_sigma_sq = 2.0 * f64::from(sigma).powi(2);
        let raw: Vec<f64> = (-radius..=radius)
            .map(|i| (-f64::from(i * i) / two_sigma_sq).exp())
            .collect();
        let total: f64 = raw.iter().sum();

        let mut taps: Vec<u32> = raw
            .iter()
            .map(|w| ((w / total) * f64::from(Q16_ONE)).round() as u32)
            .collect();
        // Rounding drift goes to the centre tap so the taps sum to exactly one.
        let sum: i64 = taps.iter().map(|&t| i64::from(t)).sum();
        let mid = radius as usize;
        taps[mid] = (i64::from(taps[mid]) + i64::from(Q16_ONE) - sum).clamp(0, 1 << 16) as u32;

        Ok(Some(Self { taps }))
    }

    /// Taps on each side of the centre.
    pub fn radius(&self) -> usize {
        self.taps.len() / 2
    }

    /// Weights from `-radius` to `+radius`.
    pub fn taps(&self) -> &[u32] {
        &self.taps
    }
}

/// Gaussian blur of a premultiplied RGBA8 buffer with clamp-to-edge sampling.
pub fn blur_rgba8_premul(src: &[u8], width: u32, height: u32, sigma: f32) -> SawcutResult<Vec<u8>> {
    let len = buffer_len(width, height)?;
    if src.len() != len {
        return Err(SawcutError::geometry(format!(
            "blur expects {len} bytes for {width}x{height}, got {}",
            src.len()
        )));
    }
    let Some(kernel) = GaussianKernel::new(sigma)? else {
        return Ok(src.to_vec());
    };
    if len == 0 {
        return Ok(Vec::new());
    }

    let (w, h) = (width as usize, height as usize);
    let mut rows = vec![0u8; len];
    let mut out = vec![0u8; len];
    convolve(src, &mut rows, w, h, Axis::Row, &kernel);
    convolve(&rows, &mut out, w, h, Axis::Column, &kernel);
    Ok(out)
}

#[derive(Clone, Copy)]
enum Axis {
    Row,
    Column,
}

fn convolve(src: &[u8], dst: &mut [u8], w: usize, h: usize, axis: Axis, kernel: &GaussianKernel) {
    let r = kernel.radius() as isize;
    let (len, stride) = match axis {
        Axis::Row => (w, 4),
        Axis::Column => (h, w * 4),
    };
    let lines = match axis {
        Axis::Row => h,
        Axis::Column => w,
    };

    for line in 0..lines {
        let base = match axis {
            Axis::Row => line * w * 4,
            Axis::Column => line * 4,
        };
        for pos in 0..len {
            let mut acc = [0u64; 4];
            for (k, &tap) in kernel.taps().iter().enumerate() {
                let at = (pos as isize + k as isize - r).clamp(0, len as isize - 1) as usize;
                let px = &src[base + at * stride..][..4];
                for (a, &c) in acc.iter_mut().zip(px) {
                    *a += u64::from(tap) * u64::from(c);
                }
            }
            let px = &mut dst[base + pos * stride..][..4];
            for (d, a) in px.iter_mut().zip(acc) {
                *d = ((a + u64::from(Q16_ONE / 2)) >> 16).min(255) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
