//! Procedural droplet overlay used while the split halves fall apart.
//!
//! Sampling and drawing are separate steps: [`sample_droplets`] only consumes randomness, so tests
//! can check the distribution without touching pixels.

use std::ops::RangeInclusive;

use kurbo::{Ellipse, Rect};
use rand::Rng;

use crate::foundation::core::{PixelRect, Rgba8Premul};
use crate::foundation::error::SawcutResult;
use crate::render::canvas::Canvas;

const COUNT: RangeInclusive<u32> = 1..=2;
const WIDTH: RangeInclusive<u32> = 12..=18;
const HEIGHT: RangeInclusive<u32> = 25..=35;
const RED: RangeInclusive<u8> = 200..=255;
const ALPHA: RangeInclusive<u8> = 220..=255;
const TRAIL_LENGTH: RangeInclusive<u32> = 5..=10;
const TRAIL_STROKE: RangeInclusive<u32> = 2..=4;
const TRAIL_ALPHA_DROP: u8 = 30;
const START_JITTER_PX: i32 = 10;
const BLUR_SIGMA: f32 = 0.3;
const GLOW_ALPHA: u8 = 10;

/// One falling droplet, positioned by its bounding box on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Droplet {
    /// Left edge of the droplet's bounding box.
    pub x: i32,
    /// Top edge of the droplet's bounding box.
    pub y: i32,
    /// Bounding-box width.
    pub width: u32,
    /// Bounding-box height.
    pub height: u32,
    /// Red channel (green and blue are always zero).
    pub red: u8,
    /// Straight alpha.
    pub alpha: u8,
    /// Trail hanging below the droplet, if any.
    pub trail: Option<Trail>,
}

/// Vertical mark connecting a droplet to the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trail {
    /// Length in pixels below the droplet's bottom edge.
    pub length: u32,
    /// Stroke width in pixels.
    pub stroke: u32,
    /// Straight alpha; the droplet's alpha minus 30, floored at zero.
    pub alpha: u8,
}

impl Droplet {
    /// Horizontal centre of the droplet.
    pub fn center_x(&self) -> f64 {
        f64::from(self.x) + f64::from(self.width) / 2.0
    }

    fn bottom(&self) -> f64 {
        f64::from(self.y) + f64::from(self.height)
    }
}

/// Sample 1–2 droplets falling below `region`.
///
/// Every droplet except the last in the batch carries a trail.
pub fn sample_droplets<R: Rng>(rng: &mut R, region: PixelRect) -> Vec<Droplet> {
    let count = rng.random_range(COUNT);
    let spread = (region.width / 4) as i32;
    let center_x = region.center().x.round() as i32;
    let bottom = region.bottom().clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;

    (0..count)
        .map(|i| {
            let width = rng.random_range(WIDTH);
            let height = rng.random_range(HEIGHT);
            let cx = center_x.saturating_add(rng.random_range(-spread..=spread));
            let y = bottom.saturating_add(rng.random_range(-START_JITTER_PX..=START_JITTER_PX));
            let red = rng.random_range(RED);
            let alpha = rng.random_range(ALPHA);
            let trail = if i + 1 < count {
                Some(Trail {
                    length: rng.random_range(TRAIL_LENGTH),
                    stroke: rng.random_range(TRAIL_STROKE),
                    alpha: alpha.saturating_sub(TRAIL_ALPHA_DROP),
                })
            } else {
                None
            };
            Droplet {
                x: cx.saturating_sub((width / 2) as i32),
                y,
                width,
                height,
                red,
                alpha,
                trail,
            }
        })
        .collect()
}

/// Rasterize droplets (ellipse bodies, rectangular trails) onto `canvas` in order.
pub fn draw_droplets(canvas: &mut Canvas, droplets: &[Droplet]) {
    for d in droplets {
        let body = Rect::new(
            f64::from(d.x),
            f64::from(d.y),
            f64::from(d.x) + f64::from(d.width),
            d.bottom(),
        );
        canvas.fill_shape(
            &Ellipse::from_rect(body),
            Rgba8Premul::from_straight_rgba(d.red, 0, 0, d.alpha),
        );

        if let Some(trail) = d.trail {
            let half = f64::from(trail.stroke) / 2.0;
            let stem = Rect::new(
                d.center_x() - half,
                d.bottom(),
                d.center_x() + half,
                d.bottom() + f64::from(trail.length),
            );
            canvas.fill_shape(
                &stem,
                Rgba8Premul::from_straight_rgba(d.red, 0, 0, trail.alpha),
            );
        }
    }
}

/// Full overlay pass: sample, draw, soften the whole frame, then add a faint white glow.
///
/// Returns the droplets that were drawn.
pub fn apply_droplet_overlay<R: Rng>(
    canvas: &mut Canvas,
    region: PixelRect,
    rng: &mut R,
) -> SawcutResult<Vec<Droplet>> {
    let droplets = sample_droplets(rng, region);
    draw_droplets(canvas, &droplets);
    canvas.blur(BLUR_SIGMA)?;
    canvas.overlay(Rgba8Premul::from_straight_rgba(255, 255, 255, GLOW_ALPHA))?;
    Ok(droplets)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/droplets.rs"]
mod tests;
