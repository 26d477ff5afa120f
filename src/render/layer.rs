use std::sync::Arc;

use crate::foundation::core::{PixelPos, Point, Rgba8Premul};
use crate::foundation::error::{SawcutError, SawcutResult};

/// An immutable premultiplied RGBA8 image plus its top-left anchor on the canvas.
///
/// Pixel storage is shared behind an `Arc`, so cloning a layer (or re-anchoring it) never copies
/// pixels. Every transform in [`crate::render::transform`] returns a new layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
    anchor: PixelPos,
}

impl Layer {
    /// Wrap tightly packed, row-major premultiplied RGBA8 pixels.
    ///
    /// Zero-sized layers are allowed and composite as a no-op.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> SawcutResult<Self> {
        let expected = buffer_len(width, height)?;
        if rgba8_premul.len() != expected {
            return Err(SawcutError::geometry(format!(
                "layer buffer has {} bytes, expected {expected} for {width}x{height}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
            anchor: PixelPos::default(),
        })
    }

    /// A layer filled with a single color.
    pub fn solid(width: u32, height: u32, color: Rgba8Premul) -> SawcutResult<Self> {
        let px = color.to_array();
        let len = buffer_len(width, height)?;
        Self::from_premul(width, height, px.repeat(len / 4))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `true` when the layer covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Top-left canvas position.
    pub fn anchor(&self) -> PixelPos {
        self.anchor
    }

    /// Same pixels, anchored at `pos`.
    pub fn placed_at(mut self, pos: PixelPos) -> Self {
        self.anchor = pos;
        self
    }

    /// Same pixels, anchored so the layer centre lands on `center`.
    pub fn centered_on(self, center: Point) -> Self {
        let x = center.x - f64::from(self.width) / 2.0;
        let y = center.y - f64::from(self.height) / 2.0;
        self.placed_at(PixelPos::from_point(Point::new(x, y)))
    }

    /// Centre of the layer in canvas space.
    pub fn center(&self) -> Point {
        Point::new(
            f64::from(self.anchor.x) + f64::from(self.width) / 2.0,
            f64::from(self.anchor.y) + f64::from(self.height) / 2.0,
        )
    }

    /// Read one pixel, or `None` outside the layer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = &self.rgba8_premul[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }
}

pub(crate) fn buffer_len(width: u32, height: u32) -> SawcutResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| SawcutError::geometry("layer buffer size overflow"))
}
