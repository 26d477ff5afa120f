use kurbo::Shape;

use crate::effects::blur::blur_rgba8_premul;
use crate::effects::composite::{over, over_uniform_in_place};
use crate::foundation::core::{CanvasSize, PixelPos, Point, Rgba8Premul};
use crate::foundation::error::{SawcutError, SawcutResult};
use crate::render::frame::FrameRGBA;
use crate::render::layer::{Layer, buffer_len};

/// One output frame under construction: a fixed-size premultiplied RGBA8 buffer.
///
/// Operations apply strictly in call order; later calls draw over earlier ones.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    fill: Rgba8Premul,
    data: Vec<u8>,
}

impl Canvas {
    /// Allocate a canvas filled with `fill`.
    pub fn new(width: u32, height: u32, fill: Rgba8Premul) -> SawcutResult<Self> {
        if width == 0 || height == 0 {
            return Err(SawcutError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        let len = buffer_len(width, height)?;
        Ok(Self {
            width,
            height,
            fill,
            data: fill.to_array().repeat(len / 4),
        })
    }

    /// Allocate a canvas of `size`.
    pub fn with_size(size: CanvasSize, fill: Rgba8Premul) -> SawcutResult<Self> {
        Self::new(size.width, size.height, fill)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Read one pixel, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        let px = &self.data[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Source-over `layer` with its top-left at `position`, clipping silently at the edges.
    pub fn composite(&mut self, layer: &Layer, position: PixelPos) {
        if layer.is_empty() {
            return;
        }
        let (cw, ch) = (i64::from(self.width), i64::from(self.height));
        let (px, py) = (i64::from(position.x), i64::from(position.y));
        let x0 = px.max(0);
        let y0 = py.max(0);
        let x1 = (px + i64::from(layer.width())).min(cw);
        let y1 = (py + i64::from(layer.height())).min(ch);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let src = layer.data();
        let lw = layer.width() as usize;
        for y in y0..y1 {
            let sy = (y - py) as usize;
            for x in x0..x1 {
                let sx = (x - px) as usize;
                let si = (sy * lw + sx) * 4;
                let s = [src[si], src[si + 1], src[si + 2], src[si + 3]];
                if s[3] == 0 {
                    continue;
                }
                let di = self.index(x as u32, y as u32);
                let d = [
                    self.data[di],
                    self.data[di + 1],
                    self.data[di + 2],
                    self.data[di + 3],
                ];
                self.data[di..di + 4].copy_from_slice(&over(d, s, 1.0));
            }
        }
    }

    /// Composite `layer` at its own anchor.
    pub fn draw(&mut self, layer: &Layer) {
        self.composite(layer, layer.anchor());
    }

    /// Translate the whole current content by `(dx, dy)` pixels.
    ///
    /// No resampling happens; content pushed past an edge is dropped and the revealed strip is set
    /// to the canvas fill.
    pub fn affine_jitter(&mut self, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        let w = self.width as i64;
        let h = self.height as i64;
        let fill = self.fill.to_array();
        let mut out = fill.repeat((w * h) as usize);
        for y in 0..h {
            let sy = y - i64::from(dy);
            if sy < 0 || sy >= h {
                continue;
            }
            for x in 0..w {
                let sx = x - i64::from(dx);
                if sx < 0 || sx >= w {
                    continue;
                }
                let si = ((sy * w + sx) as usize) * 4;
                let di = ((y * w + x) as usize) * 4;
                out[di..di + 4].copy_from_slice(&self.data[si..si + 4]);
            }
        }
        self.data = out;
    }

    /// Fill any closed `kurbo` shape, sampling coverage at pixel centres.
    pub fn fill_shape(&mut self, shape: &impl Shape, color: Rgba8Premul) {
        if color.a == 0 {
            return;
        }
        let bbox = shape.bounding_box();
        let x0 = bbox.x0.floor().max(0.0) as i64;
        let y0 = bbox.y0.floor().max(0.0) as i64;
        let x1 = bbox.x1.ceil().min(f64::from(self.width)) as i64;
        let y1 = bbox.y1.ceil().min(f64::from(self.height)) as i64;
        let src = color.to_array();
        for y in y0..y1 {
            for x in x0..x1 {
                if !shape.contains(Point::new(x as f64 + 0.5, y as f64 + 0.5)) {
                    continue;
                }
                let di = self.index(x as u32, y as u32);
                let d = [
                    self.data[di],
                    self.data[di + 1],
                    self.data[di + 2],
                    self.data[di + 3],
                ];
                self.data[di..di + 4].copy_from_slice(&over(d, src, 1.0));
            }
        }
    }

    /// Gaussian-blur the whole canvas. Sigma 0 leaves it untouched.
    pub fn blur(&mut self, sigma: f32) -> SawcutResult<()> {
        self.data = blur_rgba8_premul(&self.data, self.width, self.height, sigma)?;
        Ok(())
    }

    /// Composite one uniform color over the whole canvas.
    pub fn overlay(&mut self, color: Rgba8Premul) -> SawcutResult<()> {
        over_uniform_in_place(&mut self.data, color.to_array())
    }

    /// Freeze the canvas into a frame for the sequence.
    pub fn into_frame(self) -> FrameRGBA {
        FrameRGBA {
            width: self.width,
            height: self.height,
            data: self.data,
            premultiplied: true,
        }
    }

    /// Freeze the canvas into a layer anchored at the origin.
    pub fn into_layer(self) -> SawcutResult<Layer> {
        Layer::from_premul(self.width, self.height, self.data)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
