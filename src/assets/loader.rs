use std::path::{Path, PathBuf};

use image::imageops::FilterType;

use crate::assets::decode::{decode_rgba8, layer_to_rgba_image, rgba_image_to_layer};
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{SawcutError, SawcutResult};
use crate::render::canvas::Canvas;
use crate::render::layer::Layer;

/// Size class an asset is normalized to after decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "fit", rename_all = "snake_case")]
pub enum SizeTarget {
    /// Scale to `px` wide, preserving aspect ratio.
    Width {
        /// Target width in pixels.
        px: u32,
    },
    /// Scale to `px` tall, preserving aspect ratio.
    Height {
        /// Target height in pixels.
        px: u32,
    },
    /// Stretch to exactly `width` x `height`.
    Exact {
        /// Target width in pixels.
        width: u32,
        /// Target height in pixels.
        height: u32,
    },
}

impl SizeTarget {
    /// Reject zero-sized targets.
    pub fn validate(&self) -> SawcutResult<()> {
        let ok = match *self {
            Self::Width { px } | Self::Height { px } => px > 0,
            Self::Exact { width, height } => width > 0 && height > 0,
        };
        if ok {
            Ok(())
        } else {
            Err(SawcutError::validation(format!(
                "size target {self:?} must be non-zero"
            )))
        }
    }

    /// Output dimensions for a `src_w` x `src_h` source.
    pub fn resolve(&self, src_w: u32, src_h: u32) -> SawcutResult<(u32, u32)> {
        self.validate()?;
        if src_w == 0 || src_h == 0 {
            return Err(SawcutError::validation("cannot resize an empty image"));
        }
        let scaled = |len: u32, scale: f64| ((f64::from(len) * scale).floor() as u32).max(1);
        Ok(match *self {
            Self::Width { px } => {
                let scale = f64::from(px) / f64::from(src_w);
                (px, scaled(src_h, scale))
            }
            Self::Height { px } => {
                let scale = f64::from(px) / f64::from(src_h);
                (scaled(src_w, scale), px)
            }
            Self::Exact { width, height } => (width, height),
        })
    }
}

/// A static image asset reference plus its normalization.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetSpec {
    /// File path of the encoded image.
    pub source: PathBuf,
    /// Size class after loading.
    pub size: SizeTarget,
    /// Alpha of a uniform white glow composited over the asset (0 disables it).
    #[serde(default)]
    pub glow_alpha: u8,
}

/// Load, resize and glow an asset.
#[tracing::instrument(skip(spec), fields(source = %spec.source.display()))]
pub fn load_asset(spec: &AssetSpec) -> SawcutResult<Layer> {
    let layer = load_layer(&spec.source, &spec.size)?;
    tracing::debug!(
        width = layer.width(),
        height = layer.height(),
        "loaded asset"
    );
    apply_glow(&layer, spec.glow_alpha)
}

/// Read and decode `path`, resized to `size` with a Lanczos filter.
///
/// Any read or decode failure is an [`SawcutError::AssetLoad`] carrying `path`.
pub fn load_layer(path: &Path, size: &SizeTarget) -> SawcutResult<Layer> {
    let source_id = path.display().to_string();
    let bytes = std::fs::read(path)
        .map_err(|e| SawcutError::asset_load(source_id.as_str(), format!("read file: {e}")))?;
    decode_resized(&bytes, &source_id, size)
}

/// Decode in-memory bytes and resize to `size`.
pub fn decode_resized(bytes: &[u8], source_id: &str, size: &SizeTarget) -> SawcutResult<Layer> {
    let rgba = decode_rgba8(bytes, source_id)?;
    let (w, h) = size
        .resolve(rgba.width(), rgba.height())
        .map_err(|e| SawcutError::asset_load(source_id, e))?;
    rgba_image_to_layer(resize_rgba(rgba, w, h))
}

/// Resize an already decoded layer to `size`. The anchor is reset to the origin.
pub fn resize_layer(layer: &Layer, size: &SizeTarget) -> SawcutResult<Layer> {
    let (w, h) = size.resolve(layer.width(), layer.height())?;
    if (w, h) == (layer.width(), layer.height()) {
        return Ok(layer.clone().placed_at(Default::default()));
    }
    let rgba = layer_to_rgba_image(layer)?;
    rgba_image_to_layer(resize_rgba(rgba, w, h))
}

/// Composite a uniform white layer with `alpha` over `layer`. Transparent areas pick up the glow.
pub fn apply_glow(layer: &Layer, alpha: u8) -> SawcutResult<Layer> {
    if alpha == 0 || layer.is_empty() {
        return Ok(layer.clone());
    }
    let mut canvas = Canvas::new(layer.width(), layer.height(), Rgba8Premul::transparent())?;
    canvas.composite(layer, Default::default());
    canvas.overlay(Rgba8Premul::from_straight_rgba(255, 255, 255, alpha))?;
    Ok(canvas.into_layer()?.placed_at(layer.anchor()))
}

fn resize_rgba(rgba: image::RgbaImage, w: u32, h: u32) -> image::RgbaImage {
    if rgba.dimensions() == (w, h) {
        return rgba;
    }
    image::imageops::resize(&rgba, w, h, FilterType::Lanczos3)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
