use crate::foundation::error::{SawcutError, SawcutResult};
use crate::render::layer::Layer;

/// Decode encoded image bytes (PNG, JPEG, ...) into a premultiplied RGBA8 layer.
///
/// `source_id` is only used to label errors.
pub fn decode_layer(bytes: &[u8], source_id: &str) -> SawcutResult<Layer> {
    let rgba = decode_rgba8(bytes, source_id)?;
    rgba_image_to_layer(rgba)
}

pub(crate) fn decode_rgba8(bytes: &[u8], source_id: &str) -> SawcutResult<image::RgbaImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| SawcutError::asset_load(source_id, format!("decode image: {e}")))?;
    Ok(dyn_img.to_rgba8())
}

/// Convert a straight-alpha `RgbaImage` into a premultiplied layer.
pub(crate) fn rgba_image_to_layer(rgba: image::RgbaImage) -> SawcutResult<Layer> {
    let (width, height) = rgba.dimensions();
    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    Layer::from_premul(width, height, rgba8_premul)
}

/// Convert a premultiplied layer back into a straight-alpha `RgbaImage`.
pub(crate) fn layer_to_rgba_image(layer: &Layer) -> SawcutResult<image::RgbaImage> {
    let mut straight = layer.data().to_vec();
    unpremultiply_rgba8_in_place(&mut straight);
    image::RgbaImage::from_raw(layer.width(), layer.height(), straight)
        .ok_or_else(|| SawcutError::geometry("layer buffer does not match its dimensions"))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
