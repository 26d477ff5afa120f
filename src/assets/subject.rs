use std::path::PathBuf;

use kurbo::{Ellipse, Point, Rect};

use crate::assets::loader::{SizeTarget, load_layer, resize_layer};
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::SawcutResult;
use crate::render::canvas::Canvas;
use crate::render::layer::Layer;

const PLACEHOLDER_FILL: (u8, u8, u8) = (29, 161, 242);
const PLACEHOLDER_STROKE_PX: f64 = 3.0;

/// Where the subject (profile) image comes from.
///
/// Upload handling and remote fetching happen before the engine runs; by the time a source reaches
/// here it is either a local file, a decoded buffer, or a request for a placeholder.
#[derive(Clone, Debug)]
pub enum SubjectSource {
    /// Local image file. A path that does not exist falls back to a placeholder.
    Path(PathBuf),
    /// Already decoded image.
    Image(Layer),
    /// Locally generated placeholder, labelled for logs.
    Placeholder {
        /// Free-form label, usually the handle the caller failed to resolve.
        label: String,
    },
}

impl SubjectSource {
    /// Interpret a CLI/config argument as a path; [`Self::resolve`] handles the missing case.
    pub fn from_arg(arg: &str) -> Self {
        Self::Path(PathBuf::from(arg))
    }

    /// Produce the subject layer at `size`.
    ///
    /// Decode failures of an existing file are fatal; a missing file degrades to the placeholder.
    #[tracing::instrument(skip(self))]
    pub fn resolve(&self, size: &SizeTarget) -> SawcutResult<Layer> {
        match self {
            Self::Path(path) if path.is_file() => load_layer(path, size),
            Self::Path(path) => {
                tracing::warn!(
                    path = %path.display(),
                    "subject image not found, substituting placeholder"
                );
                placeholder_for(size, &path.display().to_string())
            }
            Self::Image(layer) => resize_layer(layer, size),
            Self::Placeholder { label } => placeholder_for(size, label),
        }
    }
}

fn placeholder_for(size: &SizeTarget, label: &str) -> SawcutResult<Layer> {
    // Placeholders have no intrinsic aspect; treat them as square.
    let (w, h) = match *size {
        SizeTarget::Exact { width, height } => (width, height),
        SizeTarget::Width { px } | SizeTarget::Height { px } => (px, px),
    };
    tracing::debug!(label, width = w, height = h, "generating placeholder subject");
    placeholder_image(w, h)
}

/// Flat blue tile with a white border and a centred white ring.
pub fn placeholder_image(width: u32, height: u32) -> SawcutResult<Layer> {
    let (r, g, b) = PLACEHOLDER_FILL;
    let fill = Rgba8Premul::opaque(r, g, b);
    let white = Rgba8Premul::opaque(255, 255, 255);
    let mut canvas = Canvas::new(width, height, fill)?;

    let (w, h) = (f64::from(width), f64::from(height));
    let s = PLACEHOLDER_STROKE_PX;
    for edge in [
        Rect::new(0.0, 0.0, w, s),
        Rect::new(0.0, h - s, w, h),
        Rect::new(0.0, 0.0, s, h),
        Rect::new(w - s, 0.0, w, h),
    ] {
        canvas.fill_shape(&edge, white);
    }

    let radius = f64::from(width.min(height) / 2) / 2.0;
    if radius > s {
        let center = Point::new(w / 2.0, h / 2.0);
        canvas.fill_shape(&Ellipse::new(center, (radius, radius), 0.0), white);
        canvas.fill_shape(&Ellipse::new(center, (radius - s, radius - s), 0.0), fill);
    }

    canvas.into_layer()
}

#[cfg(test)]
#[path = "../../tests/unit/assets/subject.rs"]
mod tests;
