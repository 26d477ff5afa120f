/// Per-frame compositing surface.
pub mod canvas;
/// Finished frame buffers.
pub mod frame;
/// Immutable positioned image layers.
pub mod layer;
/// Pure rotate / crop / split / lerp helpers.
pub mod transform;
