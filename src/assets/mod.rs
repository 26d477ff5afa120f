/// Image decoding and premultiplication.
pub mod decode;
/// Static asset loading, resizing and glow.
pub mod loader;
/// Subject image resolution with placeholder fallback.
pub mod subject;
