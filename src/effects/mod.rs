/// Separable gaussian blur over premultiplied pixels.
pub mod blur;
/// Premultiplied source-over blending.
pub mod composite;
/// Procedural droplet overlay.
pub mod droplets;
