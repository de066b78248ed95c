pub mod geometry;
mod projection;
mod renderer;
mod spatial;

pub use projection::Viewport;
pub use renderer::{DisplaySettings, MapLayers, MapRenderer};
