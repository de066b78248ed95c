mod controller;
mod scene;
mod state;

pub use controller::{Controller, RenderSink};
pub use scene::{CountryMark, DetailScene, MapScene, Summary};
pub use state::ViewState;
