pub mod braille;
pub mod data;
pub mod error;
pub mod map;
pub mod stats;
pub mod view;

pub use data::Dataset;
pub use stats::{Month, Stats};
pub use view::{Controller, RenderSink, ViewState};
