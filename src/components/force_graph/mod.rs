pub mod codec;
mod component;
pub mod error;
pub mod export;
pub mod interaction;
pub mod levels;
pub mod merge;
mod render;
pub mod sanitize;
pub mod scene;
pub mod search;
pub mod simulation;
mod state;
mod types;

pub use component::ForceGraphCanvas;
pub use types::GraphData;
