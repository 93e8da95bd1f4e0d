mod component;
mod detail_panel;
mod label_canvas;
mod render;
mod scene;
mod simulation;

pub use component::NetworkGraphCanvas;
