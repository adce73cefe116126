// src/visualization/mod.rs

pub mod plotter;
pub mod window;

use serde::{Deserialize, Serialize};

/// Rendering collaborator for the ingestion pipeline.
///
/// `is_active` is the pipeline's only close signal: once the display
/// surface reports inactive, ingestion stops for good. `pause` is a
/// cooperative yield after a redraw so the surface can process pending
/// UI events; it may block the calling thread for the given bounded
/// time.
pub trait RenderSurface: Send {
    fn is_active(&self) -> bool;

    /// Replace the plotted deviation series. `warn_level` is drawn as a
    /// marker line and `upper_bound` sizes the y axis.
    fn redraw(&mut self, t: &[f64], deviation: &[f64], std: f64, warn_level: f64, upper_bound: f64);

    fn pause(&mut self, seconds: f64);
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VisualizationConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub plot_height: u32,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            window_width: 1000,
            window_height: 480,
            plot_height: 360,
        }
    }
}
