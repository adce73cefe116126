// src/visualization/plotter.rs

use super::RenderSurface;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Latest deviation series plus the threshold levels derived from the
/// rolling std. The pipeline thread overwrites this wholesale on each
/// redraw; the window thread only reads.
#[derive(Default)]
pub struct DeviationPlot {
    pub t: Vec<f64>,
    pub deviation: Vec<f64>,
    pub std: f64,
    pub warn_level: f64,
    pub upper_bound: f64,
    pub revision: u64,
}

pub type SharedPlot = Arc<Mutex<DeviationPlot>>;

pub fn create_shared_plot() -> SharedPlot {
    Arc::new(Mutex::new(DeviationPlot::default()))
}

/// `RenderSurface` adapter over the shared plot state. The window
/// thread clears `alive` when the egui window closes, which the
/// pipeline observes through `is_active`.
pub struct PlotterSurface {
    plot: SharedPlot,
    alive: Arc<AtomicBool>,
}

impl PlotterSurface {
    pub fn new(plot: SharedPlot, alive: Arc<AtomicBool>) -> Self {
        Self { plot, alive }
    }
}

impl RenderSurface for PlotterSurface {
    fn is_active(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    fn redraw(
        &mut self,
        t: &[f64],
        deviation: &[f64],
        std: f64,
        warn_level: f64,
        upper_bound: f64,
    ) {
        let mut plot = match self.plot.lock() {
            Ok(plot) => plot,
            // A poisoned plot means the window thread already died;
            // the next is_active check closes the pipeline.
            Err(_) => return,
        };
        plot.t.clear();
        plot.t.extend_from_slice(t);
        plot.deviation.clear();
        plot.deviation.extend_from_slice(deviation);
        plot.std = std;
        plot.warn_level = warn_level;
        plot.upper_bound = upper_bound;
        plot.revision += 1;
    }

    fn pause(&mut self, seconds: f64) {
        if seconds > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(seconds));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redraw_replaces_the_series() {
        let plot = create_shared_plot();
        let alive = Arc::new(AtomicBool::new(true));
        let mut surface = PlotterSurface::new(plot.clone(), alive.clone());

        surface.redraw(&[0.0, 1.0], &[0.1, 0.4], 0.2, 1.0, 1.4);
        surface.redraw(&[1.0, 2.0], &[0.4, 0.9], 0.3, 1.5, 2.1);

        let snapshot = plot.lock().unwrap();
        assert_eq!(snapshot.t, vec![1.0, 2.0]);
        assert_eq!(snapshot.deviation, vec![0.4, 0.9]);
        assert_eq!(snapshot.upper_bound, 2.1);
        assert_eq!(snapshot.revision, 2);
    }

    #[test]
    fn active_flag_tracks_the_window() {
        let plot = create_shared_plot();
        let alive = Arc::new(AtomicBool::new(true));
        let surface = PlotterSurface::new(plot, alive.clone());

        assert!(surface.is_active());
        alive.store(false, Ordering::Relaxed);
        assert!(!surface.is_active());
    }
}
