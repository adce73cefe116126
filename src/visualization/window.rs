// src/visualization/window.rs

use super::plotter::SharedPlot;
use super::VisualizationConfig;

use eframe::egui;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct MonitorWindow {
    plot: SharedPlot,
    config: VisualizationConfig,
}

impl MonitorWindow {
    pub fn new(plot: SharedPlot, config: VisualizationConfig) -> Self {
        Self { plot, config }
    }

    pub fn run(plot: SharedPlot, config: VisualizationConfig) -> Result<(), eframe::Error> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([config.window_width as f32, config.window_height as f32])
                .with_title("rodwatch - Acc"),
            ..Default::default()
        };

        eframe::run_native(
            "rodwatch",
            options,
            Box::new(|_cc| Ok(Box::new(MonitorWindow::new(plot, config)))),
        )
    }
}

impl eframe::App for MonitorWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Request continuous repainting for real-time updates
        ctx.request_repaint();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Deviation from rolling mean");
            ui.separator();

            let plot = self.plot.lock().unwrap();
            if plot.deviation.is_empty() {
                ui.label("Waiting for data...");
                return;
            }

            use egui_plot::{HLine, Line, Plot, PlotPoints};

            let points: PlotPoints = plot
                .t
                .iter()
                .zip(plot.deviation.iter())
                .map(|(t, d)| [*t, *d])
                .collect();
            let line = Line::new(points)
                .color(egui::Color32::LIGHT_BLUE)
                .width(1.5);
            let warn_line = HLine::new(plot.warn_level)
                .color(egui::Color32::YELLOW)
                .width(1.0);
            let upper_bound = plot.upper_bound;

            ui.label(format!(
                "std: {:.4}   warning level: {:.4}",
                plot.std, plot.warn_level
            ));

            Plot::new("deviation")
                .height(self.config.plot_height as f32)
                .include_y(0.0)
                .include_y(upper_bound)
                .show_axes([true, true])
                .show_grid([true, true])
                .show(ui, |plot_ui| {
                    plot_ui.line(line);
                    plot_ui.hline(warn_line);
                });
        });
    }
}

/// Spawns the monitor window on its own thread, clearing `alive` when
/// the window closes so the pipeline can shut down.
pub fn spawn_monitor_window(
    plot: SharedPlot,
    config: VisualizationConfig,
    alive: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        if let Err(e) = MonitorWindow::run(plot, config) {
            log::error!("monitor window error: {}", e);
        }
        alive.store(false, Ordering::Relaxed);
    })
}
