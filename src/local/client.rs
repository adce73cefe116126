use colored::Colorize;
use std::io::{self, BufRead, BufReader};
use std::net::TcpStream;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::audio::ConsoleAudio;
use crate::config::Config;
use crate::error::PipelineError;
use crate::logging::CsvLogSink;
use crate::processing::alert::AlertTier;
use crate::processing::pipeline::IngestionPipeline;
use crate::visualization::plotter::{create_shared_plot, PlotterSurface};
use crate::visualization::window::spawn_monitor_window;
use crate::visualization::VisualizationConfig;

pub fn run() -> io::Result<()> {
    let stream = TcpStream::connect("127.0.0.1:8080")?;
    let reader = BufReader::new(stream);

    let config = Config::default();

    let plot = create_shared_plot();
    let alive = Arc::new(AtomicBool::new(true));
    let window_handle =
        spawn_monitor_window(plot.clone(), VisualizationConfig::default(), alive.clone());
    let surface = PlotterSurface::new(plot, alive);

    let sink = CsvLogSink::new(&config.logging.directory);
    let destination = CsvLogSink::run_destination();

    let mut pipeline = if config.logging.enabled {
        IngestionPipeline::with_logging(
            config,
            Box::new(surface),
            Box::new(ConsoleAudio),
            Box::new(sink),
            destination,
        )
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    } else {
        IngestionPipeline::new(config, Box::new(surface), Box::new(ConsoleAudio))
    };

    if let Some(destination) = pipeline.log_destination() {
        log::info!("logging rows to {}", destination);
    }

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match pipeline.on_record(&line) {
            Ok(outcome) => {
                if outcome.closed {
                    break;
                }
                print_sample_bar(&pipeline, outcome.tier);
            }
            // A garbled line is worth seeing but not worth dying for.
            Err(
                e @ (PipelineError::MalformedRecord(_) | PipelineError::InvalidNumber { .. }),
            ) => {
                log::warn!("skipping record: {}", e);
            }
            Err(e) => {
                pipeline.finish()?;
                return Err(io::Error::new(io::ErrorKind::Other, e));
            }
        }
    }

    pipeline.finish()?;
    log::info!("stream ended after {} samples", pipeline.sample_count());

    // Keep the process alive until the monitor window is closed.
    let _ = window_handle.join();
    Ok(())
}

fn print_sample_bar(pipeline: &IngestionPipeline, tier: Option<AlertTier>) {
    let window = pipeline.window();
    let deviation = window.deviation(pipeline.target_channel());
    let latest = deviation.last().copied().unwrap_or(0.0);

    let alert = match tier {
        Some(AlertTier::OverRange) => "OVER RANGE !".red().bold().to_string(),
        Some(AlertTier::Warning) => "Warning     ".yellow().to_string(),
        None => "            ".normal().to_string(),
    };

    // One character per 0.1 of deviation, clamped to a screen width.
    let bar_len = ((latest * 10.0).max(0.0) as usize).min(80);
    let bar = "|".repeat(bar_len);
    println!("{} {}", alert, bar.white());
}
