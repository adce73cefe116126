use crate::audio::AudioPlayer;
use crate::config::Config;
use crate::error::PipelineError;
use crate::logging::{LogBuffer, LogRow, LogSink};
use crate::processing::alert::{AlertPolicy, AlertTier};
use crate::processing::angle;
use crate::processing::parser::Sample;
use crate::processing::window::SlidingWindow;
use crate::visualization::RenderSurface;

use std::io;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    Running,
    Closed,
}

/// What one ingested record produced.
#[derive(Debug, Default)]
pub struct StepOutcome {
    pub tier: Option<AlertTier>,
    pub redrawn: bool,
    pub closed: bool,
}

impl StepOutcome {
    fn closed() -> Self {
        Self {
            closed: true,
            ..Self::default()
        }
    }
}

/// Per-record orchestration: parse, window update, angle tracking,
/// rolling statistics, alert decision, then the external side effects
/// (sound, redraw, data log).
///
/// Internal state is committed before any collaborator is called, so a
/// failing collaborator can never roll back ingested data. The render
/// surface going inactive is the only close signal; once `Closed`,
/// `on_record` fails with `PipelineClosed` (strict mode).
pub struct IngestionPipeline {
    config: Config,
    window: SlidingWindow,
    tilt: Option<SlidingWindow>,
    policy: AlertPolicy,
    logbook: Option<LogBuffer>,
    render: Box<dyn RenderSurface>,
    audio: Box<dyn AudioPlayer>,
    state: PipelineState,
}

impl IngestionPipeline {
    /// Pipeline without a data log.
    pub fn new(
        config: Config,
        render: Box<dyn RenderSurface>,
        audio: Box<dyn AudioPlayer>,
    ) -> Self {
        let channels = config.processor.channel_labels.len();
        assert!(
            config.processor.target_channel < channels,
            "target channel out of range"
        );

        let capacity = config.window.capacity;
        let tilt = config
            .processor
            .track_angle
            .then(|| SlidingWindow::new(1, capacity));
        let policy = AlertPolicy::new(
            config.alerts.sigma_warn,
            config.alerts.sigma_over,
            Duration::from_secs_f64(config.alerts.cooldown_secs),
            Duration::from_secs_f64(config.alerts.startup_grace_secs),
        );

        Self {
            window: SlidingWindow::new(channels, capacity),
            tilt,
            policy,
            logbook: None,
            render,
            audio,
            state: PipelineState::Running,
            config,
        }
    }

    /// Pipeline that also buffers log rows into `sink` under a fixed
    /// destination id. The header row is written immediately.
    pub fn with_logging(
        config: Config,
        render: Box<dyn RenderSurface>,
        audio: Box<dyn AudioPlayer>,
        sink: Box<dyn LogSink>,
        destination: String,
    ) -> Result<Self, PipelineError> {
        let mut pipeline = Self::new(config, render, audio);
        let logbook = LogBuffer::new(
            sink,
            destination,
            &pipeline.config.processor.channel_labels,
            pipeline.config.logging.flush_threshold,
        )?;
        pipeline.logbook = Some(logbook);
        Ok(pipeline)
    }

    pub fn is_closed(&self) -> bool {
        self.state == PipelineState::Closed
    }

    pub fn sample_count(&self) -> u64 {
        self.window.count()
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub fn target_channel(&self) -> usize {
        self.config.processor.target_channel
    }

    /// Tilt-angle window contents, oldest first, when tracking is on.
    pub fn tilt_angles(&self) -> Option<Vec<f64>> {
        self.tilt.as_ref().map(|buffer| buffer.channel(0))
    }

    pub fn log_destination(&self) -> Option<&str> {
        self.logbook.as_ref().map(|book| book.destination())
    }

    /// Ingest one raw record.
    pub fn on_record(&mut self, raw: &str) -> Result<StepOutcome, PipelineError> {
        if self.state == PipelineState::Closed {
            return Err(PipelineError::PipelineClosed);
        }

        // Cooperative close check, once per record.
        if !self.render.is_active() {
            self.state = PipelineState::Closed;
            log::info!("render surface gone, closing pipeline");
            return Ok(StepOutcome::closed());
        }

        let started = Instant::now();

        // Parse and convert before touching any state: a bad record
        // must not advance the window.
        let sample = Sample::parse(raw)?;
        let floats = sample.to_floats()?;
        self.window.push(&floats)?;

        if let Some(tilt) = &mut self.tilt {
            if floats.len() >= 3 {
                let n = self.config.processor.angle_smooth_len.max(1);
                let (theta, phi) = angle::estimate(
                    self.window.tail_mean(0, n),
                    self.window.tail_mean(1, n),
                    self.window.tail_mean(2, n),
                );
                tilt.push(&[theta.abs()])?;
                if self.config.processor.verbose {
                    log::debug!("angle theta={:.2} phi={:.2}", theta, phi);
                }
            }
        }

        let target = self.config.processor.target_channel;
        let std = self.window.std(target);
        let deviation = self.window.deviation(target);
        let latest = deviation.last().copied().unwrap_or(0.0);

        let tier = self.policy.evaluate(latest, std, Instant::now());

        // State is committed; everything below is a side effect.
        if let Some(tier) = tier {
            let asset = match tier {
                AlertTier::Warning => &self.config.alerts.warning_asset,
                AlertTier::OverRange => &self.config.alerts.over_range_asset,
            };
            log::warn!(
                "{:?} alert at sample {} (deviation {:.4}, std {:.4})",
                tier,
                self.window.count(),
                latest,
                std
            );
            self.audio.play(asset, self.config.alerts.audio_wait)?;
        }

        let mut redrawn = false;
        if self.window.count() % self.config.render.interval.max(1) == 0 {
            self.render.redraw(
                &self.window.times(),
                &deviation,
                std,
                self.policy.warn_level(std),
                self.policy.upper_bound(std),
            );
            self.render.pause(self.config.render.pause_secs);
            redrawn = true;
        }

        if let Some(book) = &mut self.logbook {
            book.record(LogRow {
                index: self.window.count() - 1,
                unixtime: chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
                values: sample.values().to_vec(),
            })?;
        }

        if self.config.processor.verbose {
            log::debug!("record processed in {:?}", started.elapsed());
        }

        Ok(StepOutcome {
            tier,
            redrawn,
            closed: false,
        })
    }

    /// Flush any pending log rows; call once the stream ends.
    pub fn finish(&mut self) -> io::Result<()> {
        match &mut self.logbook {
            Some(book) => book.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogSink;

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    struct TestSurface {
        active: Arc<AtomicBool>,
        redraws: Arc<Mutex<usize>>,
    }

    impl RenderSurface for TestSurface {
        fn is_active(&self) -> bool {
            self.active.load(Ordering::Relaxed)
        }

        fn redraw(&mut self, _t: &[f64], _dev: &[f64], _std: f64, _warn: f64, _upper: f64) {
            *self.redraws.lock().unwrap() += 1;
        }

        fn pause(&mut self, _seconds: f64) {}
    }

    #[derive(Default, Clone)]
    struct TestAudio {
        played: Arc<Mutex<Vec<String>>>,
    }

    impl AudioPlayer for TestAudio {
        fn play(&mut self, asset_id: &str, _wait: bool) -> Result<(), PipelineError> {
            self.played.lock().unwrap().push(asset_id.to_string());
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    struct TestSink {
        batches: Arc<Mutex<Vec<Vec<Vec<String>>>>>,
    }

    impl LogSink for TestSink {
        fn append_rows(&mut self, _destination: &str, rows: &[Vec<String>]) -> std::io::Result<()> {
            self.batches.lock().unwrap().push(rows.to_vec());
            Ok(())
        }
    }

    struct Harness {
        pipeline: IngestionPipeline,
        active: Arc<AtomicBool>,
        redraws: Arc<Mutex<usize>>,
        audio: TestAudio,
        sink: TestSink,
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.window.capacity = 16;
        config.render.pause_secs = 0.0;
        // Make alerts immediate and deterministic for tests.
        config.alerts.cooldown_secs = 0.0;
        config.alerts.startup_grace_secs = 0.0;
        config
    }

    fn harness(config: Config) -> Harness {
        let active = Arc::new(AtomicBool::new(true));
        let redraws = Arc::new(Mutex::new(0));
        let audio = TestAudio::default();
        let sink = TestSink::default();
        let surface = TestSurface {
            active: active.clone(),
            redraws: redraws.clone(),
        };
        let pipeline = IngestionPipeline::with_logging(
            config,
            Box::new(surface),
            Box::new(audio.clone()),
            Box::new(sink.clone()),
            "acc_test".to_string(),
        )
        .unwrap();
        Harness {
            pipeline,
            active,
            redraws,
            audio,
            sink,
        }
    }

    fn record(values: [f64; 4]) -> String {
        format!(
            "Ax, Ay, Az, A : {}, {}, {}, {}",
            values[0], values[1], values[2], values[3]
        )
    }

    #[test]
    fn each_valid_record_advances_the_window_once() {
        let mut h = harness(config());
        for i in 0..5 {
            let outcome = h.pipeline.on_record(&record([0.0, 0.0, 9.8, 9.8])).unwrap();
            assert!(!outcome.closed);
            assert_eq!(h.pipeline.sample_count(), i + 1);
        }
    }

    #[test]
    fn bad_records_leave_the_window_untouched() {
        let mut h = harness(config());
        h.pipeline.on_record(&record([0.0, 0.0, 9.8, 9.8])).unwrap();

        let err = h.pipeline.on_record("no delimiter here").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedRecord(_)));

        let err = h.pipeline.on_record("Ax, Ay, Az, A : 1, 2, 3, x").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidNumber { .. }));

        assert_eq!(h.pipeline.sample_count(), 1);
    }

    #[test]
    fn constant_signal_never_alerts() {
        let mut h = harness(config());
        for _ in 0..40 {
            let outcome = h.pipeline.on_record(&record([0.0, 0.0, 9.8, 9.8])).unwrap();
            assert_eq!(outcome.tier, None);
        }
        assert!(h.audio.played.lock().unwrap().is_empty());
    }

    #[test]
    fn spike_plays_the_over_range_asset() {
        // A spike into a zeroed window of capacity W deviates by
        // sqrt(W - 1) rolling stds; W = 64 clears the 7-sigma tier.
        let mut cfg = config();
        cfg.window.capacity = 64;
        let mut h = harness(cfg);
        for _ in 0..64 {
            h.pipeline.on_record(&record([0.0, 0.0, 0.0, 0.0])).unwrap();
        }
        let outcome = h.pipeline.on_record(&record([0.0, 0.0, 0.0, 50.0])).unwrap();
        assert_eq!(outcome.tier, Some(AlertTier::OverRange));
        assert_eq!(
            h.audio.played.lock().unwrap().as_slice(),
            ["sfx/warning2.mp3"]
        );
    }

    #[test]
    fn render_thinning_follows_the_interval() {
        let mut cfg = config();
        cfg.render.interval = 4;
        let mut h = harness(cfg);
        for _ in 0..12 {
            h.pipeline.on_record(&record([0.0, 0.0, 9.8, 9.8])).unwrap();
        }
        assert_eq!(*h.redraws.lock().unwrap(), 3);
    }

    #[test]
    fn inactive_surface_closes_the_pipeline_for_good() {
        let mut h = harness(config());
        h.pipeline.on_record(&record([0.0, 0.0, 9.8, 9.8])).unwrap();

        h.active.store(false, Ordering::Relaxed);
        let outcome = h.pipeline.on_record(&record([0.0, 0.0, 9.8, 9.8])).unwrap();
        assert!(outcome.closed);
        assert!(h.pipeline.is_closed());
        assert_eq!(h.pipeline.sample_count(), 1);

        // Strict mode: further records are an error, even if the
        // surface comes back.
        h.active.store(true, Ordering::Relaxed);
        let err = h.pipeline.on_record(&record([0.0, 0.0, 9.8, 9.8])).unwrap_err();
        assert!(matches!(err, PipelineError::PipelineClosed));
    }

    #[test]
    fn tilt_buffer_tracks_absolute_theta() {
        let mut cfg = config();
        cfg.processor.angle_smooth_len = 1;
        let mut h = harness(cfg);
        // ay == 0, ax < 0 is the -90 branch; the buffer stores 90.
        h.pipeline.on_record(&record([-1.0, 0.0, 0.0, 1.0])).unwrap();
        let tilt = h.pipeline.tilt_angles().unwrap();
        assert_eq!(tilt.last().copied(), Some(90.0));
    }

    #[test]
    fn log_rows_flush_in_batches() {
        let mut cfg = config();
        cfg.logging.flush_threshold = 5;
        let mut h = harness(cfg);
        for _ in 0..6 {
            h.pipeline.on_record(&record([0.0, 0.0, 9.8, 9.8])).unwrap();
        }

        let batches = h.sink.batches.lock().unwrap();
        // Header batch plus one auto-flush of the six pending rows.
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0][0][0], "count");
        assert_eq!(batches[1].len(), 6);
        assert_eq!(batches[1][0][0], "0");
        assert_eq!(batches[1][0][2..], ["0", "0", "9.8", "9.8"]);
        drop(batches);

        // One more record stays pending until the final drain.
        h.pipeline.on_record(&record([0.0, 0.0, 9.8, 9.8])).unwrap();
        h.pipeline.finish().unwrap();
        let batches = h.sink.batches.lock().unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].len(), 1);
        assert_eq!(batches[2][0][0], "6");
    }

    #[test]
    fn log_destination_is_stable() {
        let mut h = harness(config());
        assert_eq!(h.pipeline.log_destination(), Some("acc_test"));
        h.pipeline.on_record(&record([0.0, 0.0, 9.8, 9.8])).unwrap();
        assert_eq!(h.pipeline.log_destination(), Some("acc_test"));
    }
}
