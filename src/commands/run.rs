//! The visualizer: capture, analyze, render until the user quits.

use crate::analyzer::{self, SampleSource, Settings, ToneSource};
use crate::capture::{Microphone, WavSource};
use crate::config::{DisplayMode, LedspecConfig};
use crate::display::{LedMatrix, MatrixView, Status, ViewCommand};
use crate::session::Session;
use crate::ui::ErrorScreen;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Amplitude of the `--tone` demo signal, about three quarters of full scale.
const TONE_AMPLITUDE: u16 = 1500;

/// Command-line overrides for a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub mode: Option<DisplayMode>,
    pub tone: Option<f32>,
    pub wav: Option<PathBuf>,
    pub device: Option<String>,
}

impl RunOptions {
    fn apply(&self, config: &mut LedspecConfig) {
        if let Some(mode) = self.mode {
            config.display.mode = mode;
        }
        if let Some(device) = &self.device {
            config.audio.device = device.clone();
        }
    }
}

/// Runs the visualizer until `q`, Escape, Ctrl+C, SIGINT or SIGTERM.
///
/// # Errors
/// - If the configuration is missing, malformed or invalid
/// - If the sample source cannot be opened
/// - If the terminal cannot be driven
pub fn handle_run(options: RunOptions) -> anyhow::Result<()> {
    tracing::info!("=== ledspec started ===");

    let mut config = match LedspecConfig::load() {
        Ok(config) => config,
        Err(err) => return fail("Configuration Error", err),
    };
    options.apply(&mut config);

    // Validate against the requested rate before sizing any buffer.
    if let Err(err) = Settings::new(&config, config.audio.sample_rate) {
        return fail("Configuration Error", anyhow::anyhow!("Invalid configuration: {err}"));
    }

    let (source, label) = match open_source(&options, &config) {
        Ok(opened) => opened,
        Err(err) => return fail("Audio Error", err),
    };

    let settings = match Settings::new(&config, source.sample_rate()) {
        Ok(settings) => settings,
        Err(err) => {
            return fail(
                "Configuration Error",
                anyhow::anyhow!("Invalid configuration at {}Hz: {err}", source.sample_rate()),
            )
        }
    };

    tracing::info!(
        "Configuration: mode={}, source={}, {}Hz, {} samples, {}x{} matrix, update {:?}, render {:?}",
        config.display.mode,
        label,
        settings.sample_rate,
        settings.transform_size,
        settings.bucket_count,
        settings.rows,
        settings.update_interval,
        settings.render_interval
    );

    let analyzer = analyzer::build(config.display.mode, &settings);
    let mut session = Session::new(analyzer, source, settings.render_interval);

    let term = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&term))
            .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;
    }

    let matrix = LedMatrix::new(settings.bucket_count, settings.rows, config.display.invert);
    let mut view = MatrixView::new(matrix, config.display.rgb())
        .map_err(|e| anyhow::anyhow!("Failed to initialize display: {e}"))?;

    let mut status = Status {
        mode: config.display.mode,
        source: label,
        sample_rate: settings.sample_rate,
        ..Status::default()
    };

    let result = render_loop(&mut session, &mut view, &mut status, &term);

    view.cleanup()
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;
    result?;

    tracing::info!(
        "=== ledspec exited ({} overruns) ===",
        session.overruns()
    );
    Ok(())
}

fn render_loop(
    session: &mut Session,
    view: &mut MatrixView,
    status: &mut Status,
    term: &AtomicBool,
) -> anyhow::Result<()> {
    let mut frame_count = 0u64;

    loop {
        if term.load(Ordering::Relaxed) {
            tracing::info!("Received termination signal");
            return Ok(());
        }

        match view.handle_input() {
            Ok(ViewCommand::Continue) => {}
            Ok(ViewCommand::Quit) => return Ok(()),
            Ok(ViewCommand::TogglePause) => session.toggle_pause(),
            Err(e) => {
                tracing::error!("Input handling error: {}", e);
                return Err(anyhow::anyhow!("Input handling error: {e}"));
            }
        }

        status.paused = session.is_paused();
        status.overruns = session.overruns();
        view.set_status(status.clone());

        let report = session
            .frame(Instant::now(), view)
            .map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;
        if let Some(analysis) = report.analysis {
            status.analysis = analysis.elapsed;
        }

        frame_count += 1;
        if frame_count.is_multiple_of(300) {
            tracing::debug!(
                "{} frames rendered, last took {:?}",
                frame_count,
                report.elapsed
            );
        }

        let remaining = session.remaining(report.elapsed);
        if remaining > Duration::ZERO {
            std::thread::sleep(remaining);
        }
    }
}

/// Opens the sample source the options ask for: tone, WAV file, or microphone.
fn open_source(
    options: &RunOptions,
    config: &LedspecConfig,
) -> anyhow::Result<(Box<dyn SampleSource>, String)> {
    let size = config.analyzer.transform_size;
    let rate = config.audio.sample_rate;

    if let Some(frequency) = options.tone {
        if !(frequency.is_finite() && frequency >= 0.0) {
            return Err(anyhow::anyhow!("Invalid tone frequency: {frequency}"));
        }
        tracing::info!("Using a {}Hz test tone", frequency);
        let source = ToneSource::new(size, rate, frequency, TONE_AMPLITUDE);
        return Ok((Box::new(source), format!("tone {frequency}Hz")));
    }

    if let Some(path) = &options.wav {
        let source = WavSource::open(path, rate, size)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        return Ok((Box::new(source), name));
    }

    let microphone = Microphone::open(&config.audio.device, rate, size)?;
    let label = microphone.device_name().to_string();
    Ok((Box::new(microphone), label))
}

/// Shows `err` on an error screen, logs it, and returns it.
fn fail(title: &str, err: anyhow::Error) -> anyhow::Result<()> {
    tracing::error!("{title}: {err}");
    let message = format!(
        "{err}\n\nPlease check ~/.config/ledspec/ledspec.toml and your audio setup, then try again."
    );
    if let Err(screen_err) = ErrorScreen::show(title, &message) {
        tracing::warn!("Failed to show error screen: {}", screen_err);
    }
    Err(err)
}
