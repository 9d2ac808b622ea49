//! One render-loop iteration: analysis when due, then a full redraw.

use crate::analyzer::{AnalysisReport, Analyzer, SampleSource, MAX_VALUE};
use crate::display::Renderer;
use std::io;
use std::time::{Duration, Instant};

/// Timing of one iteration of the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Set when an analysis tick ran in this iteration
    pub analysis: Option<AnalysisReport>,
    /// Blend factor the frame was drawn with
    pub blend: u8,
    /// Wall time spent analyzing and drawing
    pub elapsed: Duration,
    /// The iteration took longer than the render interval
    pub overrun: bool,
}

/// Couples an analyzer with its sample source and drives both clocks.
pub struct Session {
    analyzer: Box<dyn Analyzer>,
    source: Box<dyn SampleSource>,
    render_interval: Duration,
    paused: bool,
    overruns: u64,
}

impl Session {
    pub fn new(
        analyzer: Box<dyn Analyzer>,
        source: Box<dyn SampleSource>,
        render_interval: Duration,
    ) -> Self {
        Self {
            analyzer,
            source,
            render_interval,
            paused: false,
            overruns: 0,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Freezes the display on the current analysis, or resumes it.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        tracing::debug!("Analysis {}", if self.paused { "paused" } else { "resumed" });
    }

    /// Number of analysis or render overruns so far.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Runs an analysis tick if one is due.
    pub fn tick_analysis(&mut self, now: Instant) -> Option<AnalysisReport> {
        if self.paused {
            return None;
        }

        let report = self.analyzer.tick(now, self.source.as_mut())?;
        tracing::debug!(
            "Analysis: {}us, window {:?}",
            report.elapsed.as_micros(),
            report.window
        );
        if report.overrun {
            self.overruns += 1;
            tracing::warn!(
                "Analysis took {:?}, longer than the update interval",
                report.elapsed
            );
        }
        Some(report)
    }

    /// Draws every column blended for `now`; returns the blend factor used.
    ///
    /// # Errors
    /// - If the renderer fails to flush
    pub fn tick_render(&mut self, now: Instant, renderer: &mut dyn Renderer) -> io::Result<u8> {
        let blend = if self.paused {
            u8::MAX
        } else {
            self.analyzer.blend_factor(now)
        };

        renderer.clear();
        for x in 0..self.analyzer.bucket_count() {
            renderer.draw_column(x, self.analyzer.get(x, blend), MAX_VALUE);
        }
        renderer.flush()?;
        Ok(blend)
    }

    /// One loop iteration at `now`: at most one analysis tick, then a render.
    ///
    /// # Errors
    /// - If the renderer fails to flush
    pub fn frame(&mut self, now: Instant, renderer: &mut dyn Renderer) -> io::Result<FrameReport> {
        let started = Instant::now();
        let analysis = self.tick_analysis(now);
        let blend = self.tick_render(now, renderer)?;
        let elapsed = started.elapsed();

        let overrun = elapsed > self.render_interval;
        if overrun {
            self.overruns += 1;
            tracing::warn!(
                "Frame took {:?}, longer than the {:?} render interval",
                elapsed,
                self.render_interval
            );
        }

        Ok(FrameReport {
            analysis,
            blend,
            elapsed,
            overrun,
        })
    }

    /// Time left to sleep after a frame that took `elapsed`; zero after an overrun.
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.render_interval.saturating_sub(elapsed)
    }
}
