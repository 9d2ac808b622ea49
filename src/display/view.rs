//! Terminal emulation of the LED matrix.
//!
//! Draws an [`LedMatrix`] as a grid of round LEDs centered in the terminal, with a
//! one-line status footer, and translates key presses into [`ViewCommand`]s.

use super::{LedMatrix, Renderer};
use crate::config::DisplayMode;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use std::io::{self, Stdout};
use std::time::Duration;

const LED: &str = "●";
const LED_OFF_COLOR: Color = Color::Rgb(38, 38, 38);
const BACKGROUND: Color = Color::Rgb(0, 0, 0);
const FOOTER_COLOR: Color = Color::Rgb(185, 207, 212);

/// User input during playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    /// No key, or a key without a binding
    Continue,
    /// Stop and exit (Escape, 'q' or Ctrl+C)
    Quit,
    /// Freeze or resume analysis (Space)
    TogglePause,
}

/// What the footer shows.
#[derive(Debug, Clone, Default)]
pub struct Status {
    pub mode: DisplayMode,
    pub source: String,
    pub sample_rate: u32,
    pub paused: bool,
    pub analysis: Duration,
    pub overruns: u64,
}

/// Terminal renderer for an LED matrix.
pub struct MatrixView {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    matrix: LedMatrix,
    color: Color,
    status: Status,
    restored: bool,
}

impl MatrixView {
    /// Takes over the terminal: raw mode and the alternate screen.
    ///
    /// # Errors
    /// - If raw mode cannot be enabled
    /// - If the alternate screen cannot be entered
    pub fn new(matrix: LedMatrix, (r, g, b): (u8, u8, u8)) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;

        Ok(Self {
            terminal,
            matrix,
            color: Color::Rgb(r, g, b),
            status: Status::default(),
            restored: false,
        })
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Polls for a key press without blocking.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> io::Result<ViewCommand> {
        if !event::poll(Duration::ZERO)? {
            return Ok(ViewCommand::Continue);
        }

        let Event::Key(key) = event::read()? else {
            return Ok(ViewCommand::Continue);
        };

        Ok(match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                tracing::debug!("Escape or 'q' pressed: quitting");
                ViewCommand::Quit
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                tracing::debug!("Ctrl+C pressed: quitting");
                ViewCommand::Quit
            }
            KeyCode::Char(' ') => {
                tracing::debug!("Space pressed: toggling pause");
                ViewCommand::TogglePause
            }
            _ => ViewCommand::Continue,
        })
    }

    /// Leaves the alternate screen and restores the cursor.
    ///
    /// # Errors
    /// - If raw mode cannot be disabled
    /// - If the alternate screen cannot be left
    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    fn grid_lines(&self) -> Vec<Line<'static>> {
        let lit = Style::default().fg(self.color).bg(BACKGROUND);
        let off = Style::default().fg(LED_OFF_COLOR).bg(BACKGROUND);

        (0..self.matrix.rows())
            .map(|y| {
                let spans: Vec<Span> = (0..self.matrix.columns())
                    .map(|x| {
                        let style = if self.matrix.pixel(x, y) { lit } else { off };
                        Span::styled(format!("{LED} "), style)
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }

    fn footer_line(&self) -> Line<'static> {
        let status = &self.status;
        let indicator = if status.paused {
            Span::styled("⏸ ", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("● ", Style::default().fg(self.color))
        };

        let mut spans = vec![
            indicator,
            Span::raw(format!("{} / {} @ {}Hz", status.mode, status.source, status.sample_rate)),
            Span::raw(format!(" / {:.1}ms", status.analysis.as_secs_f64() * 1000.0)),
        ];
        if status.overruns > 0 {
            spans.push(Span::raw(" / "));
            spans.push(Span::styled(
                format!("{} overruns", status.overruns),
                Style::default().bg(Color::Red).fg(Color::Rgb(255, 255, 255)),
            ));
        }
        Line::from(spans)
    }
}

impl Renderer for MatrixView {
    fn clear(&mut self) {
        self.matrix.clear();
    }

    fn draw_column(&mut self, x: usize, value: u16, max_value: u16) {
        self.matrix.draw_column(x, value, max_value);
    }

    fn flush(&mut self) -> io::Result<()> {
        let grid = self.grid_lines();
        let footer = self.footer_line();
        let grid_width = (self.matrix.columns() * 2) as u16;
        let grid_height = self.matrix.rows() as u16;

        self.terminal.draw(|frame| {
            let area = frame.area();
            let footer_height = 1;
            let content_height = area.height.saturating_sub(footer_height);

            let width = grid_width.min(area.width);
            let height = grid_height.min(content_height);
            let grid_area = Rect {
                x: area.x + (area.width - width) / 2,
                y: area.y + (content_height - height) / 2,
                width,
                height,
            };

            frame.render_widget(
                Paragraph::new("").style(Style::default().bg(BACKGROUND)),
                area,
            );
            frame.render_widget(Paragraph::new(grid), grid_area);

            let footer_area = Rect {
                x: area.x,
                y: area.y + content_height,
                width: area.width,
                height: footer_height.min(area.height),
            };
            frame.render_widget(
                Paragraph::new(footer).style(Style::default().fg(FOOTER_COLOR).bg(BACKGROUND)),
                footer_area,
            );
        })?;

        Ok(())
    }
}

impl Drop for MatrixView {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
