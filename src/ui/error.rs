//! Full-screen error message shown when the visualizer cannot start.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::time::Duration;

/// Red error panel that waits for a key press.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// Shows `title` and `message` until a key is pressed, then restores the terminal.
    ///
    /// # Errors
    /// - If the terminal cannot be set up or drawn to
    pub fn show(title: &str, message: &str) -> anyhow::Result<()> {
        let mut screen = Self::new()?;
        let result = screen.wait(title, message);
        screen.cleanup()?;
        result
    }

    fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    fn wait(&mut self, title: &str, message: &str) -> anyhow::Result<()> {
        let panel = Style::default()
            .fg(Color::Rgb(255, 255, 255))
            .bg(Color::Rgb(160, 20, 10));

        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                let width = (area.width * 4 / 5).max(20).min(area.width);
                let height = 7.min(area.height);
                let panel_area = Rect {
                    x: area.x + (area.width - width) / 2,
                    y: area.y + (area.height - height) / 2,
                    width,
                    height,
                };

                let text = vec![
                    Line::from(message.to_string()),
                    Line::from(""),
                    Line::from("Press any key to exit").style(Style::default().italic()),
                ];
                let paragraph = Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .style(panel)
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .title(format!(" {title} "))
                            .style(panel),
                    );
                frame.render_widget(paragraph, panel_area);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    return Ok(());
                }
            }
        }
    }

    fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
