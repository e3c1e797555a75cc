//! Ratatui terminal frontend: renders the board and overlay texts, translates
//! crossterm events, and paces the session tick at the configured frame rate.

use std::{
    fs::{self, File},
    io::{self, Stdout},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use gridlife_core::{FrameSnapshot, InputAction, Mode, Session, Vec2};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use serde::Serialize;
use tracing::info;

use crate::{Frontend, input::translate_key};

const DEFAULT_HEADLESS_FRAMES: usize = 12;
const MAX_HEADLESS_FRAMES: usize = 360;

/// Interactive terminal frontend.
#[derive(Debug, Default)]
pub struct TerminalFrontend;

impl Frontend for TerminalFrontend {
    fn name(&self) -> &'static str {
        "terminal"
    }

    fn run(&self, session: Session) -> Result<()> {
        if std::env::var_os("GRIDLIFE_TERMINAL_HEADLESS").is_some() {
            let report = run_headless(session)?;
            info!(
                frames = report.summary.frame_count,
                final_generation = report.summary.final_generation,
                final_population = report.summary.final_population,
                "Terminal headless run completed"
            );
            return Ok(());
        }

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enable raw mode")?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to build terminal backend")?;
        terminal.hide_cursor().ok();

        let result = run_event_loop(&mut terminal, session);

        terminal.show_cursor().ok();
        if let Err(err) = disable_raw_mode() {
            tracing::error!(?err, "failed to disable raw mode");
        }
        if let Err(err) = execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        ) {
            tracing::error!(?err, "failed to leave alternate screen");
        }

        result
    }
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut session: Session,
) -> Result<()> {
    let mut screen = Screen::default();
    let frame_interval = Duration::from_millis(1_000 / u64::from(session.config().frame_rate));
    let mut last_tick = Instant::now();

    loop {
        let timeout = frame_interval.saturating_sub(last_tick.elapsed());
        if event::poll(timeout).unwrap_or(false) {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(action) = translate_key(key)
                        && session.apply(action)?
                    {
                        break;
                    }
                }
                Event::Mouse(mouse) => screen.handle_mouse(&mut session, mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= frame_interval {
            let now = Instant::now();
            let dt = now.duration_since(last_tick).as_millis() as u64;
            last_tick = now;

            session.tick(dt);
            let snapshot = session.frame();
            terminal.draw(|frame| screen.draw(frame, &snapshot))?;
        }
    }

    Ok(())
}

/// Draw-side state: the palette and the board area of the last frame, which
/// pointer events are resolved against.
#[derive(Debug, Default)]
struct Screen {
    palette: Palette,
    board_area: Rect,
}

impl Screen {
    fn handle_mouse(&self, session: &mut Session, mouse: MouseEvent) {
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return;
        }
        let area = self.board_area;
        if area.width == 0
            || mouse.column < area.x
            || mouse.row < area.y
            || mouse.column >= area.right()
            || mouse.row >= area.bottom()
        {
            return;
        }
        let scale = session.config().block_size_pixels as i32;
        let position = Vec2::new(
            i32::from(mouse.column - area.x),
            i32::from(mouse.row - area.y),
        ) * scale;
        session.toggle_at(position);
    }

    fn draw(&mut self, frame: &mut Frame<'_>, snapshot: &FrameSnapshot) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(frame.area());

        self.draw_header(frame, outer[0], snapshot);
        self.draw_board(frame, outer[1], snapshot);
    }

    fn draw_header(&self, frame: &mut Frame<'_>, area: Rect, snapshot: &FrameSnapshot) {
        let status = format!(
            "Gen {:>6}  Cells {:>6}  Timer {:>3} ms",
            snapshot.generation, snapshot.population, snapshot.timer_ms,
        );

        let mut line = Line::from(vec![Span::styled(status, self.palette.header_style())]);
        line.spans.push(Span::raw("  "));
        line.spans.push(Span::styled(
            format!(" {} ", snapshot.mode),
            self.palette.mode_style(snapshot.mode),
        ));
        if snapshot.help_visible {
            line.spans.push(Span::raw("  "));
            line.spans
                .push(Span::styled(" HELP ", self.palette.accent_style()));
        }

        let paragraph = Paragraph::new(line).block(
            Block::default()
                .title(self.palette.title("GridLife"))
                .borders(Borders::ALL),
        );
        frame.render_widget(paragraph, area);
    }

    fn draw_board(&mut self, frame: &mut Frame<'_>, area: Rect, snapshot: &FrameSnapshot) {
        let block = Block::default()
            .title(self.palette.title(format!("Board {}", snapshot.bounds)))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.board_area = inner;

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let width = inner.width as i32;
        let height = inner.height as i32;
        let mut rows = vec![vec![' '; width as usize]; height as usize];
        for cell in &snapshot.cells {
            if cell.x < width && cell.y < height {
                rows[cell.y as usize][cell.x as usize] = '█';
            }
        }

        let lines: Vec<Line> = rows
            .into_iter()
            .map(|row| {
                Line::from(Span::styled(
                    row.into_iter().collect::<String>(),
                    self.palette.cell_style(),
                ))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);

        self.draw_overlays(frame, inner, snapshot);
    }

    fn draw_overlays(&self, frame: &mut Frame<'_>, area: Rect, snapshot: &FrameSnapshot) {
        for item in &snapshot.overlays {
            if item.position.x < 0 || item.position.y < 0 {
                continue;
            }
            let x = area.x.saturating_add(item.position.x as u16);
            let y = area.y.saturating_add(item.position.y as u16);
            if x >= area.right() || y >= area.bottom() {
                continue;
            }
            let width = (area.right() - x).min(item.text.chars().count() as u16);
            let style = match item.color {
                Some([r, g, b]) => Style::default()
                    .fg(Color::Rgb(r, g, b))
                    .add_modifier(Modifier::BOLD),
                None => self.palette.overlay_style(),
            };
            frame.render_widget(
                Paragraph::new(item.text.as_str()).style(style),
                Rect::new(x, y, width, 1),
            );
        }
    }
}

#[derive(Debug, Default)]
struct Palette;

impl Palette {
    fn header_style(&self) -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    fn accent_style(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::LightMagenta)
            .add_modifier(Modifier::BOLD)
    }

    fn cell_style(&self) -> Style {
        Style::default().fg(Color::Green)
    }

    fn overlay_style(&self) -> Style {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    fn mode_style(&self, mode: Mode) -> Style {
        let style = Style::default()
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD);
        match mode {
            Mode::Initializing => style.bg(Color::Yellow),
            Mode::Running => style.bg(Color::Green),
            Mode::Paused => style.bg(Color::DarkGray),
            Mode::GameOver => style.bg(Color::Red),
        }
    }

    fn title<T: Into<String>>(&self, title: T) -> Span<'static> {
        Span::styled(title.into(), self.header_style())
    }
}

fn run_headless(mut session: Session) -> Result<HeadlessReport> {
    let backend = ratatui::backend::TestBackend::new(80, 30);
    let mut terminal = Terminal::new(backend).context("failed to build test backend")?;
    let mut screen = Screen::default();
    let mut report = HeadlessReport::default();
    let frames = headless_frame_budget();

    // Start immediately so the paced step path is exercised; one timer
    // interval elapses per simulated frame.
    session
        .apply(InputAction::Start)
        .context("failed to auto-start headless session")?;
    let dt = session.timer_ms();

    for _ in 0..frames {
        session.tick(dt);
        let snapshot = session.frame();
        report.record(&snapshot);
        terminal.draw(|frame| screen.draw(frame, &snapshot))?;
    }

    report.finalize();

    if let Some(path) = report_file_path_from_env() {
        report
            .write_json(&path)
            .with_context(|| format!("failed to write headless report to {}", path.display()))?;
    }

    Ok(report)
}

fn headless_frame_budget() -> usize {
    std::env::var("GRIDLIFE_TERMINAL_HEADLESS_FRAMES")
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .map(|value| value.min(MAX_HEADLESS_FRAMES))
        .unwrap_or(DEFAULT_HEADLESS_FRAMES)
}

fn report_file_path_from_env() -> Option<PathBuf> {
    std::env::var_os("GRIDLIFE_TERMINAL_HEADLESS_REPORT").and_then(|raw| {
        if raw.is_empty() {
            None
        } else {
            Some(PathBuf::from(raw))
        }
    })
}

#[derive(Debug, Clone, Serialize)]
struct FrameStats {
    generation: u64,
    population: usize,
    timer_ms: u64,
    mode: Mode,
}

impl FrameStats {
    fn from_snapshot(snapshot: &FrameSnapshot) -> Self {
        Self {
            generation: snapshot.generation,
            population: snapshot.population,
            timer_ms: snapshot.timer_ms,
            mode: snapshot.mode,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
struct ReportSummary {
    frame_count: usize,
    final_generation: u64,
    final_population: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
struct HeadlessReport {
    frames: Vec<FrameStats>,
    summary: ReportSummary,
}

impl HeadlessReport {
    fn record(&mut self, snapshot: &FrameSnapshot) {
        self.frames.push(FrameStats::from_snapshot(snapshot));
    }

    fn finalize(&mut self) {
        let last = self.frames.last();
        self.summary = ReportSummary {
            frame_count: self.frames.len(),
            final_generation: last.map(|stats| stats.generation).unwrap_or(0),
            final_population: last.map(|stats| stats.population).unwrap_or(0),
        };
    }

    fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self).context("failed to serialize headless report")?;
        Ok(())
    }
}
