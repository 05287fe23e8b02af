//! Terminal front end for stepwave
//!
//! Provides a TUI showing:
//! - The 4x16 step grid with play head and edit cursor
//! - Waveform of the selected track's analysis tap
//! - Parameters of the selected track
//! - Transport status and key help

mod sampler;
mod waveform;

pub use sampler::{Surface, VisualizationSampler};
pub use waveform::Waveform;

use std::io::Stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tracing::debug;

use crate::engine::Engine;
use crate::sequencer::{ParamSpec, SequencerState, Track, STEPS};

/// Display refresh interval, about 60 fps
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Tempo change per +/- key press
const TEMPO_STEP: u32 = 5;

/// Keeps the latest analyser frame for the waveform widget
#[derive(Default)]
struct Scope {
    bytes: Vec<u8>,
}

impl Surface for Scope {
    fn draw(&mut self, samples: &[u8]) {
        self.bytes.clear();
        self.bytes.extend_from_slice(samples);
    }
}

/// Cursor and editing state of the terminal UI
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub cursor_track: Track,
    pub cursor_step: usize,
    param_index: usize,
    /// Last rejected edit, shown in the status bar
    pub message: Option<String>,
    quit: bool,
}

impl UiState {
    pub fn new(selected: Track) -> Self {
        Self {
            cursor_track: selected,
            cursor_step: 0,
            param_index: 0,
            message: None,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Parameter the `,`/`.` keys edit on `track`
    pub fn active_param(&self, track: Track) -> &'static ParamSpec {
        let specs = track.params();
        &specs[self.param_index % specs.len()]
    }

    /// Apply one key press to the engine and the cursor
    pub fn handle_key(&mut self, engine: &Engine, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.message = None;

        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => self.quit = true,
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => self.quit = true,
            (KeyCode::Char(' '), _) => {
                engine.toggle_playing();
            }
            (KeyCode::Char(c @ '1'..='4'), _) => {
                let track = Track::ALL[c as usize - '1' as usize];
                engine.select_track(track);
                self.cursor_track = track;
                self.param_index = 0;
            }
            (KeyCode::Up, _) => {
                self.cursor_track = Track::ALL[(self.cursor_track.index() + 3) % 4];
            }
            (KeyCode::Down, _) => {
                self.cursor_track = Track::ALL[(self.cursor_track.index() + 1) % 4];
            }
            (KeyCode::Left, _) => self.cursor_step = (self.cursor_step + STEPS - 1) % STEPS,
            (KeyCode::Right, _) => self.cursor_step = (self.cursor_step + 1) % STEPS,
            (KeyCode::Enter, _) | (KeyCode::Char('x'), _) => {
                if let Err(err) = engine.toggle_step(self.cursor_track, self.cursor_step) {
                    self.message = Some(err.to_string());
                }
            }
            (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => {
                let tempo = engine.snapshot().tempo();
                engine.set_tempo(tempo + TEMPO_STEP);
            }
            (KeyCode::Char('-'), _) => {
                let tempo = engine.snapshot().tempo();
                engine.set_tempo(tempo.saturating_sub(TEMPO_STEP));
            }
            (KeyCode::Tab, _) => {
                let count = engine.snapshot().selected().params().len();
                self.param_index = (self.param_index + 1) % count;
            }
            (KeyCode::Char(','), _) => self.nudge(engine, -1),
            (KeyCode::Char('.'), _) => self.nudge(engine, 1),
            _ => {}
        }
    }

    fn nudge(&mut self, engine: &Engine, steps: i32) {
        let track = engine.snapshot().selected();
        let spec = self.active_param(track);
        match engine.nudge_parameter(track, spec.name, steps) {
            Ok(value) => debug!(%track, param = spec.name, value, "nudged"),
            Err(err) => self.message = Some(err.to_string()),
        }
    }
}

/// Run the terminal UI until the user quits
pub fn run_tui(engine: &Engine) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, engine);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, engine: &Engine) -> Result<()> {
    let sampler = engine.visualizer();
    let mut ui = UiState::new(engine.snapshot().selected());
    let mut scope = Scope::default();

    while !ui.should_quit() {
        sampler.frame(Some(&mut scope));
        let state = engine.snapshot();

        terminal.draw(|f| draw_ui(f, &state, &ui, &scope.bytes))?;

        if event::poll(FRAME_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                ui.handle_key(engine, key);
            }
        }
    }

    Ok(())
}

fn draw_ui(f: &mut Frame, state: &SequencerState, ui: &UiState, scope: &[u8]) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),   // Grid
            Constraint::Min(5),      // Waveform
            Constraint::Length(3),   // Parameters
            Constraint::Length(3),   // Status
        ])
        .split(area);

    draw_grid(f, chunks[0], state, ui);
    draw_waveform(f, chunks[1], state, scope);
    draw_params(f, chunks[2], state, ui);
    draw_status(f, chunks[3], state, ui);
}

fn draw_grid(f: &mut Frame, area: Rect, state: &SequencerState, ui: &UiState) {
    let lines: Vec<Line> = Track::ALL
        .into_iter()
        .map(|track| {
            let pattern = state.pattern(track);
            let label_style = if track == state.selected() {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let mut spans = vec![Span::styled(format!(" {:<7}", track.name()), label_style)];
            for (step, &gate) in pattern.gates().iter().enumerate() {
                let mut style = Style::default();
                if step == state.current_step() && state.is_playing() {
                    style = style.bg(Color::DarkGray);
                }
                if track == ui.cursor_track && step == ui.cursor_step {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                let symbol = if gate { " ■" } else { " ·" };
                spans.push(Span::styled(
                    symbol,
                    if gate { style.fg(Color::Green) } else { style },
                ));
            }
            Line::from(spans)
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" Pattern ");
    let grid = Paragraph::new(lines).block(block);
    f.render_widget(grid, area);
}

fn draw_waveform(f: &mut Frame, area: Rect, state: &SequencerState, scope: &[u8]) {
    let title = format!(" Waveform: {} ", state.selected());
    let waveform = Waveform::new(scope)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(waveform, area);
}

fn draw_params(f: &mut Frame, area: Rect, state: &SequencerState, ui: &UiState) {
    let track = state.selected();
    let params = state.params(track);
    let active = ui.active_param(track);

    let mut spans = vec![Span::raw(" ")];
    for spec in track.params() {
        let value = params.get(spec.name).unwrap_or(spec.min);
        let text = format!("{} {:.2}  ", spec.name, value);
        if spec.name == active.name {
            spans.push(Span::styled(text, Style::default().fg(Color::Yellow)));
        } else {
            spans.push(Span::raw(text));
        }
    }
    if track == Track::Sample && state.sample().is_none() {
        spans.push(Span::styled("(no sample loaded)", Style::default().fg(Color::DarkGray)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", track)));
    f.render_widget(paragraph, area);
}

fn draw_status(f: &mut Frame, area: Rect, state: &SequencerState, ui: &UiState) {
    let (status, status_color) = if state.is_playing() {
        ("PLAYING", Color::Green)
    } else {
        ("PAUSED", Color::Yellow)
    };

    let mut spans = vec![
        Span::raw("  "),
        Span::styled(status, Style::default().fg(status_color)),
        Span::raw(format!("  {} BPM  |  ", state.tempo())),
    ];
    match &ui.message {
        Some(message) => spans.push(Span::styled(message.clone(), Style::default().fg(Color::Red))),
        None => spans.push(Span::raw(
            "space play  1-4 track  arrows move  x toggle  +/- tempo  tab/,/. param  q quit",
        )),
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(paragraph, area);
}
