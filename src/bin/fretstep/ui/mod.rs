//! TUI module for fretstep
//!
//! Shows the transport, the recorded steps as tablature and the playhead.

mod timeline;
mod transport;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fretstep::{
    engine::{PlaybackEvent, TransportState},
    sequencing::{Step, StrumDirection, TimeSignature},
    Session, SessionEvent,
};

use timeline::render_timeline;
use transport::{render_transport, AudioStats};

/// Samples used for the level meter
const VIS_BUFFER_SIZE: usize = 1024;
/// Tempo change per key press
const TEMPO_STEP: f64 = 5.0;

/// Snapshot of the session taken once per frame
pub struct View {
    pub title: String,
    pub sample_rate: f32,
    pub tempo: f64,
    pub time_signature: TimeSignature,
    pub volume: f32,
    pub strum: StrumDirection,
    pub state: TransportState,
    pub steps: Vec<Step>,
    pub cursor: Option<usize>,
    pub playing_step: Option<usize>,
    /// (name, enabled) in chain order
    pub effects: Vec<(String, bool)>,
    /// (string, fret) of notes currently sounding
    pub sounding: Vec<(u8, u8)>,
}

/// UI application state
pub struct UiApp {
    session: Arc<Mutex<Session>>,
    events_rx: Consumer<PlaybackEvent>,
    audio_rx: Consumer<f32>,
    audio_buffer: Vec<f32>,
    sounding: Vec<(u8, u8)>,
    status: String,
    title: String,
    sample_rate: f32,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        session: Arc<Mutex<Session>>,
        events_rx: Consumer<PlaybackEvent>,
        audio_rx: Consumer<f32>,
        sample_rate: f32,
        title: String,
    ) -> Self {
        Self {
            session,
            events_rx,
            audio_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            sounding: Vec::new(),
            status: String::new(),
            title,
            sample_rate,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_events();

            let Some(view) = self.snapshot() else {
                self.status = "session lock poisoned".to_string();
                break;
            };
            terminal.draw(|frame| self.render(frame, &view))?;

            // Non-blocking, ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Keep the last VIS_BUFFER_SIZE samples
    fn poll_audio(&mut self) {
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn poll_events(&mut self) {
        while let Ok(event) = self.events_rx.pop() {
            match event {
                PlaybackEvent::NoteSounding { string, fret, .. } => {
                    self.sounding.push((string, fret));
                }
                PlaybackEvent::NoteSilenced { string, fret, .. } => {
                    self.sounding.retain(|&n| n != (string, fret));
                }
                PlaybackEvent::Finished | PlaybackEvent::Cancelled => {
                    self.sounding.clear();
                }
                PlaybackEvent::StepStarted { .. } => {}
            }
        }
    }

    fn snapshot(&self) -> Option<View> {
        let mut session = self.session.lock().ok()?;
        let config = *session.config();
        let view = View {
            title: self.title.clone(),
            sample_rate: self.sample_rate,
            tempo: config.tempo_bpm(),
            time_signature: config.time_signature,
            volume: config.volume(),
            strum: session.strum_direction(),
            state: session.transport_state(),
            steps: session.store().steps().to_vec(),
            cursor: session.current_step(),
            playing_step: session.playing_step(),
            effects: session
                .effects()
                .settings()
                .into_iter()
                .map(|s| (s.name, s.enabled))
                .collect(),
            sounding: self.sounding.clone(),
        };
        // Session events other than rejections are reflected by the snapshot
        session.take_events();
        Some(view)
    }

    fn handle_key(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
            self.should_quit = true;
            return;
        }

        let Ok(mut session) = self.session.lock() else {
            return;
        };
        self.status.clear();

        match key {
            KeyCode::Char(' ') => {
                if session.is_playing() {
                    session.stop();
                } else {
                    let _ = session.play();
                }
            }
            KeyCode::Left => {
                let _ = session.previous();
            }
            KeyCode::Right => {
                let _ = session.next();
            }
            KeyCode::Home => {
                let _ = session.goto_step(0);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let bpm = session.config().tempo_bpm() + TEMPO_STEP;
                let _ = session.set_tempo(bpm);
            }
            KeyCode::Char('-') => {
                let bpm = (session.config().tempo_bpm() - TEMPO_STEP).max(TEMPO_STEP);
                let _ = session.set_tempo(bpm);
            }
            KeyCode::Char('t') => {
                let current = session.config().time_signature;
                let common = TimeSignature::COMMON;
                let next = common
                    .iter()
                    .position(|ts| *ts == current)
                    .map_or(0, |i| (i + 1) % common.len());
                let ts = common[next];
                let _ = session.set_time_signature(ts.beats_per_measure as u32, ts.beat_unit as u32);
            }
            KeyCode::Char('s') => {
                let dir = session.strum_direction().toggled();
                session.set_strum_direction(dir);
            }
            KeyCode::Char('d') => toggle_effect(&mut session, "distortion"),
            KeyCode::Char('v') => toggle_effect(&mut session, "bend"),
            _ => {}
        }

        for event in session.take_events() {
            if let SessionEvent::Rejected(msg) = event {
                self.status = msg;
            }
        }
    }

    fn render(&self, frame: &mut Frame, view: &View) {
        let area = frame.area();

        // Main layout: transport, tablature, status, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(9),    // Tablature
                Constraint::Length(1), // Status
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_transport(frame, chunks[0], view, &stats);

        let timeline_block = Block::default().title(" Steps ").borders(Borders::ALL);
        let timeline_inner = timeline_block.inner(chunks[1]);
        frame.render_widget(timeline_block, chunks[1]);
        render_timeline(frame, timeline_inner, view);

        let status = Paragraph::new(format!(" {}", self.status)).style(Style::default().fg(Color::Red));
        frame.render_widget(status, chunks[2]);

        let help = Paragraph::new(
            " [Q] Quit  [Space] Play/Stop  [←/→] Step  [+/-] Tempo  [T] Time sig  [S] Strum  [D] Distortion  [V] Bend",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}

fn toggle_effect(session: &mut Session, name: &str) {
    let enabled = session.effects().is_enabled(name).unwrap_or(false);
    if let Err(err) = session.effects_mut().set_enabled(name, !enabled) {
        log::warn!("cannot toggle {name}: {err}");
    }
}
