//! Transport bar widget - shows tempo, play state, step position, effects and levels

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use fretstep::engine::TransportState;

use super::View;

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Render the transport bar
pub fn render_transport(frame: &mut Frame, area: Rect, view: &View, audio_stats: &AudioStats) {
    let title = format!(" fretstep: {} ", view.title);
    let block = Block::default().title(title).borders(Borders::ALL);

    let (play_symbol, play_state_str, play_color) = match view.state {
        TransportState::Idle => ("■", "Stopped", Color::Yellow),
        TransportState::Scheduled | TransportState::Playing => ("▶", "Playing", Color::Green),
        TransportState::Cancelled => ("■", "Stopping", Color::Yellow),
    };

    let position = match (view.playing_step, view.cursor) {
        (Some(step), _) => format!("Step {}/{}  ", step + 1, view.steps.len()),
        (None, Some(cursor)) => format!("Step {}/{}  ", cursor + 1, view.steps.len()),
        (None, None) => "No steps  ".to_string(),
    };

    let mut spans = vec![
        Span::styled(
            format!(" BPM: {:.0}  ", view.tempo),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!(
                "{}/{}  ",
                view.time_signature.beats_per_measure, view.time_signature.beat_unit
            ),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} {}  ", play_symbol, play_state_str),
            Style::default().fg(play_color),
        ),
        Span::styled(position, Style::default().fg(Color::White)),
        Span::styled(
            format!("Strum: {}  ", view.strum),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Vol: {:.0}%  ", view.volume * 100.0),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    for (name, enabled) in &view.effects {
        spans.push(Span::styled(
            format!("{name} "),
            Style::default().fg(if *enabled { Color::Green } else { Color::DarkGray }),
        ));
    }

    spans.push(Span::styled(
        format!(" {:.1}kHz  ", view.sample_rate / 1000.0),
        Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::styled(
        format!("Peak: {:.2}  RMS: {:.2}", audio_stats.peak, audio_stats.rms),
        Style::default().fg(Color::Magenta),
    ));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
