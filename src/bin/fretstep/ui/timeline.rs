//! Timeline widget - the recorded steps as tablature, with cursor and playhead

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use fretstep::{sequencing::NUM_STRINGS, tuning};

use super::View;

/// Characters per step column
const COLUMN_WIDTH: usize = 4;

/// Render the tablature grid with the current step and playhead
pub fn render_timeline(frame: &mut Frame, area: Rect, view: &View) {
    if area.height < 2 || area.width < 20 {
        return;
    }

    let label_width = 4usize;
    let visible = (area.width as usize).saturating_sub(label_width) / COLUMN_WIDTH;
    if visible == 0 {
        return;
    }

    // Scroll so the playhead (or the cursor) stays on screen
    let focus = view.playing_step.or(view.cursor).unwrap_or(0);
    let first = (focus + 1).saturating_sub(visible);
    let last = (first + visible).min(view.steps.len());

    let mut lines = Vec::new();

    // Step numbers
    let mut header = " ".repeat(label_width);
    for index in first..last {
        header.push_str(&format!("{:<width$}", index + 1, width = COLUMN_WIDTH));
    }
    lines.push(Line::from(Span::styled(header, Style::default().fg(Color::DarkGray))));

    // One row per string, high E on top
    for string in 0..NUM_STRINGS {
        let open = tuning::note_name_of(string, 0);
        let mut spans = vec![Span::styled(
            format!("{:<2}| ", open.name()),
            Style::default().fg(Color::White),
        )];

        for (index, step) in view.steps.iter().enumerate().take(last).skip(first) {
            let cell = match step.fret_on(string as u8) {
                Some(note) if note.is_rest => "r".to_string(),
                Some(note) => note.fret().to_string(),
                None => "-".to_string(),
            };
            let cell = format!("{:-<width$}", cell, width = COLUMN_WIDTH);

            let sounding = step
                .fret_on(string as u8)
                .is_some_and(|n| view.sounding.contains(&n.key()));
            let style = if view.playing_step == Some(index) {
                let style = Style::default().fg(Color::Black).bg(Color::Yellow);
                if sounding {
                    style.add_modifier(Modifier::BOLD)
                } else {
                    style
                }
            } else if view.cursor == Some(index) {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(cell, style));
        }

        lines.push(Line::from(spans));
    }

    // Playhead row
    let mut playhead_str = " ".repeat(label_width);
    if let Some(step) = view.playing_step.filter(|s| (first..last).contains(s)) {
        playhead_str.push_str(&" ".repeat((step - first) * COLUMN_WIDTH));
        playhead_str.push('▲');
    }
    lines.push(Line::from(Span::styled(
        playhead_str,
        Style::default().fg(Color::Yellow),
    )));

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, area);
}
