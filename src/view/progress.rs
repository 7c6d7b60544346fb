//! Transport bar rendering and the intent helpers behind its keys

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::model::PlaybackState;
use super::utils::format_time;

pub const NO_TRACK_PLACEHOLDER: &str = "Search and select a song to play";

/// Seek seconds for a relative jump, kept inside the track
pub fn seek_target(progress: f64, delta: f64, duration: f64) -> f64 {
    let upper = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
    (progress + delta).clamp(0.0, upper)
}

/// Volume after a slider step, kept in 0..=100
pub fn volume_step(current: u8, delta: i16) -> u8 {
    (current as i16 + delta).clamp(0, 100) as u8
}

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackState) {
    let Some(track) = &playback.current_track else {
        let placeholder = Paragraph::new(format!(" {}", NO_TRACK_PLACEHOLDER))
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Player "));
        frame.render_widget(placeholder, area);
        return;
    };

    let glyph = if playback.is_playing { " ▶" } else { "⏸ " };
    let title = format!("{} {} ", glyph, track.title);

    let repeat_text = if playback.repeat_enabled { "Repeat: On" } else { "Repeat: Off" };
    let controls_info = format!(" {} | Vol: {}% ", repeat_text, playback.volume_percent);

    let time_str = format!(
        "{} / {}",
        format_time(playback.progress_secs),
        format_time(playback.duration_secs)
    );

    let progress_ratio = if playback.duration_secs > 0.0 {
        (playback.progress_secs / playback.duration_secs).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
