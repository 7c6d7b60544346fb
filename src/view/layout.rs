//! Layout rendering (top bar with search and navigation)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use crate::model::{ActiveSection, UiState};
use crate::router::Route;

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(44), // Navbar
        ])
        .split(area);

    let search_focused =
        ui_state.route == Route::Home && ui_state.active_section == ActiveSection::Search;
    let search_style = if search_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if ui_state.search_query.is_empty() {
        "Type to search..."
    } else {
        &ui_state.search_query
    };

    let search = Paragraph::new(search_text)
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .padding(Padding::horizontal(1))
                .border_style(if search_focused {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }),
        );
    frame.render_widget(search, chunks[0]);

    render_navbar(frame, chunks[1], ui_state);
}

fn render_navbar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let tabs = [
        ("1", "Home", matches!(ui_state.route, Route::Home)),
        ("2", "Playlists", matches!(ui_state.route, Route::Playlists | Route::Playlist(_))),
        ("3", "Profile", matches!(ui_state.route, Route::Profile)),
    ];

    let mut spans = Vec::new();
    for (key, label, active) in tabs {
        let style = if active {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(key.to_string(), Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(format!(" {label}  "), style));
    }

    let user = ui_state.user_name.as_deref().unwrap_or("");
    let navbar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", user))
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(navbar, area);
}
