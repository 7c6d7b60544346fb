//! Main content area rendering (search results, playlists, profile, auth forms)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::{
    ActiveSection, AuthField, ContentState, FormMessage, ProfileField, Track, UiState,
};
use crate::router::Route;
use super::utils::{calculate_num_width, render_scrollable_list, truncate_string};

fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    }
}

fn item_style(is_selected: bool, is_focused: bool, is_playing: bool) -> Style {
    if is_selected && is_focused {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if is_selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else if is_playing {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

pub fn render_main_content(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    current_track_id: Option<&str>,
) {
    let is_focused = ui_state.active_section == ActiveSection::MainContent;

    match ui_state.route {
        Route::Home => render_search_results(frame, area, content_state, is_focused, current_track_id),
        Route::Playlists => render_playlists(frame, area, content_state, is_focused),
        Route::Playlist(_) => render_playlist_detail(frame, area, content_state, is_focused, current_track_id),
        Route::Profile => render_profile(frame, area, content_state),
        Route::Login | Route::Register => {}
    }
}

fn track_items<'a>(
    tracks: &'a [Track],
    selected_index: usize,
    is_focused: bool,
    current_track_id: Option<&str>,
    content_width: usize,
) -> Vec<ListItem<'a>> {
    let num_width = calculate_num_width(tracks.len());
    let title_width = content_width.saturating_sub(num_width + 4);
    tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let is_playing = current_track_id == Some(track.id.as_str());
            let marker = if is_playing { "♪" } else { " " };
            let text = format!(
                "{:>num_width$} {} {}",
                i + 1,
                marker,
                truncate_string(&track.title, title_width),
            );
            ListItem::new(text).style(item_style(i == selected_index, is_focused, is_playing))
        })
        .collect()
}

pub fn render_search_results(
    frame: &mut Frame,
    area: Rect,
    content_state: &ContentState,
    is_focused: bool,
    current_track_id: Option<&str>,
) {
    if content_state.is_searching && content_state.search_results.is_empty() {
        let loading = Paragraph::new("Searching...")
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Results ")
                    .border_style(border_style(is_focused)),
            );
        frame.render_widget(loading, area);
        return;
    }

    if content_state.search_results.is_empty() {
        let content = Paragraph::new("Type in search and press Enter to find music\n\nUse Tab to switch between search and results\nUse ↑/↓ to select, Enter to play, A to add to a playlist")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Results ")
                    .padding(Padding::horizontal(1))
                    .border_style(border_style(is_focused)),
            );
        frame.render_widget(content, area);
        return;
    }

    let title = if content_state.is_searching {
        format!(" Results ({}) - searching... ", content_state.search_results.len())
    } else {
        format!(" Results ({}) ", content_state.search_results.len())
    };
    let content_width = area.width.saturating_sub(4) as usize;
    let items = track_items(
        &content_state.search_results,
        content_state.results_selected,
        is_focused,
        current_track_id,
        content_width,
    );

    render_scrollable_list(
        frame,
        area,
        items,
        content_state.results_selected,
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .padding(Padding::horizontal(1))
            .border_style(border_style(is_focused)),
    );
}

fn render_playlists(frame: &mut Frame, area: Rect, content_state: &ContentState, is_focused: bool) {
    let (list_area, prompt_area) = if content_state.new_playlist_name.is_some() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Playlists (n new, d delete, Enter open) ")
        .padding(Padding::horizontal(1))
        .border_style(border_style(is_focused));

    if content_state.playlists.is_empty() {
        let empty = Paragraph::new("No playlists yet. Press N to create one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, list_area);
    } else {
        let items: Vec<ListItem> = content_state
            .playlists
            .iter()
            .enumerate()
            .map(|(i, playlist)| {
                let style = item_style(i == content_state.playlist_selected, is_focused, false);
                ListItem::new(format!("{} ({} tracks)", playlist.name, playlist.tracks.len())).style(style)
            })
            .collect();
        render_scrollable_list(frame, list_area, items, content_state.playlist_selected, block);
    }

    if let (Some(prompt_area), Some(name)) = (prompt_area, &content_state.new_playlist_name) {
        let prompt = Paragraph::new(name.as_str())
            .style(Style::default().fg(Color::Green))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" New playlist name (Enter to create, Esc to cancel) ")
                    .padding(Padding::horizontal(1))
                    .border_style(Style::default().fg(Color::Green)),
            );
        frame.render_widget(prompt, prompt_area);
    }
}

fn render_playlist_detail(
    frame: &mut Frame,
    area: Rect,
    content_state: &ContentState,
    is_focused: bool,
    current_track_id: Option<&str>,
) {
    let Some(playlist) = content_state.current_playlist() else {
        let missing = Paragraph::new("Playlist not found")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).border_style(border_style(is_focused)));
        frame.render_widget(missing, area);
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} (Enter play, d remove, Esc back) ", playlist.name))
        .padding(Padding::horizontal(1))
        .border_style(border_style(is_focused));

    if playlist.tracks.is_empty() {
        let empty = Paragraph::new("This playlist is empty. Add search results with A.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let items = track_items(
        &playlist.tracks,
        content_state.playlist_track_selected,
        is_focused,
        current_track_id,
        content_width,
    );
    render_scrollable_list(frame, area, items, content_state.playlist_track_selected, block);
}

fn field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let style = if focused {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{:>10}: ", label), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{}{}", value, cursor), style),
    ])
}

fn masked(password: &str) -> String {
    "*".repeat(password.chars().count())
}

fn render_profile(frame: &mut Frame, area: Rect, content_state: &ContentState) {
    let profile = &content_state.profile;
    let mut lines = vec![
        field_line("Username", profile.username.clone(), profile.focused == ProfileField::Username),
        field_line("Password", masked(&profile.password), profile.focused == ProfileField::Password),
        Line::default(),
    ];
    match &profile.message {
        Some(FormMessage::Success(text)) => {
            lines.push(Line::styled(text.clone(), Style::default().fg(Color::Green)));
        }
        Some(FormMessage::Error(text)) => {
            lines.push(Line::styled(text.clone(), Style::default().fg(Color::Red)));
        }
        None => {}
    }
    lines.push(Line::styled(
        "Tab switch field, Enter save field, Esc back",
        Style::default().fg(Color::DarkGray),
    ));

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Profile ")
            .padding(Padding::uniform(1))
            .border_style(Style::default().fg(Color::Green)),
    );
    frame.render_widget(form, area);
}

/// Login or register form, the only thing drawn while signed out
pub fn render_auth_form(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let form = &ui_state.auth_form;
    let (title, hint) = match ui_state.route {
        Route::Register => (" Register ", "Enter create account, Ctrl+L back to login, Esc back"),
        _ => (" Login ", "Enter log in, Ctrl+R create an account, Esc quit"),
    };

    let mut lines = vec![
        field_line("Name", form.name.clone(), form.focused == AuthField::Name),
        field_line("Password", masked(&form.password), form.focused == AuthField::Password),
        Line::default(),
    ];
    if let Some(error) = &form.error {
        lines.push(Line::styled(error.clone(), Style::default().fg(Color::Red)));
    }
    lines.push(Line::styled(hint, Style::default().fg(Color::DarkGray)));

    let popup_width = 60.min(area.width);
    let popup_height = 10.min(area.height);
    let form_area = Rect {
        x: area.x + area.width.saturating_sub(popup_width) / 2,
        y: area.y + area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .padding(Padding::uniform(1))
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(widget, form_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(ui_state: &UiState, content_state: &ContentState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        terminal
            .draw(|frame| {
                if ui_state.route.is_public() {
                    render_auth_form(frame, frame.area(), ui_state);
                } else {
                    render_main_content(frame, frame.area(), ui_state, content_state, Some("b"));
                }
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn home() -> UiState {
        UiState {
            route: Route::Home,
            active_section: ActiveSection::MainContent,
            ..UiState::default()
        }
    }

    fn track(id: &str, title: &str) -> Track {
        Track {
            id: id.to_string(),
            title: title.to_string(),
            thumbnail_url: String::new(),
        }
    }

    #[test]
    fn zero_results_render_without_panicking() {
        let mut content = ContentState::default();
        content.replace_results(Vec::new());
        let text = draw(&home(), &content);
        assert!(text.contains("Type in search"));
    }

    #[test]
    fn results_list_titles() {
        let mut content = ContentState::default();
        content.replace_results(vec![track("a", "First song"), track("b", "Second song")]);
        let text = draw(&home(), &content);
        assert!(text.contains("Results (2)"));
        assert!(text.contains("First song"));
        assert!(text.contains("Second song"));
    }

    #[test]
    fn login_form_masks_password_and_shows_error() {
        let mut ui = UiState::default();
        ui.auth_form.name = "alice".to_string();
        ui.auth_form.password = "secret".to_string();
        ui.auth_form.error = Some("Invalid username or password".to_string());
        let text = draw(&ui, &ContentState::default());
        assert!(text.contains("alice"));
        assert!(text.contains("******"));
        assert!(!text.contains("secret"));
        assert!(text.contains("Invalid username or password"));
    }

    #[test]
    fn profile_shows_inline_message() {
        let ui = UiState {
            route: Route::Profile,
            ..UiState::default()
        };
        let mut content = ContentState::default();
        content.profile.username = "alice".to_string();
        content.profile.message = Some(FormMessage::Success("Username updated successfully".to_string()));
        let text = draw(&ui, &content);
        assert!(text.contains("Username updated successfully"));
    }
}
