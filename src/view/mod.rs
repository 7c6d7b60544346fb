//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Top bar with search input and navbar
//! - `content`: Main content area and the login/register forms
//! - `progress`: Transport bar and its intent helpers
//! - `overlays`: Modal overlays (error, help)

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

pub use progress::{seek_target, volume_step};
pub use utils::format_time;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{ContentState, PlaybackState, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, playback: &PlaybackState, ui_state: &UiState, content_state: &ContentState) {
        // Signed out: only the login/register forms
        if ui_state.user_name.is_none() || ui_state.route.is_public() {
            content::render_auth_form(frame, frame.area(), ui_state);
            if ui_state.error_message.is_some() {
                overlays::render_error_notification(frame, ui_state);
            }
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + navbar
                Constraint::Min(0),    // Main content
                Constraint::Length(3), // Transport
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state);

        content::render_main_content(
            frame,
            chunks[1],
            ui_state,
            content_state,
            playback.current_track_id(),
        );

        progress::render_progress_bar(frame, chunks[2], playback);

        // Error notification overlay (if there's an error)
        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        // Help popup overlay (if open)
        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Route;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(ui_state: &UiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal
            .draw(|frame| {
                AppView::render(frame, &PlaybackState::with_volume(80), ui_state, &ContentState::default())
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

    #[test]
    fn signed_out_sees_only_the_form() {
        let text = draw(&UiState::default());
        assert!(text.contains("Login"));
        assert!(!text.contains("Search"));
        assert!(!text.contains("Search and select a song to play"));
    }

    #[test]
    fn signed_in_sees_search_and_transport() {
        let ui = UiState {
            route: Route::Home,
            user_name: Some("alice".to_string()),
            ..UiState::default()
        };
        let text = draw(&ui);
        assert!(text.contains("Search"));
        assert!(text.contains("alice"));
        assert!(text.contains("Search and select a song to play"));
    }
}
