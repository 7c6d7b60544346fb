//! Routes, search, session, playlists and profile

use crate::model::FormMessage;
use crate::router::{guard, Route};

use super::AppController;

impl AppController {
    /// Move to a route, applying the access policy and per-page loading
    pub async fn navigate(&self, requested: Route) {
        let authenticated = self.users.is_authenticated().await;
        let route = guard(requested, authenticated);
        if route != requested {
            tracing::debug!(requested = %requested, resolved = %route, "Route redirected");
        }

        match route {
            Route::Playlists => {
                self.refresh_playlists().await;
                self.model.open_playlist(None).await;
            }
            Route::Playlist(id) => {
                self.refresh_playlists().await;
                let owner = self.users.current_user().await.map(|u| u.id);
                let owned = self
                    .playlists
                    .get(id)
                    .await
                    .is_some_and(|p| Some(p.owner) == owner);
                if !owned {
                    tracing::warn!(playlist_id = %id, "Playlist not found");
                    self.model.set_error("Playlist not found.".to_string()).await;
                    self.model.open_playlist(None).await;
                    self.model.set_route(Route::Playlists).await;
                    return;
                }
                self.model.open_playlist(Some(id)).await;
            }
            Route::Profile => {
                let name = self
                    .users
                    .current_user()
                    .await
                    .map(|u| u.name)
                    .unwrap_or_default();
                self.model.reset_profile_form(name).await;
            }
            _ => {}
        }

        self.model.set_route(route).await;
    }

    /// Pick up a persisted session at startup and open the requested page
    pub async fn restore_session(&self, start: Route) {
        let user = self.users.current_user().await;
        if let Some(user) = &user {
            tracing::info!(user_id = %user.id, "Restored session");
        }
        self.model.set_user_name(user.map(|u| u.name)).await;
        self.navigate(start).await;
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Run a search; failures leave the previous results in place
    pub async fn perform_search(&self, query: &str) {
        self.model.set_searching(true).await;
        match self.search.search(query).await {
            Ok(tracks) => {
                tracing::debug!(query, results = tracks.len(), "Search results received");
                self.model.replace_search_results(tracks).await;
            }
            Err(e) => {
                tracing::error!(error = %e, query, "Error searching videos");
                self.model.set_searching(false).await;
            }
        }
    }

    /// Search in the background so the UI keeps drawing
    pub fn spawn_search(&self, query: String) {
        let controller = self.clone();
        tokio::spawn(async move {
            controller.perform_search(&query).await;
        });
    }

    // ========================================================================
    // Session
    // ========================================================================

    pub async fn submit_auth_form(&self) {
        let ui_state = self.model.get_ui_state().await;
        let form = ui_state.auth_form;
        let result = match ui_state.route {
            Route::Register => self.users.register(&form.name, &form.password).await,
            Route::Login => self.users.login(&form.name, &form.password).await,
            _ => return,
        };

        match result {
            Ok(user) => {
                self.model.set_user_name(Some(user.name)).await;
                self.navigate(Route::Home).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, route = %ui_state.route, "Authentication failed");
                self.model.set_auth_error(Some(Self::format_store_error(&e))).await;
            }
        }
    }

    pub async fn logout(&self) {
        if self.model.is_playing().await {
            self.model.set_playing(false).await;
            self.player.set_playing(false).await;
        }
        if let Err(e) = self.users.logout().await {
            tracing::error!(error = %e, "Logout failed");
            self.model.set_error(Self::format_store_error(&e)).await;
            return;
        }
        self.model.set_user_name(None).await;
        self.navigate(Route::Login).await;
    }

    // ========================================================================
    // Playlists
    // ========================================================================

    pub async fn refresh_playlists(&self) {
        let playlists = match self.users.current_user().await {
            Some(user) => self.playlists.list(user.id).await,
            None => Vec::new(),
        };
        self.model.set_playlists(playlists).await;
    }

    pub async fn create_playlist(&self, name: &str) {
        let Some(user) = self.users.current_user().await else {
            return;
        };
        if let Err(e) = self.playlists.create(user.id, name).await {
            tracing::warn!(error = %e, "Create playlist failed");
            self.model.set_error(Self::format_store_error(&e)).await;
        }
        self.refresh_playlists().await;
    }

    pub async fn delete_selected_playlist(&self) {
        let Some(playlist) = self.model.get_selected_playlist().await else {
            return;
        };
        if let Err(e) = self.playlists.delete(playlist.id).await {
            tracing::warn!(error = %e, playlist_id = %playlist.id, "Delete playlist failed");
            self.model.set_error(Self::format_store_error(&e)).await;
        }
        self.refresh_playlists().await;
    }

    pub async fn open_selected_playlist(&self) {
        if let Some(playlist) = self.model.get_selected_playlist().await {
            self.navigate(Route::Playlist(playlist.id)).await;
        }
    }

    /// Add the highlighted search result to the highlighted playlist
    pub async fn add_selected_result_to_playlist(&self) {
        let Some(track) = self.model.get_selected_result().await else {
            return;
        };
        self.refresh_playlists().await;
        let Some(playlist) = self.model.get_selected_playlist().await else {
            self.model
                .set_error("Create a playlist first (Playlists page, n).".to_string())
                .await;
            return;
        };

        match self.playlists.add_track(playlist.id, track).await {
            Ok(true) => tracing::info!(playlist = %playlist.name, "Track added to playlist"),
            Ok(false) => {
                self.model
                    .set_error(format!("Already in '{}'.", playlist.name))
                    .await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Add to playlist failed");
                self.model.set_error(Self::format_store_error(&e)).await;
            }
        }
        self.refresh_playlists().await;
    }

    pub async fn remove_selected_playlist_track(&self) {
        let Some((playlist_id, track)) = self.model.get_selected_playlist_track().await else {
            return;
        };
        if let Err(e) = self.playlists.remove_track(playlist_id, &track.id).await {
            tracing::warn!(error = %e, "Remove from playlist failed");
            self.model.set_error(Self::format_store_error(&e)).await;
        }
        self.refresh_playlists().await;
    }

    pub async fn play_selected_playlist_track(&self) {
        if let Some((_, track)) = self.model.get_selected_playlist_track().await {
            self.select_track(track).await;
        }
    }

    // ========================================================================
    // Profile
    // ========================================================================

    pub async fn submit_profile_field(&self) {
        let profile = self.model.get_content_state().await.profile;
        self.model.set_profile_message(None).await;

        let message = match profile.focused {
            crate::model::ProfileField::Username => {
                match self.users.update_username(&profile.username).await {
                    Ok(user) => {
                        self.model.set_user_name(Some(user.name)).await;
                        FormMessage::Success("Username updated successfully".to_string())
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Username update failed");
                        FormMessage::Error("Failed to update username".to_string())
                    }
                }
            }
            crate::model::ProfileField::Password => {
                match self.users.update_password(&profile.password).await {
                    Ok(()) => {
                        self.model.clear_profile_password().await;
                        FormMessage::Success("Password updated successfully".to_string())
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Password update failed");
                        FormMessage::Error("Failed to update password".to_string())
                    }
                }
            }
        };
        self.model.set_profile_message(Some(message)).await;
    }
}

#[cfg(test)]
mod tests {
    use crate::controller::test_support::{harness, harness_sharing, track, StubReply};
    use crate::model::FormMessage;
    use crate::router::Route;

    async fn register(h: &crate::controller::test_support::Harness, name: &str) {
        h.controller.navigate(Route::Register).await;
        for c in name.chars() {
            h.controller.model.auth_form_input(c).await;
        }
        h.controller.model.auth_form_next_field().await;
        for c in "secret".chars() {
            h.controller.model.auth_form_input(c).await;
        }
        h.controller.submit_auth_form().await;
    }

    #[tokio::test]
    async fn anonymous_navigation_redirects_to_login() {
        let h = harness();
        h.controller.navigate(Route::Playlists).await;
        assert_eq!(h.controller.model.route().await, Route::Login);
    }

    #[tokio::test]
    async fn registering_lands_on_home_and_login_redirects() {
        let h = harness();
        register(&h, "alice").await;
        assert_eq!(h.controller.model.route().await, Route::Home);
        assert_eq!(h.controller.model.get_ui_state().await.user_name.as_deref(), Some("alice"));

        h.controller.navigate(Route::Login).await;
        assert_eq!(h.controller.model.route().await, Route::Home);
    }

    #[tokio::test]
    async fn failed_login_shows_inline_error() {
        let h = harness();
        h.controller.navigate(Route::Login).await;
        h.controller.model.auth_form_input('x').await;
        h.controller.submit_auth_form().await;

        let ui = h.controller.model.get_ui_state().await;
        assert_eq!(ui.route, Route::Login);
        assert_eq!(ui.auth_form.error.as_deref(), Some("Invalid username or password"));
    }

    #[tokio::test]
    async fn logout_returns_to_login() {
        let h = harness();
        register(&h, "bob").await;
        h.controller.logout().await;

        assert_eq!(h.controller.model.route().await, Route::Login);
        h.controller.navigate(Route::Profile).await;
        assert_eq!(h.controller.model.route().await, Route::Login);
    }

    #[tokio::test]
    async fn restored_session_opens_requested_page() {
        let h = harness();
        register(&h, "gina").await;

        let fresh = harness_sharing(&h);
        fresh.controller.restore_session(Route::Playlists).await;
        assert_eq!(fresh.controller.model.route().await, Route::Playlists);
        assert_eq!(fresh.controller.model.get_ui_state().await.user_name.as_deref(), Some("gina"));
    }

    #[tokio::test]
    async fn no_session_starts_on_login() {
        let h = harness();
        h.controller.restore_session(Route::Profile).await;
        assert_eq!(h.controller.model.route().await, Route::Login);
    }

    #[tokio::test]
    async fn empty_search_result_clears_the_list() {
        let h = harness();
        *h.search.reply.lock().unwrap() = StubReply::Tracks(vec![track("a"), track("b")]);
        h.controller.perform_search("first").await;
        assert_eq!(h.controller.model.get_content_state().await.search_results.len(), 2);

        *h.search.reply.lock().unwrap() = StubReply::Tracks(Vec::new());
        h.controller.perform_search("second").await;
        assert!(h.controller.model.get_content_state().await.search_results.is_empty());
    }

    #[tokio::test]
    async fn failed_search_keeps_previous_results() {
        let h = harness();
        *h.search.reply.lock().unwrap() = StubReply::Tracks(vec![track("a")]);
        h.controller.perform_search("lofi").await;

        *h.search.reply.lock().unwrap() = StubReply::Fail;
        h.controller.perform_search("lofi beats").await;

        let content = h.controller.model.get_content_state().await;
        assert_eq!(content.search_results, vec![track("a")]);
        assert!(!content.is_searching);
        assert!(!h.controller.model.has_error().await);
    }

    #[tokio::test]
    async fn empty_query_is_passed_through() {
        let h = harness();
        h.controller.perform_search("").await;
        assert_eq!(*h.search.queries.lock().unwrap(), vec![String::new()]);
    }

    #[tokio::test]
    async fn results_can_be_collected_into_a_playlist() {
        let h = harness();
        register(&h, "carol").await;
        h.controller.create_playlist("Focus").await;
        *h.search.reply.lock().unwrap() = StubReply::Tracks(vec![track("a"), track("b")]);
        h.controller.perform_search("focus").await;
        h.controller.model.results_move_down().await;

        h.controller.add_selected_result_to_playlist().await;

        let playlist = h.controller.model.get_selected_playlist().await.unwrap();
        assert_eq!(playlist.tracks, vec![track("b")]);

        h.controller.navigate(Route::Playlist(playlist.id)).await;
        assert_eq!(h.controller.model.route().await, Route::Playlist(playlist.id));
        h.controller.remove_selected_playlist_track().await;
        assert!(h.controller.model.get_selected_playlist().await.unwrap().tracks.is_empty());
    }

    #[tokio::test]
    async fn other_users_playlists_cannot_be_opened() {
        let h = harness();
        register(&h, "owner").await;
        h.controller.create_playlist("Private").await;
        let private = h.controller.model.get_selected_playlist().await.unwrap();
        h.controller.logout().await;

        register(&h, "guest").await;
        h.controller.navigate(Route::Playlist(private.id)).await;

        assert_eq!(h.controller.model.route().await, Route::Playlists);
        assert_eq!(
            h.controller.model.get_ui_state().await.error_message.as_deref(),
            Some("Playlist not found.")
        );
    }

    #[tokio::test]
    async fn adding_without_playlists_reports_error() {
        let h = harness();
        register(&h, "dave").await;
        *h.search.reply.lock().unwrap() = StubReply::Tracks(vec![track("a")]);
        h.controller.perform_search("x").await;

        h.controller.add_selected_result_to_playlist().await;
        assert!(h.controller.model.has_error().await);
    }

    #[tokio::test]
    async fn profile_updates_report_inline() {
        let h = harness();
        register(&h, "erin").await;
        h.controller.navigate(Route::Profile).await;
        assert_eq!(h.controller.model.get_content_state().await.profile.username, "erin");

        h.controller.model.profile_input('!').await;
        h.controller.submit_profile_field().await;
        let content = h.controller.model.get_content_state().await;
        assert_eq!(
            content.profile.message,
            Some(FormMessage::Success("Username updated successfully".to_string()))
        );
        assert_eq!(h.controller.model.get_ui_state().await.user_name.as_deref(), Some("erin!"));

        // Empty password is rejected
        h.controller.model.profile_next_field().await;
        h.controller.submit_profile_field().await;
        let content = h.controller.model.get_content_state().await;
        assert_eq!(
            content.profile.message,
            Some(FormMessage::Error("Failed to update password".to_string()))
        );
    }
}
