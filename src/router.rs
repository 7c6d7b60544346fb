//! Client-side routes and access gating

use std::fmt;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Home,
    Profile,
    Playlists,
    Playlist(Uuid),
}

impl Route {
    /// Parse a path like `/playlist/<id>`; unknown paths yield `None`
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Route::Home),
            "/login" => Some(Route::Login),
            "/register" => Some(Route::Register),
            "/profile" => Some(Route::Profile),
            "/playlists" => Some(Route::Playlists),
            _ => trimmed
                .strip_prefix("/playlist/")
                .and_then(|id| Uuid::parse_str(id).ok())
                .map(Route::Playlist),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Home => "/".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Playlists => "/playlists".to_string(),
            Route::Playlist(id) => format!("/playlist/{id}"),
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Resolve where a navigation actually lands.
///
/// Protected routes send anonymous users to `/login`; the public auth routes
/// send logged-in users to `/`.
pub fn guard(requested: Route, authenticated: bool) -> Route {
    match (requested.is_public(), authenticated) {
        (true, true) => Route::Home,
        (false, false) => Route::Login,
        _ => requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_users_are_sent_to_login() {
        assert_eq!(guard(Route::Playlists, false), Route::Login);
        assert_eq!(guard(Route::Home, false), Route::Login);
        assert_eq!(guard(Route::Profile, false), Route::Login);
        assert_eq!(guard(Route::Playlist(Uuid::new_v4()), false), Route::Login);
        assert_eq!(guard(Route::Register, false), Route::Register);
    }

    #[test]
    fn logged_in_users_skip_auth_pages() {
        assert_eq!(guard(Route::Login, true), Route::Home);
        assert_eq!(guard(Route::Register, true), Route::Home);
        assert_eq!(guard(Route::Playlists, true), Route::Playlists);
    }

    #[test]
    fn paths_parse_back_to_routes() {
        let id = Uuid::new_v4();
        for route in [
            Route::Login,
            Route::Register,
            Route::Home,
            Route::Profile,
            Route::Playlists,
            Route::Playlist(id),
        ] {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
        assert_eq!(Route::parse("/playlist/not-a-uuid"), None);
        assert_eq!(Route::parse("/nowhere"), None);
    }
}
