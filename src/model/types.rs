//! Core type definitions for the application UI

use std::time::Instant;

use crate::router::Route;

/// Which part of an authenticated screen has keyboard focus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    MainContent,
}

impl ActiveSection {
    pub fn toggle(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::MainContent,
            ActiveSection::MainContent => ActiveSection::Search,
        }
    }
}

/// Which login/register field has focus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AuthField {
    #[default]
    Name,
    Password,
}

impl AuthField {
    pub fn next(self) -> Self {
        match self {
            AuthField::Name => AuthField::Password,
            AuthField::Password => AuthField::Name,
        }
    }
}

/// Login or register form
#[derive(Clone, Debug, Default)]
pub struct AuthForm {
    pub name: String,
    pub password: String,
    pub focused: AuthField,
    pub error: Option<String>,
}

impl AuthForm {
    pub fn focused_value_mut(&mut self) -> &mut String {
        match self.focused {
            AuthField::Name => &mut self.name,
            AuthField::Password => &mut self.password,
        }
    }
}

/// UI state for the application
#[derive(Clone)]
pub struct UiState {
    pub route: Route,
    pub active_section: ActiveSection,
    pub search_query: String,
    pub auth_form: AuthForm,
    pub user_name: Option<String>,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_help_popup: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            route: Route::Login,
            active_section: ActiveSection::Search,
            search_query: String::new(),
            auth_form: AuthForm::default(),
            user_name: None,
            error_message: None,
            error_timestamp: None,
            show_help_popup: false,
        }
    }
}
