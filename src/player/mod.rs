//! Player module - embedded player widget and the adapter that drives it
//!
//! - `widget`: capability traits every widget implements
//! - `adapter`: lifecycle, progress polling and repeat handling
//! - `mpv`: the concrete widget, an mpv process over JSON IPC

mod widget;
mod adapter;
mod mpv;
#[cfg(test)]
pub(crate) mod testing;

pub use widget::{PlayerError, WidgetEvent, WidgetState};
pub use adapter::{PlayerAdapter, PlayerEvent, PlayerEventChannel};
pub use mpv::MpvBackend;
