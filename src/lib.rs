//! App state core of the My All In One shopping list.
//!
//! The app state of an app instance is loaded from and saved to the
//! `aeAppState` section of its INI config files, mirrored one-way into an
//! observable duplicate for the UI layer and navigated by a context path
//! through the nested shopping lists.

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod lists;
pub mod logger;
pub mod state;
pub mod updater;
pub mod utils;

pub use app::MainApp;
pub use config::ConfigStore;
pub use error::{AppError, AppResult};
pub use events::{AppEvent, EventHooks, EventKind, StateMirror};
pub use lists::{ListStore, ListTree};
pub use state::{AppState, StateSchema};
pub use utils::literal::{StateValue, ValueKind};
