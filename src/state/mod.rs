//! Application state management module.
//!
//! This module contains the typed app state of an app instance:
//! - `AppStates`, the canonical holder of every app state value
//! - `StateSchema`, the registry of keys an app tracks
//! - State error handling

mod error;
mod schema;
mod state_impl;

pub use error::StateError;
pub use schema::{StateSchema, StateSlot};
pub use state_impl::{
    AppStates, Rgba, WinRectangle, CONTEXT_ID_INK, CONTEXT_PATH_INK, DEFAULT_FONT_SIZE,
    DEFAULT_WIN_RECTANGLE, MAX_FONT_SIZE, MIN_FONT_SIZE, SELECTED_ITEM_INK, UNSELECTED_ITEM_INK,
};

use crate::utils::literal::StateValue;
use std::collections::BTreeMap;

/// Config section storing the app state.
pub const APP_STATE_SECTION_NAME: &str = "aeAppState";

/// Snapshot of app state values by key.
pub type AppState = BTreeMap<String, StateValue>;
