//! Lifecycle and input events of the hosting UI framework.

use super::MainApp;
use crate::error::AppResult;
use crate::events::AppEvent;
use crate::state::WinRectangle;
use log::*;

impl MainApp {
    /// Seed the state mirror with the current app state. From now on every
    /// app state change is published to it.
    ///
    pub fn attach_mirror(&mut self) {
        let snapshot = self.retrieve_app_state();
        debug!("Seeding state mirror with {} value(s)", snapshot.len());
        self.mirror.seed(snapshot);
    }

    pub fn on_app_start(&mut self) -> AppResult<()> {
        info!("Starting app...");
        self.call_event(&AppEvent::AppStart)?;
        Ok(())
    }

    /// Save the app state when the app gets paused. Returns `true` to keep
    /// the app alive while paused.
    ///
    pub fn on_app_pause(&mut self) -> AppResult<bool> {
        let saved = self.save_app_state();
        if let Err(e) = &saved {
            error!("Failed to save app state on pause: {}", e);
        }
        self.call_event(&AppEvent::AppPause)?;
        saved?;
        Ok(true)
    }

    pub fn on_app_stop(&mut self) -> AppResult<()> {
        let saved = self.save_app_state();
        if let Err(e) = &saved {
            error!("Failed to save app state on exit: {}", e);
        }
        self.call_event(&AppEvent::AppStop)?;
        info!("Exiting app...");
        saved
    }

    /// Dispatch a key press. Returns whether a hook consumed the key.
    ///
    pub fn on_key_down(&mut self, key: &str, modifiers: &[&str]) -> AppResult<bool> {
        let event = AppEvent::KeyPress {
            key: key.to_string(),
            modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
        };
        Ok(self.call_event(&event)?.unwrap_or(false))
    }

    pub fn on_key_up(&mut self, key: &str) -> AppResult<bool> {
        let event = AppEvent::KeyRelease {
            key: key.to_string(),
        };
        Ok(self.call_event(&event)?.unwrap_or(false))
    }

    /// Track the moved or resized app window.
    ///
    pub fn win_pos_size_changed(&mut self, rectangle: WinRectangle) -> AppResult<()> {
        self.change_app_state("win_rectangle", rectangle)?;
        self.call_event(&AppEvent::WinPosSize { rectangle })?;
        Ok(())
    }
}
