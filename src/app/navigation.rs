//! Context navigation through the nested shopping lists.
//!
//! The context path names the lists entered from the root list; the context
//! id names the item selected in the list the path addresses.

use super::MainApp;
use crate::error::AppResult;
use crate::events::AppEvent;
use crate::lists::{ListItem, ListTree};
use crate::state::StateError;
use log::*;

impl MainApp {
    /// Select `context_id` in the current list. The context path gets
    /// published again, changed or not.
    ///
    pub fn set_context(&mut self, context_id: &str, redraw: bool) -> AppResult<()> {
        let path = self.states.context_path().to_vec();
        self.change_app_state("context_path", path)?;
        self.change_app_state("context_id", context_id)?;
        if redraw {
            self.call_event(&AppEvent::ContextDraw)?;
        }
        Ok(())
    }

    /// Enter the list `context_id` and select `next_id` in it.
    ///
    pub fn context_enter(&mut self, context_id: &str, next_id: &str) -> AppResult<()> {
        let mut path = self.states.context_path().to_vec();
        path.push(context_id.to_string());
        self.change_app_state("context_path", path)?;
        debug!("Entered context {:?}", self.states.context_path());
        self.set_context(next_id, true)
    }

    /// Leave the current list, selecting `next_id` or else the left list in
    /// its parent. Fails without changes at the root list.
    ///
    pub fn context_leave(&mut self, next_id: Option<&str>) -> AppResult<()> {
        let mut path = self.states.context_path().to_vec();
        let left_id = path.pop().ok_or(StateError::ContextPathEmpty)?;
        self.change_app_state("context_path", path)?;
        self.set_context(next_id.unwrap_or(&left_id), true)
    }

    pub fn set_font_size(&mut self, font_size: f64) -> AppResult<()> {
        self.change_app_state("font_size", font_size)?;
        self.call_event(&AppEvent::ContextDraw)?;
        Ok(())
    }

    /// Items of the list the context path addresses in `tree`.
    ///
    pub fn current_list<'t>(&self, tree: &'t ListTree) -> Option<&'t [ListItem]> {
        tree.resolve(self.states.context_path())
    }

    /// Reset a context not matching `tree`, e.g. after the lists data got
    /// replaced: an unresolvable path returns to the root list and a missing
    /// context id gets deselected. Returns whether the context got reset.
    ///
    pub fn ensure_valid_context(&mut self, tree: &ListTree) -> AppResult<bool> {
        let id = self.states.context_id().to_string();
        let valid_path = self.current_list(tree).is_some();
        if valid_path && (id.is_empty() || tree.find_item(self.states.context_path(), &id).is_some()) {
            return Ok(false);
        }

        warn!("Resetting context {:?}/{} not found in lists", self.states.context_path(), id);
        if !valid_path {
            self.change_app_state("context_path", Vec::<String>::new())?;
        }
        self.set_context("", false)?;
        Ok(true)
    }
}
