//! Optional event hooks of the UI layer.
//!
//! The core never depends on UI types. It notifies the UI layer through hooks
//! registered per event kind; an event without a hook is simply not handled.

use crate::error::AppResult;
use crate::state::WinRectangle;
use log::*;
use std::collections::HashMap;
use std::fmt;

/// Specifying the different event kinds a hook can be registered for.
///
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum EventKind {
    ContextDraw,
    AppInit,
    AppStart,
    AppPause,
    AppStop,
    KeyPress,
    KeyRelease,
    WinPosSize,
}

/// Specifying the events dispatched by the core.
///
#[derive(Debug, PartialEq, Clone)]
pub enum AppEvent {
    /// Context or font size changed, screens need a redraw.
    ContextDraw,
    AppInit,
    AppStart,
    AppPause,
    AppStop,
    KeyPress { key: String, modifiers: Vec<String> },
    KeyRelease { key: String },
    WinPosSize { rectangle: WinRectangle },
}

impl AppEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            AppEvent::ContextDraw => EventKind::ContextDraw,
            AppEvent::AppInit => EventKind::AppInit,
            AppEvent::AppStart => EventKind::AppStart,
            AppEvent::AppPause => EventKind::AppPause,
            AppEvent::AppStop => EventKind::AppStop,
            AppEvent::KeyPress { .. } => EventKind::KeyPress,
            AppEvent::KeyRelease { .. } => EventKind::KeyRelease,
            AppEvent::WinPosSize { .. } => EventKind::WinPosSize,
        }
    }
}

/// Hook callback. Returns whether the event got consumed.
pub type Hook = Box<dyn FnMut(&AppEvent) -> AppResult<bool>>;

/// Hooks registered by the UI layer, at most one per event kind.
///
/// Hooks only get the event. A hook needing app state, e.g. to redraw on
/// [`AppEvent::ContextDraw`], shares a cell with a binding registered through
/// `MainApp::mirror_mut().bind(..)`; the binding runs before the event is
/// dispatched, so the hook always sees the current values.
///
#[derive(Default)]
pub struct EventHooks {
    hooks: HashMap<EventKind, Hook>,
}

impl fmt::Debug for EventHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.hooks.keys()).finish()
    }
}

impl EventHooks {
    pub fn new() -> Self {
        EventHooks {
            hooks: HashMap::new(),
        }
    }

    /// Builder flavor of [`EventHooks::register`].
    ///
    pub fn on<F>(mut self, kind: EventKind, hook: F) -> Self
    where
        F: FnMut(&AppEvent) -> AppResult<bool> + 'static,
    {
        self.register(kind, hook);
        self
    }

    /// Register the hook of an event kind, replacing any previous one.
    ///
    pub fn register<F>(&mut self, kind: EventKind, hook: F)
    where
        F: FnMut(&AppEvent) -> AppResult<bool> + 'static,
    {
        if self.hooks.insert(kind, Box::new(hook)).is_some() {
            debug!("Replaced hook for {:?}", kind);
        }
    }

    pub fn remove(&mut self, kind: EventKind) -> bool {
        self.hooks.remove(&kind).is_some()
    }

    pub fn is_registered(&self, kind: EventKind) -> bool {
        self.hooks.contains_key(&kind)
    }

    /// Invoke the hook of the event's kind. Returns `Ok(None)` if no hook is
    /// registered; errors of the hook are passed through unchanged.
    ///
    pub fn dispatch(&mut self, event: &AppEvent) -> AppResult<Option<bool>> {
        match self.hooks.get_mut(&event.kind()) {
            Some(hook) => {
                trace!("Dispatching {:?}", event);
                hook(event).map(Some)
            }
            None => Ok(None),
        }
    }
}
