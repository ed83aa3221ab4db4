//! Observable duplicate of the app state for UI bindings.
//!
//! The core is the only writer: it seeds the mirror once and publishes every
//! state change into it. The UI layer reads values and binds callbacks that
//! fire on each published change.

use crate::state::AppState;
use crate::utils::literal::StateValue;
use std::fmt;

/// Binding callback receiving the changed key and its new value.
pub type Binding = Box<dyn FnMut(&str, &StateValue)>;

/// Framework side copy of the app state.
///
#[derive(Default)]
pub struct StateMirror {
    values: AppState,
    initialized: bool,
    bindings: Vec<(Option<String>, Binding)>,
}

impl fmt::Debug for StateMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMirror")
            .field("values", &self.values)
            .field("initialized", &self.initialized)
            .field("bindings", &self.bindings.len())
            .finish()
    }
}

impl StateMirror {
    pub fn new() -> Self {
        StateMirror::default()
    }

    /// Whether the core seeded this mirror. Changes are only published into
    /// an initialized mirror.
    ///
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.values.get(key)
    }

    pub fn values(&self) -> &AppState {
        &self.values
    }

    /// Call `callback` whenever `key` changes.
    ///
    pub fn bind<F>(&mut self, key: &str, callback: F)
    where
        F: FnMut(&str, &StateValue) + 'static,
    {
        self.bindings.push((Some(key.to_string()), Box::new(callback)));
    }

    /// Call `callback` on every change.
    ///
    pub fn bind_all<F>(&mut self, callback: F)
    where
        F: FnMut(&str, &StateValue) + 'static,
    {
        self.bindings.push((None, Box::new(callback)));
    }

    /// Replace all values with a snapshot of the canonical state and notify
    /// the bindings of every key in it.
    pub(crate) fn seed(&mut self, snapshot: AppState) {
        self.values = snapshot;
        self.initialized = true;
        let keys: Vec<String> = self.values.keys().cloned().collect();
        for key in keys {
            if let Some(value) = self.values.get(&key).cloned() {
                self.notify(&key, &value);
            }
        }
    }

    pub(crate) fn publish(&mut self, key: &str, value: &StateValue) {
        self.values.insert(key.to_string(), value.clone());
        self.notify(key, value);
    }

    fn notify(&mut self, key: &str, value: &StateValue) {
        for (bound_key, callback) in self.bindings.iter_mut() {
            if bound_key.as_deref().map_or(true, |bound| bound == key) {
                callback(key, value);
            }
        }
    }
}
