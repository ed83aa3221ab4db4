//! Registry of the app state keys.
//!
//! Every key an app tracks is declared here with its kind and default value.
//! Built-in keys map onto the typed fields of [`AppStates`]; apps declare
//! their own keys on top. Unknown keys are rejected instead of being looked
//! up at runtime.

use super::error::StateError;
use super::state_impl::AppStates;
use crate::utils::literal::{StateValue, ValueKind};
use std::fmt;

type Getter = fn(&AppStates) -> StateValue;
type Setter = fn(&mut AppStates, &str, StateValue) -> Result<(), StateError>;

#[derive(Clone, Copy)]
enum Accessor {
    Field { get: Getter, set: Setter },
    Declared,
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Field { .. } => f.write_str("Field"),
            Accessor::Declared => f.write_str("Declared"),
        }
    }
}

/// Declaration of one app state key.
///
#[derive(Debug, Clone)]
pub struct StateSlot {
    name: String,
    kind: ValueKind,
    default: StateValue,
    accessor: Accessor,
}

impl StateSlot {
    fn field(name: &str, get: Getter, set: Setter) -> StateSlot {
        let default = get(&AppStates::default());
        StateSlot {
            name: name.to_string(),
            kind: default.kind(),
            default,
            accessor: Accessor::Field { get, set },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn default_value(&self) -> &StateValue {
        &self.default
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.accessor, Accessor::Field { .. })
    }
}

/// Declared app state keys of an app.
///
#[derive(Debug, Clone)]
pub struct StateSchema {
    slots: Vec<StateSlot>,
}

impl Default for StateSchema {
    fn default() -> StateSchema {
        StateSchema::builtin()
    }
}

impl StateSchema {
    /// Schema with the keys every app tracks.
    ///
    pub fn builtin() -> StateSchema {
        let slots = vec![
            StateSlot::field(
                "context_path",
                |s| StateValue::from(s.context_path()),
                AppStates::set_context_path,
            ),
            StateSlot::field(
                "context_id",
                |s| StateValue::from(s.context_id()),
                AppStates::set_context_id,
            ),
            StateSlot::field(
                "font_size",
                |s| StateValue::from(s.font_size()),
                AppStates::set_font_size,
            ),
            StateSlot::field(
                "win_rectangle",
                |s| StateValue::from(s.win_rectangle()),
                AppStates::set_win_rectangle,
            ),
            StateSlot::field(
                "selected_item_ink",
                |s| StateValue::from(s.selected_item_ink()),
                AppStates::set_selected_item_ink,
            ),
            StateSlot::field(
                "unselected_item_ink",
                |s| StateValue::from(s.unselected_item_ink()),
                AppStates::set_unselected_item_ink,
            ),
            StateSlot::field(
                "context_path_ink",
                |s| StateValue::from(s.context_path_ink()),
                AppStates::set_context_path_ink,
            ),
            StateSlot::field(
                "context_id_ink",
                |s| StateValue::from(s.context_id_ink()),
                AppStates::set_context_id_ink,
            ),
        ];
        StateSchema { slots }
    }

    /// Declare an app specific key. Its kind is the kind of the default value.
    ///
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        default: impl Into<StateValue>,
    ) -> Result<&mut StateSchema, StateError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(StateError::DuplicateKey { key: name });
        }
        let default = default.into();
        self.slots.push(StateSlot {
            name,
            kind: default.kind(),
            default,
            accessor: Accessor::Declared,
        });
        Ok(self)
    }

    /// Builder flavor of [`StateSchema::declare`].
    ///
    pub fn with(
        mut self,
        name: impl Into<String>,
        default: impl Into<StateValue>,
    ) -> Result<StateSchema, StateError> {
        self.declare(name, default)?;
        Ok(self)
    }

    pub fn slot(&self, key: &str) -> Option<&StateSlot> {
        self.slots.iter().find(|slot| slot.name == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slot(key).is_some()
    }

    pub fn kind_of(&self, key: &str) -> Option<ValueKind> {
        self.slot(key).map(StateSlot::kind)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(StateSlot::name)
    }

    /// Fresh per-instance state holding the defaults of every key.
    ///
    pub fn instantiate(&self) -> AppStates {
        let mut states = AppStates::default();
        for slot in &self.slots {
            if let Accessor::Declared = slot.accessor {
                states.set_declared(&slot.name, slot.default.clone());
            }
        }
        states
    }

    /// Current value of a key.
    ///
    pub fn read(&self, states: &AppStates, key: &str) -> Option<StateValue> {
        let slot = self.slot(key)?;
        match slot.accessor {
            Accessor::Field { get, .. } => Some(get(states)),
            Accessor::Declared => states
                .declared(key)
                .cloned()
                .or_else(|| Some(slot.default.clone())),
        }
    }

    /// Assign a value to a key after checking it against the declaration.
    /// Returns the value as stored, e.g. an integer font size as float.
    ///
    pub fn assign(
        &self,
        states: &mut AppStates,
        key: &str,
        value: StateValue,
    ) -> Result<StateValue, StateError> {
        let slot = self.slot(key).ok_or_else(|| StateError::UnknownKey {
            key: key.to_string(),
        })?;
        let value = normalize(key, slot.kind, value)?;
        match slot.accessor {
            Accessor::Field { get, set } => {
                set(states, key, value)?;
                Ok(get(states))
            }
            Accessor::Declared => {
                states.set_declared(key, value.clone());
                Ok(value)
            }
        }
    }
}

fn normalize(key: &str, kind: ValueKind, value: StateValue) -> Result<StateValue, StateError> {
    let value = match (kind, value) {
        (ValueKind::Float, StateValue::Int(value)) => StateValue::Float(value as f64),
        (ValueKind::Tuple, StateValue::List(items)) => StateValue::Tuple(items),
        (ValueKind::List, StateValue::Tuple(items)) => StateValue::List(items),
        (kind, value) if value.kind() == kind => value,
        (kind, value) => {
            return Err(StateError::TypeMismatch {
                key: key.to_string(),
                expected: kind,
                found: value.kind(),
            })
        }
    };
    if !is_finite(&value) {
        return Err(StateError::InvalidValue {
            key: key.to_string(),
            message: format!("numbers must be finite, got {}", value),
        });
    }
    Ok(value)
}

/// NaN and infinities have no literal form, so they could not be read back.
fn is_finite(value: &StateValue) -> bool {
    match value {
        StateValue::Float(number) => number.is_finite(),
        StateValue::Tuple(items) | StateValue::List(items) => items.iter().all(is_finite),
        StateValue::Dict(entries) => entries.values().all(is_finite),
        _ => true,
    }
}
