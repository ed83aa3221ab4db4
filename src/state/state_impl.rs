use super::error::StateError;
use crate::utils::literal::StateValue;
use std::collections::BTreeMap;

/// Window position and size: left, top, width, height.
pub type WinRectangle = [i64; 4];

/// Color as red, green, blue and alpha in the range 0.0..=1.0.
pub type Rgba = [f64; 4];

pub const DEFAULT_FONT_SIZE: f64 = 30.0;
pub const MIN_FONT_SIZE: f64 = 24.0;
pub const MAX_FONT_SIZE: f64 = 33.0;
pub const DEFAULT_WIN_RECTANGLE: WinRectangle = [0, 0, 800, 600];
pub const SELECTED_ITEM_INK: Rgba = [0.69, 1.0, 0.39, 0.18];
pub const UNSELECTED_ITEM_INK: Rgba = [0.39, 0.39, 0.39, 0.18];
pub const CONTEXT_PATH_INK: Rgba = [0.99, 0.99, 0.39, 0.48];
pub const CONTEXT_ID_INK: Rgba = [0.99, 0.99, 0.69, 0.69];

/// Houses the typed app state of one app instance.
///
/// Fields are read through getters only. Changes go through
/// `MainApp::change_app_state`, which keeps the framework mirror current.
#[derive(Debug, Clone, PartialEq)]
pub struct AppStates {
    context_path: Vec<String>,
    context_id: String,
    font_size: f64,
    win_rectangle: WinRectangle,
    selected_item_ink: Rgba,
    unselected_item_ink: Rgba,
    context_path_ink: Rgba,
    context_id_ink: Rgba,
    declared: BTreeMap<String, StateValue>,
}

/// Defines default application state.
///
impl Default for AppStates {
    fn default() -> AppStates {
        AppStates {
            context_path: vec![],
            context_id: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            win_rectangle: DEFAULT_WIN_RECTANGLE,
            selected_item_ink: SELECTED_ITEM_INK,
            unselected_item_ink: UNSELECTED_ITEM_INK,
            context_path_ink: CONTEXT_PATH_INK,
            context_id_ink: CONTEXT_ID_INK,
            declared: BTreeMap::new(),
        }
    }
}

impl AppStates {
    /// Ids of the lists from the root down to the list being viewed.
    ///
    pub fn context_path(&self) -> &[String] {
        &self.context_path
    }

    /// Id of the selected item of the current list, empty if none.
    ///
    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn win_rectangle(&self) -> WinRectangle {
        self.win_rectangle
    }

    pub fn selected_item_ink(&self) -> Rgba {
        self.selected_item_ink
    }

    pub fn unselected_item_ink(&self) -> Rgba {
        self.unselected_item_ink
    }

    pub fn context_path_ink(&self) -> Rgba {
        self.context_path_ink
    }

    pub fn context_id_ink(&self) -> Rgba {
        self.context_id_ink
    }

    /// Value of an app specific key declared in the schema.
    ///
    pub fn declared(&self, key: &str) -> Option<&StateValue> {
        self.declared.get(key)
    }

    pub(super) fn set_context_path(&mut self, key: &str, value: StateValue) -> Result<(), StateError> {
        let items = value.as_items().unwrap_or_default();
        let mut path = Vec::with_capacity(items.len());
        for item in items {
            match item.as_text() {
                Some(id) => path.push(id.to_string()),
                None => {
                    return Err(StateError::InvalidValue {
                        key: key.to_string(),
                        message: format!("context ids must be text, got {}", item),
                    })
                }
            }
        }
        self.context_path = path;
        Ok(())
    }

    pub(super) fn set_context_id(&mut self, _key: &str, value: StateValue) -> Result<(), StateError> {
        if let StateValue::Text(id) = value {
            self.context_id = id;
        }
        Ok(())
    }

    /// Positive sizes are clamped to `MIN_FONT_SIZE..=MAX_FONT_SIZE`.
    pub(super) fn set_font_size(&mut self, key: &str, value: StateValue) -> Result<(), StateError> {
        let size = value.as_float().unwrap_or(self.font_size);
        if !size.is_finite() || size <= 0.0 {
            return Err(StateError::InvalidValue {
                key: key.to_string(),
                message: format!("font size must be positive, got {}", size),
            });
        }
        self.font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        Ok(())
    }

    pub(super) fn set_win_rectangle(&mut self, key: &str, value: StateValue) -> Result<(), StateError> {
        let items = four_items(key, &value)?;
        let mut rectangle = DEFAULT_WIN_RECTANGLE;
        for (slot, item) in rectangle.iter_mut().zip(items) {
            *slot = item.as_int().ok_or_else(|| StateError::InvalidValue {
                key: key.to_string(),
                message: format!("window coordinates must be integers, got {}", item),
            })?;
        }
        self.win_rectangle = rectangle;
        Ok(())
    }

    pub(super) fn set_selected_item_ink(&mut self, key: &str, value: StateValue) -> Result<(), StateError> {
        self.selected_item_ink = rgba(key, &value)?;
        Ok(())
    }

    pub(super) fn set_unselected_item_ink(&mut self, key: &str, value: StateValue) -> Result<(), StateError> {
        self.unselected_item_ink = rgba(key, &value)?;
        Ok(())
    }

    pub(super) fn set_context_path_ink(&mut self, key: &str, value: StateValue) -> Result<(), StateError> {
        self.context_path_ink = rgba(key, &value)?;
        Ok(())
    }

    pub(super) fn set_context_id_ink(&mut self, key: &str, value: StateValue) -> Result<(), StateError> {
        self.context_id_ink = rgba(key, &value)?;
        Ok(())
    }

    pub(super) fn set_declared(&mut self, key: &str, value: StateValue) {
        self.declared.insert(key.to_string(), value);
    }
}

fn four_items<'a>(key: &str, value: &'a StateValue) -> Result<&'a [StateValue], StateError> {
    match value.as_items() {
        Some(items) if items.len() == 4 => Ok(items),
        _ => Err(StateError::InvalidValue {
            key: key.to_string(),
            message: format!("expected 4 items, got {}", value),
        }),
    }
}

fn rgba(key: &str, value: &StateValue) -> Result<Rgba, StateError> {
    let items = four_items(key, value)?;
    let mut color = [0.0; 4];
    for (channel, item) in color.iter_mut().zip(items) {
        *channel = item
            .as_float()
            .filter(|c| (0.0..=1.0).contains(c))
            .ok_or_else(|| StateError::InvalidValue {
                key: key.to_string(),
                message: format!("color channels must be within 0.0 and 1.0, got {}", item),
            })?;
    }
    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_states() {
        let states = AppStates::default();
        assert!(states.context_path().is_empty());
        assert_eq!(states.context_id(), "");
        assert_eq!(states.font_size(), DEFAULT_FONT_SIZE);
        assert_eq!(states.win_rectangle(), [0, 0, 800, 600]);
        assert_eq!(states.selected_item_ink(), SELECTED_ITEM_INK);
        assert_eq!(states.context_id_ink(), CONTEXT_ID_INK);
        assert_eq!(states.declared("tst_var"), None);
    }

    #[test]
    fn set_context_path_requires_text_ids() {
        let mut states = AppStates::default();
        states
            .set_context_path("context_path", StateValue::from(vec!["Lidl".to_string()]))
            .unwrap();
        assert_eq!(states.context_path(), ["Lidl".to_string()]);

        let result = states.set_context_path(
            "context_path",
            StateValue::List(vec![StateValue::Int(1)]),
        );
        assert!(matches!(result, Err(StateError::InvalidValue { .. })));
        assert_eq!(states.context_path(), ["Lidl".to_string()]);
    }

    #[test]
    fn set_win_rectangle_requires_four_integers() {
        let mut states = AppStates::default();
        states
            .set_win_rectangle("win_rectangle", StateValue::from([90i64, 60, 900, 600]))
            .unwrap();
        assert_eq!(states.win_rectangle(), [90, 60, 900, 600]);

        assert!(states
            .set_win_rectangle("win_rectangle", StateValue::Tuple(vec![StateValue::Int(1)]))
            .is_err());
        assert!(states
            .set_win_rectangle("win_rectangle", StateValue::from([1.5f64, 0.0, 1.0, 1.0]))
            .is_err());
        assert_eq!(states.win_rectangle(), [90, 60, 900, 600]);
    }

    #[test]
    fn set_ink_accepts_integer_channels() {
        let mut states = AppStates::default();
        states
            .set_selected_item_ink("selected_item_ink", StateValue::from([1i64, 0, 0, 1]))
            .unwrap();
        assert_eq!(states.selected_item_ink(), [1.0, 0.0, 0.0, 1.0]);

        let result = states.set_context_id_ink("context_id_ink", StateValue::from([2.0f64, 0.0, 0.0, 1.0]));
        assert!(result.is_err());
    }

    #[test]
    fn set_font_size_rejects_non_positive_sizes() {
        let mut states = AppStates::default();
        states.set_font_size("font_size", StateValue::Float(24.0)).unwrap();
        assert_eq!(states.font_size(), 24.0);
        assert!(states.set_font_size("font_size", StateValue::Float(0.0)).is_err());
        assert_eq!(states.font_size(), 24.0);
    }

    #[test]
    fn set_font_size_clamps_to_limits() {
        let mut states = AppStates::default();
        states.set_font_size("font_size", StateValue::Float(1e9)).unwrap();
        assert_eq!(states.font_size(), MAX_FONT_SIZE);
        states.set_font_size("font_size", StateValue::Float(0.5)).unwrap();
        assert_eq!(states.font_size(), MIN_FONT_SIZE);
        states.set_font_size("font_size", StateValue::Float(27.0)).unwrap();
        assert_eq!(states.font_size(), 27.0);
    }
}
