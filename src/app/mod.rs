//! The app object owning the canonical app state.
//!
//! `MainApp` loads the app state section of the config store into typed
//! state, routes every state change through [`MainApp::change_app_state`]
//! and writes the state back on demand. The UI layer observes it through
//! the state mirror and the event hooks.

mod lifecycle;
mod navigation;

use crate::config::ConfigStore;
use crate::error::AppResult;
use crate::events::{AppEvent, EventHooks, StateMirror};
use crate::state::{AppState, AppStates, StateError, StateSchema, APP_STATE_SECTION_NAME};
use crate::utils::literal::{coerce_literal, StateValue, ValueKind};
use log::*;
use std::io::{self, Write};

/// Debug level from which the debug bubble is shown.
pub const VERBOSE_DEBUG_LEVEL: i64 = 2;

/// Oversees the app state, its persistence and its propagation to the UI
/// layer.
///
#[derive(Debug)]
pub struct MainApp {
    config: ConfigStore,
    schema: StateSchema,
    states: AppStates,
    hooks: EventHooks,
    mirror: StateMirror,
    debug_bubble: bool,
}

impl MainApp {
    /// Create the app over the given config store, load its app state and
    /// dispatch the `AppInit` event.
    ///
    pub fn new(config: ConfigStore, schema: StateSchema, hooks: EventHooks) -> AppResult<MainApp> {
        let states = schema.instantiate();
        let mut app = MainApp {
            config,
            schema,
            states,
            hooks,
            mirror: StateMirror::new(),
            debug_bubble: false,
        };
        app.load_app_state()?;
        app.call_event(&AppEvent::AppInit)?;
        info!("App initialized with {} app state key(s)", app.app_state_keys().len());
        Ok(app)
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn schema(&self) -> &StateSchema {
        &self.schema
    }

    /// Typed read access to the app state.
    ///
    pub fn states(&self) -> &AppStates {
        &self.states
    }

    pub fn hooks_mut(&mut self) -> &mut EventHooks {
        &mut self.hooks
    }

    pub fn mirror(&self) -> &StateMirror {
        &self.mirror
    }

    /// Mutable access to the mirror, for adding bindings.
    ///
    pub fn mirror_mut(&mut self) -> &mut StateMirror {
        &mut self.mirror
    }

    /// Whether log output is to be shown in the debug bubble.
    ///
    pub fn debug_bubble(&self) -> bool {
        self.debug_bubble
    }

    /// Keys of the app state section that are declared in the schema.
    ///
    pub fn app_state_keys(&self) -> Vec<String> {
        self.config
            .options(APP_STATE_SECTION_NAME)
            .into_iter()
            .filter(|key| self.schema.contains(key))
            .collect()
    }

    /// Read the app state section and assign the stored values. A missing
    /// section loads nothing. Unreadable values keep the current value.
    ///
    pub fn load_app_state(&mut self) -> AppResult<()> {
        self.debug_bubble = self.config.debug_level() >= VERBOSE_DEBUG_LEVEL;

        let mut candidate = AppState::new();
        for (key, raw) in self.config.items(APP_STATE_SECTION_NAME) {
            let kind = self.schema.kind_of(&key).unwrap_or(ValueKind::Text);
            match coerce_literal(&raw, kind) {
                Some(value) => {
                    candidate.insert(key, value);
                }
                None => warn!(
                    "Keeping current value of app state {}: '{}' is not a {} literal",
                    key, raw, kind
                ),
            }
        }
        self.setup_app_state(&candidate)
    }

    /// Assign the values of `candidate` for every option of the app state
    /// section. Keys missing in the schema are ignored, values not fitting
    /// their key are skipped.
    ///
    pub fn setup_app_state(&mut self, candidate: &AppState) -> AppResult<()> {
        for key in self.config.options(APP_STATE_SECTION_NAME) {
            let value = match candidate.get(&key) {
                Some(value) => value.clone(),
                None => continue,
            };
            if !self.schema.contains(&key) {
                debug!("Ignoring undeclared app state {}", key);
                continue;
            }
            if let Err(e) = self.change_app_state(&key, value) {
                warn!("Skipping stored app state: {}", e);
            }
        }
        Ok(())
    }

    /// Live values of all app state keys.
    ///
    pub fn retrieve_app_state(&self) -> AppState {
        self.app_state_keys()
            .into_iter()
            .filter_map(|key| {
                let value = self.schema.read(&self.states, &key)?;
                Some((key, value))
            })
            .collect()
    }

    /// Write all app state values to the config store, stopping at the first
    /// failure. The config files get reloaded in any case.
    ///
    pub fn save_app_state(&mut self) -> AppResult<()> {
        let app_state = self.retrieve_app_state();
        let mut saved = Ok(());
        for (key, value) in &app_state {
            if let Err(e) = self.config.set_var(key, value, APP_STATE_SECTION_NAME) {
                error!("Failed to save app state {}: {}", key, e);
                saved = Err(e);
                break;
            }
        }
        let reloaded = self.config.load_cfg_files();
        saved?;
        reloaded?;
        debug!("Saved {} app state value(s)", app_state.len());
        Ok(())
    }

    /// Change an app state value and publish it to the mirror. This is the
    /// only way to change the app state.
    ///
    pub fn change_app_state(&mut self, key: &str, value: impl Into<StateValue>) -> Result<(), StateError> {
        let stored = self.schema.assign(&mut self.states, key, value.into())?;
        trace!("App state {} = {}", key, stored);
        if self.mirror.is_initialized() {
            self.mirror.publish(key, &stored);
        }
        Ok(())
    }

    pub fn get_app_state(&self, key: &str) -> Option<StateValue> {
        self.schema.read(&self.states, key)
    }

    /// Pass an event to the hook registered for its kind. Returns `Ok(None)`
    /// if no hook is registered.
    ///
    pub fn call_event(&mut self, event: &AppEvent) -> AppResult<Option<bool>> {
        self.hooks.dispatch(event)
    }

    /// Ring the terminal bell.
    ///
    pub fn play_beep(&self) {
        let mut stdout = io::stdout();
        if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            debug!("Beep failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::error::AppError;
    use crate::events::EventKind;
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("maio.ini");
        fs::write(&path, contents).unwrap();
        path
    }

    fn app_with(path: &Path, schema: StateSchema) -> MainApp {
        let config = ConfigStore::with_files(&[path]).unwrap();
        MainApp::new(config, schema, EventHooks::new()).unwrap()
    }

    fn tst_schema() -> StateSchema {
        StateSchema::builtin().with("tst_var", "").unwrap()
    }

    #[test]
    fn load_and_retrieve_declared_keys() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[aeAppState]\ntst_var = 'tstVal'\n");
        let app = app_with(&path, tst_schema());

        let mut expected = AppState::new();
        expected.insert("tst_var".to_string(), StateValue::from("tstVal"));
        assert_eq!(app.retrieve_app_state(), expected);
        assert_eq!(app.app_state_keys(), vec!["tst_var"]);
    }

    #[test]
    fn changed_value_survives_save() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[aeAppState]\ntst_var = 'tstVal'\n");
        let mut app = app_with(&path, tst_schema());

        app.change_app_state("tst_var", "ChangedVal").unwrap();
        app.save_app_state().unwrap();
        assert_eq!(
            app.config().get_var("tst_var", APP_STATE_SECTION_NAME),
            Some("'ChangedVal'")
        );

        let reloaded = app_with(&path, tst_schema());
        assert_eq!(
            reloaded.get_app_state("tst_var"),
            Some(StateValue::from("ChangedVal"))
        );
        assert_eq!(reloaded.retrieve_app_state(), app.retrieve_app_state());
    }

    #[test]
    fn builtin_keys_load_typed_values() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "[aeAppState]\n\
             context_path = ['Lidl', 'Obst']\n\
             context_id = 'Äpfel'\n\
             font_size = 24\n\
             win_rectangle = (10, 20, 640, 480)\n\
             selected_item_ink = (0.5, 1, 0.5, 0.2)\n",
        );
        let app = app_with(&path, StateSchema::builtin());
        let states = app.states();
        assert_eq!(states.context_path(), ["Lidl".to_string(), "Obst".to_string()]);
        assert_eq!(states.context_id(), "Äpfel");
        assert_eq!(states.font_size(), 24.0);
        assert_eq!(states.win_rectangle(), [10, 20, 640, 480]);
        assert_eq!(states.selected_item_ink(), [0.5, 1.0, 0.5, 0.2]);
    }

    #[test]
    fn repeated_saves_are_identical() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "; maio settings\n[aeAppState]\nfont_size = 21.0\ncontext_path = []\ntst_var = 'x'\n",
        );
        let mut app = app_with(&path, tst_schema());

        app.save_app_state().unwrap();
        let first = fs::read_to_string(&path).unwrap();
        app.save_app_state().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), first);
        assert!(first.starts_with("; maio settings\n"));
    }

    #[test]
    fn missing_section_loads_nothing() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[aeOptions]\ndebugLevel = 2\n");
        let mut app = app_with(&path, tst_schema());

        assert!(app.retrieve_app_state().is_empty());
        assert_eq!(app.states(), &tst_schema().instantiate());
        assert!(app.debug_bubble());
        app.save_app_state().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[aeOptions]\ndebugLevel = 2\n");
    }

    #[test]
    fn undeclared_and_malformed_values_are_tolerated() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "[aeAppState]\nunknown_key = 'x'\nfont_size = 'huge'\nwin_rectangle = (1, 2\ntst_var = plain text\n",
        );
        let app = app_with(&path, tst_schema());

        assert_eq!(app.states().font_size(), 30.0);
        assert_eq!(app.states().win_rectangle(), [0, 0, 800, 600]);
        assert_eq!(app.get_app_state("tst_var"), Some(StateValue::from("plain text")));
        assert_eq!(app.get_app_state("unknown_key"), None);
        assert!(!app.retrieve_app_state().contains_key("unknown_key"));
        assert!(!app.debug_bubble());
    }

    #[test]
    fn setup_ignores_unknown_candidate_keys() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[aeAppState]\ntst_var = ''\nother = 1\n");
        let mut app = app_with(&path, tst_schema());

        let mut candidate = AppState::new();
        candidate.insert("other".to_string(), StateValue::Int(2));
        candidate.insert("tst_var".to_string(), StateValue::from("set"));
        candidate.insert("not_in_section".to_string(), StateValue::Int(3));
        app.setup_app_state(&candidate).unwrap();

        assert_eq!(app.get_app_state("tst_var"), Some(StateValue::from("set")));
        assert_eq!(app.retrieve_app_state().len(), 1);
    }

    #[test]
    fn change_rejects_unknown_keys_and_kinds() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[aeAppState]\n");
        let mut app = app_with(&path, tst_schema());

        assert!(matches!(
            app.change_app_state("nope", 1i64),
            Err(StateError::UnknownKey { .. })
        ));
        assert!(matches!(
            app.change_app_state("font_size", "big"),
            Err(StateError::TypeMismatch { .. })
        ));
        assert_eq!(app.states().font_size(), 30.0);
    }

    #[test]
    fn changes_reach_initialized_mirror_only() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[aeAppState]\nfont_size = 30.0\n");
        let mut app = app_with(&path, tst_schema());

        app.change_app_state("font_size", 26.0).unwrap();
        assert!(app.mirror().get("font_size").is_none());

        app.attach_mirror();
        app.change_app_state("font_size", 28i64).unwrap();
        app.change_app_state("tst_var", "seen").unwrap();
        assert_eq!(app.mirror().get("font_size"), Some(&StateValue::Float(28.0)));
        assert_eq!(app.mirror().get("tst_var"), Some(&StateValue::from("seen")));
        assert_eq!(app.states().font_size(), 28.0);

        app.change_app_state("font_size", 12.0).unwrap();
        assert_eq!(app.mirror().get("font_size"), Some(&StateValue::Float(24.0)));
    }

    #[test]
    fn save_fails_on_deleted_config_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[aeAppState]\ntst_var = 'a'\n");
        let mut app = app_with(&path, tst_schema());
        fs::remove_file(&path).unwrap();

        let error = app.save_app_state().unwrap_err();
        assert!(matches!(
            error,
            AppError::Config(ConfigError::FileNotFound { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn init_event_is_dispatched_once() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[aeAppState]\n");
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let hooks = EventHooks::new().on(EventKind::AppInit, move |_| {
            *counter.borrow_mut() += 1;
            Ok(true)
        });
        let config = ConfigStore::with_files(&[path]).unwrap();
        let mut app = MainApp::new(config, tst_schema(), hooks).unwrap();

        assert_eq!(*calls.borrow(), 1);
        assert_eq!(app.call_event(&AppEvent::AppStart).unwrap(), None);
        app.play_beep();
    }

    #[test]
    fn corrupted_state_files_do_not_fail_startup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("maio.ini");
        let mut contents = b"[aeAppState]\ncontext_id = '\xff'\nfont_size = 24.0\ncontext_path = ".to_vec();
        contents.extend("[".repeat(200_000).into_bytes());
        contents.push(b'\n');
        fs::write(&path, contents).unwrap();

        let app = app_with(&path, StateSchema::builtin());
        assert!(app.states().context_path().is_empty());
        assert_eq!(app.states().context_id(), "\u{fffd}");
        assert_eq!(app.states().font_size(), 24.0);
    }
}
