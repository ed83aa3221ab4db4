//! Configuration management module.
//!
//! The config store layers one or more INI files. Later files override
//! earlier ones when reading; a write goes to the file that owns the option.
//! The app state section and the debug options live in these files.

mod error;
mod ini;

pub use error::ConfigError;
pub use ini::IniDocument;

use crate::utils::literal::{coerce_literal, StateValue, ValueKind};
use log::*;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

const FILE_EXTENSION: &str = "ini";

/// Config section holding the framework options (debug level).
pub const OPTIONS_SECTION_NAME: &str = "aeOptions";

/// Option of [`OPTIONS_SECTION_NAME`] holding the debug level.
pub const DEBUG_LEVEL_OPTION: &str = "debugLevel";

/// One backing file of the store.
///
#[derive(Debug, Clone)]
struct ConfigFile {
    path: PathBuf,
    document: Option<IniDocument>,
}

/// Oversees the layered configuration files.
///
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    files: Vec<ConfigFile>,
}

impl ConfigStore {
    /// Return a new store without any backing file.
    ///
    pub fn new() -> ConfigStore {
        ConfigStore { files: vec![] }
    }

    /// Build a store over the given files, lowest priority first, and load them.
    ///
    pub fn with_files<P: AsRef<Path>>(paths: &[P]) -> Result<ConfigStore, ConfigError> {
        let mut store = ConfigStore::new();
        for path in paths {
            store.files.push(ConfigFile {
                path: path.as_ref().to_path_buf(),
                document: None,
            });
        }
        store.load_cfg_files()?;
        Ok(store)
    }

    /// Build the store of an app: its default file in the platform config
    /// directory, followed by the additional files. The default directory is
    /// created if missing.
    ///
    pub fn for_app<P: AsRef<Path>>(
        app_name: &str,
        additional_cfg_files: &[P],
    ) -> Result<ConfigStore, ConfigError> {
        let default_file = ConfigStore::default_path(app_name)?;
        if let Some(dir_path) = default_file.parent() {
            if !dir_path.exists() {
                fs::create_dir_all(dir_path).map_err(|e| ConfigError::CreateDirectoryFailed {
                    path: dir_path.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut paths = vec![default_file];
        paths.extend(additional_cfg_files.iter().map(|p| p.as_ref().to_path_buf()));
        ConfigStore::with_files(&paths)
    }

    /// Returns the path of the default config file of an app or an error if
    /// the platform config directory could not be found.
    ///
    pub fn default_path(app_name: &str) -> Result<PathBuf, ConfigError> {
        match dirs::config_dir() {
            Some(config_dir) => Ok(config_dir
                .join(app_name)
                .join(Path::new(app_name).with_extension(FILE_EXTENSION))),
            None => Err(ConfigError::ConfigDirectoryNotFound),
        }
    }

    /// Layer another file on top of the existing ones and load it.
    ///
    pub fn add_file(&mut self, path: impl Into<PathBuf>) -> Result<(), ConfigError> {
        let path = path.into();
        let document = read_document(&path)?;
        self.files.push(ConfigFile { path, document });
        Ok(())
    }

    /// Paths of all backing files, lowest priority first.
    ///
    pub fn files(&self) -> Vec<&Path> {
        self.files.iter().map(|file| file.path.as_path()).collect()
    }

    /// Re-read all backing files, picking up external changes. Files missing
    /// on disk are treated as empty.
    ///
    pub fn load_cfg_files(&mut self) -> Result<(), ConfigError> {
        for file in self.files.iter_mut() {
            file.document = read_document(&file.path)?;
        }
        debug!("Loaded {} config file(s)", self.files.len());
        Ok(())
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.documents().any(|doc| doc.has_section(section))
    }

    /// Option names of a section over all files, in order of first appearance.
    /// Empty if no file has the section.
    ///
    pub fn options(&self, section: &str) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for doc in self.documents() {
            for key in doc.options(section) {
                if !keys.iter().any(|k| k == key) {
                    keys.push(key.to_string());
                }
            }
        }
        keys
    }

    /// Effective raw text of every option of a section.
    ///
    pub fn items(&self, section: &str) -> Vec<(String, String)> {
        self.options(section)
            .into_iter()
            .filter_map(|key| {
                let value = self.get_var(&key, section)?.to_string();
                Some((key, value))
            })
            .collect()
    }

    /// Raw text of an option from the highest priority file defining it.
    ///
    pub fn get_var(&self, key: &str, section: &str) -> Option<&str> {
        self.files
            .iter()
            .rev()
            .filter_map(|file| file.document.as_ref())
            .find_map(|doc| doc.get(section, key))
    }

    /// Value of an option coerced into the given kind.
    ///
    pub fn get_value(&self, key: &str, section: &str, kind: ValueKind) -> Option<StateValue> {
        coerce_literal(self.get_var(key, section)?, kind)
    }

    /// Write an option as literal text into the file owning it and persist
    /// that file. The file owning an option is the highest priority one
    /// defining the option, else the highest priority one having the section,
    /// else the last layered file. The owning file must exist on disk.
    ///
    pub fn set_var(&mut self, key: &str, value: &StateValue, section: &str) -> Result<(), ConfigError> {
        let index = self.owning_file_index(key, section)?;
        let file = &mut self.files[index];
        if !file.path.exists() {
            return Err(ConfigError::FileNotFound {
                path: file.path.clone(),
            });
        }

        // re-read to keep changes made by others since the last load
        let mut document = read_document(&file.path)?.unwrap_or_default();
        document.set(section, key, &value.to_literal());
        write_document(&file.path, &document)?;
        file.document = Some(document);
        debug!("Saved {}.{} = {} to {}", section, key, value, file.path.display());
        Ok(())
    }

    /// Debug level of the framework options, 0 if unset or invalid.
    ///
    pub fn debug_level(&self) -> i64 {
        self.get_value(DEBUG_LEVEL_OPTION, OPTIONS_SECTION_NAME, ValueKind::Int)
            .and_then(|value| value.as_int())
            .unwrap_or(0)
    }

    fn owning_file_index(&self, key: &str, section: &str) -> Result<usize, ConfigError> {
        let rev_position = |predicate: &dyn Fn(&IniDocument) -> bool| {
            self.files
                .iter()
                .rposition(|file| file.document.as_ref().map_or(false, predicate))
        };
        rev_position(&|doc| doc.has_option(section, key))
            .or_else(|| rev_position(&|doc| doc.has_section(section)))
            .or_else(|| self.files.len().checked_sub(1))
            .ok_or(ConfigError::NoConfigFile)
    }

    fn documents(&self) -> impl Iterator<Item = &IniDocument> {
        self.files.iter().filter_map(|file| file.document.as_ref())
    }
}

fn read_document(path: &Path) -> Result<Option<IniDocument>, ConfigError> {
    if !path.exists() {
        debug!("Config file {} does not exist", path.display());
        return Ok(None);
    }
    let bytes = fs::read(path).map_err(|e| ConfigError::LoadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    let contents = match String::from_utf8(bytes) {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Config file {} is not valid UTF-8, replacing invalid bytes", path.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    Ok(Some(IniDocument::parse(&contents)))
}

fn write_document(path: &Path, document: &IniDocument) -> Result<(), ConfigError> {
    let mut file = fs::File::create(path).map_err(|e| ConfigError::SaveFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    write!(file, "{}", document).map_err(|e| ConfigError::SaveFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    file.flush().map_err(|e| ConfigError::SaveFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
