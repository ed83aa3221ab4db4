use super::{ListError, ListTree};
use chrono::{DateTime, Local};
use log::*;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

/// Name of the lists data file in the app data directory.
pub const LISTS_FILE_NAME: &str = "maio_lists.yml";

/// Persists the list tree as YAML, keeping hourly backups of overwritten
/// data files.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ListStore {
    file_path: PathBuf,
}

impl ListStore {
    pub fn new(file_path: impl Into<PathBuf>) -> ListStore {
        ListStore {
            file_path: file_path.into(),
        }
    }

    /// Store of the default data file inside `dir_path`.
    ///
    pub fn in_dir(dir_path: &Path) -> ListStore {
        ListStore::new(dir_path.join(LISTS_FILE_NAME))
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Load the list tree. A missing data file yields the default tree, a
    /// corrupted one is logged and yields the default tree as well.
    ///
    pub fn load(&self) -> Result<ListTree, ListError> {
        if !self.file_path.exists() {
            debug!("No lists data file at {}", self.file_path.display());
            return Ok(ListTree::default());
        }
        let bytes = fs::read(&self.file_path).map_err(|e| ListError::LoadFailed {
            path: self.file_path.clone(),
            source: e,
        })?;
        let contents = match String::from_utf8(bytes) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Ignoring corrupted lists file {}: {}", self.file_path.display(), e);
                return Ok(ListTree::default());
            }
        };
        match serde_yaml::from_str::<ListTree>(&contents) {
            Ok(tree) if !tree.root().is_empty() => Ok(tree),
            Ok(_) => Ok(ListTree::default()),
            Err(e) => {
                warn!("Ignoring corrupted lists file {}: {}", self.file_path.display(), e);
                Ok(ListTree::default())
            }
        }
    }

    /// Save the list tree, see [`ListStore::save_at`].
    ///
    pub fn save(&self, tree: &ListTree) -> Result<(), ListError> {
        self.save_at(tree, Local::now())
    }

    /// Save the list tree. An existing data file is first renamed to the
    /// backup of the hour of `now`, unless that backup already exists.
    ///
    pub fn save_at(&self, tree: &ListTree, now: DateTime<Local>) -> Result<(), ListError> {
        let content =
            serde_yaml::to_string(tree).map_err(|e| ListError::SerializationFailed(e.to_string()))?;

        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ListError::CreateDirectoryFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        if self.file_path.exists() {
            let backup = self.backup_path(now);
            if !backup.exists() {
                fs::rename(&self.file_path, &backup).map_err(|e| ListError::SaveFailed {
                    path: backup.clone(),
                    source: e,
                })?;
                debug!("Backed up lists to {}", backup.display());
            }
        }

        let mut file = fs::File::create(&self.file_path).map_err(|e| ListError::SaveFailed {
            path: self.file_path.clone(),
            source: e,
        })?;
        write!(file, "{}", content)
            .and_then(|_| file.flush())
            .map_err(|e| ListError::SaveFailed {
                path: self.file_path.clone(),
                source: e,
            })?;
        Ok(())
    }

    /// Backup file of the hour of `now`: `<stem>_<YYYYMMDDHH>.<ext>`.
    ///
    pub fn backup_path(&self, now: DateTime<Local>) -> PathBuf {
        let stem = self
            .file_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut name = format!("{}_{}", stem, now.format("%Y%m%d%H"));
        if let Some(ext) = self.file_path.extension() {
            name.push('.');
            name.push_str(&ext.to_string_lossy());
        }
        self.file_path.with_file_name(name)
    }
}
