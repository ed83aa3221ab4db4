//! Local app updates applied on startup.
//!
//! Files placed below the update folders of the app directory get moved into
//! the app directory, keeping their path relative to the update folder.

use crate::error::AppResult;
use log::*;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Folder with files that are moved unless they already exist.
pub const MOVES_FOLDER_NAME: &str = "ae_updater_moves";

/// Folder with files that overwrite existing ones.
pub const OVERWRITES_FOLDER_NAME: &str = "ae_updater_overwrites";

/// Move the files below `src_dir` into `dst_dir`, skipping files already
/// existing there. Returns the paths of the moved files.
///
pub fn check_local_moves(src_dir: &Path, dst_dir: &Path) -> AppResult<Vec<PathBuf>> {
    update_files(src_dir, dst_dir, false)
}

/// Move the files below `src_dir` into `dst_dir`, replacing existing files.
/// Returns the paths of the moved files.
///
pub fn check_local_overwrites(src_dir: &Path, dst_dir: &Path) -> AppResult<Vec<PathBuf>> {
    update_files(src_dir, dst_dir, true)
}

/// Apply the overwrites, then the moves of the update folders in `app_dir`.
///
pub fn check_all(app_dir: &Path) -> AppResult<Vec<PathBuf>> {
    let mut updated = check_local_overwrites(&app_dir.join(OVERWRITES_FOLDER_NAME), app_dir)?;
    updated.extend(check_local_moves(&app_dir.join(MOVES_FOLDER_NAME), app_dir)?);
    if !updated.is_empty() {
        info!("Applied {} local update(s)", updated.len());
    }
    Ok(updated)
}

fn update_files(src_dir: &Path, dst_dir: &Path, overwrite: bool) -> AppResult<Vec<PathBuf>> {
    let mut updated = vec![];
    if !src_dir.is_dir() {
        return Ok(updated);
    }
    for src_file in files_below(src_dir)? {
        let relative = match src_file.strip_prefix(src_dir) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let dst_file = dst_dir.join(relative);
        if !overwrite && dst_file.exists() {
            debug!("Keeping existing {}", dst_file.display());
            continue;
        }
        if let Some(parent) = dst_file.parent() {
            fs::create_dir_all(parent)?;
        }
        move_file(&src_file, &dst_file)?;
        debug!("Updated {}", dst_file.display());
        updated.push(dst_file);
    }
    Ok(updated)
}

fn files_below(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn move_file(src: &Path, dst: &Path) -> io::Result<()> {
    if fs::rename(src, dst).is_ok() {
        return Ok(());
    }
    // rename fails across file systems
    fs::copy(src, dst)?;
    fs::remove_file(src)
}
