//! Preset boundary
//!
//! Named text/markdown snippets that can be loaded into the editor with
//! `set_value`. The editor core only consumes the `PresetSource` and
//! `DirectoryPicker` traits; `FsPresetSource` is the filesystem-backed source
//! used by native hosts and tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File extensions recognised as presets (compared case-insensitively)
pub const PRESET_EXTENSIONS: [&str; 2] = ["md", "txt"];

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preset file not found: {0}")]
    NotFound(PathBuf),
}

/// One preset file as listed to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetDescriptor {
    /// File name without its extension
    pub name: String,
    pub path: PathBuf,
    /// Lowercased extension including the dot (".md", ".txt")
    pub extension: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

pub trait PresetSource {
    /// List presets in `dir`, newest first
    fn list_presets(&self, dir: &Path) -> Result<Vec<PresetDescriptor>, PresetError>;

    /// Raw text of the preset at `path`
    fn load_preset(&self, path: &Path) -> Result<String, PresetError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryChoice {
    Chosen(PathBuf),
    Cancelled,
}

/// Host-provided directory chooser
pub trait DirectoryPicker {
    fn pick_directory(&mut self) -> Result<DirectoryChoice, PresetError>;
}

/// Ask the host for a directory and list its presets
///
/// `Ok(None)` when the user cancelled the picker.
pub fn browse_presets(
    picker: &mut dyn DirectoryPicker,
    source: &dyn PresetSource,
) -> Result<Option<(PathBuf, Vec<PresetDescriptor>)>, PresetError> {
    match picker.pick_directory()? {
        DirectoryChoice::Chosen(dir) => {
            let presets = source.list_presets(&dir)?;
            Ok(Some((dir, presets)))
        }
        DirectoryChoice::Cancelled => Ok(None),
    }
}

/// Order descriptors by modification time, newest first
pub fn sort_newest_first(presets: &mut [PresetDescriptor]) {
    presets.sort_by(|a, b| b.modified.cmp(&a.modified));
}

/// Presets stored as plain files on disk
///
/// Relative paths are resolved against `root`.
#[derive(Debug, Clone, Default)]
pub struct FsPresetSource {
    root: PathBuf,
}

impl FsPresetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        let cleaned = path.strip_prefix(".").unwrap_or(path);
        self.root.join(cleaned)
    }

    fn describe(path: &Path) -> Result<Option<PresetDescriptor>, PresetError> {
        let Some(extension) = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
        else {
            return Ok(None);
        };
        if !PRESET_EXTENSIONS.contains(&extension.as_str()) {
            return Ok(None);
        }

        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Ok(None);
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        Ok(Some(PresetDescriptor {
            name,
            path: path.to_path_buf(),
            extension: format!(".{}", extension),
            size: metadata.len(),
            modified: DateTime::<Utc>::from(modified),
        }))
    }
}

impl PresetSource for FsPresetSource {
    fn list_presets(&self, dir: &Path) -> Result<Vec<PresetDescriptor>, PresetError> {
        let dir = self.resolve(dir);
        log::info!("Loading presets from {}", dir.display());

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            return Ok(Vec::new());
        }

        let mut presets = Vec::new();
        for entry in fs::read_dir(&dir)? {
            if let Some(descriptor) = Self::describe(&entry?.path())? {
                presets.push(descriptor);
            }
        }
        sort_newest_first(&mut presets);
        Ok(presets)
    }

    fn load_preset(&self, path: &Path) -> Result<String, PresetError> {
        let path = self.resolve(path);
        if !path.exists() {
            return Err(PresetError::NotFound(path));
        }
        Ok(fs::read_to_string(&path)?)
    }
}
