use crate::models::error::SError;
use crate::utils::toml::Toml;
use camino::{Utf8Path, Utf8PathBuf};
use directories::ProjectDirs;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use specta::Type;
use std::path::PathBuf;
use tracing::info;

const APP_NAME: &str = "addon_keeper";

fn default_true() -> bool {
    true
}

#[derive(Serialize, Deserialize, Type, Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub addons_dir: PathBuf,
    pub community_dir: PathBuf,
    #[serde(default = "default_true")]
    pub auto_enable: bool,
    #[serde(default)]
    pub auto_clear_scenery_indexes: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        let base_dir = ProjectDirs::from("com", "martes", APP_NAME)
            .map(|dirs| dirs.data_dir().to_path_buf())
            .or_else(|| {
                std::env::current_exe()
                    .ok()
                    .and_then(|exe_path| exe_path.parent().map(|p| p.to_path_buf()))
            })
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            addons_dir: base_dir.join("addons"),
            community_dir: base_dir.join("Community"),
            auto_enable: true,
            auto_clear_scenery_indexes: false,
        }
    }
}

impl AppSettings {
    pub fn addons_dir(&self) -> Result<Utf8PathBuf, SError> {
        to_utf8(&self.addons_dir)
    }

    pub fn community_dir(&self) -> Result<Utf8PathBuf, SError> {
        to_utf8(&self.community_dir)
    }
}

fn to_utf8(path: &std::path::Path) -> Result<Utf8PathBuf, SError> {
    Utf8PathBuf::from_path_buf(path.to_path_buf())
        .map_err(|p| SError::Validation(format!("path is not valid UTF-8: {:?}", p)))
}

/// A single change to the settings.
#[derive(Serialize, Deserialize, Type, Debug, Clone, PartialEq)]
#[serde(tag = "key", content = "value", rename_all = "snake_case")]
pub enum SettingUpdate {
    AddonsDir(String),
    CommunityDir(String),
    AutoEnable(bool),
    AutoClearSceneryIndexes(bool),
}

impl SettingUpdate {
    /// True when the change moves the library to another directory.
    pub fn moves_library(&self) -> bool {
        matches!(self, SettingUpdate::AddonsDir(_))
    }

    fn apply_to(&self, settings: &mut AppSettings) -> Result<(), SError> {
        match self {
            SettingUpdate::AddonsDir(path) => settings.addons_dir = existing_dir(path)?,
            SettingUpdate::CommunityDir(path) => settings.community_dir = existing_dir(path)?,
            SettingUpdate::AutoEnable(v) => settings.auto_enable = *v,
            SettingUpdate::AutoClearSceneryIndexes(v) => settings.auto_clear_scenery_indexes = *v,
        }
        Ok(())
    }
}

fn existing_dir(raw: &str) -> Result<PathBuf, SError> {
    let path = Utf8Path::new(raw.trim());
    if path.as_str().is_empty() {
        return Err(SError::Validation("directory must not be empty".into()));
    }
    if !path.is_dir() {
        return Err(SError::Validation(format!("'{path}' is not an existing directory")));
    }
    Ok(path.as_std_path().to_path_buf())
}

/// Settings loaded from, and written back to, one TOML file.
pub struct SettingsStore {
    pub path: Utf8PathBuf,
    settings: RwLock<AppSettings>,
}

impl SettingsStore {
    /// Loads the settings at `path`, writing defaults there when the file is missing.
    pub fn open(path: &Utf8Path) -> Result<Self, SError> {
        let settings: AppSettings = confy::load_path(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            settings: RwLock::new(settings),
        })
    }

    pub fn get(&self) -> AppSettings {
        self.settings.read().clone()
    }

    /// The settings `update` would produce, validated but neither applied nor persisted.
    pub fn preview(&self, update: &SettingUpdate) -> Result<AppSettings, SError> {
        let mut next = self.get();
        update.apply_to(&mut next)?;
        Ok(next)
    }

    /// Validates and persists one change. Nothing changes when validation or the write fails.
    pub fn set(&self, update: &SettingUpdate) -> Result<AppSettings, SError> {
        let mut current = self.settings.write();
        let mut next = current.clone();
        update.apply_to(&mut next)?;

        Toml::write(&self.path, &next)?;
        info!("Settings updated: {:?}", update);
        *current = next.clone();
        Ok(next)
    }
}
