use crate::core::enablement::Enablement;
use crate::core::library::Library;
use crate::models::error::SError;
use crate::models::preset::Preset;
use crate::utils::id::{slugify, validate_id};
use crate::utils::toml::Toml;
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fs;
use tracing::{info, warn};

/// One step of a preset application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Disable(String),
    Enable(String),
}

/// Computes the steps turning `current` into `target`: every disable first, then every
/// enable, each group in ascending id order.
pub fn plan(current: &BTreeSet<String>, target: &BTreeSet<String>) -> Vec<Intent> {
    let disables = current.difference(target).cloned().map(Intent::Disable);
    let enables = target.difference(current).cloned().map(Intent::Enable);
    disables.chain(enables).collect()
}

/// Applies `preset` to the library. Ids the library does not know are skipped.
///
/// Every intent is attempted; failures are collected and reported together as a
/// `PartialFailure` (in execution order), leaving whatever state the successful steps
/// produced. Returns the intents that were applied.
pub fn apply(
    library: &Library,
    community: &Utf8Path,
    preset: &Preset,
) -> Result<Vec<Intent>, SError> {
    let registered = library.ids();
    let target: BTreeSet<String> = preset.addons.intersection(&registered).cloned().collect();
    let current = library.enabled_ids(community);

    let stale = preset.addons.len() - target.len();
    if stale > 0 {
        warn!("Preset '{}' references {stale} unknown addon(s)", preset.id);
    }

    let mut applied = Vec::new();
    let mut failures = Vec::new();
    for intent in plan(&current, &target) {
        let result = match &intent {
            Intent::Disable(id) => Enablement::disable(library, community, id),
            Intent::Enable(id) => Enablement::enable(library, community, id),
        };
        match result {
            Ok(_) => applied.push(intent),
            Err(e) => {
                let (verb, id) = match &intent {
                    Intent::Disable(id) => ("disable", id),
                    Intent::Enable(id) => ("enable", id),
                };
                warn!("Preset '{}': failed to {verb} '{id}': {e}", preset.id);
                failures.push(format!("failed to {verb} '{id}': {e}"));
            }
        }
    }

    if !failures.is_empty() {
        return Err(SError::PartialFailure(failures));
    }
    info!("Applied preset '{}' ({} change(s))", preset.id, applied.len());
    Ok(applied)
}

/// Presets stored one file per preset under a directory.
pub struct PresetManager {
    pub path: Utf8PathBuf,
    // Serializes the existence check and the write of every mutation.
    writes: Mutex<()>,
}

impl PresetManager {
    pub fn new(path: &Utf8Path) -> Result<Self, SError> {
        fs::create_dir_all(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writes: Mutex::new(()),
        })
    }

    /// Stores a new preset. An empty id is derived from the name.
    pub fn create(&self, mut preset: Preset) -> Result<Preset, SError> {
        preset.name = preset.name.trim().to_string();
        if preset.name.is_empty() {
            return Err(SError::Validation("preset name must not be empty".into()));
        }
        if preset.id.trim().is_empty() {
            preset.id = slugify(&preset.name);
        }
        validate_id(&preset.id)
            .map_err(|_| SError::Validation(format!("invalid preset id '{}'", preset.id)))?;

        let _guard = self.writes.lock();
        let file = self.preset_file(&preset.id);
        if file.exists() {
            return Err(SError::Conflict(format!("preset '{}' already exists", preset.id)));
        }

        Toml::write(&file, &preset)?;
        Ok(preset)
    }

    /// All presets, ordered by id. Unreadable files are skipped.
    pub fn list(&self) -> Result<Vec<Preset>, SError> {
        let mut presets = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let path = entry?.path();
            let Ok(path) = Utf8PathBuf::from_path_buf(path) else {
                continue;
            };
            if !path.is_file() || path.extension() != Some("toml") {
                continue;
            }
            match Toml::read::<Preset>(&path) {
                Ok(preset) => presets.push(preset),
                Err(e) => warn!("Skipping unreadable preset {path}: {e}"),
            }
        }
        presets.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(presets)
    }

    pub fn get(&self, id: &str) -> Result<Preset, SError> {
        let file = self.existing_file(id)?;
        Toml::read(&file)
    }

    pub fn update(&self, mut preset: Preset) -> Result<Preset, SError> {
        let _guard = self.writes.lock();
        let file = self.existing_file(&preset.id)?;
        preset.name = preset.name.trim().to_string();
        if preset.name.is_empty() {
            return Err(SError::Validation("preset name must not be empty".into()));
        }
        Toml::write(&file, &preset)?;
        Ok(preset)
    }

    pub fn remove(&self, id: &str) -> Result<(), SError> {
        let _guard = self.writes.lock();
        let file = self.existing_file(id)?;
        fs::remove_file(file)?;
        Ok(())
    }

    fn existing_file(&self, id: &str) -> Result<Utf8PathBuf, SError> {
        validate_id(id).map_err(|_| SError::PresetNotFound(id.to_string()))?;
        let file = self.preset_file(id);
        if !file.is_file() {
            return Err(SError::PresetNotFound(id.to_string()));
        }
        Ok(file)
    }

    fn preset_file(&self, id: &str) -> Utf8PathBuf {
        self.path.join(format!("{id}.toml"))
    }
}
