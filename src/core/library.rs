use crate::core::linker;
use crate::core::locks::LockTable;
use crate::core::manifest::ManifestParser;
use crate::core::stager::{self, StagedAddon};
use crate::models::addon::{Addon, AddonRecord};
use crate::models::error::SError;
use crate::models::paths::{LibPathRules, PackagePaths};
use crate::utils::file::FileUtils;
use crate::utils::icon;
use crate::utils::id::validate_id;
use crate::utils::toml::Toml;
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const REGISTRY_VERSION: u8 = 1;

#[derive(Deserialize, Default)]
struct RegistryFile {
    #[allow(dead_code)]
    version: u8,
    #[serde(default)]
    addons: BTreeMap<String, AddonRecord>,
}

#[derive(Serialize)]
struct RegistryFileRef<'a> {
    version: u8,
    addons: &'a BTreeMap<String, AddonRecord>,
}

/// The installed add-ons of one addons directory.
///
/// Records live in an arena keyed by id; `enabled` is never stored but derived from the
/// community directory on every read, so it cannot drift from the links on disk.
pub struct Library {
    pub paths: LibPathRules,
    records: RwLock<BTreeMap<String, AddonRecord>>,
    locks: LockTable,
    thumbnails: Mutex<HashMap<String, Option<String>>>,
}

impl Library {
    /// Opens (creating if needed) the library rooted at `addons_dir`.
    ///
    /// Leftovers of interrupted installs are wiped, records whose directory vanished are
    /// dropped and package directories nobody registered yet are adopted.
    pub fn open(addons_dir: &Utf8Path) -> Result<Self, SError> {
        let paths = LibPathRules::new(addons_dir);
        std::fs::create_dir_all(&paths.meta)?;
        Self::clear_staging(&paths.staging)?;

        let mut addons = if paths.registry.exists() {
            Toml::read::<RegistryFile>(&paths.registry)?.addons
        } else {
            BTreeMap::new()
        };

        let mut changed = false;
        addons.retain(|id, _| {
            let present = paths.addon(id).is_dir();
            if !present {
                warn!("Dropping registry entry '{id}': directory is gone");
                changed = true;
            }
            present
        });

        for (id, dir) in Self::package_dirs(addons_dir)? {
            if addons.contains_key(&id) {
                continue;
            }
            match Self::adopt(&id, &dir) {
                Ok(record) => {
                    info!("Adopted unregistered addon '{id}'");
                    addons.insert(id, record);
                    changed = true;
                }
                Err(e) => debug!("Skipping '{dir}': {e}"),
            }
        }

        let library = Self {
            paths,
            records: RwLock::new(addons),
            locks: LockTable::default(),
            thumbnails: Mutex::new(HashMap::new()),
        };
        if changed || !library.paths.registry.exists() {
            library.persist(&library.records.read())?;
        }
        Ok(library)
    }

    pub fn root(&self) -> &Utf8Path {
        self.paths.root()
    }

    pub fn addon_path(&self, id: &str) -> Utf8PathBuf {
        self.paths.addon(id)
    }

    pub fn link_path(community: &Utf8Path, id: &str) -> Utf8PathBuf {
        community.join(id)
    }

    pub fn is_enabled(&self, community: &Utf8Path, id: &str) -> bool {
        linker::points_to(&Self::link_path(community, id), &self.addon_path(id))
    }

    pub fn lock_for(&self, id: &str) -> Arc<Mutex<()>> {
        self.locks.get(id)
    }

    /// Ids whose lock is held right now.
    pub fn held_locks(&self) -> usize {
        self.locks.live()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.read().contains_key(id)
    }

    pub fn record(&self, id: &str) -> Result<AddonRecord, SError> {
        self.records
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| SError::AddonNotFound(id.to_string()))
    }

    pub fn get(&self, id: &str, community: &Utf8Path) -> Result<Addon, SError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock();
        self.get_unlocked(id, community)
    }

    fn get_unlocked(&self, id: &str, community: &Utf8Path) -> Result<Addon, SError> {
        let records = self.records.read();
        let record = records
            .get(id)
            .ok_or_else(|| SError::AddonNotFound(id.to_string()))?;
        Ok(record.to_addon(self.is_enabled(community, id)))
    }

    /// All add-ons, ordered by id.
    pub fn list(&self, community: &Utf8Path) -> Vec<Addon> {
        self.records
            .read()
            .values()
            .map(|r| r.to_addon(self.is_enabled(community, &r.id)))
            .collect()
    }

    pub fn ids(&self) -> BTreeSet<String> {
        self.records.read().keys().cloned().collect()
    }

    pub fn enabled_ids(&self, community: &Utf8Path) -> BTreeSet<String> {
        self.records
            .read()
            .keys()
            .filter(|id| self.is_enabled(community, id))
            .cloned()
            .collect()
    }

    /// Moves a staged package into the library and registers it.
    /// Rejects the package when its id is already taken.
    pub fn commit(&self, staged: &StagedAddon) -> Result<String, SError> {
        let id = staged.id.as_str();
        let lock = self.lock_for(id);
        let _guard = lock.lock();
        let mut records = self.records.write();

        let dst = self.addon_path(id);
        if records.contains_key(id) || dst.exists() || dst.is_symlink() {
            return Err(SError::conflict_exists(id));
        }

        std::fs::rename(&staged.root, &dst)?;

        records.insert(
            id.to_string(),
            AddonRecord {
                id: id.to_string(),
                manifest: staged.manifest.clone(),
                size: staged.size,
                files: staged.files.clone(),
            },
        );
        if let Err(e) = self.persist(&records) {
            records.remove(id);
            if let Err(undo) = std::fs::rename(&dst, &staged.root) {
                warn!("Unable to move '{dst}' back to staging: {undo}");
            }
            return Err(e);
        }

        self.invalidate_thumbnail(id);
        info!("Registered addon '{id}' ({} bytes)", staged.size);
        Ok(id.to_string())
    }

    /// Renames an add-on, moving its directory and repointing its community link.
    /// Every completed step is undone when a later one fails.
    pub fn rename(&self, id: &str, new_id: &str, community: &Utf8Path) -> Result<Addon, SError> {
        validate_id(new_id)?;
        if id == new_id {
            return self.get(id, community);
        }

        let locks = self.locks.get_many(&[id, new_id]);
        let _guards: Vec<_> = locks.iter().map(|l| l.lock()).collect();
        let mut records = self.records.write();

        if !records.contains_key(id) {
            return Err(SError::AddonNotFound(id.to_string()));
        }
        let (old_dir, new_dir) = (self.addon_path(id), self.addon_path(new_id));
        if records.contains_key(new_id) || new_dir.exists() || new_dir.is_symlink() {
            return Err(SError::conflict_exists(new_id));
        }

        let was_enabled = self.is_enabled(community, id);
        let (old_link, new_link) = (
            Self::link_path(community, id),
            Self::link_path(community, new_id),
        );
        if was_enabled && (new_link.exists() || new_link.is_symlink()) {
            return Err(SError::Conflict(format!(
                "'{new_link}' already exists in the community directory"
            )));
        }

        if was_enabled {
            linker::unlink(&old_link).map_err(|e| SError::Link(e.to_string()))?;
        }

        let relink_old = || {
            if was_enabled {
                if let Err(e) = linker::link(&old_dir, &old_link) {
                    warn!("Rollback: unable to relink '{id}': {e}");
                }
            }
        };

        if let Err(e) = std::fs::rename(&old_dir, &new_dir) {
            relink_old();
            return Err(e.into());
        }

        let move_back = || {
            if let Err(e) = std::fs::rename(&new_dir, &old_dir) {
                warn!("Rollback: unable to move '{new_dir}' back: {e}");
            }
        };

        if was_enabled {
            if let Err(e) = linker::link(&new_dir, &new_link) {
                move_back();
                relink_old();
                return Err(SError::Link(e.to_string()));
            }
        }

        let mut record = records.remove(id).ok_or(SError::Unexpected(None))?;
        record.id = new_id.to_string();
        records.insert(new_id.to_string(), record);

        if let Err(e) = self.persist(&records) {
            if let Some(mut record) = records.remove(new_id) {
                record.id = id.to_string();
                records.insert(id.to_string(), record);
            }
            if was_enabled {
                if let Err(undo) = linker::unlink(&new_link) {
                    warn!("Rollback: unable to unlink '{new_link}': {undo}");
                }
            }
            move_back();
            relink_old();
            return Err(e);
        }

        self.invalidate_thumbnail(id);
        self.invalidate_thumbnail(new_id);
        info!("Renamed addon '{id}' to '{new_id}'");

        let record = records.get(new_id).ok_or(SError::Unexpected(None))?;
        Ok(record.to_addon(was_enabled))
    }

    /// Removes the community link and the library copy of an add-on.
    pub fn uninstall(&self, id: &str, community: &Utf8Path) -> Result<(), SError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock();
        let mut records = self.records.write();

        let record = records
            .get(id)
            .cloned()
            .ok_or_else(|| SError::AddonNotFound(id.to_string()))?;

        let was_enabled = self.is_enabled(community, id);
        let (dir, link) = (self.addon_path(id), Self::link_path(community, id));
        std::fs::create_dir_all(&self.paths.staging)?;
        if was_enabled {
            linker::unlink(&link).map_err(|e| SError::Link(e.to_string()))?;
        }
        let relink = || {
            if let Err(undo) = linker::link(&dir, &link) {
                warn!("Rollback: unable to relink '{id}': {undo}");
            }
        };

        // Move out of the way first: the rename is atomic, the recursive delete is not.
        let trash = self.paths.staging.join(format!("trash-{}", uuid::Uuid::new_v4()));
        let moved = dir.exists();
        if moved {
            if let Err(e) = std::fs::rename(&dir, &trash) {
                if was_enabled {
                    relink();
                }
                return Err(e.into());
            }
        }

        records.remove(id);
        if let Err(e) = self.persist(&records) {
            records.insert(id.to_string(), record);
            if moved {
                if let Err(undo) = std::fs::rename(&trash, &dir) {
                    warn!("Rollback: unable to move '{trash}' back to '{dir}': {undo}");
                }
            }
            if was_enabled {
                relink();
            }
            return Err(e);
        }

        if moved {
            if let Err(e) = std::fs::remove_dir_all(&trash) {
                warn!("Unable to delete '{trash}': {e}");
            }
        }
        self.invalidate_thumbnail(id);
        info!("Uninstalled addon '{id}'");
        Ok(())
    }

    /// Recomputes the recorded size of an add-on from the files on disk.
    pub fn rescan(&self, id: &str, community: &Utf8Path) -> Result<Addon, SError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock();
        let size = FileUtils::dir_size(&self.addon_path(id))?;

        let mut records = self.records.write();
        let record = records
            .get_mut(id)
            .ok_or_else(|| SError::AddonNotFound(id.to_string()))?;
        let previous = std::mem::replace(&mut record.size, size);
        if previous != size {
            if let Err(e) = self.persist(&records) {
                if let Some(r) = records.get_mut(id) {
                    r.size = previous;
                }
                return Err(e);
            }
        }
        drop(records);

        self.invalidate_thumbnail(id);
        self.get_unlocked(id, community)
    }

    /// Thumbnail as a data URI, cached until the add-on is next mutated.
    pub fn thumbnail(&self, id: &str) -> Result<Option<String>, SError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock();
        if !self.contains(id) {
            return Err(SError::AddonNotFound(id.to_string()));
        }

        if let Some(cached) = self.thumbnails.lock().get(id) {
            return Ok(cached.clone());
        }

        let uri = Self::find_thumbnail(&self.addon_path(id))
            .and_then(|p| icon::load_image_as_data_uri(&p));
        self.thumbnails.lock().insert(id.to_string(), uri.clone());
        Ok(uri)
    }

    pub(crate) fn invalidate_thumbnail(&self, id: &str) {
        self.thumbnails.lock().remove(id);
    }

    fn find_thumbnail(root: &Utf8Path) -> Option<Utf8PathBuf> {
        let is_thumbnail = |p: &Utf8Path| {
            p.file_stem().is_some_and(|s| s.eq_ignore_ascii_case("thumbnail"))
                && icon::mime_for(p).is_some()
        };

        let content_info = PackagePaths::new(root).content_info;
        WalkDir::new(&content_info)
            .max_depth(3)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter_map(|e| Utf8PathBuf::from_path_buf(e.into_path()).ok())
            .find(|p| p.is_file() && is_thumbnail(p))
            .or_else(|| {
                std::fs::read_dir(root)
                    .ok()?
                    .filter_map(|e| e.ok())
                    .filter_map(|e| Utf8PathBuf::from_path_buf(e.path()).ok())
                    .find(|p| p.is_file() && is_thumbnail(p))
            })
    }

    fn persist(&self, addons: &BTreeMap<String, AddonRecord>) -> Result<(), SError> {
        Toml::write(
            &self.paths.registry,
            &RegistryFileRef {
                version: REGISTRY_VERSION,
                addons,
            },
        )
    }

    fn adopt(id: &str, dir: &Utf8Path) -> Result<AddonRecord, SError> {
        validate_id(id)?;
        let manifest = ManifestParser::read_manifest(&PackagePaths::new(dir).manifest)?;
        Ok(AddonRecord {
            id: id.to_string(),
            manifest,
            size: FileUtils::dir_size(dir)?,
            files: stager::build_ledger(dir)?,
        })
    }

    /// Sub-directories of the addons directory that may hold packages (hidden ones excluded).
    fn package_dirs(addons_dir: &Utf8Path) -> Result<Vec<(String, Utf8PathBuf)>, SError> {
        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(addons_dir)? {
            let entry = entry?;
            let path = FileUtils::utf8_buf(entry.path())?;
            let Some(name) = path.file_name().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') || !entry.file_type()?.is_dir() {
                continue;
            }
            dirs.push((name, path));
        }
        Ok(dirs)
    }

    fn clear_staging(staging: &Utf8Path) -> Result<(), SError> {
        if staging.exists() {
            for entry in std::fs::read_dir(staging)? {
                let path = entry?.path();
                debug!("Removing stale staging entry {:?}", path);
                if path.is_dir() {
                    std::fs::remove_dir_all(&path)?;
                } else {
                    std::fs::remove_file(&path)?;
                }
            }
        }
        std::fs::create_dir_all(staging)?;
        Ok(())
    }
}
