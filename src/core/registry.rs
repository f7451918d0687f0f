use crate::config::{AppSettings, SettingsStore};
use crate::core::installer::InstallTarget;
use crate::core::library::Library;
use crate::core::preset::PresetManager;
use crate::models::error::SError;
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::info;

// Packages staged at the same time during one install request.
const INSTALL_CONCURRENCY: usize = 4;

/// Shared state behind every boundary call.
pub struct AppRegistry {
    pub settings: Arc<SettingsStore>,
    // The outer lock lets a change of addons directory swap the whole library at once.
    library: Arc<RwLock<Arc<Library>>>,
    pub presets: Arc<PresetManager>,
    pub install_permits: Arc<Semaphore>,
}

impl AppRegistry {
    /// Builds the state from a configuration directory holding `settings.toml` and `presets/`.
    pub fn new(config_dir: &Utf8Path) -> Result<Self, SError> {
        let settings = SettingsStore::open(&config_dir.join("settings.toml"))?;
        let library = Library::open(&settings.get().addons_dir()?)?;
        let presets = PresetManager::new(&config_dir.join("presets"))?;
        info!("Library opened at {}", library.root());

        Ok(Self {
            settings: Arc::new(settings),
            library: Arc::new(RwLock::new(Arc::new(library))),
            presets: Arc::new(presets),
            install_permits: Arc::new(Semaphore::new(INSTALL_CONCURRENCY)),
        })
    }

    /// The library currently in use. Callers keep working on their handle even if the
    /// library is swapped meanwhile.
    pub fn library(&self) -> Arc<Library> {
        self.library.read().clone()
    }

    /// Makes `library` current. Callers holding the previous one keep using it.
    pub fn replace_library(&self, library: Library) -> Arc<Library> {
        let library = Arc::new(library);
        *self.library.write() = library.clone();
        info!("Library reopened at {}", library.root());
        library
    }

    pub fn settings(&self) -> AppSettings {
        self.settings.get()
    }

    pub fn community_dir(&self) -> Result<Utf8PathBuf, SError> {
        self.settings.get().community_dir()
    }

    pub fn install_target(&self) -> Result<InstallTarget, SError> {
        let settings = self.settings.get();
        Ok(InstallTarget {
            community: settings.community_dir()?,
            auto_enable: settings.auto_enable,
        })
    }
}
