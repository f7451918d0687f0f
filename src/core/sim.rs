use crate::models::error::SError;
use crate::models::paths::SimPathRules;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing::info;

/// Maintenance of simulator data living next to the community directory
/// (`<sim>/Packages/Community` → `<sim>`).
pub struct Sim {
    paths: SimPathRules,
}

impl Sim {
    pub fn from_community(community: &Utf8Path) -> Result<Self, SError> {
        let root = Self::sim_root(community).ok_or_else(|| {
            SError::Validation(format!(
                "unable to locate the simulator directory from '{community}'"
            ))
        })?;
        Ok(Self {
            paths: SimPathRules::new(&root),
        })
    }

    fn sim_root(community: &Utf8Path) -> Option<Utf8PathBuf> {
        community
            .parent()?
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .map(Utf8Path::to_path_buf)
    }

    /// Deletes the scenery index directory. Returns false when there was none.
    pub fn clear_scenery_indexes(&self) -> Result<bool, SError> {
        let dir = &self.paths.scenery_indexes;
        if !dir.is_dir() {
            return Ok(false);
        }
        fs::remove_dir_all(dir)?;
        info!("Cleared scenery indexes at {dir}");
        Ok(true)
    }

    /// Deletes the rolling cache file. Returns false when there was none.
    pub fn clear_rolling_cache(&self) -> Result<bool, SError> {
        let file = &self.paths.rolling_cache;
        if !file.is_file() {
            return Ok(false);
        }
        fs::remove_file(file)?;
        info!("Cleared rolling cache at {file}");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clears_indexes_two_levels_above_community() {
        let tmp = tempfile::tempdir().unwrap();
        let sim = Utf8Path::from_path(tmp.path()).unwrap();
        let community = sim.join("Packages/Community");
        fs::create_dir_all(&community).unwrap();
        fs::create_dir_all(sim.join("SceneryIndexes/x")).unwrap();

        let tool = Sim::from_community(&community).unwrap();
        assert!(tool.clear_scenery_indexes().unwrap());
        assert!(!sim.join("SceneryIndexes").exists());
        assert!(!tool.clear_scenery_indexes().unwrap());
        assert!(!tool.clear_rolling_cache().unwrap());
    }
}
