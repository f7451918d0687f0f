#![allow(dead_code)]

use addon_keeper_lib::core::installer::{InstallTarget, Installer};
use addon_keeper_lib::core::library::Library;
use addon_keeper_lib::models::install::AddonInstallResult;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io::Write;
use tempfile::TempDir;

/// A throwaway simulator layout:
/// `root/sim/Packages/Community`, `root/addons`, `root/config` and `root/sources`.
pub struct TestEnv {
    _tmp: TempDir,
    pub root: Utf8PathBuf,
    pub sim: Utf8PathBuf,
    pub community: Utf8PathBuf,
    pub addons: Utf8PathBuf,
    pub config: Utf8PathBuf,
    pub sources: Utf8PathBuf,
}

pub fn setup_test_env() -> TestEnv {
    let tmp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();

    let sim = root.join("sim");
    let community = sim.join("Packages").join("Community");
    let addons = root.join("addons");
    let config = root.join("config");
    let sources = root.join("sources");
    for dir in [&community, &addons, &config, &sources] {
        fs::create_dir_all(dir).unwrap();
    }

    TestEnv {
        _tmp: tmp,
        root,
        sim,
        community,
        addons,
        config,
        sources,
    }
}

impl TestEnv {
    pub fn library(&self) -> Library {
        Library::open(&self.addons).expect("Failed to open library")
    }

    pub fn target(&self, auto_enable: bool) -> InstallTarget {
        InstallTarget {
            community: self.community.clone(),
            auto_enable,
        }
    }

    /// Writes a settings file pointing at this environment.
    pub fn write_settings(&self, auto_enable: bool, auto_clear: bool) {
        let text = format!(
            "addons_dir = {:?}\ncommunity_dir = {:?}\nauto_enable = {auto_enable}\nauto_clear_scenery_indexes = {auto_clear}\n",
            self.addons.as_str(),
            self.community.as_str(),
        );
        fs::write(self.config.join("settings.toml"), text).unwrap();
    }

    /// Creates a package directory under `sources/` and installs it, returning its id.
    pub fn install_package(&self, library: &Library, name: &str, enable: bool) -> String {
        let dir = self.sources.join(name);
        create_test_package(&dir, name, &[("data/file.bin", "payload")], false);
        let result = Installer::install(library, &self.target(enable), &[dir]);
        match &result.results[0] {
            AddonInstallResult::Success { id } => id.clone(),
            other => panic!("install of {name} failed: {other:?}"),
        }
    }
}

pub fn manifest_json(title: &str) -> String {
    format!(
        r#"{{
    "dependencies": [],
    "content_type": "SCENERY",
    "title": "{title}",
    "manufacturer": "",
    "creator": "Test Studio",
    "package_version": "1.0.0",
    "minimum_game_version": "1.0.0",
    "release_notes": {{}}
}}"#
    )
}

/// Mock a package folder: `manifest.json`, the given files and optionally a `layout.json`
/// listing them.
pub fn create_test_package(dir: &Utf8Path, title: &str, files: &[(&str, &str)], layout: bool) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("manifest.json"), manifest_json(title)).unwrap();

    for (path, content) in files {
        let file = dir.join(path);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, content).unwrap();
    }

    if layout {
        let entries: Vec<String> = files
            .iter()
            .map(|(path, content)| {
                format!(
                    r#"{{"path": "{path}", "size": {}, "date": 132000000000000000}}"#,
                    content.len()
                )
            })
            .collect();
        fs::write(
            dir.join("layout.json"),
            format!(r#"{{"content": [{}]}}"#, entries.join(",")),
        )
        .unwrap();
    }
}

/// Zips `src_dir`, placing its contents under `prefix` inside the archive
/// (an empty prefix produces a flat archive).
pub fn create_zip(src_dir: &Utf8Path, zip_path: &Utf8Path, prefix: &str) {
    let file = fs::File::create(zip_path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    for entry in walkdir::WalkDir::new(src_dir).sort_by_file_name() {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(src_dir).unwrap();
        if rel.as_os_str().is_empty() {
            continue;
        }
        let rel = rel.to_str().unwrap().replace('\\', "/");
        let name = if prefix.is_empty() {
            rel
        } else {
            format!("{prefix}/{rel}")
        };

        if entry.file_type().is_dir() {
            zip.add_directory(name, options).unwrap();
        } else {
            zip.start_file(name, options).unwrap();
            zip.write_all(&fs::read(entry.path()).unwrap()).unwrap();
        }
    }
    zip.finish().unwrap();
}
