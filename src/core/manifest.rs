use crate::models::error::SError;
use crate::models::manifest::{Layout, Manifest};
use crate::models::paths::PackagePaths;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io::Read;
use walkdir::WalkDir;

// How deep below a dropped folder or archive root we look for `manifest.json`.
const MAX_ROOT_DEPTH: usize = 3;

pub struct ManifestParser;

/// A manifest read straight out of an archive, without extracting it.
#[derive(Debug)]
pub struct ArchiveManifest {
    pub manifest: Manifest,
    /// Directory inside the archive holding `manifest.json`; empty for a flat archive.
    pub root: Utf8PathBuf,
}

impl ManifestParser {
    pub fn parse(text: &str) -> Result<Manifest, SError> {
        // Packages built on Windows frequently carry a BOM.
        let text = text.trim_start_matches('\u{feff}');
        serde_json::from_str(text).map_err(|e| SError::ManifestError(e.to_string()))
    }

    pub fn read_manifest(path: &Utf8Path) -> Result<Manifest, SError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SError::ManifestError(format!("unable to read {path}: {e}")))?;
        Self::parse(&text)
    }

    pub fn read_layout(path: &Utf8Path) -> Result<Layout, SError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(text.trim_start_matches('\u{feff}'))
            .map_err(|e| SError::ManifestError(format!("invalid layout.json: {e}")))
    }

    /// Finds the package root inside `dir`: the shallowest directory holding a `manifest.json`.
    pub fn find_package_root(dir: &Utf8Path) -> Result<Utf8PathBuf, SError> {
        let manifest_name = PackagePaths::default().manifest;
        if dir.join(&manifest_name).is_file() {
            return Ok(dir.to_path_buf());
        }

        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(MAX_ROOT_DEPTH + 1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_type().is_file() && e.file_name().to_str() == Some(manifest_name.as_str())
            })
            .min_by_key(|e| e.depth())
            .and_then(|e| e.path().parent().map(|p| p.to_path_buf()))
            .map(Utf8PathBuf::from_path_buf)
            .transpose()
            .map_err(|p| SError::ParseError(format!("Invalid UTF-8 path: {:?}", p)))?
            .ok_or_else(|| SError::ManifestError(format!("no manifest.json found in '{dir}'")))
    }

    /// Reads the shallowest `manifest.json` of a zip archive.
    pub fn read_from_archive(archive_path: &Utf8Path) -> Result<ArchiveManifest, SError> {
        let mut archive = zip::ZipArchive::new(File::open(archive_path)?)?;
        let manifest_name = PackagePaths::default().manifest;

        let entry = (0..archive.len())
            .filter_map(|i| {
                let name = archive.name_for_index(i)?;
                let path = Utf8PathBuf::from(name.replace('\\', "/"));
                let depth = path.components().count();
                let usable = path.file_name() == Some(manifest_name.as_str())
                    && depth <= MAX_ROOT_DEPTH + 1
                    && !path.starts_with("__MACOSX");
                usable.then_some((depth, i, path))
            })
            .min_by_key(|(depth, _, path)| (*depth, path.clone()))
            .ok_or_else(|| {
                SError::ManifestError(format!("no manifest.json found in '{archive_path}'"))
            })?;

        let (_, index, path) = entry;
        let mut text = String::new();
        archive
            .by_index(index)?
            .read_to_string(&mut text)
            .map_err(|e| SError::ManifestError(format!("unable to read manifest.json: {e}")))?;

        Ok(ArchiveManifest {
            manifest: Self::parse(&text)?,
            root: path.parent().map(|p| p.to_path_buf()).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "dependencies": [{"name": "fs-base", "package_version": "0.1.0"}],
        "content_type": "SCENERY",
        "title": "KJFK Airport",
        "manufacturer": "",
        "creator": "Studio",
        "package_version": "1.2.0",
        "minimum_game_version": "1.20.0",
        "release_notes": {}
    }"#;

    #[test]
    fn parses_with_bom_and_unknown_fields() {
        let m = ManifestParser::parse(&format!("\u{feff}{MANIFEST}")).unwrap();
        assert_eq!(m.title, "KJFK Airport");
        assert_eq!(m.dependencies[0].name, "fs-base");
    }

    #[test]
    fn optional_fields_default() {
        let m = ManifestParser::parse(
            r#"{"title":"T","content_type":"LIVERY","creator":"c","package_version":"1"}"#,
        )
        .unwrap();
        assert!(m.dependencies.is_empty());
        assert_eq!(m.minimum_game_version, "");
    }

    #[test]
    fn missing_title_is_a_manifest_error() {
        let err = ManifestParser::parse(r#"{"creator":"c"}"#).unwrap_err();
        assert!(matches!(err, SError::ManifestError(_)));
    }
}
