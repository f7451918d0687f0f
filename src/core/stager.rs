use crate::core::decompression::Decompression;
use crate::core::manifest::ManifestParser;
use crate::models::addon::LedgerEntry;
use crate::models::error::SError;
use crate::models::manifest::Manifest;
use crate::models::paths::PackagePaths;
use crate::utils::file::FileUtils;
use crate::utils::id::sanitize_id;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::fs;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct Stager;

/// A package unpacked into the staging area, ready to be moved into the library.
#[derive(Debug)]
pub struct StagedAddon {
    pub id: String,
    pub manifest: Manifest,
    /// Package root inside the staging area; this directory becomes `<addons_dir>/<id>`.
    pub root: Utf8PathBuf,
    /// Scratch directory owning `root`; removed by `clean_up`.
    pub staging_dir: Utf8PathBuf,
    pub files: Vec<LedgerEntry>,
    pub size: u64,
}

impl Stager {
    /// Copies or extracts one user-supplied path into `staging_root`.
    pub fn stage(input: &Utf8Path, staging_root: &Utf8Path) -> Result<StagedAddon, SError> {
        if !input.exists() {
            return Err(SError::IOError(format!("'{input}' does not exist")));
        }

        // Chain strategies: Try Directory -> If None, Try Archive
        Self::process_as_directory(input, staging_root)
            .or_else(|| Self::process_as_archive(input, staging_root))
            .unwrap_or_else(|| {
                Err(SError::Validation(format!(
                    "'{input}' is neither a package directory nor a .zip archive"
                )))
            })
    }

    // --- Strategy Functions (Option<Result<...>>) ---

    /// Strategy A: input is a directory holding (possibly one level down) a package.
    fn process_as_directory(
        input: &Utf8Path,
        staging_root: &Utf8Path,
    ) -> Option<Result<StagedAddon, SError>> {
        if !input.is_dir() {
            return None;
        }

        Some(ManifestParser::find_package_root(input).and_then(|package_root| {
            let manifest_path = PackagePaths::new(&package_root).manifest;
            let manifest = ManifestParser::read_manifest(&manifest_path)?;
            let name = package_root.file_name().unwrap_or(input.as_str());
            let id = sanitize_id(name)?;

            Self::fill_staging(staging_root, id, manifest, |dest| {
                FileUtils::copy_recursive(&package_root, dest).map(|_| ())
            })
        }))
    }

    /// Strategy B: input is a zip archive.
    fn process_as_archive(
        input: &Utf8Path,
        staging_root: &Utf8Path,
    ) -> Option<Result<StagedAddon, SError>> {
        Decompression::is_archive(input).then(|| {
            let probe = ManifestParser::read_from_archive(input)?;
            let name = probe
                .root
                .file_name()
                .or_else(|| input.file_stem())
                .unwrap_or_default();
            let id = sanitize_id(name)?;

            Self::fill_staging(staging_root, id, probe.manifest, |dest| {
                Decompression::extract_subtree(input, &probe.root, dest).map(|_| ())
            })
        })
    }

    // --- Internal Helpers ---

    fn fill_staging<F>(
        staging_root: &Utf8Path,
        id: String,
        manifest: Manifest,
        fill: F,
    ) -> Result<StagedAddon, SError>
    where
        F: FnOnce(&Utf8Path) -> Result<(), SError>,
    {
        let staging_dir = staging_root.join(Uuid::new_v4().to_string());
        let root = staging_dir.join("package");
        fs::create_dir_all(&root)?;

        let staged = fill(&root)
            .and_then(|_| Ok((build_ledger(&root)?, FileUtils::dir_size(&root)?)))
            .map(|(files, size)| StagedAddon {
                id,
                manifest,
                root,
                staging_dir: staging_dir.clone(),
                files,
                size,
            });

        if staged.is_err() {
            let _ = fs::remove_dir_all(&staging_dir);
        }
        staged
    }

    pub fn clean_up(StagedAddon { staging_dir, .. }: &StagedAddon) -> Result<(), SError> {
        if !staging_dir.exists() {
            return Ok(());
        }
        debug!("clean up for {staging_dir}");
        fs::remove_dir_all(staging_dir).map_err(Into::into)
    }
}

/// The expected file list of a package: its `layout.json` when it has one,
/// otherwise every file currently below `root`.
pub fn build_ledger(root: &Utf8Path) -> Result<Vec<LedgerEntry>, SError> {
    let layout_path = PackagePaths::new(root).layout;
    if !layout_path.is_file() {
        return FileUtils::collect_ledger(root);
    }

    Ok(ManifestParser::read_layout(&layout_path)?
        .content
        .into_iter()
        .map(|c| LedgerEntry {
            path: c.path.replace('\\', "/"),
            size: c.size,
        })
        .filter(|entry| {
            let inside = is_contained(Utf8Path::new(&entry.path));
            if !inside {
                warn!("Ignoring layout entry outside the package: {}", entry.path);
            }
            inside
        })
        .collect())
}

fn is_contained(path: &Utf8Path) -> bool {
    path.components()
        .all(|c| matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir))
}
