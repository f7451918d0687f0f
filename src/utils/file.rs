use crate::models::addon::LedgerEntry;
use crate::models::error::SError;
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;
use walkdir::WalkDir;

pub struct FileUtils;

impl FileUtils {
    /// Recursively copies a directory tree from source to destination.
    /// Creates all necessary directories and overwrites existing files.
    /// Returns the number of bytes copied.
    pub fn copy_recursive(src: &Utf8Path, dst: &Utf8Path) -> Result<u64, SError> {
        std::fs::create_dir_all(dst)?;
        let mut copied = 0;

        for entry in WalkDir::new(src) {
            let entry = entry?;
            let src_path = Self::utf8(entry.path())?;
            let dst_path = dst.join(src_path.strip_prefix(src)?);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dst_path)?;
            } else {
                if let Some(parent) = dst_path.parent() {
                    if !parent.exists() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                copied += std::fs::copy(src_path, &dst_path)?;
            }
        }

        Ok(copied)
    }

    /// Lists every regular file under `root` with its size, sorted by relative path.
    pub fn collect_ledger(root: &Utf8Path) -> Result<Vec<LedgerEntry>, SError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = Self::utf8(entry.path())?;
            files.push(LedgerEntry {
                path: Self::to_ledger_path(path.strip_prefix(root)?),
                size: entry.metadata()?.len(),
            });
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// Sum of the sizes of all regular files below `root`.
    pub fn dir_size(root: &Utf8Path) -> Result<u64, SError> {
        let mut size = 0;
        for entry in WalkDir::new(root) {
            let entry = entry?;
            if entry.file_type().is_file() {
                size += entry.metadata()?.len();
            }
        }
        Ok(size)
    }

    /// Relative path rendered with `/` separators on every platform.
    pub fn to_ledger_path(rel: &Utf8Path) -> String {
        rel.components()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Writes `data` next to `path` under a temporary name, then renames it into place.
    pub fn write_atomic(path: &Utf8Path, data: &[u8]) -> Result<(), SError> {
        let parent = path
            .parent()
            .ok_or_else(|| SError::IOError(format!("'{path}' has no parent directory")))?;
        std::fs::create_dir_all(parent)?;

        let file_name = path.file_name().unwrap_or("data");
        let tmp = parent.join(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()));

        let written = std::fs::File::create(&tmp).and_then(|mut f| {
            f.write_all(data)?;
            f.sync_all()
        });
        if let Err(e) = written.and_then(|_| std::fs::rename(&tmp, path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn utf8(path: &std::path::Path) -> Result<&Utf8Path, SError> {
        Utf8Path::from_path(path)
            .ok_or_else(|| SError::ParseError(format!("Invalid UTF-8 path: {:?}", path)))
    }

    pub fn utf8_buf(path: std::path::PathBuf) -> Result<Utf8PathBuf, SError> {
        Utf8PathBuf::from_path_buf(path)
            .map_err(|p| SError::ParseError(format!("Invalid UTF-8 path: {:?}", p)))
    }
}
