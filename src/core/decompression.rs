use crate::models::error::SError;
use camino::Utf8Path;
use std::fs::{self, File};
use std::io;
use std::path::Path;

pub struct Decompression;

impl Decompression {
    /// Extracts the entries of `archive_path` found below `prefix` into `destination`,
    /// with `prefix` stripped. An empty prefix extracts the whole archive.
    /// Returns the number of bytes written.
    pub fn extract_subtree(
        archive_path: &Utf8Path,
        prefix: &Utf8Path,
        destination: &Utf8Path,
    ) -> Result<u64, SError> {
        let mut archive = zip::ZipArchive::new(File::open(archive_path)?)?;
        fs::create_dir_all(destination)?;
        let mut written = 0;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;

            // enclosed_name() rejects absolute paths and `..` components ("zip slip")
            let Some(safe_path) = entry.enclosed_name() else {
                continue;
            };
            let Ok(relative) = safe_path.strip_prefix(prefix.as_std_path()) else {
                continue;
            };
            if relative.as_os_str().is_empty() || relative.starts_with("__MACOSX") {
                continue;
            }

            let output_path = destination.as_std_path().join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&output_path)?;
                continue;
            }

            Self::ensure_parent(&output_path)?;
            let mut outfile = File::create(&output_path)?;
            written += io::copy(&mut entry, &mut outfile)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    let _ = fs::set_permissions(&output_path, fs::Permissions::from_mode(mode));
                }
            }
        }

        Ok(written)
    }

    fn ensure_parent(path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.exists() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }

    pub fn is_archive(path: &Utf8Path) -> bool {
        path.extension()
            .map(|ext| ext.eq_ignore_ascii_case("zip"))
            .unwrap_or(false)
    }
}
