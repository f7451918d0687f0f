use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;

/// Creates a directory link at `target` pointing to `source`
/// (a junction on Windows, a symlink elsewhere).
///
/// Succeeds without touching anything when `target` already links to `source`.
/// Fails with `AlreadyExists` when `target` is occupied by anything else.
pub fn link(source: &Utf8Path, target: &Utf8Path) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    if target.exists() || target.is_symlink() {
        if points_to(target, source) {
            return Ok(());
        }
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("'{target}' exists but is not a link to '{source}'"),
        ));
    }

    #[cfg(windows)]
    {
        junction::create(source, target)
    }
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(source, target)
    }
}

/// Removes the link at `target`. Never follows it, so the linked directory is untouched.
/// A missing target is not an error.
pub fn unlink(target: &Utf8Path) -> io::Result<()> {
    let meta = match fs::symlink_metadata(target) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    if !meta.file_type().is_symlink() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{target}' is not a link"),
        ));
    }

    #[cfg(windows)]
    {
        // Junctions and directory symlinks are directories on Windows
        fs::remove_dir(target).or_else(|_| fs::remove_file(target))
    }
    #[cfg(unix)]
    {
        fs::remove_file(target)
    }
}

pub fn read_link_target(path: &Utf8Path) -> io::Result<Utf8PathBuf> {
    #[cfg(windows)]
    let target = junction::get_target(path).or_else(|_| fs::read_link(path))?;
    #[cfg(unix)]
    let target = fs::read_link(path)?;

    Utf8PathBuf::from_path_buf(target).map_err(|p| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Invalid UTF-8 link target: {:?}", p),
        )
    })
}

/// True when `link` is a link whose resolved destination is `source`.
pub fn points_to(link: &Utf8Path, source: &Utf8Path) -> bool {
    let is_link = fs::symlink_metadata(link)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if !is_link {
        return false;
    }

    match (dunce::canonicalize(link), dunce::canonicalize(source)) {
        (Ok(resolved), Ok(expected)) => resolved == expected,
        _ => false,
    }
}
