use crate::core::library::Library;
use crate::core::linker;
use crate::models::error::SError;
use camino::Utf8Path;
use tracing::{debug, info};

/// Outcome of an enable/disable request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChange {
    Linked,
    Unlinked,
    /// The add-on already was in the requested state.
    Unchanged,
}

impl LinkChange {
    pub fn changed(self) -> bool {
        self != LinkChange::Unchanged
    }
}

pub struct Enablement;

impl Enablement {
    /// Links `<community>/<id>` to the library copy of the add-on.
    pub fn enable(
        library: &Library,
        community: &Utf8Path,
        id: &str,
    ) -> Result<LinkChange, SError> {
        let lock = library.lock_for(id);
        let _guard = lock.lock();
        if !library.contains(id) {
            return Err(SError::AddonNotFound(id.to_string()));
        }

        let source = library.addon_path(id);
        let target = Library::link_path(community, id);
        if linker::points_to(&target, &source) {
            debug!("'{id}' is already enabled");
            return Ok(LinkChange::Unchanged);
        }
        if !source.is_dir() {
            return Err(SError::IOError(format!("library copy '{source}' is missing")));
        }
        if target.exists() || target.is_symlink() {
            return Err(SError::Link(format!(
                "'{target}' is occupied by an entry this library does not manage"
            )));
        }

        linker::link(&source, &target).map_err(|e| SError::Link(format!("{target}: {e}")))?;
        library.invalidate_thumbnail(id);
        info!("Enabled addon '{id}'");
        Ok(LinkChange::Linked)
    }

    /// Removes the community link of the add-on. The library copy is never touched,
    /// nor is a community entry that does not link back to it.
    pub fn disable(
        library: &Library,
        community: &Utf8Path,
        id: &str,
    ) -> Result<LinkChange, SError> {
        let lock = library.lock_for(id);
        let _guard = lock.lock();
        if !library.contains(id) {
            return Err(SError::AddonNotFound(id.to_string()));
        }

        let target = Library::link_path(community, id);
        if !linker::points_to(&target, &library.addon_path(id)) {
            debug!("'{id}' is already disabled");
            return Ok(LinkChange::Unchanged);
        }

        linker::unlink(&target).map_err(|e| SError::Link(format!("{target}: {e}")))?;
        library.invalidate_thumbnail(id);
        info!("Disabled addon '{id}'");
        Ok(LinkChange::Unlinked)
    }
}
