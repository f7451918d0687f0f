use crate::commands::after_link_change;
use crate::core::enablement::Enablement;
use crate::core::installer::Installer;
use crate::core::registry::AppRegistry;
use crate::core::verifier::Verifier;
use crate::models::addon::Addon;
use crate::models::error::SError;
use crate::models::install::{AddonInstallResult, InstallResult};
use crate::models::verification::VerificationResult;
use crate::utils::context::TaskContext;
use camino::Utf8PathBuf;
use tracing::{debug, info, instrument};

#[instrument(skip(state))]
pub async fn get_addon(state: &AppRegistry, id: String) -> Result<Addon, SError> {
    let library = state.library();
    let community = state.community_dir()?;
    TaskContext::run(move || library.get(&id, &community)).await
}

#[instrument(skip(state))]
pub async fn get_addons(state: &AppRegistry) -> Result<Vec<Addon>, SError> {
    let library = state.library();
    let community = state.community_dir()?;
    TaskContext::run(move || Ok(library.list(&community))).await
}

#[instrument(skip(state))]
pub async fn install_addons(
    state: &AppRegistry,
    paths: Vec<String>,
) -> Result<InstallResult, SError> {
    info!("Starting task install");
    let inputs = paths.into_iter().map(Utf8PathBuf::from).collect::<Vec<_>>();
    let target = state.install_target()?;
    debug!("install target: {:?}", target);

    let result = Installer::install_parallel(
        state.library(),
        target.clone(),
        inputs,
        state.install_permits.clone(),
    )
    .await?;

    let linked_any = target.auto_enable
        && result
            .results
            .iter()
            .any(|r| matches!(r, AddonInstallResult::Success { .. }));
    if linked_any {
        after_link_change(state);
    }
    info!("Install finished");
    Ok(result)
}

#[instrument(skip(state))]
pub async fn enable_addon(state: &AppRegistry, id: String) -> Result<(), SError> {
    let library = state.library();
    let community = state.community_dir()?;
    let change = TaskContext::run(move || Enablement::enable(&library, &community, &id)).await?;
    if change.changed() {
        after_link_change(state);
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn disable_addon(state: &AppRegistry, id: String) -> Result<(), SError> {
    let library = state.library();
    let community = state.community_dir()?;
    let change = TaskContext::run(move || Enablement::disable(&library, &community, &id)).await?;
    if change.changed() {
        after_link_change(state);
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn uninstall_addon(state: &AppRegistry, id: String) -> Result<(), SError> {
    let library = state.library();
    let community = state.community_dir()?;
    let was_enabled = TaskContext::run(move || {
        let was_enabled = library.is_enabled(&community, &id);
        library.uninstall(&id, &community)?;
        Ok(was_enabled)
    })
    .await?;
    if was_enabled {
        after_link_change(state);
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn rename_addon(
    state: &AppRegistry,
    id: String,
    new_id: String,
) -> Result<Addon, SError> {
    let library = state.library();
    let community = state.community_dir()?;
    let addon = TaskContext::run(move || library.rename(&id, &new_id, &community)).await?;
    if addon.enabled {
        after_link_change(state);
    }
    Ok(addon)
}

/// Resolves the on-disk location of an add-on; opening it is left to the caller.
#[instrument(skip(state))]
pub async fn reveal_addon(state: &AppRegistry, id: String) -> Result<String, SError> {
    let library = state.library();
    if !library.contains(&id) {
        return Err(SError::AddonNotFound(id));
    }
    Ok(library.addon_path(&id).into_string())
}

#[instrument(skip(state))]
pub async fn verify_addon(state: &AppRegistry, id: String) -> Result<VerificationResult, SError> {
    let library = state.library();
    TaskContext::run(move || Verifier::verify(&library, &id)).await
}

#[instrument(skip(state))]
pub async fn rescan_addon(state: &AppRegistry, id: String) -> Result<Addon, SError> {
    let library = state.library();
    let community = state.community_dir()?;
    TaskContext::run(move || library.rescan(&id, &community)).await
}

/// Thumbnail of an add-on as a `data:` URI.
#[instrument(skip(state))]
pub async fn get_addon_thumbnail(state: &AppRegistry, id: String) -> Result<String, SError> {
    let library = state.library();
    TaskContext::run(move || {
        library
            .thumbnail(&id)?
            .ok_or(SError::ThumbnailNotFound(id))
    })
    .await
}
