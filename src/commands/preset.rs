use crate::commands::after_link_change;
use crate::core::preset;
use crate::core::registry::AppRegistry;
use crate::models::error::SError;
use crate::models::preset::Preset;
use crate::utils::context::TaskContext;
use tracing::{info, instrument};

#[instrument(skip(state))]
pub async fn list_presets(state: &AppRegistry) -> Result<Vec<Preset>, SError> {
    let presets = state.presets.clone();
    TaskContext::run(move || presets.list()).await
}

#[instrument(skip(state))]
pub async fn get_preset(state: &AppRegistry, id: String) -> Result<Preset, SError> {
    let presets = state.presets.clone();
    TaskContext::run(move || presets.get(&id)).await
}

/// Stores a new preset holding the add-ons enabled right now.
#[instrument(skip(state))]
pub async fn create_preset(state: &AppRegistry, preset: Preset) -> Result<Preset, SError> {
    let presets = state.presets.clone();
    let library = state.library();
    let community = state.community_dir()?;
    TaskContext::run(move || {
        presets.create(Preset {
            addons: library.enabled_ids(&community),
            ..preset
        })
    })
    .await
}

/// Overwrites a preset, capturing the add-ons enabled right now.
#[instrument(skip(state))]
pub async fn update_preset(state: &AppRegistry, preset: Preset) -> Result<Preset, SError> {
    let presets = state.presets.clone();
    let library = state.library();
    let community = state.community_dir()?;
    TaskContext::run(move || {
        presets.update(Preset {
            addons: library.enabled_ids(&community),
            ..preset
        })
    })
    .await
}

#[instrument(skip(state))]
pub async fn remove_preset(state: &AppRegistry, id: String) -> Result<(), SError> {
    let presets = state.presets.clone();
    TaskContext::run(move || presets.remove(&id)).await
}

/// Enables exactly the registered add-ons of the preset and disables every other one.
#[instrument(skip(state))]
pub async fn apply_preset(state: &AppRegistry, id: String) -> Result<(), SError> {
    let presets = state.presets.clone();
    let library = state.library();
    let community = state.community_dir()?;

    let outcome = TaskContext::run(move || {
        let preset = presets.get(&id)?;
        preset::apply(&library, &community, &preset)
    })
    .await;

    match outcome {
        Ok(applied) => {
            info!("{} link change(s) applied", applied.len());
            if !applied.is_empty() {
                after_link_change(state);
            }
            Ok(())
        }
        Err(e @ SError::PartialFailure(_)) => {
            after_link_change(state);
            Err(e)
        }
        Err(e) => Err(e),
    }
}
