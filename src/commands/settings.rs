use crate::config::{AppSettings, SettingUpdate};
use crate::core::library::Library;
use crate::core::registry::AppRegistry;
use crate::models::error::SError;
use crate::utils::context::TaskContext;
use tracing::instrument;

#[instrument(skip(state))]
pub async fn get_settings(state: &AppRegistry) -> Result<AppSettings, SError> {
    Ok(state.settings())
}

/// Applies one validated change. Moving the addons directory opens the library there
/// first; the setting only changes once that succeeded.
#[instrument(skip(state))]
pub async fn update_setting(
    state: &AppRegistry,
    update: SettingUpdate,
) -> Result<AppSettings, SError> {
    let store = state.settings.clone();
    if !update.moves_library() {
        return TaskContext::run(move || store.set(&update)).await;
    }

    let (settings, library) = TaskContext::run(move || {
        let next = store.preview(&update)?;
        let library = Library::open(&next.addons_dir()?)?;
        let settings = store.set(&update)?;
        Ok((settings, library))
    })
    .await?;
    state.replace_library(library);
    Ok(settings)
}
