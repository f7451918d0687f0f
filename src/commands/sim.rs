use crate::core::registry::AppRegistry;
use crate::core::sim::Sim;
use crate::models::error::SError;
use crate::utils::context::TaskContext;
use tracing::instrument;

/// Returns whether there was anything to clear.
#[instrument(skip(state))]
pub async fn clear_scenery_indexes(state: &AppRegistry) -> Result<bool, SError> {
    let community = state.community_dir()?;
    TaskContext::run(move || Sim::from_community(&community)?.clear_scenery_indexes()).await
}

#[instrument(skip(state))]
pub async fn clear_rolling_cache(state: &AppRegistry) -> Result<bool, SError> {
    let community = state.community_dir()?;
    TaskContext::run(move || Sim::from_community(&community)?.clear_rolling_cache()).await
}
