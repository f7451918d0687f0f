pub mod addon;
pub mod preset;
pub mod settings;
pub mod sim;

use crate::core::registry::AppRegistry;
use crate::core::sim::Sim;
use tracing::warn;

/// Drops the scenery indexes after the set of linked add-ons changed, when enabled.
/// Failures are logged; the link change itself already succeeded.
pub(crate) fn after_link_change(state: &AppRegistry) {
    let settings = state.settings();
    if !settings.auto_clear_scenery_indexes {
        return;
    }
    let cleared = settings
        .community_dir()
        .and_then(|community| Sim::from_community(&community))
        .and_then(|sim| sim.clear_scenery_indexes());
    if let Err(e) = cleared {
        warn!("Unable to clear scenery indexes: {e}");
    }
}
