//! Method selection.

use proxygen_core::{MethodDescriptor, TargetClass};
use tracing::debug;

use crate::config::GenerationConfig;

/// Methods of `class` to emit, in reflected order.
pub fn select_methods<'a>(class: &'a TargetClass, config: &GenerationConfig) -> Vec<&'a MethodDescriptor> {
    class
        .methods
        .iter()
        .filter(|method| {
            if config.is_ignored(&method.name) {
                debug!(class = %class.name, method = %method.name, "Skipping ignored method");
                return false;
            }
            let visibility = method.visibility();
            if !config.allows(visibility) {
                debug!(class = %class.name, method = %method.name, %visibility, "Skipping method by visibility");
                return false;
            }
            true
        })
        .collect()
}
