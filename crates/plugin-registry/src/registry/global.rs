//! Process-wide default registry.

use std::sync::Arc;

use once_cell::sync::Lazy;

use super::Registry;

static GLOBAL_REGISTRY: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

/// Returns the process-wide default registry, creating it on first use.
///
/// The default instance is one convenience factory; independent registries
/// are built with [`Registry::new`] and may name this one as their parent.
/// It is never dropped, so its libraries stay mapped until the process
/// exits.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use plugin_registry::{PluginRegistry, Registry, global_registry};
///
/// let global = global_registry();
/// assert!(Arc::ptr_eq(&global, &global_registry()));
///
/// let child = Registry::new().with_parent(global);
/// assert!(child.is_parent_search_enabled());
/// ```
#[must_use]
pub fn global_registry() -> Arc<Registry> {
    Arc::clone(&GLOBAL_REGISTRY)
}
