//! Post-construction callbacks keyed by type identity.

use super::container::Container;
use super::provider::{Dependencies, Instance, downcast};
use super::token::{AnyToken, Token};
use crate::error::Result;
use dashmap::DashMap;
use std::any::{TypeId, type_name};
use std::sync::{Arc, LazyLock};

/// Type-erased hook as stored in the registry.
pub type InitializationHook =
    Arc<dyn Fn(&InitializationContext<'_>) -> anyhow::Result<()> + Send + Sync>;

static HOOKS: LazyLock<DashMap<TypeId, Vec<InitializationHook>>> = LazyLock::new(DashMap::new);

/// What a hook sees right after its type was constructed.
///
/// `resolve` re-enters the container while the constructed token is still on the
/// resolution stack, so resolving that same token from a hook reports a circular
/// dependency.
pub struct InitializationContext<'a> {
    pub(crate) instance: &'a Instance,
    pub(crate) token: &'a AnyToken,
    pub(crate) dependencies: &'a Dependencies,
    pub(crate) container: &'a Container,
}

impl InitializationContext<'_> {
    pub fn instance<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        downcast(self.instance, self.token)
    }

    pub fn token(&self) -> &AnyToken {
        self.token
    }

    pub fn dependencies(&self) -> &Dependencies {
        self.dependencies
    }

    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self, token: &Token<T>) -> Result<Arc<T>> {
        self.container.resolve(token)
    }
}

/// Append a hook for `T`; hooks run in registration order after each construction.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use wiring::register_initialization_hook;
///
/// #[derive(Default)]
/// struct Cache {
///     warm: AtomicBool,
/// }
///
/// register_initialization_hook::<Cache, _>(|cache: &Arc<Cache>, _| {
///     cache.warm.store(true, Ordering::SeqCst);
///     Ok(())
/// });
/// assert_eq!(wiring::get_initialization_hooks::<Cache>().len(), 1);
/// ```
pub fn register_initialization_hook<T, F>(hook: F)
where
    T: Send + Sync + 'static,
    F: Fn(&Arc<T>, &InitializationContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
{
    let erased: InitializationHook = Arc::new(move |context: &InitializationContext<'_>| {
        let instance = context.instance::<T>()?;
        hook(&instance, context)
    });

    HOOKS.entry(TypeId::of::<T>()).or_default().push(erased);
    tracing::debug!(type_name = type_name::<T>(), "Registered initialization hook");
}

/// The hooks registered for `T`, in registration order.
pub fn get_initialization_hooks<T: 'static>() -> Vec<InitializationHook> {
    hooks_for(TypeId::of::<T>())
}

/// Snapshot of the hooks for `type_id`; the registry lock is released before any runs.
pub(crate) fn hooks_for(type_id: TypeId) -> Vec<InitializationHook> {
    HOOKS
        .get(&type_id)
        .map(|hooks| hooks.value().clone())
        .unwrap_or_default()
}
