//! Runtime service marker
//!
//! Types carrying the marker are discovered from the application's modules and
//! instantiated eagerly during `start`.

use super::RuntimeService;
use crate::di::Instance;
use dashmap::DashMap;
use std::any::{TypeId, type_name};
use std::sync::{Arc, LazyLock};

static MARKERS: LazyLock<DashMap<TypeId, RuntimeServiceMarker>> = LazyLock::new(|| {
    inventory::iter::<internal::MarkerRegisterer>
        .into_iter()
        .map(|registerer| (registerer.register)())
        .map(|marker| (marker.type_id, marker))
        .collect()
});

type CastFn = fn(&Instance) -> Option<Arc<dyn RuntimeService>>;

/// Marker entry for a runtime service type, able to view a resolved instance
/// through its [`RuntimeService`] capabilities.
#[derive(Clone, Copy)]
pub struct RuntimeServiceMarker {
    type_id: TypeId,
    type_name: &'static str,
    cast: CastFn,
}

impl RuntimeServiceMarker {
    pub fn of<T: RuntimeService>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            cast: cast::<T>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn cast(&self, instance: &Instance) -> Option<Arc<dyn RuntimeService>> {
        (self.cast)(instance)
    }
}

fn cast<T: RuntimeService>(instance: &Instance) -> Option<Arc<dyn RuntimeService>> {
    instance
        .downcast_ref::<Arc<T>>()
        .map(|service| Arc::clone(service) as Arc<dyn RuntimeService>)
}

/// Mark `T` as a runtime service.
///
/// `#[runtime_service]` does the same at load time; marking twice is harmless.
pub fn mark_runtime_service<T: RuntimeService>() {
    tracing::debug!(type_name = type_name::<T>(), "Marked runtime service");
    MARKERS.insert(TypeId::of::<T>(), RuntimeServiceMarker::of::<T>());
}

pub fn is_runtime_service<T: 'static>() -> bool {
    is_runtime_service_constructor(TypeId::of::<T>())
}

pub fn is_runtime_service_constructor(type_id: TypeId) -> bool {
    MARKERS.contains_key(&type_id)
}

pub(crate) fn marker_for(type_id: TypeId) -> Option<RuntimeServiceMarker> {
    MARKERS.get(&type_id).map(|marker| *marker.value())
}

#[doc(hidden)]
pub mod internal {
    use super::RuntimeServiceMarker;
    use inventory::collect;
    pub use inventory::submit;

    pub struct MarkerRegisterer {
        pub register: fn() -> RuntimeServiceMarker,
    }

    collect!(MarkerRegisterer);
}
