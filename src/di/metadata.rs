//! Dependency metadata attached to constructable types.
//!
//! The module composer only accepts a type registration when its scope and dependency
//! list have been recorded here, either explicitly through [`annotate`] or at load time
//! by `#[derive(Injectable)]`.

use super::provider::{Construct, Scope};
use super::token::AnyToken;
use dashmap::DashMap;
use std::any::{TypeId, type_name};
use std::sync::LazyLock;

static METADATA: LazyLock<DashMap<TypeId, InjectableMetadata>> = LazyLock::new(|| {
    inventory::iter::<internal::MetadataRegisterer>
        .into_iter()
        .map(|registerer| (registerer.register)())
        .map(|annotated| (annotated.type_id, annotated.metadata))
        .collect()
});

/// Scope and ordered dependency tokens of a constructable type.
#[derive(Debug, Clone, Default)]
pub struct InjectableMetadata {
    scope: Scope,
    dependencies: Vec<AnyToken>,
}

impl InjectableMetadata {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            dependencies: Vec::new(),
        }
    }

    pub fn singleton() -> Self {
        Self::new(Scope::Singleton)
    }

    pub fn transient() -> Self {
        Self::new(Scope::Transient)
    }

    /// Append a dependency; the constructor receives them in this order.
    pub fn inject(mut self, token: impl Into<AnyToken>) -> Self {
        self.dependencies.push(token.into());
        self
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn dependencies(&self) -> &[AnyToken] {
        &self.dependencies
    }
}

/// Attach dependency metadata to `T`, replacing any earlier annotation.
///
/// # Example
///
/// ```
/// use wiring::{Construct, Dependencies, InjectableMetadata, Token, annotate};
/// use std::sync::Arc;
///
/// struct Clock;
/// struct Scheduler {
///     clock: Arc<Clock>,
/// }
///
/// impl Construct for Scheduler {
///     fn construct(deps: &Dependencies) -> anyhow::Result<Self> {
///         Ok(Self { clock: deps.get_at(0)? })
///     }
/// }
///
/// annotate::<Scheduler>(InjectableMetadata::transient().inject(Token::<Clock>::of()));
/// assert!(wiring::is_annotated::<Scheduler>());
/// ```
pub fn annotate<T: Construct>(metadata: InjectableMetadata) {
    tracing::debug!(
        type_name = type_name::<T>(),
        scope = %metadata.scope,
        dependencies = metadata.dependencies.len(),
        "Annotated injectable type"
    );
    METADATA.insert(TypeId::of::<T>(), metadata);
}

pub fn is_annotated<T: 'static>() -> bool {
    METADATA.contains_key(&TypeId::of::<T>())
}

pub(crate) fn metadata_for(type_id: TypeId) -> Option<InjectableMetadata> {
    METADATA.get(&type_id).map(|entry| entry.value().clone())
}

#[doc(hidden)]
pub mod internal {
    use super::InjectableMetadata;
    use crate::di::provider::{Construct, Scope};
    use crate::di::token::AnyToken;
    use inventory::collect;
    pub use inventory::submit;
    use std::any::TypeId;

    pub struct AnnotatedType {
        pub(super) type_id: TypeId,
        pub(super) metadata: InjectableMetadata,
    }

    impl AnnotatedType {
        pub fn new<T: Construct>(scope: Scope, dependencies: Vec<AnyToken>) -> Self {
            Self {
                type_id: TypeId::of::<T>(),
                metadata: InjectableMetadata {
                    scope,
                    dependencies,
                },
            }
        }
    }

    pub struct MetadataRegisterer {
        pub register: fn() -> AnnotatedType,
    }

    collect!(MetadataRegisterer);
}
