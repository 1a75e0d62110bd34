use super::metadata;
use super::token::{AnyToken, Token, TokenKey};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use strum_macros::{AsRefStr, Display, EnumString};

/// Type-erased instance held by the container.
///
/// The value inside is always an `Arc<T>` for the token's `T`, which lets unsized
/// targets such as `dyn Trait` be stored and handed out without re-wrapping.
pub type Instance = Arc<dyn Any + Send + Sync>;

type CreateFn = Arc<dyn Fn(&Dependencies) -> anyhow::Result<Instance> + Send + Sync>;

/// Lifetime of instances produced by a provider.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// One instance per container, created on first resolution.
    #[default]
    Singleton,
    /// A fresh instance for every resolution.
    Transient,
}

pub(crate) fn wrap<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Instance {
    Arc::new(value)
}

pub(crate) fn downcast<T: ?Sized + Send + Sync + 'static>(
    instance: &Instance,
    token: &AnyToken,
) -> Result<Arc<T>> {
    instance
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or_else(|| Error::DowncastFailed {
            token: token.to_string(),
            type_name: type_name::<T>().to_string(),
        })
}

/// Resolved dependency values, in the order the provider declared them.
pub struct Dependencies {
    entries: Vec<(AnyToken, Instance)>,
}

impl Dependencies {
    pub(crate) fn new(entries: Vec<(AnyToken, Instance)>) -> Self {
        Self { entries }
    }

    /// Look up a declared dependency by its token.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self, token: &Token<T>) -> Result<Arc<T>> {
        let (token, instance) = self
            .entries
            .iter()
            .find(|(declared, _)| declared.key() == token.key())
            .ok_or_else(|| Error::UndeclaredDependency {
                token: token.to_string(),
            })?;
        downcast(instance, token)
    }

    /// Look up a dependency by its position in the declared list.
    pub fn get_at<T: ?Sized + Send + Sync + 'static>(&self, index: usize) -> Result<Arc<T>> {
        let (token, instance) =
            self.entries
                .get(index)
                .ok_or_else(|| Error::UndeclaredDependency {
                    token: format!("#{index} ({})", type_name::<T>()),
                })?;
        downcast(instance, token)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &AnyToken> {
        self.entries.iter().map(|(token, _)| token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A type the container knows how to build from its resolved dependencies.
///
/// Usually implemented through `#[derive(Injectable)]`, which also records the
/// dependency metadata the module composer requires.
pub trait Construct: Sized + Send + Sync + 'static {
    fn construct(dependencies: &Dependencies) -> anyhow::Result<Self>;
}

/// Binding of a token to creation logic, a scope and an ordered dependency list.
#[derive(Clone)]
pub struct ProviderDefinition {
    token: AnyToken,
    scope: Scope,
    inject: Vec<AnyToken>,
    create: CreateFn,
}

impl ProviderDefinition {
    pub fn token(&self) -> &AnyToken {
        &self.token
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn inject(&self) -> &[AnyToken] {
        &self.inject
    }

    pub(crate) fn create(&self, dependencies: &Dependencies) -> anyhow::Result<Instance> {
        (self.create)(dependencies)
    }
}

impl fmt::Debug for ProviderDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDefinition")
            .field("token", &self.token)
            .field("scope", &self.scope)
            .field("inject", &self.inject)
            .finish_non_exhaustive()
    }
}

/// Explicit factory registration for a token.
///
/// Defaults to singleton scope with no dependencies.
///
/// # Example
///
/// ```
/// use wiring::{FactoryRegistration, Scope, Token};
///
/// let port = Token::<u16>::new("port");
/// let url = Token::<String>::new("url");
///
/// let dependency = port.clone();
/// let registration = FactoryRegistration::new(&url, move |deps| {
///     Ok(format!("http://localhost:{}", deps.get(&dependency)?))
/// })
/// .inject(&port)
/// .scope(Scope::Transient);
/// ```
#[derive(Clone)]
pub struct FactoryRegistration {
    token: AnyToken,
    scope: Scope,
    inject: Vec<AnyToken>,
    create: CreateFn,
}

impl FactoryRegistration {
    pub fn new<T, R, F>(token: &Token<T>, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        R: Into<Arc<T>>,
        F: Fn(&Dependencies) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        Self {
            token: token.erase(),
            scope: Scope::default(),
            inject: Vec::new(),
            create: Arc::new(move |deps: &Dependencies| -> anyhow::Result<Instance> {
                Ok(wrap::<T>(factory(deps)?.into()))
            }),
        }
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Append a dependency, resolved before the factory runs.
    pub fn inject(mut self, token: impl Into<AnyToken>) -> Self {
        self.inject.push(token.into());
        self
    }

    pub fn token(&self) -> &AnyToken {
        &self.token
    }

    fn into_definition(self) -> ProviderDefinition {
        ProviderDefinition {
            token: self.token,
            scope: self.scope,
            inject: self.inject,
            create: self.create,
        }
    }
}

/// Register a dependency-free factory for `token`.
pub fn provide_value<T, R, F>(token: &Token<T>, factory: F) -> FactoryRegistration
where
    T: ?Sized + Send + Sync + 'static,
    R: Into<Arc<T>>,
    F: Fn() -> R + Send + Sync + 'static,
{
    FactoryRegistration::new(token, move |_| Ok(factory()))
}

/// Registration of a constructable type acting as its own token.
#[derive(Clone)]
pub struct TypeRegistration {
    type_id: TypeId,
    type_name: &'static str,
    token: AnyToken,
    create: CreateFn,
}

/// An entry in a module's `register` list.
#[derive(Clone)]
pub enum Registration {
    Type(TypeRegistration),
    Factory(FactoryRegistration),
}

impl Registration {
    /// Register `T` under its own type token; requires dependency metadata.
    pub fn of<T: Construct>() -> Self {
        Self::Type(TypeRegistration {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            token: Token::<T>::of().erase(),
            create: Arc::new(|deps: &Dependencies| -> anyhow::Result<Instance> {
                Ok(wrap(Arc::new(T::construct(deps)?)))
            }),
        })
    }

    pub(crate) fn into_definition(self) -> Result<ProviderDefinition> {
        match self {
            Self::Factory(factory) => Ok(factory.into_definition()),
            Self::Type(registration) => {
                let metadata = metadata::metadata_for(registration.type_id).ok_or_else(|| {
                    Error::MissingDependencyMetadata {
                        type_name: registration.type_name.to_string(),
                    }
                })?;
                Ok(ProviderDefinition {
                    token: registration.token,
                    scope: metadata.scope(),
                    inject: metadata.dependencies().to_vec(),
                    create: registration.create,
                })
            }
        }
    }
}

impl From<FactoryRegistration> for Registration {
    fn from(registration: FactoryRegistration) -> Self {
        Self::Factory(registration)
    }
}

/// Insertion-ordered provider lookup shared by modules and containers.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProviderMap {
    ordered: Vec<Arc<ProviderDefinition>>,
    index: HashMap<TokenKey, usize>,
}

impl ProviderMap {
    /// Insert unless the token is already bound; returns whether it was inserted.
    pub(crate) fn try_insert(&mut self, definition: Arc<ProviderDefinition>) -> bool {
        let key = definition.token().key();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.ordered.len());
        self.ordered.push(definition);
        true
    }

    pub(crate) fn get(&self, key: TokenKey) -> Option<&Arc<ProviderDefinition>> {
        self.index.get(&key).map(|&position| &self.ordered[position])
    }

    pub(crate) fn contains(&self, key: TokenKey) -> bool {
        self.index.contains_key(&key)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<ProviderDefinition>> {
        self.ordered.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.ordered.len()
    }
}
