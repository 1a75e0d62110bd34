use super::hooks::{self, InitializationContext};
use super::provider::{Dependencies, Instance, ProviderDefinition, ProviderMap, downcast, wrap};
use super::token::{AnyToken, Token, TokenKey};
use crate::error::{Error, Result};
use crate::module::Module;
use dashmap::DashMap;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

/// Constant substitutions that take precedence over every provider.
///
/// # Example
///
/// ```
/// use wiring::{Overrides, Token};
///
/// let port = Token::<u16>::new("port");
/// let overrides = Overrides::new().with(&port, 8080u16);
/// assert_eq!(overrides.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct Overrides {
    entries: Vec<(AnyToken, Instance)>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: ?Sized + Send + Sync + 'static>(
        mut self,
        token: &Token<T>,
        value: impl Into<Arc<T>>,
    ) -> Self {
        self.entries.push((token.erase(), wrap::<T>(value.into())));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One module or several, treated uniformly when building a container.
#[derive(Clone, Default)]
pub struct Modules(Vec<Module>);

impl Modules {
    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.0.iter()
    }
}

impl From<Module> for Modules {
    fn from(module: Module) -> Self {
        Self(vec![module])
    }
}

impl From<Vec<Module>> for Modules {
    fn from(modules: Vec<Module>) -> Self {
        Self(modules)
    }
}

impl<const N: usize> From<[Module; N]> for Modules {
    fn from(modules: [Module; N]) -> Self {
        Self(modules.into())
    }
}

impl FromIterator<Module> for Modules {
    fn from_iter<I: IntoIterator<Item = Module>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Resolves tokens to instances from merged modules and overrides.
///
/// Resolution is synchronous and serialized per container through a re-entrant lock:
/// the resolving thread may re-enter (dependencies, initialization hooks) while other
/// threads wait, which keeps singleton construction to a single run.
pub struct Container {
    providers: ProviderMap,
    overrides: HashMap<TokenKey, Instance>,
    singletons: DashMap<TokenKey, Instance>,
    resolution_stack: ReentrantMutex<RefCell<Vec<AnyToken>>>,
}

/// Build a container from one or more modules.
///
/// Fails when two modules bind the same token.
pub fn create_container(modules: impl Into<Modules>, overrides: Overrides) -> Result<Container> {
    let modules = modules.into();
    let mut providers = ProviderMap::default();

    for module in modules.iter() {
        for definition in module.providers() {
            if !providers.try_insert(Arc::clone(definition)) {
                return Err(Error::DuplicateAcrossModules {
                    token: definition.token().to_string(),
                });
            }
        }
    }

    tracing::debug!(
        providers = providers.len(),
        overrides = overrides.len(),
        "Created container"
    );

    Ok(Container {
        providers,
        overrides: overrides.entries.into_iter().map(|(t, v)| (t.key(), v)).collect(),
        singletons: DashMap::new(),
        resolution_stack: ReentrantMutex::new(RefCell::new(Vec::new())),
    })
}

/// Pops the current token when the frame goes out of scope, failure included.
struct StackFrame<'a> {
    stack: &'a RefCell<Vec<AnyToken>>,
}

impl Drop for StackFrame<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}

impl Container {
    pub fn builder() -> super::ContainerBuilder {
        super::ContainerBuilder::new()
    }

    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self, token: &Token<T>) -> Result<Arc<T>> {
        let instance = self.resolve_any(token.as_any())?;
        downcast(&instance, token.as_any())
    }

    /// Resolve without a static type; the instance wraps an `Arc<T>`.
    pub fn resolve_any(&self, token: &AnyToken) -> Result<Instance> {
        let key = token.key();
        let guard = self.resolution_stack.lock();

        if let Some(value) = self.overrides.get(&key) {
            return Ok(Arc::clone(value));
        }

        if let Some(instance) = self.singletons.get(&key) {
            return Ok(Arc::clone(instance.value()));
        }

        let provider = self
            .providers
            .get(key)
            .map(Arc::clone)
            .ok_or_else(|| Error::MissingProvider {
                token: token.to_string(),
            })?;

        let frame = Self::enter(&guard, token)?;
        let instance = self.construct(&provider, token)?;
        drop(frame);

        Ok(instance)
    }

    fn enter<'a>(stack: &'a RefCell<Vec<AnyToken>>, token: &AnyToken) -> Result<StackFrame<'a>> {
        let mut entries = stack.borrow_mut();
        if entries.contains(token) {
            let chain = entries
                .iter()
                .chain(std::iter::once(token))
                .map(AnyToken::to_string)
                .collect::<Vec<_>>()
                .join(" → ");
            return Err(Error::CircularDependency { chain });
        }
        entries.push(token.clone());
        Ok(StackFrame { stack })
    }

    fn construct(&self, provider: &ProviderDefinition, token: &AnyToken) -> Result<Instance> {
        let dependencies = provider
            .inject()
            .iter()
            .map(|dependency| Ok((dependency.clone(), self.resolve_any(dependency)?)))
            .collect::<Result<Vec<_>>>()?;
        let dependencies = Dependencies::new(dependencies);

        let instance = provider
            .create(&dependencies)
            .map_err(|e| Error::construction(token, e))?;

        if let Some(type_id) = token.type_id() {
            let context = InitializationContext {
                instance: &instance,
                token,
                dependencies: &dependencies,
                container: self,
            };
            for hook in hooks::hooks_for(type_id) {
                hook(&context).map_err(|e| Error::initialization_hook(token, e))?;
            }
        }

        if provider.scope() == super::Scope::Singleton {
            self.singletons.insert(token.key(), Arc::clone(&instance));
        }

        tracing::trace!(token = %token, scope = %provider.scope(), "Constructed instance");
        Ok(instance)
    }

    pub fn contains(&self, token: &AnyToken) -> bool {
        self.overrides.contains_key(&token.key()) || self.providers.contains(token.key())
    }

    /// Provider definitions in merge order.
    pub fn providers(&self) -> impl Iterator<Item = &Arc<ProviderDefinition>> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.len() == 0
    }
}
