use super::container::{Container, Modules, Overrides, create_container};
use super::token::Token;
use crate::error::Result;
use crate::module::Module;
use std::sync::Arc;

/// Builder for constructing a dependency injection container
///
/// Collects modules and overrides, then validates and merges them in [`build`](Self::build).
///
/// # Example
/// ```
/// use wiring::{ContainerBuilder, ModuleOptions, Token, module, provide_value};
///
/// let greeting = Token::<String>::new("greeting");
/// let app = module(ModuleOptions::new().register(provide_value(&greeting, || "hi".to_string())))?;
///
/// let container = ContainerBuilder::new()
///     .module(app)
///     .override_value(&greeting, "hello".to_string())
///     .build()?;
///
/// assert_eq!(*container.resolve(&greeting)?, "hello");
/// # Ok::<(), wiring::Error>(())
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
    modules: Vec<Module>,
    overrides: Overrides,
}

impl ContainerBuilder {
    /// Create a new container builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module; modules are merged in the order they were added
    pub fn module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    pub fn modules(mut self, modules: impl IntoIterator<Item = Module>) -> Self {
        self.modules.extend(modules);
        self
    }

    /// Substitute a constant value for `token`, bypassing its provider
    pub fn override_value<T: ?Sized + Send + Sync + 'static>(
        mut self,
        token: &Token<T>,
        value: impl Into<Arc<T>>,
    ) -> Self {
        self.overrides = self.overrides.with(token, value);
        self
    }

    /// Build the container
    ///
    /// # Errors
    /// Returns an error if two modules bind the same token.
    pub fn build(self) -> Result<Container> {
        create_container(Modules::from(self.modules), self.overrides)
    }
}
