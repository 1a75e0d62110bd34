use crate::di::{ProviderDefinition, ProviderMap, Registration};
use crate::error::{Error, Result};
use std::sync::Arc;

/// Immutable, validated collection of provider bindings.
///
/// Modules are usually declared with the `#[module]` attribute, which generates a
/// `module()` constructor from its `imports` and `register` lists, or built directly
/// through [`module`].
///
/// # Example
/// ```
/// use wiring::{ModuleOptions, Token, module, provide_value};
///
/// let counter = Token::<u64>::new("counter");
/// let core = module(ModuleOptions::new().register(provide_value(&counter, || 0u64)))?;
///
/// let app = module(ModuleOptions::new().import(core))?;
/// assert_eq!(app.len(), 1);
/// # Ok::<(), wiring::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Module {
    providers: Arc<ProviderMap>,
}

impl Module {
    /// Provider definitions in insertion order: imports first, then local registrations.
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

/// Inputs for [`module`]: previously built modules and local registrations.
#[derive(Clone, Default)]
pub struct ModuleOptions {
    imports: Vec<Module>,
    register: Vec<Registration>,
}

impl ModuleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn import(mut self, module: Module) -> Self {
        self.imports.push(module);
        self
    }

    pub fn imports(mut self, modules: impl IntoIterator<Item = Module>) -> Self {
        self.imports.extend(modules);
        self
    }

    pub fn register(mut self, registration: impl Into<Registration>) -> Self {
        self.register.push(registration.into());
        self
    }
}

/// Build a module, importing first and then converting local registrations.
///
/// # Errors
/// - a token contributed by two imports
/// - a type registration without dependency metadata
/// - a local registration whose token is already bound
pub fn module(options: ModuleOptions) -> Result<Module> {
    let mut providers = ProviderMap::default();

    for imported in &options.imports {
        for definition in imported.providers() {
            if !providers.try_insert(Arc::clone(definition)) {
                return Err(Error::DuplicateOnImport {
                    token: definition.token().to_string(),
                });
            }
        }
    }

    for registration in options.register {
        let definition = registration.into_definition()?;
        let token = definition.token().to_string();
        if !providers.try_insert(Arc::new(definition)) {
            return Err(Error::DuplicateInModule { token });
        }
    }

    tracing::debug!(providers = providers.len(), "Built module");

    Ok(Module {
        providers: Arc::new(providers),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::{Construct, Dependencies, InjectableMetadata, Scope, Token, annotate};
    use crate::di::provide_value;

    #[test]
    fn test_duplicate_in_module() {
        let token = Token::<u8>::new("byte");
        let err = module(
            ModuleOptions::new()
                .register(provide_value(&token, || 1u8))
                .register(provide_value(&token, || 2u8)),
        )
        .unwrap_err();
        assert!(err.to_string().contains("registered multiple times in module"));
    }

    #[test]
    fn test_duplicate_while_importing() {
        let token = Token::<u8>::new("byte");
        let first = module(ModuleOptions::new().register(provide_value(&token, || 1u8))).unwrap();
        let second = module(ModuleOptions::new().register(provide_value(&token, || 2u8))).unwrap();

        let err = module(ModuleOptions::new().import(first).import(second)).unwrap_err();
        assert!(err
            .to_string()
            .contains("registered multiple times while importing modules"));
    }

    #[test]
    fn test_local_registration_colliding_with_import() {
        let token = Token::<u8>::new("byte");
        let imported = module(ModuleOptions::new().register(provide_value(&token, || 1u8))).unwrap();

        let err = module(
            ModuleOptions::new()
                .import(imported)
                .register(provide_value(&token, || 2u8)),
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateInModule { .. }));
    }

    struct Unannotated;

    impl Construct for Unannotated {
        fn construct(_: &Dependencies) -> anyhow::Result<Self> {
            Ok(Self)
        }
    }

    #[test]
    fn test_type_without_metadata_is_rejected() {
        let err = module(ModuleOptions::new().register(Registration::of::<Unannotated>())).unwrap_err();
        assert!(matches!(err, Error::MissingDependencyMetadata { .. }));
        assert!(err
            .to_string()
            .contains("must be annotated with dependency metadata"));
        assert!(err.to_string().contains("Unannotated"));
    }

    struct Annotated;

    impl Construct for Annotated {
        fn construct(_: &Dependencies) -> anyhow::Result<Self> {
            Ok(Self)
        }
    }

    #[test]
    fn test_type_registration_uses_metadata_and_keeps_order() {
        let name = Token::<String>::new("name");
        annotate::<Annotated>(InjectableMetadata::transient().inject(&name));

        let core = module(ModuleOptions::new().register(provide_value(&name, String::new))).unwrap();
        let app = module(
            ModuleOptions::new()
                .import(core)
                .register(Registration::of::<Annotated>()),
        )
        .unwrap();

        let definitions: Vec<_> = app.providers().collect();
        assert_eq!(definitions.len(), 2);
        assert_eq!(definitions[0].token(), name.as_any());
        assert_eq!(definitions[1].token(), Token::<Annotated>::of().as_any());
        assert_eq!(definitions[1].scope(), Scope::Transient);
        assert_eq!(definitions[1].inject(), &[name.erase()]);
    }
}
