mod builder;
mod container;
mod hooks;
mod metadata;
mod provider;
mod token;

pub use builder::ContainerBuilder;
pub use container::{Container, Modules, Overrides, create_container};
pub use hooks::{
    InitializationContext, InitializationHook, get_initialization_hooks,
    register_initialization_hook,
};
pub use metadata::{InjectableMetadata, annotate, is_annotated};
pub use provider::{
    Construct, Dependencies, FactoryRegistration, Instance, ProviderDefinition, Registration,
    Scope, TypeRegistration, provide_value,
};
pub use token::{AnyToken, Token, TokenKey};

pub(crate) use provider::ProviderMap;

#[doc(hidden)]
pub use metadata::internal;
