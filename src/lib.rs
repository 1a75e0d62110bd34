//! # Wiring
//!
//! A dependency injection container with a runtime-application lifecycle.
//!
//! Wiring resolves typed tokens to shared instances through immutable modules, and
//! drives the services it discovers through an ordered, idempotent startup and
//! shutdown.
//!
//! ## Features
//!
//! - **Typed tokens**: `Token<T>` identities for values, trait objects and types
//! - **Modules**: validated provider maps composed through imports
//! - **Container**: singleton and transient scopes, overrides, cycle detection
//! - **Initialization hooks**: per-type callbacks after construction
//! - **Runtime application**: features and participants with memoized start/dispose
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wiring::{Injectable, LifecycleParticipant, RuntimeApplication, RuntimeContext};
//! use wiring::{async_trait, module, runtime_service};
//! use std::sync::Arc;
//!
//! // 1. Define your services
//! #[derive(Injectable)]
//! pub struct Store {}
//!
//! #[derive(Injectable)]
//! #[runtime_service(participant)]
//! pub struct Indexer {
//!     store: Arc<Store>,
//! }
//!
//! #[async_trait]
//! impl LifecycleParticipant for Indexer {
//!     async fn on_start(&self, _: &RuntimeContext) -> anyhow::Result<()> {
//!         tracing::info!("Indexing");
//!         Ok(())
//!     }
//! }
//!
//! // 2. Define your module
//! #[module(register = [Store, Indexer])]
//! pub struct AppModule;
//!
//! // 3. Run your application
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let app = RuntimeApplication::builder()
//!         .module(AppModule::module()?)
//!         .build()?;
//!
//!     app.run_until_shutdown_signal().await?;
//!     Ok(())
//! }
//! ```

extern crate self as wiring;

pub mod config;
pub mod di;
pub mod error;
pub mod lifecycle;
pub mod module;

// Re-export core types
pub use config::ConfigService;
pub use di::{
    AnyToken, Construct, Container, ContainerBuilder, Dependencies, FactoryRegistration,
    InitializationContext, InitializationHook, InjectableMetadata, Instance, Modules, Overrides,
    ProviderDefinition, Registration, Scope, Token, TokenKey, TypeRegistration, annotate,
    create_container, get_initialization_hooks, is_annotated, provide_value,
    register_initialization_hook,
};
pub use error::{Error, Result};
pub use lifecycle::{
    ApplicationBuilder, Disposable, Feature, LifecycleError, LifecycleParticipant,
    LifecyclePhase, LifecycleState, RuntimeApplication, RuntimeContext, RuntimeService,
    RuntimeServiceMarker, ShutdownHandler, create_runtime_application, is_runtime_service,
    is_runtime_service_constructor, mark_runtime_service, shutdown_signal,
};
pub use module::{Module, ModuleOptions, module};

// Re-export macros
pub use wiring_macro::{Injectable, module, runtime_service};

// Re-export commonly used types from dependencies
pub use anyhow;
pub use async_trait::async_trait;

/// Prelude module for convenient imports
///
/// ```
/// use wiring::prelude::*;
/// ```
pub mod prelude {
    pub use crate::di::{
        Construct, Container, Dependencies, FactoryRegistration, Overrides, Registration, Scope,
        Token, create_container, provide_value,
    };
    pub use crate::error::{Error, Result};
    pub use crate::lifecycle::{
        Disposable, Feature, LifecycleError, LifecycleParticipant, RuntimeApplication,
        RuntimeContext, RuntimeService,
    };
    pub use crate::module::{Module, ModuleOptions};
    pub use crate::{Injectable, module, runtime_service};
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}
