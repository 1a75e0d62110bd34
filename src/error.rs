use std::sync::Arc;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while composing modules, building containers and resolving tokens.
///
/// The type is `Clone` so that a failed lifecycle operation can hand the same error
/// to every caller awaiting it.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("No provider found for {token}.")]
    MissingProvider { token: String },

    #[error("Circular dependency detected: {chain}")]
    CircularDependency { chain: String },

    #[error("Token {token} is registered multiple times in module.")]
    DuplicateInModule { token: String },

    #[error("Token {token} is registered multiple times while importing modules.")]
    DuplicateOnImport { token: String },

    #[error("Token {token} is registered multiple times across modules.")]
    DuplicateAcrossModules { token: String },

    #[error("{type_name} must be annotated with dependency metadata to be registered.")]
    MissingDependencyMetadata { type_name: String },

    #[error("Dependency {token} was not declared by the provider being constructed.")]
    UndeclaredDependency { token: String },

    #[error("Failed to downcast instance of {token} to {type_name}")]
    DowncastFailed { token: String, type_name: String },

    #[error("Failed to construct {token}: {error}")]
    Construction {
        token: String,
        error: Arc<anyhow::Error>,
    },

    #[error("Initialization hook for {token} failed: {error}")]
    InitializationHook {
        token: String,
        error: Arc<anyhow::Error>,
    },
}

impl Error {
    pub(crate) fn construction(token: impl ToString, error: anyhow::Error) -> Self {
        Self::Construction {
            token: token.to_string(),
            error: Arc::new(error),
        }
    }

    pub(crate) fn initialization_hook(token: impl ToString, error: anyhow::Error) -> Self {
        Self::InitializationHook {
            token: token.to_string(),
            error: Arc::new(error),
        }
    }
}
