//! Lifecycle-specific error types

use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

/// Phase in which a lifecycle hook ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LifecyclePhase {
    Start,
    Shutdown,
}

/// Errors that can occur during lifecycle operations
///
/// Cloned out of the memoized start/dispose operations, so every caller awaiting the
/// same operation observes the same error.
#[derive(Debug, Clone, Error)]
pub enum LifecycleError {
    /// The application was disposed; it cannot be started again
    #[error("Runtime application has already been disposed")]
    Disposed,

    /// Resolving a runtime service failed
    #[error(transparent)]
    Resolution(#[from] crate::error::Error),

    /// A feature or participant start hook failed
    #[error("{phase} hook failed for {name}: {error}")]
    HookFailed {
        /// The lifecycle phase of the failing hook
        phase: LifecyclePhase,
        /// Name of the feature or service that failed
        name: String,
        /// The error returned by the hook
        error: Arc<anyhow::Error>,
    },

    /// Shutdown hooks failed; carries the first collected failure
    #[error("{error}")]
    Disposal {
        /// First failure, participant failures ahead of feature failures
        error: Arc<anyhow::Error>,
        /// Number of shutdown hooks that failed
        failures: usize,
    },

    /// Installing a shutdown signal listener failed
    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(String),

    /// The task running start or dispose panicked or was aborted
    #[error("Lifecycle task did not complete: {0}")]
    Task(String),
}

impl LifecycleError {
    /// Create a hook failure error
    pub fn hook_failed(phase: LifecyclePhase, name: impl Into<String>, error: anyhow::Error) -> Self {
        Self::HookFailed {
            phase,
            name: name.into(),
            error: Arc::new(error),
        }
    }

    pub(crate) fn disposal(mut failures: Vec<anyhow::Error>) -> Option<Self> {
        let count = failures.len();
        if count == 0 {
            return None;
        }
        Some(Self::Disposal {
            error: Arc::new(failures.swap_remove(0)),
            failures: count,
        })
    }
}

/// A specialized Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, LifecycleError>;

/// Turn a panic payload into an error.
///
/// An `anyhow::Error` payload passes through unchanged, string payloads become the
/// message, a `serde_json::Value` payload is rendered as JSON, and anything else
/// (including `()`) becomes `"unknown"`.
pub fn normalize_fault(payload: Box<dyn Any + Send>) -> anyhow::Error {
    let payload = match payload.downcast::<anyhow::Error>() {
        Ok(error) => return *error,
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<String>() {
        Ok(message) => return anyhow::Error::msg(*message),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<&'static str>() {
        Ok(message) => return anyhow::Error::msg(*message),
        Err(payload) => payload,
    };
    match payload.downcast::<serde_json::Value>() {
        Ok(value) => match serde_json::to_string(&*value) {
            Ok(json) => anyhow::Error::msg(json),
            Err(_) => anyhow::Error::msg("unknown"),
        },
        Err(_) => anyhow::Error::msg("unknown"),
    }
}

/// Await a hook, turning a panic inside it into a normalized error.
pub(crate) async fn guarded<F>(hook: F) -> anyhow::Result<()>
where
    F: Future<Output = anyhow::Result<()>>,
{
    AssertUnwindSafe(hook)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(normalize_fault(payload)))
}
