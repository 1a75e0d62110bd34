//! Lifecycle hook traits
//!
//! These traits define the contract for features and services that take part in the
//! runtime application's startup and shutdown. Every hook is optional: the default
//! implementation does nothing, so a type only overrides the phases it cares about.

use super::RuntimeContext;
use async_trait::async_trait;
use std::any::type_name;

/// Cross-cutting behavior supplied to the application rather than resolved from it
///
/// Features start in registration order after runtime services are discovered and
/// shut down in the same order once participants have shut down.
///
/// # Example
///
/// ```rust,ignore
/// use wiring::{Feature, RuntimeContext};
/// use async_trait::async_trait;
///
/// struct DiagnosticsFeature;
///
/// #[async_trait]
/// impl Feature for DiagnosticsFeature {
///     async fn start(&self, context: &RuntimeContext) -> anyhow::Result<()> {
///         let linter = context.resolve(&LINTER)?;
///         linter.publish_all().await
///     }
/// }
/// ```
#[async_trait]
pub trait Feature: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str {
        type_name::<Self>()
    }

    /// Called once during `start`, before any participant starts
    async fn start(&self, _context: &RuntimeContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once during `dispose`, after every participant has shut down
    async fn shutdown(&self, _context: &RuntimeContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Best-effort cleanup; failures are logged and ignored
    async fn dispose(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Start and shutdown hooks of a discovered runtime service
#[async_trait]
pub trait LifecycleParticipant: Send + Sync {
    /// Called after every feature has started
    async fn on_start(&self, _context: &RuntimeContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called first during `dispose`; a failure does not stop the other hooks
    async fn on_shutdown(&self, _context: &RuntimeContext) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Best-effort cleanup of a discovered runtime service
#[async_trait]
pub trait Disposable: Send + Sync {
    async fn dispose(&self) -> anyhow::Result<()>;
}

/// Capabilities of a type marked as a runtime service
///
/// Usually implemented by `#[runtime_service]`, whose `participant` and `disposable`
/// flags expose the corresponding trait implementations.
pub trait RuntimeService: Send + Sync + 'static {
    fn service_name(&self) -> &'static str {
        type_name::<Self>()
    }

    fn as_participant(&self) -> Option<&dyn LifecycleParticipant> {
        None
    }

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }
}
