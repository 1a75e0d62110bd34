//! Runtime application lifecycle
//!
//! A [`RuntimeApplication`] owns a container, discovers the runtime services bound in
//! it and drives features and participants through startup and shutdown.
//!
//! # Lifecycle Phases
//!
//! ```text
//! start()
//!   1. Discover runtime services (provider order, each resolved once)
//!      ↓
//!   2. Feature::start (each feature)               ← fail-fast
//!      ↓
//!   3. LifecycleParticipant::on_start (each)       ← fail-fast
//!      ↓
//! [Running...]
//!      ↓
//! dispose()
//!   4. LifecycleParticipant::on_shutdown (each)    ← failures collected
//!      ↓
//!   5. Feature::shutdown (each feature)            ← failures collected
//!      ↓
//!   6. Disposable::dispose (each service)          ← failures ignored
//!      ↓
//!   7. Feature::dispose (each feature)             ← failures ignored
//! ```
//!
//! Both operations are memoized: every caller awaits the same run and observes
//! the same outcome.
//!
//! # Example
//!
//! ```rust,ignore
//! use wiring::{LifecycleParticipant, RuntimeContext, runtime_service};
//! use async_trait::async_trait;
//!
//! #[derive(Injectable)]
//! #[runtime_service(participant)]
//! pub struct DatabaseService {
//!     config: Arc<DatabaseConfig>,
//! }
//!
//! #[async_trait]
//! impl LifecycleParticipant for DatabaseService {
//!     async fn on_start(&self, _: &RuntimeContext) -> anyhow::Result<()> {
//!         tracing::info!("Opening database connection");
//!         Ok(())
//!     }
//!
//!     async fn on_shutdown(&self, _: &RuntimeContext) -> anyhow::Result<()> {
//!         tracing::info!("Closing database connections");
//!         Ok(())
//!     }
//! }
//! ```

mod application;
mod error;
mod manager;
mod marker;
mod shutdown;
mod traits;

pub use application::{
    ApplicationBuilder, LifecycleState, RuntimeApplication, RuntimeContext,
    create_runtime_application,
};
pub use error::{LifecycleError, LifecyclePhase, Result, normalize_fault};
pub use marker::{
    RuntimeServiceMarker, is_runtime_service, is_runtime_service_constructor,
    mark_runtime_service,
};
#[doc(hidden)]
pub use marker::internal;
pub use shutdown::{ShutdownHandler, shutdown_signal};
pub use traits::{Disposable, Feature, LifecycleParticipant, RuntimeService};
