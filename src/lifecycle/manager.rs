//! Lifecycle Manager
//!
//! Runs feature and participant hooks for each lifecycle phase, strictly in order.

use super::error::guarded;
use super::{Feature, LifecycleError, LifecyclePhase, Result, RuntimeContext, RuntimeService};
use std::sync::Arc;

/// Drives the hooks of one runtime application
///
/// Start hooks are fail-fast. Shutdown hooks all run and their failures are
/// collected; dispose hooks all run and their failures are logged and dropped.
pub(crate) struct LifecycleManager {
    features: Vec<Arc<dyn Feature>>,
}

impl LifecycleManager {
    pub(crate) fn new(features: Vec<Arc<dyn Feature>>) -> Self {
        Self { features }
    }

    /// Start every feature, then every participant.
    ///
    /// Nothing already started is rolled back when a later hook fails.
    pub(crate) async fn call_start(
        &self,
        context: &RuntimeContext,
        participants: &[Arc<dyn RuntimeService>],
    ) -> Result<()> {
        tracing::info!("Starting {} features...", self.features.len());

        for feature in &self.features {
            tracing::debug!("Starting feature: {}", feature.name());
            guarded(feature.start(context)).await.map_err(|e| {
                tracing::error!("Feature start failed for {}: {}", feature.name(), e);
                LifecycleError::hook_failed(LifecyclePhase::Start, feature.name(), e)
            })?;
        }

        tracing::info!("Starting {} participants...", participants.len());

        for service in participants {
            let Some(participant) = service.as_participant() else {
                continue;
            };
            tracing::debug!("Starting participant: {}", service.service_name());
            guarded(participant.on_start(context)).await.map_err(|e| {
                tracing::error!("on_start failed for {}: {}", service.service_name(), e);
                LifecycleError::hook_failed(LifecyclePhase::Start, service.service_name(), e)
            })?;
        }

        Ok(())
    }

    /// Shut down every participant, then every feature, collecting failures.
    pub(crate) async fn call_shutdown(
        &self,
        context: &RuntimeContext,
        participants: &[Arc<dyn RuntimeService>],
    ) -> Vec<anyhow::Error> {
        let mut failures = Vec::new();

        for service in participants {
            let Some(participant) = service.as_participant() else {
                continue;
            };
            tracing::debug!("Shutting down participant: {}", service.service_name());
            if let Err(e) = guarded(participant.on_shutdown(context)).await {
                tracing::error!("on_shutdown failed for {}: {}", service.service_name(), e);
                failures.push(e);
            }
        }

        for feature in &self.features {
            tracing::debug!("Shutting down feature: {}", feature.name());
            if let Err(e) = guarded(feature.shutdown(context)).await {
                tracing::error!("Feature shutdown failed for {}: {}", feature.name(), e);
                failures.push(e);
            }
        }

        tracing::info!(
            "Shutdown hooks complete ({} participants, {} features, {} failures)",
            participants.len(),
            self.features.len(),
            failures.len()
        );
        failures
    }

    /// Best-effort cleanup of services, then features.
    pub(crate) async fn call_dispose(&self, services: &[Arc<dyn RuntimeService>]) {
        for service in services {
            let Some(disposable) = service.as_disposable() else {
                continue;
            };
            if let Err(e) = guarded(disposable.dispose()).await {
                tracing::warn!("Ignoring dispose failure for {}: {}", service.service_name(), e);
            }
        }

        for feature in &self.features {
            if let Err(e) = guarded(feature.dispose()).await {
                tracing::warn!("Ignoring dispose failure for {}: {}", feature.name(), e);
            }
        }
    }
}
