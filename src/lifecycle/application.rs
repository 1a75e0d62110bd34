//! Runtime Application
//!
//! Wraps a container with discovery of runtime services and an ordered, memoized
//! start/dispose lifecycle.

use super::manager::LifecycleManager;
use super::marker::marker_for;
use super::{Feature, LifecycleError, Result, RuntimeService, ShutdownHandler, shutdown_signal};
use crate::di::{Container, Modules, Overrides, Token, create_container};
use crate::error::Error;
use crate::module::Module;
use futures::FutureExt;
use futures::future::{self, BoxFuture, Shared};
use parking_lot::Mutex;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use strum_macros::{AsRefStr, Display};
use tokio::sync::OnceCell;

/// Where a runtime application is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Idle,
    Starting,
    Started,
    /// A start hook or service resolution failed; nothing was rolled back
    Failed,
    ShuttingDown,
    Disposed,
}

/// Read-only view handed to feature and participant hooks
#[derive(Clone)]
pub struct RuntimeContext {
    container: Arc<Container>,
    services: Arc<[Arc<dyn RuntimeService>]>,
}

impl RuntimeContext {
    pub(crate) fn new(container: Arc<Container>, services: Vec<Arc<dyn RuntimeService>>) -> Self {
        Self {
            container,
            services: services.into(),
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self, token: &Token<T>) -> crate::Result<Arc<T>> {
        self.container.resolve(token)
    }

    /// Discovered runtime services, in discovery order.
    pub fn services(&self) -> &[Arc<dyn RuntimeService>] {
        &self.services
    }
}

struct State {
    lifecycle: LifecycleState,
    services: Vec<Arc<dyn RuntimeService>>,
    participants: Vec<Arc<dyn RuntimeService>>,
    context: Option<RuntimeContext>,
}

/// Outcome of a start or dispose run, shared by every caller.
type Operation = Shared<BoxFuture<'static, Result<()>>>;

struct Inner {
    container: Arc<Container>,
    manager: LifecycleManager,
    state: Mutex<State>,
    start: OnceCell<Operation>,
    dispose: OnceCell<Operation>,
}

/// Run `operation` on its own task so dropping a caller never cancels it.
fn spawn_operation<F>(operation: F) -> Operation
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    let handle = tokio::spawn(operation);
    async move {
        handle
            .await
            .unwrap_or_else(|e| Err(LifecycleError::Task(e.to_string())))
    }
    .boxed()
    .shared()
}

/// A container plus the lifecycle of its runtime services and features.
///
/// Cloning yields another handle to the same application.
///
/// # Example
///
/// ```rust,ignore
/// use wiring::{ModuleOptions, RuntimeApplication, module};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let app = RuntimeApplication::builder()
///         .module(module(ModuleOptions::new().register(Registration::of::<Indexer>()))?)
///         .feature(DiagnosticsFeature)
///         .build()?;
///
///     app.run_until_shutdown_signal().await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct RuntimeApplication {
    inner: Arc<Inner>,
}

/// Build a runtime application over `modules`.
///
/// Fails only when the container cannot be created; runtime services are resolved
/// during [`RuntimeApplication::start`].
pub fn create_runtime_application(
    modules: impl Into<Modules>,
    overrides: Overrides,
    features: Vec<Arc<dyn Feature>>,
) -> crate::Result<RuntimeApplication> {
    let container = create_container(modules, overrides)?;

    tracing::debug!(
        providers = container.len(),
        features = features.len(),
        "Created runtime application"
    );

    Ok(RuntimeApplication {
        inner: Arc::new(Inner {
            container: Arc::new(container),
            manager: LifecycleManager::new(features),
            state: Mutex::new(State {
                lifecycle: LifecycleState::Idle,
                services: Vec::new(),
                participants: Vec::new(),
                context: None,
            }),
            start: OnceCell::new(),
            dispose: OnceCell::new(),
        }),
    })
}

impl RuntimeApplication {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    /// Discover runtime services, then start features and participants.
    ///
    /// Runs once on a spawned task; concurrent and later callers observe the same
    /// outcome, and a caller that stops waiting does not interrupt it.
    ///
    /// # Errors
    ///
    /// `Disposed` once `dispose` has begun, a resolution error from discovery, or the
    /// first failing start hook.
    pub async fn start(&self) -> Result<()> {
        if matches!(
            self.state(),
            LifecycleState::ShuttingDown | LifecycleState::Disposed
        ) {
            return Err(LifecycleError::Disposed);
        }

        let operation = self
            .inner
            .start
            .get_or_init(|| {
                let inner = Arc::clone(&self.inner);
                async move { spawn_operation(async move { inner.run_start().await }) }
            })
            .await
            .clone();
        operation.await
    }

    /// Shut down and release everything started by [`start`](Self::start).
    ///
    /// Waits for an in-flight start. An application that never started successfully
    /// is marked disposed without running any hook. Runs once; later callers observe
    /// the same outcome.
    ///
    /// # Errors
    ///
    /// `Disposal` carrying the first failed shutdown hook, participants before
    /// features. Every shutdown hook runs regardless.
    pub async fn dispose(&self) -> Result<()> {
        let operation = self
            .inner
            .dispose
            .get_or_init(|| {
                let inner = Arc::clone(&self.inner);
                async move { spawn_operation(async move { inner.run_dispose().await }) }
            })
            .await
            .clone();
        operation.await
    }

    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self, token: &Token<T>) -> crate::Result<Arc<T>> {
        self.inner.container.resolve(token)
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.state.lock().lifecycle
    }

    /// Discovered runtime services; empty before start and after dispose.
    pub fn services(&self) -> Vec<Arc<dyn RuntimeService>> {
        self.inner.state.lock().services.clone()
    }

    pub fn container(&self) -> &Container {
        &self.inner.container
    }

    /// Start, wait for `signal`, then dispose.
    pub async fn run_until<F: Future>(&self, signal: F) -> Result<()> {
        self.start().await?;
        signal.await;
        self.dispose().await
    }

    /// Start, wait for Ctrl+C or SIGTERM, then dispose.
    pub async fn run_until_shutdown_signal(&self) -> Result<()> {
        self.start().await?;
        let signal = shutdown_signal().await;
        let disposed = self.dispose().await;
        signal.and(disposed)
    }

    pub fn shutdown_handler(&self) -> ShutdownHandler {
        ShutdownHandler::new(self.clone())
    }

    /// Spawn a task that disposes the application once a shutdown signal arrives.
    pub fn spawn_shutdown_handler(&self) -> tokio::task::JoinHandle<Result<()>> {
        let handler = self.shutdown_handler();
        tokio::spawn(async move { handler.wait_for_shutdown().await })
    }
}

impl Inner {
    fn set_state(&self, lifecycle: LifecycleState) {
        self.state.lock().lifecycle = lifecycle;
    }

    async fn run_start(&self) -> Result<()> {
        self.set_state(LifecycleState::Starting);
        tracing::info!("Starting runtime application...");

        match self.boot().await {
            Ok(()) => {
                self.set_state(LifecycleState::Started);
                tracing::info!("Runtime application started");
                Ok(())
            }
            Err(e) => {
                self.set_state(LifecycleState::Failed);
                tracing::error!("Runtime application failed to start: {}", e);
                Err(e)
            }
        }
    }

    async fn boot(&self) -> Result<()> {
        let services = self.discover()?;
        let participants: Vec<_> = services
            .iter()
            .filter(|service| service.as_participant().is_some())
            .cloned()
            .collect();
        let context = RuntimeContext::new(Arc::clone(&self.container), services.clone());

        {
            let mut state = self.state.lock();
            state.services = services;
            state.participants = participants.clone();
            state.context = Some(context.clone());
        }

        self.manager.call_start(&context, &participants).await
    }

    /// Resolve every marked type bound in the container, in provider order.
    fn discover(&self) -> Result<Vec<Arc<dyn RuntimeService>>> {
        let mut services = Vec::new();

        for definition in self.container.providers() {
            let token = definition.token();
            let Some(marker) = token.type_id().and_then(marker_for) else {
                continue;
            };

            let instance = self.container.resolve_any(token)?;
            let service = marker.cast(&instance).ok_or_else(|| Error::DowncastFailed {
                token: token.to_string(),
                type_name: marker.type_name().to_string(),
            })?;

            tracing::debug!("Discovered runtime service: {}", service.service_name());
            services.push(service);
        }

        tracing::info!("Discovered {} runtime services", services.len());
        Ok(services)
    }

    async fn run_dispose(&self) -> Result<()> {
        let start = self
            .start
            .get_or_init(|| async { future::ready(Err(LifecycleError::Disposed)).boxed().shared() })
            .await
            .clone();
        let started = start.await.is_ok();

        self.set_state(LifecycleState::ShuttingDown);

        if !started {
            self.set_state(LifecycleState::Disposed);
            tracing::info!("Runtime application disposed before a successful start");
            return Ok(());
        }

        tracing::info!("Shutting down runtime application...");

        let (context, participants, services) = {
            let state = self.state.lock();
            (
                state.context.clone(),
                state.participants.clone(),
                state.services.clone(),
            )
        };

        let failures = match &context {
            Some(context) => self.manager.call_shutdown(context, &participants).await,
            None => Vec::new(),
        };
        self.manager.call_dispose(&services).await;

        {
            let mut state = self.state.lock();
            state.services.clear();
            state.participants.clear();
            state.context = None;
            state.lifecycle = LifecycleState::Disposed;
        }

        tracing::info!("Runtime application disposed");

        match LifecycleError::disposal(failures) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Builder for [`RuntimeApplication`]
#[derive(Default)]
pub struct ApplicationBuilder {
    modules: Vec<Module>,
    overrides: Overrides,
    features: Vec<Arc<dyn Feature>>,
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    pub fn modules(mut self, modules: impl IntoIterator<Item = Module>) -> Self {
        self.modules.extend(modules);
        self
    }

    pub fn override_value<T: ?Sized + Send + Sync + 'static>(
        mut self,
        token: &Token<T>,
        value: impl Into<Arc<T>>,
    ) -> Self {
        self.overrides = self.overrides.with(token, value);
        self
    }

    /// Replace every override set so far.
    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Append a feature; features start and shut down in the order added.
    pub fn feature(self, feature: impl Feature + 'static) -> Self {
        self.shared_feature(Arc::new(feature))
    }

    pub fn shared_feature(mut self, feature: Arc<dyn Feature>) -> Self {
        self.features.push(feature);
        self
    }

    pub fn build(self) -> crate::Result<RuntimeApplication> {
        create_runtime_application(self.modules, self.overrides, self.features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::{FactoryRegistration, provide_value};
    use crate::lifecycle::{Disposable, LifecycleParticipant, mark_runtime_service};
    use crate::module::{ModuleOptions, module};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    type Journal = Arc<std::sync::Mutex<Vec<String>>>;

    fn entries(journal: &Journal) -> Vec<String> {
        journal.lock().unwrap().clone()
    }

    struct Tracker {
        name: &'static str,
        journal: Journal,
        fail_start: bool,
        fail_shutdown: bool,
    }

    impl Tracker {
        fn new(name: &'static str, journal: &Journal) -> Self {
            Self {
                name,
                journal: Arc::clone(journal),
                fail_start: false,
                fail_shutdown: false,
            }
        }

        fn push(&self, event: &str) {
            self.journal.lock().unwrap().push(format!("{}:{event}", self.name));
        }
    }

    #[async_trait]
    impl Feature for Tracker {
        fn name(&self) -> &str {
            self.name
        }

        async fn start(&self, _: &RuntimeContext) -> anyhow::Result<()> {
            self.push("start");
            if self.fail_start {
                anyhow::bail!("{} refused to start", self.name);
            }
            Ok(())
        }

        async fn shutdown(&self, _: &RuntimeContext) -> anyhow::Result<()> {
            self.push("shutdown");
            if self.fail_shutdown {
                anyhow::bail!("{} refused to stop", self.name);
            }
            Ok(())
        }

        async fn dispose(&self) -> anyhow::Result<()> {
            self.push("dispose");
            Ok(())
        }
    }

    /// Participant registered under its own type token.
    struct Indexer {
        journal: Journal,
        fail_shutdown: bool,
    }

    #[async_trait]
    impl LifecycleParticipant for Indexer {
        async fn on_start(&self, context: &RuntimeContext) -> anyhow::Result<()> {
            let names: Vec<_> = context.services().iter().map(|s| s.service_name()).collect();
            self.journal
                .lock()
                .unwrap()
                .push(format!("indexer:on_start:{}", names.len()));
            Ok(())
        }

        async fn on_shutdown(&self, _: &RuntimeContext) -> anyhow::Result<()> {
            self.journal.lock().unwrap().push("indexer:on_shutdown".into());
            if self.fail_shutdown {
                anyhow::bail!("index flush failed");
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Disposable for Indexer {
        async fn dispose(&self) -> anyhow::Result<()> {
            self.journal.lock().unwrap().push("indexer:dispose".into());
            anyhow::bail!("ignored")
        }
    }

    impl RuntimeService for Indexer {
        fn service_name(&self) -> &'static str {
            "indexer"
        }

        fn as_participant(&self) -> Option<&dyn LifecycleParticipant> {
            Some(self)
        }

        fn as_disposable(&self) -> Option<&dyn Disposable> {
            Some(self)
        }
    }

    /// Marked but without any lifecycle capability.
    struct Cache;

    impl RuntimeService for Cache {}

    fn indexer_module(journal: &Journal, fail_shutdown: bool) -> Module {
        mark_runtime_service::<Indexer>();
        mark_runtime_service::<Cache>();
        let journal = Arc::clone(journal);
        module(
            ModuleOptions::new()
                .register(provide_value(&Token::<Cache>::of(), || Cache))
                .register(FactoryRegistration::new(&Token::<Indexer>::of(), move |_| {
                    Ok(Indexer {
                        journal: Arc::clone(&journal),
                        fail_shutdown,
                    })
                })),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_start_runs_features_then_participants_once() {
        let journal = Journal::default();
        let app = RuntimeApplication::builder()
            .module(indexer_module(&journal, false))
            .feature(Tracker::new("telemetry", &journal))
            .build()
            .unwrap();
        assert_eq!(app.state(), LifecycleState::Idle);

        let (first, second) = tokio::join!(app.start(), app.start());
        first.unwrap();
        second.unwrap();
        app.start().await.unwrap();

        assert_eq!(app.state(), LifecycleState::Started);
        assert_eq!(entries(&journal), vec!["telemetry:start", "indexer:on_start:2"]);

        let names: Vec<_> = app.services().iter().map(|s| s.service_name()).collect();
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("Cache"));
        assert_eq!(names[1], "indexer");
    }

    #[tokio::test]
    async fn test_dispose_before_start_runs_no_hooks() {
        let journal = Journal::default();
        let app = RuntimeApplication::builder()
            .module(indexer_module(&journal, false))
            .feature(Tracker::new("telemetry", &journal))
            .build()
            .unwrap();

        app.dispose().await.unwrap();
        app.dispose().await.unwrap();

        assert_eq!(app.state(), LifecycleState::Disposed);
        assert!(entries(&journal).is_empty());
        assert!(matches!(app.start().await, Err(LifecycleError::Disposed)));
        assert!(entries(&journal).is_empty());
    }

    #[tokio::test]
    async fn test_dispose_runs_shutdown_then_cleanup_once() {
        let journal = Journal::default();
        let app = RuntimeApplication::builder()
            .module(indexer_module(&journal, false))
            .feature(Tracker::new("telemetry", &journal))
            .build()
            .unwrap();

        app.start().await.unwrap();
        journal.lock().unwrap().clear();

        let (first, second) = tokio::join!(app.dispose(), app.dispose());
        first.unwrap();
        second.unwrap();
        app.dispose().await.unwrap();

        assert_eq!(
            entries(&journal),
            vec![
                "indexer:on_shutdown",
                "telemetry:shutdown",
                "indexer:dispose",
                "telemetry:dispose",
            ]
        );
        assert_eq!(app.state(), LifecycleState::Disposed);
        assert!(app.services().is_empty());
        assert!(matches!(app.start().await, Err(LifecycleError::Disposed)));
    }

    #[tokio::test]
    async fn test_dispose_surfaces_first_shutdown_failure_after_running_all() {
        let journal = Journal::default();
        let mut failing = Tracker::new("telemetry", &journal);
        failing.fail_shutdown = true;
        let app = RuntimeApplication::builder()
            .module(indexer_module(&journal, true))
            .feature(failing)
            .feature(Tracker::new("metrics", &journal))
            .build()
            .unwrap();

        app.start().await.unwrap();
        let err = app.dispose().await.unwrap_err();

        assert_eq!(err.to_string(), "index flush failed");
        assert!(matches!(err, LifecycleError::Disposal { failures: 2, .. }));
        let log = entries(&journal);
        assert!(log.contains(&"telemetry:shutdown".to_string()));
        assert!(log.contains(&"metrics:shutdown".to_string()));
        assert!(log.contains(&"metrics:dispose".to_string()));
        assert_eq!(app.state(), LifecycleState::Disposed);
        assert_eq!(app.dispose().await.unwrap_err().to_string(), "index flush failed");
    }

    #[tokio::test]
    async fn test_failed_start_is_memoized_and_not_rolled_back() {
        let journal = Journal::default();
        let mut failing = Tracker::new("broker", &journal);
        failing.fail_start = true;
        let app = RuntimeApplication::builder()
            .feature(Tracker::new("telemetry", &journal))
            .feature(failing)
            .feature(Tracker::new("metrics", &journal))
            .build()
            .unwrap();

        let err = app.start().await.unwrap_err();
        assert_eq!(err.to_string(), "start hook failed for broker: broker refused to start");
        assert_eq!(app.state(), LifecycleState::Failed);
        assert!(app.start().await.is_err());
        assert_eq!(entries(&journal), vec!["telemetry:start", "broker:start"]);

        app.dispose().await.unwrap();
        assert_eq!(entries(&journal), vec!["telemetry:start", "broker:start"]);
        assert_eq!(app.state(), LifecycleState::Disposed);
    }

    struct Unresolvable;

    impl RuntimeService for Unresolvable {}

    #[tokio::test]
    async fn test_resolution_failure_fails_start() {
        mark_runtime_service::<Unresolvable>();
        let missing = Token::<u32>::new("missing");
        let options = ModuleOptions::new().register(
            FactoryRegistration::new(&Token::<Unresolvable>::of(), |_| Ok(Unresolvable))
                .inject(&missing),
        );
        let app = RuntimeApplication::builder()
            .module(module(options).unwrap())
            .build()
            .unwrap();

        let err = app.start().await.unwrap_err();
        assert!(matches!(err, LifecycleError::Resolution(Error::MissingProvider { .. })));
        assert!(err.to_string().contains("No provider found for missing"));
    }

    struct Panicky;

    #[async_trait]
    impl LifecycleParticipant for Panicky {
        async fn on_shutdown(&self, _: &RuntimeContext) -> anyhow::Result<()> {
            std::panic::panic_any(serde_json::json!({ "reason": "lost" }))
        }
    }

    impl RuntimeService for Panicky {
        fn as_participant(&self) -> Option<&dyn LifecycleParticipant> {
            Some(self)
        }
    }

    #[tokio::test]
    async fn test_panicking_shutdown_hook_is_normalized() {
        mark_runtime_service::<Panicky>();
        let options = ModuleOptions::new().register(provide_value(&Token::<Panicky>::of(), || Panicky));
        let app = create_runtime_application(module(options).unwrap(), Overrides::new(), Vec::new())
            .unwrap();

        app.start().await.unwrap();
        let err = app.dispose().await.unwrap_err();
        assert_eq!(err.to_string(), r#"{"reason":"lost"}"#);
    }

    #[tokio::test]
    async fn test_resolve_delegates_to_container_at_any_stage() {
        let port = Token::<u16>::new("port");
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let options = ModuleOptions::new().register(FactoryRegistration::new(&port, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(80u16)
        }));
        let app = RuntimeApplication::builder()
            .module(module(options).unwrap())
            .override_value(&Token::<str>::new("host"), "localhost")
            .build()
            .unwrap();

        assert_eq!(*app.resolve(&port).unwrap(), 80);
        app.start().await.unwrap();
        app.dispose().await.unwrap();
        assert_eq!(*app.resolve(&port).unwrap(), 80);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_until_starts_and_disposes() {
        let journal = Journal::default();
        let app = RuntimeApplication::builder()
            .feature(Tracker::new("telemetry", &journal))
            .build()
            .unwrap();

        app.run_until(async {}).await.unwrap();
        assert_eq!(
            entries(&journal),
            vec!["telemetry:start", "telemetry:shutdown", "telemetry:dispose"]
        );
        assert_eq!(app.state().to_string(), "disposed");
    }

    /// Feature whose start and shutdown take a while.
    struct Sluggish {
        journal: Journal,
    }

    #[async_trait]
    impl Feature for Sluggish {
        fn name(&self) -> &str {
            "sluggish"
        }

        async fn start(&self, _: &RuntimeContext) -> anyhow::Result<()> {
            self.journal.lock().unwrap().push("sluggish:start".into());
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        }

        async fn shutdown(&self, _: &RuntimeContext) -> anyhow::Result<()> {
            self.journal.lock().unwrap().push("sluggish:shutdown".into());
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        }
    }

    fn sluggish_app(journal: &Journal) -> RuntimeApplication {
        RuntimeApplication::builder()
            .feature(Sluggish {
                journal: Arc::clone(journal),
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_abandoned_start_keeps_running_and_is_not_repeated() {
        let journal = Journal::default();
        let app = sluggish_app(&journal);

        let abandoned = tokio::time::timeout(Duration::from_millis(5), app.start()).await;
        assert!(abandoned.is_err());
        assert_eq!(app.state(), LifecycleState::Starting);

        app.start().await.unwrap();
        assert_eq!(app.state(), LifecycleState::Started);
        assert_eq!(entries(&journal), vec!["sluggish:start"]);
    }

    #[tokio::test]
    async fn test_abandoned_dispose_is_not_repeated() {
        let journal = Journal::default();
        let app = sluggish_app(&journal);
        app.start().await.unwrap();

        let abandoned = tokio::time::timeout(Duration::from_millis(5), app.dispose()).await;
        assert!(abandoned.is_err());

        app.dispose().await.unwrap();
        assert_eq!(app.state(), LifecycleState::Disposed);
        assert_eq!(entries(&journal), vec!["sluggish:start", "sluggish:shutdown"]);
    }

    #[tokio::test]
    async fn test_dispose_waits_for_in_flight_start() {
        let journal = Journal::default();
        let app = sluggish_app(&journal);

        let starter = {
            let app = app.clone();
            tokio::spawn(async move { app.start().await })
        };
        while app.state() != LifecycleState::Starting {
            tokio::task::yield_now().await;
        }

        app.dispose().await.unwrap();
        starter.await.unwrap().unwrap();

        assert_eq!(entries(&journal), vec!["sluggish:start", "sluggish:shutdown"]);
        assert_eq!(app.state(), LifecycleState::Disposed);
    }

    /// Participant whose start always fails.
    struct Gatekeeper {
        journal: Journal,
    }

    #[async_trait]
    impl LifecycleParticipant for Gatekeeper {
        async fn on_start(&self, _: &RuntimeContext) -> anyhow::Result<()> {
            self.journal.lock().unwrap().push("gatekeeper:on_start".into());
            anyhow::bail!("gate closed")
        }
    }

    impl RuntimeService for Gatekeeper {
        fn service_name(&self) -> &'static str {
            "gatekeeper"
        }

        fn as_participant(&self) -> Option<&dyn LifecycleParticipant> {
            Some(self)
        }
    }

    struct Latecomer {
        journal: Journal,
    }

    #[async_trait]
    impl LifecycleParticipant for Latecomer {
        async fn on_start(&self, _: &RuntimeContext) -> anyhow::Result<()> {
            self.journal.lock().unwrap().push("latecomer:on_start".into());
            Ok(())
        }
    }

    impl RuntimeService for Latecomer {
        fn as_participant(&self) -> Option<&dyn LifecycleParticipant> {
            Some(self)
        }
    }

    #[tokio::test]
    async fn test_participant_start_failure_skips_later_participants() {
        mark_runtime_service::<Gatekeeper>();
        mark_runtime_service::<Latecomer>();
        let journal = Journal::default();
        let (first, second) = (Arc::clone(&journal), Arc::clone(&journal));
        let options = ModuleOptions::new()
            .register(FactoryRegistration::new(&Token::<Gatekeeper>::of(), move |_| {
                Ok(Gatekeeper {
                    journal: Arc::clone(&first),
                })
            }))
            .register(FactoryRegistration::new(&Token::<Latecomer>::of(), move |_| {
                Ok(Latecomer {
                    journal: Arc::clone(&second),
                })
            }));
        let app = RuntimeApplication::builder()
            .module(module(options).unwrap())
            .feature(Tracker::new("telemetry", &journal))
            .build()
            .unwrap();

        let err = app.start().await.unwrap_err();
        assert_eq!(err.to_string(), "start hook failed for gatekeeper: gate closed");
        assert!(matches!(
            err,
            LifecycleError::HookFailed {
                phase: crate::lifecycle::LifecyclePhase::Start,
                ..
            }
        ));
        assert_eq!(
            entries(&journal),
            vec!["telemetry:start", "gatekeeper:on_start"]
        );
        assert_eq!(app.state(), LifecycleState::Failed);
    }
}
