//! Ingestion orchestrator — multi-session coordinator for course scraping.
//!
//! Each session runs as its own tokio task so one session's backoff or slow
//! extraction never starves another. The task holds the session's operation
//! lock for the whole run; overlapping `continue` requests surface as a busy
//! error instead of racing. A `stop` request cancels the session token, which
//! the task observes between module steps and inside retry sleeps.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use tutor_browser::driver::{BrowserDriver, DriverError};
use tutor_browser::types::ModuleLink;
use tutor_core::constants::DEFAULT_MAX_CONSECUTIVE_MODULE_FAILURES;
use tutor_core::corpus::KnowledgeCorpus;
use tutor_core::retry::RetryPolicy;
use tutor_llm::generator::{CourseSynthesis, Generator};
use tutor_llm::invoker::{InvokeError, ResilientInvoker};
use tutor_store::{Busy, LockGuard, OperationLocks, SessionStore, StoreError};

use crate::aggregator::{self, AggregatorConfig};
use crate::session::{Module, ProcessingSession, ProcessingStatus, StatusSnapshot};

// ─────────────────────────────────────────────────────────────────────────────
// Errors / config / events
// ─────────────────────────────────────────────────────────────────────────────

/// Errors surfaced by orchestrator operations.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// No session with the given identifier.
    #[error("processing session not found: {0}")]
    SessionNotFound(String),

    /// Another operation is in flight for this session.
    #[error(transparent)]
    Busy(#[from] Busy),

    /// The requested operation is not valid in the session's current state.
    #[error("operation '{operation}' not valid in state '{status}'", status = .status.as_str())]
    InvalidState {
        /// Current session status.
        status: ProcessingStatus,
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// The session's browser handle is no longer tracked.
    #[error("no live browser for session: {0}")]
    BrowserUnavailable(String),

    /// Browser driver failure.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestrator tunables.
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Consecutive module failures that abort the run.
    pub max_consecutive_module_failures: u32,
    /// Aggregation tunables.
    pub aggregator: AggregatorConfig,
    /// Retry policy for the synthesis call.
    pub retry: RetryPolicy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_consecutive_module_failures: DEFAULT_MAX_CONSECUTIVE_MODULE_FAILURES,
            aggregator: AggregatorConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Progress events emitted on the orchestrator's broadcast channel.
#[derive(Clone, Debug)]
pub enum IngestEvent {
    /// A session changed state.
    StatusChanged {
        /// Session identifier.
        session_id: String,
        /// New status.
        status: ProcessingStatus,
    },
    /// A module finished (successfully or not).
    ModuleProcessed {
        /// Session identifier.
        session_id: String,
        /// 1-based module index.
        index: u32,
        /// Total module count.
        total: u32,
        /// Whether extraction failed.
        failed: bool,
    },
}

/// Outcome of the background run, internal to the task.
enum RunError {
    /// Cancelled by a stop request.
    Stopped,
    /// Unrecoverable fault; the reason lands on the session record.
    Fatal(String),
}

struct LiveSession {
    browser_handle: String,
    cancel: CancellationToken,
}

// ─────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ─────────────────────────────────────────────────────────────────────────────

/// Coordinates all active ingestion sessions.
pub struct IngestOrchestrator {
    driver: Arc<dyn BrowserDriver>,
    generator: Arc<dyn Generator>,
    sessions: Arc<dyn SessionStore<ProcessingSession>>,
    corpora: Arc<dyn SessionStore<KnowledgeCorpus>>,
    locks: OperationLocks,
    live: DashMap<String, LiveSession>,
    events: broadcast::Sender<IngestEvent>,
    config: IngestConfig,
}

impl IngestOrchestrator {
    /// Create an orchestrator over injected collaborators and stores.
    pub fn new(
        driver: Arc<dyn BrowserDriver>,
        generator: Arc<dyn Generator>,
        sessions: Arc<dyn SessionStore<ProcessingSession>>,
        corpora: Arc<dyn SessionStore<KnowledgeCorpus>>,
        config: IngestConfig,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            driver,
            generator,
            sessions,
            corpora,
            locks: OperationLocks::new(),
            live: DashMap::new(),
            events,
            config,
        })
    }

    /// Subscribe to progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<IngestEvent> {
        self.events.subscribe()
    }

    /// Number of sessions with a live browser handle.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Whether a run is currently in flight for the session.
    #[must_use]
    pub fn is_busy(&self, session_id: &str) -> bool {
        self.locks.is_held(session_id)
    }

    /// Open a browser at the course URL and park the session until the
    /// caller confirms login.
    #[instrument(skip(self), fields(course_url))]
    pub async fn open_browser(&self, course_url: &str) -> Result<StatusSnapshot, IngestError> {
        let mut session = ProcessingSession::new(course_url);
        let session_id = session.id.clone();
        self.sessions.put(session_id.as_str(), session.clone())?;

        match self.driver.open(course_url).await {
            Ok(handle) => {
                session.page_title = Some(handle.page_title.clone());
                session.status = ProcessingStatus::AwaitingLogin;
                self.sessions.put(session_id.as_str(), session.clone())?;
                let _ = self.live.insert(
                    session_id.as_str().to_owned(),
                    LiveSession {
                        browser_handle: handle.id,
                        cancel: CancellationToken::new(),
                    },
                );
                self.emit_status(&session);
                info!(session = session_id.as_str(), "browser opened, awaiting login");
                Ok(session.snapshot())
            }
            Err(err) => {
                session.status = ProcessingStatus::Error;
                session.error = Some(err.to_string());
                self.sessions.put(session_id.as_str(), session)?;
                Err(err.into())
            }
        }
    }

    /// Begin discovery and module processing after manual login.
    ///
    /// Returns as soon as the background run is underway; callers poll
    /// [`get_status`](Self::get_status) for progress.
    #[instrument(skip(self), fields(session_id))]
    pub fn continue_after_login(
        self: &Arc<Self>,
        session_id: &str,
    ) -> Result<StatusSnapshot, IngestError> {
        let guard = self.locks.try_acquire(session_id)?;

        let mut session = self
            .sessions
            .get(session_id)?
            .ok_or_else(|| IngestError::SessionNotFound(session_id.to_owned()))?;

        if session.status != ProcessingStatus::AwaitingLogin {
            return Err(IngestError::InvalidState {
                status: session.status,
                operation: "continue_after_login",
            });
        }

        let live = self
            .live
            .get(session_id)
            .ok_or_else(|| IngestError::BrowserUnavailable(session_id.to_owned()))?;
        let browser_handle = live.browser_handle.clone();
        let cancel = live.cancel.clone();
        drop(live);

        session.status = ProcessingStatus::DiscoveringModules;
        self.sessions.put(session_id, session.clone())?;
        self.emit_status(&session);

        let snapshot = session.snapshot();
        let this = self.clone();
        drop(tokio::spawn(async move {
            this.run_ingestion(session, browser_handle, cancel, guard)
                .await;
        }));
        Ok(snapshot)
    }

    /// Current status snapshot for a polling caller.
    pub fn get_status(&self, session_id: &str) -> Result<StatusSnapshot, IngestError> {
        let session = self
            .sessions
            .get(session_id)?
            .ok_or_else(|| IngestError::SessionNotFound(session_id.to_owned()))?;
        Ok(session.snapshot())
    }

    /// Stop a session and release its browser. Idempotent: stopping a
    /// terminal session returns its snapshot unchanged.
    #[instrument(skip(self), fields(session_id))]
    pub async fn stop(&self, session_id: &str) -> Result<StatusSnapshot, IngestError> {
        let mut session = self
            .sessions
            .get(session_id)?
            .ok_or_else(|| IngestError::SessionNotFound(session_id.to_owned()))?;

        if let Some((_, live)) = self.live.remove(session_id) {
            live.cancel.cancel();
            // Best effort: the driver treats closing an unknown handle as a
            // no-op, so racing the run task here is harmless.
            if let Err(err) = self.driver.close(&live.browser_handle).await {
                warn!(session = session_id, error = %err, "browser close failed");
            }
        }

        if !session.status.is_terminal() {
            session.status = ProcessingStatus::Stopped;
            self.sessions.put(session_id, session.clone())?;
            self.emit_status(&session);
            info!(session = session_id, "processing stopped");
        }
        Ok(session.snapshot())
    }

    // ── Background run ─────────────────────────────────────────────────

    async fn run_ingestion(
        self: Arc<Self>,
        mut session: ProcessingSession,
        browser_handle: String,
        cancel: CancellationToken,
        guard: LockGuard,
    ) {
        let outcome = self
            .drive(&mut session, &browser_handle, &cancel)
            .await;
        let session_id = session.id.as_str().to_owned();

        match outcome {
            Ok(()) => {
                self.release_browser(&session_id).await;
                info!(session = session_id, "ingestion completed");
            }
            Err(RunError::Stopped) => {
                // `stop` may already have cleaned up; both paths are
                // idempotent.
                self.release_browser(&session_id).await;
                if let Ok(Some(mut current)) = self.sessions.get(&session_id) {
                    if !current.status.is_terminal() {
                        current.status = ProcessingStatus::Stopped;
                        let _ = self.sessions.put(&session_id, current.clone());
                        self.emit_status(&current);
                    }
                }
                debug!(session = session_id, "ingestion run cancelled");
            }
            Err(RunError::Fatal(reason)) => {
                self.release_browser(&session_id).await;
                session.status = ProcessingStatus::Error;
                session.error = Some(reason.clone());
                let _ = self.sessions.put(&session_id, session.clone());
                self.emit_status(&session);
                warn!(session = session_id, reason, "ingestion failed");
            }
        }
        drop(guard);
    }

    /// The state machine body: discovery → module iteration → analysis.
    async fn drive(
        &self,
        session: &mut ProcessingSession,
        handle: &str,
        cancel: &CancellationToken,
    ) -> Result<(), RunError> {
        // Discovery
        let links = match self.driver.discover_modules(handle).await {
            Ok(links) => links,
            Err(err) => return Err(RunError::Fatal(err.to_string())),
        };
        #[allow(clippy::cast_possible_truncation)]
        {
            session.total_modules = links.len() as u32;
        }

        if links.is_empty() {
            // Recoverable: nothing to scrape, emit a zero-module summary.
            self.transition(session, ProcessingStatus::Analyzing);
            session.summary = Some(CourseSynthesis::empty());
            self.transition(session, ProcessingStatus::Completed);
            return Ok(());
        }

        // Module iteration — strictly sequential; later modules depend on
        // the browser's navigation state.
        self.transition(session, ProcessingStatus::ProcessingModules);
        let mut consecutive_failures = 0u32;

        for (idx, link) in links.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(RunError::Stopped);
            }

            #[allow(clippy::cast_possible_truncation)]
            {
                session.current_module = idx as u32 + 1;
            }
            let _ = self.sessions.put(session.id.as_str(), session.clone());

            let module = match self.extract_module(handle, link).await {
                Ok(module) => {
                    consecutive_failures = 0;
                    module
                }
                Err(err) if err.is_session_fatal() => {
                    return Err(RunError::Fatal(err.to_string()));
                }
                Err(err) => {
                    consecutive_failures += 1;
                    warn!(
                        session = session.id.as_str(),
                        module = link.title,
                        error = %err,
                        consecutive_failures,
                        "module extraction failed"
                    );
                    Module {
                        title: link.title.clone(),
                        url: link.url.clone(),
                        order: link.order,
                        text: String::new(),
                        headings: Vec::new(),
                        media: Vec::new(),
                        screenshot: None,
                        error: Some(err.to_string()),
                    }
                }
            };

            let failed = module.failed();
            session.modules.push(module);
            let _ = self.sessions.put(session.id.as_str(), session.clone());
            let _ = self.events.send(IngestEvent::ModuleProcessed {
                session_id: session.id.as_str().to_owned(),
                index: session.current_module,
                total: session.total_modules,
                failed,
            });

            if consecutive_failures >= self.config.max_consecutive_module_failures {
                return Err(RunError::Fatal(format!(
                    "{consecutive_failures} consecutive module extraction failures"
                )));
            }
        }

        // Analysis
        self.transition(session, ProcessingStatus::Analyzing);
        let title = session
            .page_title
            .clone()
            .unwrap_or_else(|| session.course_url.clone());
        let mut corpus = aggregator::aggregate(&title, &session.modules, &self.config.aggregator);

        let invoker = ResilientInvoker::with_cancellation(self.config.retry.clone(), cancel.clone());
        let synthesis = invoker
            .invoke("course_synthesis", || async {
                self.generator.synthesize_course(&corpus).await
            })
            .await;

        match synthesis {
            Ok(synthesis) => {
                aggregator::merge_synthesis(&mut corpus, &synthesis);
                let corpus_id = corpus.id.clone();
                self.corpora
                    .put(corpus_id.as_str(), corpus)
                    .map_err(|e| RunError::Fatal(e.to_string()))?;
                session.corpus_id = Some(corpus_id);
                session.summary = Some(synthesis);
                self.transition(session, ProcessingStatus::Completed);
                Ok(())
            }
            Err(InvokeError::Cancelled) => Err(RunError::Stopped),
            Err(err) => Err(RunError::Fatal(err.to_string())),
        }
    }

    async fn extract_module(&self, handle: &str, link: &ModuleLink) -> Result<Module, DriverError> {
        self.driver.navigate(handle, &link.url).await?;
        let extract = self.driver.extract(handle).await?;
        Ok(Module {
            title: link.title.clone(),
            url: link.url.clone(),
            order: link.order,
            text: extract.text,
            headings: extract.headings,
            media: extract.media,
            screenshot: extract.screenshot,
            error: None,
        })
    }

    fn transition(&self, session: &mut ProcessingSession, next: ProcessingStatus) {
        debug_assert!(
            session.status.can_transition_to(next),
            "illegal transition {:?} -> {next:?}",
            session.status
        );
        session.status = next;
        let _ = self.sessions.put(session.id.as_str(), session.clone());
        self.emit_status(session);
    }

    fn emit_status(&self, session: &ProcessingSession) {
        let _ = self.events.send(IngestEvent::StatusChanged {
            session_id: session.id.as_str().to_owned(),
            status: session.status,
        });
    }

    async fn release_browser(&self, session_id: &str) {
        if let Some((_, live)) = self.live.remove(session_id) {
            if let Err(err) = self.driver.close(&live.browser_handle).await {
                warn!(session = session_id, error = %err, "browser close failed");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
