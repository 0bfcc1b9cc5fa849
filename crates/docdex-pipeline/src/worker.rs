//! Extraction worker: drives documents from `pending` to a terminal state.
//!
//! Each dispatched document is processed as an independent task; a semaphore
//! bounds how many run at once, and nothing serializes documents against
//! each other, so completion order is unrelated to dispatch order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc, Semaphore};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use docdex_core::defaults;
use docdex_core::{
    bounded_detail, clamp_confidence, DocumentStore, Error, MimeClass, Result,
};

use crate::router::ExtractionRouter;

/// Configuration for the extraction worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum number of documents extracted concurrently.
    pub max_concurrent: usize,
    /// Retry budget: a document that has failed this many times is terminal.
    pub max_retries: i32,
    /// Wall-clock ceiling for one document's extraction.
    pub extraction_timeout: Duration,
    /// Whether to enable document processing.
    pub enabled: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::WORKER_MAX_CONCURRENT,
            max_retries: defaults::MAX_RETRIES,
            extraction_timeout: Duration::from_secs(defaults::EXTRACTION_TIMEOUT_SECS),
            enabled: true,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `DOCDEX_WORKER_ENABLED` | `true` | Enable/disable document processing |
    /// | `DOCDEX_MAX_CONCURRENT` | `4` | Max concurrent extractions |
    /// | `DOCDEX_MAX_RETRIES` | `3` | Retry budget per document |
    /// | `DOCDEX_EXTRACTION_TIMEOUT_SECS` | `300` | Per-document extraction ceiling |
    pub fn from_env() -> Self {
        let enabled = std::env::var("DOCDEX_WORKER_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let max_concurrent = std::env::var("DOCDEX_MAX_CONCURRENT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults::WORKER_MAX_CONCURRENT)
            .max(1);

        let max_retries = std::env::var("DOCDEX_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(defaults::MAX_RETRIES)
            .max(0);

        let extraction_timeout = std::env::var("DOCDEX_EXTRACTION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(defaults::EXTRACTION_TIMEOUT_SECS));

        Self {
            max_concurrent,
            max_retries,
            extraction_timeout,
            enabled,
        }
    }

    /// Set maximum concurrent extractions.
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    /// Set the retry budget.
    pub fn with_max_retries(mut self, max: i32) -> Self {
        self.max_retries = max;
        self
    }

    /// Set the per-document extraction timeout.
    pub fn with_extraction_timeout(mut self, timeout: Duration) -> Self {
        self.extraction_timeout = timeout;
        self
    }

    /// Enable or disable document processing.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Event emitted by the extraction worker.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// A document entered `processing`.
    DocumentStarted {
        document_id: Uuid,
        mime_class: MimeClass,
    },
    /// A document reached `completed`.
    DocumentCompleted {
        document_id: Uuid,
        text_len: usize,
        confidence: f32,
    },
    /// A document's extraction attempt failed and was recorded.
    DocumentFailed {
        document_id: Uuid,
        error: String,
        retry_count: i32,
    },
    /// The record store rejected a transition; the extraction outcome was
    /// dropped and the previous durable state stands. Operator attention
    /// required.
    RecordStoreUnavailable { document_id: Uuid, error: String },
    /// Worker started.
    WorkerStarted,
    /// Worker stopped.
    WorkerStopped,
}

/// Cloneable fire-and-forget handoff into the worker.
///
/// `dispatch` enqueues without blocking, so the record-creation path never
/// waits on extraction.
#[derive(Clone)]
pub struct ExtractionDispatcher {
    tx: mpsc::UnboundedSender<Uuid>,
}

impl ExtractionDispatcher {
    /// Submit a document for asynchronous extraction.
    pub fn dispatch(&self, document_id: Uuid) -> Result<()> {
        self.tx
            .send(document_id)
            .map_err(|_| Error::Internal("extraction worker is not running".to_string()))
    }
}

/// Handle for controlling a running worker.
pub struct WorkerHandle {
    dispatcher: ExtractionDispatcher,
    shutdown_tx: mpsc::Sender<()>,
    event_rx: broadcast::Receiver<PipelineEvent>,
}

impl WorkerHandle {
    /// Get a cloneable dispatcher for submitting documents.
    pub fn dispatcher(&self) -> ExtractionDispatcher {
        self.dispatcher.clone()
    }

    /// Get a receiver for pipeline events.
    pub fn events(&self) -> broadcast::Receiver<PipelineEvent> {
        self.event_rx.resubscribe()
    }

    /// Signal the worker to shut down gracefully. In-flight documents are
    /// drained before the worker stops.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| Error::Internal("failed to send shutdown signal".to_string()))?;
        Ok(())
    }
}

/// Extraction worker processing dispatched documents.
pub struct ExtractionWorker {
    store: Arc<dyn DocumentStore>,
    router: Arc<ExtractionRouter>,
    config: WorkerConfig,
    event_tx: broadcast::Sender<PipelineEvent>,
}

impl ExtractionWorker {
    /// Create a new extraction worker.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        router: Arc<ExtractionRouter>,
        config: WorkerConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(defaults::EVENT_BUS_CAPACITY);
        Self {
            store,
            router,
            config,
            event_tx,
        }
    }

    /// Get a receiver for pipeline events.
    pub fn events(&self) -> broadcast::Receiver<PipelineEvent> {
        self.event_tx.subscribe()
    }

    /// Start the worker and return a handle for control.
    pub fn start(self) -> WorkerHandle {
        let (dispatch_tx, mut dispatch_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let event_rx = self.event_tx.subscribe();

        let worker = Arc::new(self);
        tokio::spawn(async move {
            worker.run(&mut dispatch_rx, &mut shutdown_rx).await;
        });

        WorkerHandle {
            dispatcher: ExtractionDispatcher { tx: dispatch_tx },
            shutdown_tx,
            event_rx,
        }
    }

    /// Run the dispatch loop with bounded concurrent processing.
    async fn run(
        self: Arc<Self>,
        dispatch_rx: &mut mpsc::UnboundedReceiver<Uuid>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) {
        if !self.config.enabled {
            info!(
                subsystem = "pipeline",
                component = "worker",
                "Extraction worker is disabled, not starting"
            );
            return;
        }

        info!(
            subsystem = "pipeline",
            component = "worker",
            max_concurrent = self.config.max_concurrent,
            max_retries = self.config.max_retries,
            "Extraction worker started"
        );
        let _ = self.event_tx.send(PipelineEvent::WorkerStarted);

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));

        loop {
            tokio::select! {
                dispatched = dispatch_rx.recv() => {
                    let Some(document_id) = dispatched else {
                        // All dispatchers dropped
                        break;
                    };
                    let Ok(permit) = semaphore.clone().acquire_owned().await else {
                        break;
                    };
                    let worker = self.clone();
                    tokio::spawn(async move {
                        worker.process_document(document_id).await;
                        drop(permit);
                    });
                }
                _ = shutdown_rx.recv() => {
                    info!(
                        subsystem = "pipeline",
                        component = "worker",
                        "Extraction worker received shutdown signal"
                    );
                    break;
                }
            }
        }

        // Drain: wait for in-flight documents before announcing stop.
        let _ = semaphore.acquire_many(self.config.max_concurrent as u32).await;

        let _ = self.event_tx.send(PipelineEvent::WorkerStopped);
        info!(
            subsystem = "pipeline",
            component = "worker",
            "Extraction worker stopped"
        );
    }

    /// Drive one document through claim, extraction, and terminal update.
    async fn process_document(&self, document_id: Uuid) {
        let start = Instant::now();

        // Claim first: the pending → processing transition must be durable
        // before extraction runs, so a crash mid-extraction leaves visible
        // evidence of the in-flight job. The claim is also the idempotence
        // gate: ineligible documents are skipped, never reprocessed.
        let claimed = match self
            .store
            .claim_for_processing(document_id, self.config.max_retries)
            .await
        {
            Ok(Some(document)) => document,
            Ok(None) => {
                debug!(
                    subsystem = "pipeline",
                    component = "worker",
                    op = "claim",
                    document_id = %document_id,
                    "Document not eligible for processing, skipping"
                );
                return;
            }
            Err(e) => {
                error!(
                    subsystem = "pipeline",
                    component = "worker",
                    op = "claim",
                    document_id = %document_id,
                    error = %e,
                    "Record store unavailable while claiming document"
                );
                let _ = self.event_tx.send(PipelineEvent::RecordStoreUnavailable {
                    document_id,
                    error: e.to_string(),
                });
                return;
            }
        };

        info!(
            subsystem = "pipeline",
            component = "worker",
            op = "extract",
            document_id = %document_id,
            mime_class = %claimed.mime_class,
            "Processing document"
        );
        let _ = self.event_tx.send(PipelineEvent::DocumentStarted {
            document_id,
            mime_class: claimed.mime_class,
        });

        let outcome = match self.router.adapter_for(claimed.mime_class) {
            Some(adapter) => {
                match timeout(
                    self.config.extraction_timeout,
                    adapter.extract(&claimed.source_ref),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(Error::Extraction(format!(
                        "extraction exceeded timeout of {}s",
                        self.config.extraction_timeout.as_secs()
                    ))),
                }
            }
            None => Err(Error::UnsupportedFormat(claimed.mime_class.to_string())),
        };

        match outcome {
            Ok(extraction) => {
                let confidence = clamp_confidence(extraction.confidence);
                match self
                    .store
                    .complete_extraction(document_id, &extraction.text, confidence)
                    .await
                {
                    Ok(()) => {
                        info!(
                            subsystem = "pipeline",
                            component = "worker",
                            op = "complete",
                            document_id = %document_id,
                            text_len = extraction.text.len(),
                            confidence = confidence,
                            duration_ms = start.elapsed().as_millis() as u64,
                            "Document completed"
                        );
                        let _ = self.event_tx.send(PipelineEvent::DocumentCompleted {
                            document_id,
                            text_len: extraction.text.len(),
                            confidence,
                        });
                    }
                    Err(e) => self.escalate_store_failure(document_id, e),
                }
            }
            Err(e) => {
                let detail = bounded_detail(&e.to_string());
                match self.store.fail_extraction(document_id, &detail).await {
                    Ok(()) => {
                        let retry_count = claimed.retry_count + 1;
                        warn!(
                            subsystem = "pipeline",
                            component = "worker",
                            op = "fail",
                            document_id = %document_id,
                            error = %detail,
                            retry_count = retry_count,
                            duration_ms = start.elapsed().as_millis() as u64,
                            "Document extraction failed"
                        );
                        let _ = self.event_tx.send(PipelineEvent::DocumentFailed {
                            document_id,
                            error: detail,
                            retry_count,
                        });
                    }
                    Err(store_err) => self.escalate_store_failure(document_id, store_err),
                }
            }
        }
    }

    /// A terminal transition could not be written. The extraction outcome is
    /// dropped and the prior durable state stands; this is surfaced for
    /// operators instead of being recorded as document state.
    fn escalate_store_failure(&self, document_id: Uuid, error: Error) {
        error!(
            subsystem = "pipeline",
            component = "worker",
            document_id = %document_id,
            error = %error,
            "Record store unavailable, extraction outcome dropped"
        );
        let _ = self.event_tx.send(PipelineEvent::RecordStoreUnavailable {
            document_id,
            error: error.to_string(),
        });
    }
}
