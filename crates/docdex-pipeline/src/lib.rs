//! # docdex-pipeline
//!
//! Asynchronous document ingestion pipeline for docdex.
//!
//! This crate provides:
//! - The ingestion orchestrator: atomic batch record creation plus
//!   fire-and-forget extraction dispatch
//! - The extraction worker: per-document tasks with bounded concurrency,
//!   idempotent claims, explicit retry semantics, and lifecycle events
//! - Extraction adapters (image OCR, PDF text layer) over black-box engines
//! - Blob store implementations (filesystem, HTTP)
//! - The owner-scoped status/stats/search query service
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docdex_db::Database;
//! use docdex_pipeline::{
//!     ExtractionRouter, ExtractionWorker, FilesystemBlobStore, ImageOcrAdapter,
//!     IngestLimits, IngestionOrchestrator, PdfTextAdapter, PopplerPdfText,
//!     TesseractOcr, WorkerConfig,
//! };
//!
//! let db = Database::connect("postgres://...").await?;
//! let store = Arc::new(db.documents.clone());
//! let blobs: Arc<dyn docdex_core::BlobStore> =
//!     Arc::new(FilesystemBlobStore::new("/var/docdex/blobs"));
//!
//! let mut router = ExtractionRouter::new();
//! router.register(Arc::new(ImageOcrAdapter::new(
//!     blobs.clone(),
//!     Arc::new(TesseractOcr::from_env()),
//! )));
//! router.register(Arc::new(PdfTextAdapter::new(
//!     blobs.clone(),
//!     Arc::new(PopplerPdfText::new()),
//! )));
//!
//! let worker = ExtractionWorker::new(store.clone(), Arc::new(router), WorkerConfig::from_env());
//! let handle = worker.start();
//!
//! let orchestrator = IngestionOrchestrator::new(
//!     store,
//!     blobs,
//!     handle.dispatcher(),
//!     IngestLimits::from_env(),
//! );
//!
//! // Accept uploads, respond immediately; extraction happens behind the handle.
//! let created = orchestrator.ingest_batch(owner_id, uploads).await?;
//!
//! // Graceful shutdown drains in-flight documents.
//! handle.shutdown().await?;
//! ```

pub mod adapters;
pub mod engines;
pub mod orchestrator;
pub mod queries;
pub mod router;
pub mod storage;
pub mod worker;


// Re-export core types
pub use docdex_core::*;

pub use adapters::{ImageOcrAdapter, PdfTextAdapter};
pub use engines::{PopplerPdfText, TesseractOcr};
pub use orchestrator::{IngestLimits, IngestionOrchestrator};
pub use queries::DocumentQueries;
pub use router::ExtractionRouter;
pub use storage::{FilesystemBlobStore, HttpBlobStore};
pub use worker::{
    ExtractionDispatcher, ExtractionWorker, PipelineEvent, WorkerConfig, WorkerHandle,
};

/// Default maximum retries for failed extractions.
pub const DEFAULT_MAX_RETRIES: i32 = docdex_core::defaults::MAX_RETRIES;

/// Default maximum concurrent extractions.
pub const DEFAULT_MAX_CONCURRENT: usize = docdex_core::defaults::WORKER_MAX_CONCURRENT;
