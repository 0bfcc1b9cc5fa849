//! Ingestion orchestrator: accepts stored uploads, creates pending records,
//! and hands each one off to asynchronous extraction.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use docdex_core::defaults;
use docdex_core::{
    BlobStore, CreateDocumentRequest, Document, DocumentStore, Error, MimeClass, Result,
    UploadedFile,
};

use crate::worker::ExtractionDispatcher;

/// Validation limits for ingestion batches.
#[derive(Debug, Clone)]
pub struct IngestLimits {
    /// Maximum accepted file size in bytes.
    pub max_file_bytes: i64,
    /// Maximum files accepted in one batch.
    pub max_batch_files: usize,
    /// Mime classes accepted into the pipeline.
    pub allowed_classes: Vec<MimeClass>,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: defaults::MAX_FILE_BYTES,
            max_batch_files: defaults::MAX_BATCH_FILES,
            allowed_classes: vec![MimeClass::Image, MimeClass::Pdf],
        }
    }
}

impl IngestLimits {
    /// Create limits from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `DOCDEX_MAX_FILE_BYTES` | 50 MiB | Per-file size ceiling |
    /// | `DOCDEX_MAX_BATCH_FILES` | `10` | Per-batch file count ceiling |
    pub fn from_env() -> Self {
        let max_file_bytes = std::env::var("DOCDEX_MAX_FILE_BYTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(defaults::MAX_FILE_BYTES)
            .max(1);

        let max_batch_files = std::env::var("DOCDEX_MAX_BATCH_FILES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults::MAX_BATCH_FILES)
            .max(1);

        Self {
            max_file_bytes,
            max_batch_files,
            ..Default::default()
        }
    }

    /// Set the per-file size ceiling.
    pub fn with_max_file_bytes(mut self, max: i64) -> Self {
        self.max_file_bytes = max;
        self
    }

    /// Set the per-batch file count ceiling.
    pub fn with_max_batch_files(mut self, max: usize) -> Self {
        self.max_batch_files = max;
        self
    }

    /// Set the accepted mime classes.
    pub fn with_allowed_classes(mut self, classes: Vec<MimeClass>) -> Self {
        self.allowed_classes = classes;
        self
    }
}

/// Accepts newly stored uploads, creates their records, and schedules
/// extraction.
///
/// Record creation for a batch is atomic; extraction dispatch per document
/// is independent and fire-and-forget, so the caller gets its created
/// records back without waiting on any extraction.
pub struct IngestionOrchestrator {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    dispatcher: ExtractionDispatcher,
    limits: IngestLimits,
}

impl IngestionOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        dispatcher: ExtractionDispatcher,
        limits: IngestLimits,
    ) -> Self {
        Self {
            store,
            blobs,
            dispatcher,
            limits,
        }
    }

    /// Validate one upload descriptor into a creation request.
    ///
    /// Rejections here are the validation error class: nothing enters the
    /// pipeline and no record is created.
    fn validate(&self, owner_id: Uuid, file: &UploadedFile) -> Result<CreateDocumentRequest> {
        if file.byte_size <= 0 {
            return Err(Error::InvalidInput(format!(
                "zero-length file: {}",
                file.file_name
            )));
        }
        if file.byte_size > self.limits.max_file_bytes {
            return Err(Error::InvalidInput(format!(
                "file {} is {} bytes, over the {} byte limit",
                file.file_name, file.byte_size, self.limits.max_file_bytes
            )));
        }

        let mime_class = file.mime_class();
        if !self.limits.allowed_classes.contains(&mime_class) {
            return Err(Error::InvalidInput(format!(
                "unsupported mime class {} for file {}",
                mime_class, file.file_name
            )));
        }

        Ok(CreateDocumentRequest {
            owner_id,
            source_ref: file.source_ref.clone(),
            file_name: file.file_name.clone(),
            mime_class,
            byte_size: file.byte_size,
        })
    }

    /// Accept a batch of stored uploads.
    ///
    /// Every descriptor is validated before anything is created; record
    /// creation is all-or-nothing; each created document is then dispatched
    /// for extraction independently. The returned records are still
    /// `pending` — extraction proceeds after this call returns.
    pub async fn ingest_batch(
        &self,
        owner_id: Uuid,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<Document>> {
        if files.is_empty() {
            return Err(Error::InvalidInput("empty upload batch".to_string()));
        }
        if files.len() > self.limits.max_batch_files {
            return Err(Error::InvalidInput(format!(
                "batch of {} files exceeds the limit of {}",
                files.len(),
                self.limits.max_batch_files
            )));
        }

        let mut batch = Vec::with_capacity(files.len());
        for file in &files {
            batch.push(self.validate(owner_id, file)?);
        }

        let created = self.store.create_batch(batch).await?;

        for document in &created {
            if let Err(e) = self.dispatcher.dispatch(document.id) {
                // The record is durable either way; a dead worker is an
                // operator problem, not a caller problem.
                error!(
                    subsystem = "pipeline",
                    component = "orchestrator",
                    document_id = %document.id,
                    error = %e,
                    "Extraction dispatch failed"
                );
            }
        }

        info!(
            subsystem = "pipeline",
            component = "orchestrator",
            op = "ingest_batch",
            owner_id = %owner_id,
            result_count = created.len(),
            "Ingestion batch accepted"
        );
        Ok(created)
    }

    /// Explicitly re-dispatch a document for extraction.
    ///
    /// This is the retry entry point: eligibility (retry-eligible `failed`,
    /// or `pending`) is enforced by the worker's claim, so re-dispatching a
    /// terminal or in-flight document is a no-op. Returns `false` when the
    /// document does not exist for this owner.
    pub async fn redispatch(&self, owner_id: Uuid, id: Uuid) -> Result<bool> {
        let Some(document) = self.store.fetch(owner_id, id).await? else {
            return Ok(false);
        };

        debug!(
            subsystem = "pipeline",
            component = "orchestrator",
            op = "redispatch",
            document_id = %document.id,
            retry_count = document.retry_count,
            "Re-dispatching document"
        );
        self.dispatcher.dispatch(document.id)?;
        Ok(true)
    }

    /// Delete a document.
    ///
    /// Removing the record is authoritative; blob removal is best-effort
    /// and its failure only warns. Returns `false` when the document does
    /// not exist for this owner.
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool> {
        let Some(source_ref) = self.store.delete(owner_id, id).await? else {
            return Ok(false);
        };

        match self.blobs.delete(&source_ref).await {
            Ok(true) => {
                debug!(
                    subsystem = "pipeline",
                    component = "orchestrator",
                    op = "delete",
                    document_id = %id,
                    source_ref = %source_ref,
                    "Blob removed"
                );
            }
            Ok(false) => {
                warn!(
                    subsystem = "pipeline",
                    component = "orchestrator",
                    op = "delete",
                    document_id = %id,
                    source_ref = %source_ref,
                    "Blob was already absent"
                );
            }
            Err(e) => {
                warn!(
                    subsystem = "pipeline",
                    component = "orchestrator",
                    op = "delete",
                    document_id = %id,
                    source_ref = %source_ref,
                    error = %e,
                    "Blob removal failed, document record already deleted"
                );
            }
        }

        Ok(true)
    }
}
