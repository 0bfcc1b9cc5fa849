//! Core traits for docdex abstractions.
//!
//! These traits define the seams between the pipeline and its collaborators:
//! the relational record store, the blob store, and the extraction engines.
//! Concrete implementations live in `docdex-db` and `docdex-pipeline`;
//! in-memory test doubles live in `docdex_db::test_fixtures`.

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// DOCUMENT RECORD STORE
// =============================================================================

/// Repository for document records; the single source of truth for
/// lifecycle state.
///
/// Writer discipline: the orchestrator owns initial creation, the extraction
/// worker owns every subsequent mutation (status, timestamps, text,
/// confidence, error detail, retry count). The derived search index is
/// written inside `complete_extraction`, never independently.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a batch of `pending` documents in a single transaction.
    ///
    /// All-or-nothing: a failure leaves no partially created records visible
    /// to any reader.
    async fn create_batch(&self, batch: Vec<CreateDocumentRequest>) -> Result<Vec<Document>>;

    /// Atomically transition a document into `processing`.
    ///
    /// Succeeds only for documents in `pending`, or in `failed` with
    /// `retry_count` below `max_retries`. Sets `processing_started_at` to
    /// now, clears `processing_completed_at`, and returns the claimed row.
    /// Any other state returns `None`, which makes dispatch idempotent: a
    /// double dispatch or a dispatch against a terminal document is a no-op.
    async fn claim_for_processing(&self, id: Uuid, max_retries: i32) -> Result<Option<Document>>;

    /// Record a successful extraction.
    ///
    /// Writes `extracted_text`, `extraction_confidence`, the derived search
    /// index, `status = completed`, and `processing_completed_at` in one
    /// atomic update, so text and index can never diverge. The document must
    /// currently be `processing`.
    async fn complete_extraction(&self, id: Uuid, text: &str, confidence: f32) -> Result<()>;

    /// Record a failed extraction attempt.
    ///
    /// Sets `status = failed`, stores the (already bounded) error detail,
    /// increments `retry_count`, and sets `processing_completed_at`.
    async fn fail_extraction(&self, id: Uuid, error_detail: &str) -> Result<()>;

    /// Fetch a document scoped to its owner.
    ///
    /// Unknown ids and ids belonging to other owners both fold into `None`,
    /// so existence never leaks across owners.
    async fn fetch(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Document>>;

    /// List an owner's documents, newest first, with optional status filter.
    async fn list(&self, owner_id: Uuid, req: ListRequest) -> Result<ListResponse>;

    /// Per-status counts and total byte size for one owner, computed at
    /// read time.
    async fn stats_for(&self, owner_id: Uuid) -> Result<OwnerStats>;

    /// Delete a document row, returning its `source_ref` when a row was
    /// removed. Row deletion is authoritative; blob cleanup happens after
    /// and is best-effort.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<Option<String>>;

    /// Operator sweep: return documents stuck in `processing` longer than
    /// `stale_after` to `pending`. Returns the number of rows reset.
    ///
    /// Never invoked automatically by the pipeline.
    async fn reset_stale(&self, stale_after: Duration) -> Result<u64>;
}

/// Provider for ranked full-text search over an owner's completed documents.
#[async_trait]
pub trait DocumentSearch: Send + Sync {
    /// Search ranked by relevance descending, then recency descending.
    ///
    /// An empty or whitespace-only query returns zero matches; search and
    /// "list all" are distinct operations.
    async fn search(&self, owner_id: Uuid, req: SearchRequest) -> Result<SearchResponse>;
}

// =============================================================================
// BLOB STORE
// =============================================================================

/// Opaque blob store addressed by `source_ref` (URL or key).
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist bytes and return an opaque locator for them.
    async fn store(&self, data: &[u8], owner_id: Uuid, suggested_name: &str) -> Result<String>;

    /// Fetch the bytes behind a locator.
    async fn fetch(&self, source_ref: &str) -> Result<Vec<u8>>;

    /// Best-effort removal. `Ok(false)` means nothing was removed; callers
    /// must not treat that as fatal.
    async fn delete(&self, source_ref: &str) -> Result<bool>;
}

// =============================================================================
// EXTRACTION
// =============================================================================

/// Adapter for one mime class of the extraction pipeline.
///
/// Adapters fetch the source bytes themselves (the blob store is addressed
/// by locator, not pushed in-band) and surface transport failures on the
/// same error channel as engine failures, with distinct messages for
/// operator diagnosis. Adapters never mutate the document record store.
#[async_trait]
pub trait ExtractionAdapter: Send + Sync {
    /// The mime class this adapter handles.
    fn mime_class(&self) -> MimeClass;

    /// Fetch the source bytes and extract text plus confidence.
    async fn extract(&self, source_ref: &str) -> Result<Extraction>;

    /// Check that the adapter's external dependencies are available.
    async fn health_check(&self) -> Result<bool>;

    /// Human-readable name of this adapter.
    fn name(&self) -> &str;
}

/// Black-box OCR engine: image bytes in, text plus confidence out.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Run character recognition over image bytes.
    async fn recognize(&self, data: &[u8]) -> Result<Extraction>;

    /// Check that the engine is usable.
    async fn health_check(&self) -> Result<bool>;
}

/// Black-box PDF text-layer reader: PDF bytes in, text layer out.
///
/// An empty text layer is a valid outcome (a scanned PDF with no embedded
/// text), not an error.
#[async_trait]
pub trait PdfTextEngine: Send + Sync {
    /// Read the embedded text layer of a PDF.
    async fn text_layer(&self, data: &[u8]) -> Result<String>;

    /// Check that the engine is usable.
    async fn health_check(&self) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct NullBlobStore;

    #[async_trait]
    impl BlobStore for NullBlobStore {
        async fn store(&self, _data: &[u8], _owner_id: Uuid, name: &str) -> Result<String> {
            Ok(format!("null/{}", name))
        }

        async fn fetch(&self, source_ref: &str) -> Result<Vec<u8>> {
            Err(crate::Error::Storage(format!("no blob at {}", source_ref)))
        }

        async fn delete(&self, _source_ref: &str) -> Result<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_blob_store_object_safety() {
        let store: Arc<dyn BlobStore> = Arc::new(NullBlobStore);
        let source_ref = store.store(b"data", new_v7(), "a.bin").await.unwrap();
        assert_eq!(source_ref, "null/a.bin");
        assert!(store.fetch(&source_ref).await.is_err());
        assert!(!store.delete(&source_ref).await.unwrap());
    }

    #[test]
    fn test_trait_objects_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}

        assert_send_sync::<dyn DocumentStore>();
        assert_send_sync::<dyn DocumentSearch>();
        assert_send_sync::<dyn BlobStore>();
        assert_send_sync::<dyn ExtractionAdapter>();
        assert_send_sync::<dyn OcrEngine>();
        assert_send_sync::<dyn PdfTextEngine>();
    }
}
