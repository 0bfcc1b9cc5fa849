//! In-memory test fixtures.
//!
//! Note: Always compiled so dependent crates' tests can exercise the full
//! pipeline against the `DocumentStore`/`DocumentSearch`/`BlobStore`
//! contracts without a running PostgreSQL instance. The in-memory store
//! replicates the Postgres implementation's transition semantics: claims
//! only move eligible rows, terminal transitions require `processing`, and
//! the search index is derived together with the extracted text.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use docdex_core::defaults;
use docdex_core::{
    new_v7, BlobStore, CreateDocumentRequest, Document, DocumentSearch, DocumentStatus,
    DocumentStore, Error, ListRequest, ListResponse, OwnerStats, Result, SearchHit, SearchRequest,
    SearchResponse,
};

use crate::index::{index_tokens, query_tokens};

struct StoredDocument {
    document: Document,
    tokens: Option<Vec<String>>,
}

/// In-memory `DocumentStore` + `DocumentSearch` implementation.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<Uuid, StoredDocument>>,
    fail_writes: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Simulate record-store unavailability: while set, batch creation and
    /// the terminal transitions return a database error and leave state
    /// untouched. Claims still succeed, so persistence failures at the end
    /// of the pipeline can be exercised in isolation.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn write_guard(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    /// Direct snapshot of a document regardless of owner, for assertions.
    pub async fn snapshot(&self, id: Uuid) -> Option<Document> {
        self.documents
            .read()
            .await
            .get(&id)
            .map(|s| s.document.clone())
    }

    fn snippet(text: &str) -> String {
        text.chars().take(defaults::SNIPPET_LENGTH).collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create_batch(&self, batch: Vec<CreateDocumentRequest>) -> Result<Vec<Document>> {
        if batch.is_empty() {
            return Err(Error::InvalidInput("empty document batch".to_string()));
        }
        self.write_guard()?;

        let now = Utc::now();
        let mut documents = self.documents.write().await;
        let mut created = Vec::with_capacity(batch.len());

        for req in batch {
            let document = Document {
                id: new_v7(),
                owner_id: req.owner_id,
                source_ref: req.source_ref,
                file_name: req.file_name,
                mime_class: req.mime_class,
                byte_size: req.byte_size,
                status: DocumentStatus::Pending,
                extracted_text: None,
                extraction_confidence: None,
                error_detail: None,
                retry_count: 0,
                created_at: now,
                processing_started_at: None,
                processing_completed_at: None,
            };
            documents.insert(
                document.id,
                StoredDocument {
                    document: document.clone(),
                    tokens: None,
                },
            );
            created.push(document);
        }

        Ok(created)
    }

    async fn claim_for_processing(&self, id: Uuid, max_retries: i32) -> Result<Option<Document>> {
        let mut documents = self.documents.write().await;
        let Some(stored) = documents.get_mut(&id) else {
            return Ok(None);
        };

        let eligible = match stored.document.status {
            DocumentStatus::Pending => true,
            DocumentStatus::Failed => stored.document.retry_count < max_retries,
            _ => false,
        };
        if !eligible {
            return Ok(None);
        }

        stored.document.status = DocumentStatus::Processing;
        stored.document.processing_started_at = Some(Utc::now());
        stored.document.processing_completed_at = None;
        Ok(Some(stored.document.clone()))
    }

    async fn complete_extraction(&self, id: Uuid, text: &str, confidence: f32) -> Result<()> {
        self.write_guard()?;

        let mut documents = self.documents.write().await;
        let Some(stored) = documents.get_mut(&id) else {
            return Err(Error::DocumentNotFound(id));
        };
        if stored.document.status != DocumentStatus::Processing {
            return Err(Error::Internal(format!(
                "completion for document {} found it outside processing",
                id
            )));
        }

        stored.document.status = DocumentStatus::Completed;
        stored.document.extracted_text = Some(text.to_string());
        stored.document.extraction_confidence = Some(confidence);
        stored.document.error_detail = None;
        stored.document.processing_completed_at = Some(Utc::now());
        stored.tokens = Some(index_tokens(text, &stored.document.file_name));
        Ok(())
    }

    async fn fail_extraction(&self, id: Uuid, error_detail: &str) -> Result<()> {
        self.write_guard()?;

        let mut documents = self.documents.write().await;
        let Some(stored) = documents.get_mut(&id) else {
            return Err(Error::DocumentNotFound(id));
        };
        if stored.document.status != DocumentStatus::Processing {
            return Err(Error::Internal(format!(
                "failure for document {} found it outside processing",
                id
            )));
        }

        stored.document.status = DocumentStatus::Failed;
        stored.document.error_detail = Some(error_detail.to_string());
        stored.document.retry_count += 1;
        stored.document.processing_completed_at = Some(Utc::now());
        Ok(())
    }

    async fn fetch(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(&id)
            .filter(|s| s.document.owner_id == owner_id)
            .map(|s| s.document.clone()))
    }

    async fn list(&self, owner_id: Uuid, req: ListRequest) -> Result<ListResponse> {
        let limit = req
            .limit
            .unwrap_or(defaults::PAGE_LIMIT)
            .clamp(1, defaults::PAGE_LIMIT_MAX) as usize;
        let offset = req.offset.unwrap_or(defaults::PAGE_OFFSET).max(0) as usize;

        let documents = self.documents.read().await;
        let mut matching: Vec<&Document> = documents
            .values()
            .map(|s| &s.document)
            .filter(|d| d.owner_id == owner_id)
            .filter(|d| req.status.map_or(true, |status| d.status == status))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let documents = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|d| d.summary())
            .collect();

        Ok(ListResponse { documents, total })
    }

    async fn stats_for(&self, owner_id: Uuid) -> Result<OwnerStats> {
        let documents = self.documents.read().await;
        let mut stats = OwnerStats::default();

        for stored in documents.values() {
            let doc = &stored.document;
            if doc.owner_id != owner_id {
                continue;
            }
            stats.total += 1;
            stats.total_bytes += doc.byte_size;
            match doc.status {
                DocumentStatus::Pending => stats.pending += 1,
                DocumentStatus::Processing => stats.processing += 1,
                DocumentStatus::Completed => stats.completed += 1,
                DocumentStatus::Failed => stats.failed += 1,
            }
        }

        Ok(stats)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<Option<String>> {
        let mut documents = self.documents.write().await;
        let owned = documents
            .get(&id)
            .map(|s| s.document.owner_id == owner_id)
            .unwrap_or(false);
        if !owned {
            return Ok(None);
        }
        Ok(documents.remove(&id).map(|s| s.document.source_ref))
    }

    async fn reset_stale(&self, stale_after: Duration) -> Result<u64> {
        let cutoff = Utc::now() - stale_after;
        let mut documents = self.documents.write().await;
        let mut reset = 0u64;

        for stored in documents.values_mut() {
            let doc = &mut stored.document;
            if doc.status == DocumentStatus::Processing
                && doc.processing_started_at.is_some_and(|t| t < cutoff)
            {
                doc.status = DocumentStatus::Pending;
                doc.processing_started_at = None;
                reset += 1;
            }
        }

        Ok(reset)
    }
}

#[async_trait]
impl DocumentSearch for MemoryDocumentStore {
    async fn search(&self, owner_id: Uuid, req: SearchRequest) -> Result<SearchResponse> {
        let limit = req
            .limit
            .unwrap_or(defaults::SEARCH_PAGE_LIMIT)
            .clamp(1, defaults::PAGE_LIMIT_MAX);
        let offset = req.offset.unwrap_or(defaults::PAGE_OFFSET).max(0);

        let terms = query_tokens(req.query.trim());
        if terms.is_empty() {
            return Ok(SearchResponse::empty(limit, offset));
        }

        let documents = self.documents.read().await;
        let mut scored: Vec<(f32, &Document)> = Vec::new();

        for stored in documents.values() {
            let doc = &stored.document;
            if doc.owner_id != owner_id || doc.status != DocumentStatus::Completed {
                continue;
            }
            if req.created_after.is_some_and(|t| doc.created_at < t)
                || req.created_before.is_some_and(|t| doc.created_at > t)
                || req.mime_class.is_some_and(|c| doc.mime_class != c)
            {
                continue;
            }
            let Some(tokens) = &stored.tokens else {
                continue;
            };

            // AND semantics with occurrence-count scoring, mirroring
            // plainto_tsquery: every term must appear somewhere.
            let mut score = 0usize;
            let mut all_present = true;
            for term in &terms {
                let occurrences = tokens.iter().filter(|t| *t == term).count();
                if occurrences == 0 {
                    all_present = false;
                    break;
                }
                score += occurrences;
            }
            if all_present {
                scored.push((score as f32, doc));
            }
        }

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.1.created_at.cmp(&a.1.created_at))
        });

        let total = scored.len() as i64;
        let hits = scored
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|(score, doc)| SearchHit {
                id: doc.id,
                file_name: doc.file_name.clone(),
                mime_class: doc.mime_class,
                byte_size: doc.byte_size,
                created_at: doc.created_at,
                score,
                snippet: Self::snippet(doc.extracted_text.as_deref().unwrap_or("")),
            })
            .collect();

        Ok(SearchResponse {
            hits,
            total,
            limit,
            offset,
        })
    }
}

/// In-memory `BlobStore` implementation.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a blob under an explicit locator.
    pub async fn put(&self, source_ref: &str, data: Vec<u8>) {
        self.blobs.write().await.insert(source_ref.to_string(), data);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, data: &[u8], owner_id: Uuid, suggested_name: &str) -> Result<String> {
        let source_ref = format!("mem/{}/{}-{}", owner_id, new_v7(), suggested_name);
        self.blobs
            .write()
            .await
            .insert(source_ref.clone(), data.to_vec());
        Ok(source_ref)
    }

    async fn fetch(&self, source_ref: &str) -> Result<Vec<u8>> {
        self.blobs
            .read()
            .await
            .get(source_ref)
            .cloned()
            .ok_or_else(|| {
                Error::Storage(format!("failed to fetch source {}: not found", source_ref))
            })
    }

    async fn delete(&self, source_ref: &str) -> Result<bool> {
        Ok(self.blobs.write().await.remove(source_ref).is_some())
    }
}
