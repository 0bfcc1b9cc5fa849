//! Read-only status, stats, and search queries over the record store.
//!
//! Every operation is scoped to the requesting owner. Ownership and
//! existence fold into a single not-found outcome so existence never leaks
//! across owners. These reads run independently of the pipeline at any
//! time; they never mutate a record.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use docdex_core::defaults;
use docdex_core::{
    DocumentSearch, DocumentStore, ListRequest, ListResponse, OwnerStats, Result, SearchRequest,
    SearchResponse, StatusSnapshot,
};

/// Owner-scoped query service over the document record store.
pub struct DocumentQueries {
    store: Arc<dyn DocumentStore>,
    search: Arc<dyn DocumentSearch>,
}

impl DocumentQueries {
    /// Create a new query service.
    pub fn new(store: Arc<dyn DocumentStore>, search: Arc<dyn DocumentSearch>) -> Self {
        Self { store, search }
    }

    /// Current status snapshot for one document.
    ///
    /// `None` covers both "does not exist" and "belongs to someone else".
    pub async fn status(&self, owner_id: Uuid, id: Uuid) -> Result<Option<StatusSnapshot>> {
        Ok(self
            .store
            .fetch(owner_id, id)
            .await?
            .map(|document| document.status_snapshot()))
    }

    /// Aggregate per-status counts and total byte size for one owner.
    pub async fn stats(&self, owner_id: Uuid) -> Result<OwnerStats> {
        self.store.stats_for(owner_id).await
    }

    /// Ranked full-text search over the owner's completed documents.
    ///
    /// A blank query returns an empty page without consulting the backend;
    /// listing everything is `list`, not an empty search.
    pub async fn search(&self, owner_id: Uuid, req: SearchRequest) -> Result<SearchResponse> {
        if req.query.trim().is_empty() {
            let limit = req
                .limit
                .unwrap_or(defaults::SEARCH_PAGE_LIMIT)
                .clamp(1, defaults::PAGE_LIMIT_MAX);
            let offset = req.offset.unwrap_or(defaults::PAGE_OFFSET).max(0);
            debug!(
                subsystem = "pipeline",
                component = "queries",
                op = "search",
                owner_id = %owner_id,
                "Blank query answered with empty page"
            );
            return Ok(SearchResponse::empty(limit, offset));
        }
        self.search.search(owner_id, req).await
    }

    /// List the owner's documents, newest first.
    pub async fn list(&self, owner_id: Uuid, req: ListRequest) -> Result<ListResponse> {
        self.store.list(owner_id, req).await
    }
}
