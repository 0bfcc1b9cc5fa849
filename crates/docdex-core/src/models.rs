//! Core data model: documents, lifecycle states, and query types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;

/// Generate a new UUIDv7 identifier.
///
/// UUIDv7 embeds a Unix millisecond timestamp in the high bits, so document
/// ids sort in creation order.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Lifecycle state of a document in the ingestion pipeline.
///
/// Transitions are monotonic (`pending → processing → completed | failed`)
/// except for the retry re-entry `failed → processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    /// Whether this status marks the end of a processing attempt.
    pub fn is_settled(&self) -> bool {
        matches!(self, DocumentStatus::Completed | DocumentStatus::Failed)
    }
}

/// Coarse file-type bucket driving extraction-adapter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MimeClass {
    Image,
    Pdf,
    Other,
}

impl MimeClass {
    /// Classify a declared content type into a mime class.
    pub fn from_content_type(content_type: &str) -> Self {
        let ct = content_type.trim().to_ascii_lowercase();
        if ct.starts_with("image/") {
            MimeClass::Image
        } else if ct == "application/pdf" || ct == "application/x-pdf" {
            MimeClass::Pdf
        } else {
            MimeClass::Other
        }
    }

    /// Classify from a declared content type and an optional leading byte
    /// sample. Magic bytes win over the declared type when they disagree,
    /// since client-supplied content types are untrusted.
    pub fn classify(content_type: &str, head: Option<&[u8]>) -> Self {
        if let Some(bytes) = head {
            if let Some(kind) = infer::get(bytes) {
                let detected = Self::from_content_type(kind.mime_type());
                if detected != MimeClass::Other {
                    return detected;
                }
            }
        }
        Self::from_content_type(content_type)
    }
}

impl std::fmt::Display for MimeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MimeClass::Image => "image",
            MimeClass::Pdf => "pdf",
            MimeClass::Other => "other",
        };
        write!(f, "{}", s)
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

/// A stored document and its ingestion state.
///
/// `extracted_text` and the derived search index are written together in the
/// completion transaction; neither exists without the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Opaque locator of the stored original bytes.
    pub source_ref: String,
    pub file_name: String,
    pub mime_class: MimeClass,
    pub byte_size: i64,
    pub status: DocumentStatus,
    /// Set exactly once on successful extraction, never mutated afterward.
    pub extracted_text: Option<String>,
    /// Extraction confidence in `[0, 100]`, set alongside `extracted_text`.
    pub extraction_confidence: Option<f32>,
    /// Bounded failure cause, present only while `status` is `failed`.
    pub error_detail: Option<String>,
    pub retry_count: i32,
    pub created_at: DateTime<Utc>,
    /// Overwritten on each retry attempt.
    pub processing_started_at: Option<DateTime<Utc>>,
    /// Present iff `status` is `completed` or `failed`.
    pub processing_completed_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Condensed view for list endpoints and batch-creation responses.
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            file_name: self.file_name.clone(),
            mime_class: self.mime_class,
            byte_size: self.byte_size,
            status: self.status,
            created_at: self.created_at,
        }
    }

    /// Condensed view for status polling.
    pub fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.status,
            created_at: self.created_at,
            processing_started_at: self.processing_started_at,
            processing_completed_at: self.processing_completed_at,
            error_detail: self.error_detail.clone(),
            retry_count: self.retry_count,
        }
    }
}

/// Request for creating one document record.
#[derive(Debug, Clone)]
pub struct CreateDocumentRequest {
    pub owner_id: Uuid,
    pub source_ref: String,
    pub file_name: String,
    pub mime_class: MimeClass,
    pub byte_size: i64,
}

/// A file descriptor handed to the ingestion orchestrator.
///
/// The bytes are already persisted in the blob store; `head` is an optional
/// leading sample used for magic-byte classification.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub source_ref: String,
    pub file_name: String,
    pub content_type: String,
    pub byte_size: i64,
    pub head: Option<Vec<u8>>,
}

impl UploadedFile {
    /// The coarse mime class of this upload.
    pub fn mime_class(&self) -> MimeClass {
        MimeClass::classify(&self.content_type, self.head.as_deref())
    }
}

/// Condensed document view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub file_name: String,
    pub mime_class: MimeClass,
    pub byte_size: i64,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
}

/// Point-in-time status view for polling consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    pub processing_started_at: Option<DateTime<Utc>>,
    pub processing_completed_at: Option<DateTime<Utc>>,
    pub error_detail: Option<String>,
    pub retry_count: i32,
}

/// Per-owner aggregate counters, computed at read time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerStats {
    pub total: i64,
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
    pub total_bytes: i64,
}

// =============================================================================
// EXTRACTION
// =============================================================================

/// Output of an extraction adapter: text plus a confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub text: String,
    /// Confidence in `[0, 100]`.
    pub confidence: f32,
}

impl Extraction {
    /// Build an extraction result with the confidence clamped into range.
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence: clamp_confidence(confidence),
        }
    }
}

/// Clamp a confidence score into the valid `[0, 100]` range.
///
/// NaN maps to the floor value so a misbehaving engine cannot poison the
/// stored score.
pub fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        return defaults::CONFIDENCE_FLOOR;
    }
    confidence.clamp(defaults::CONFIDENCE_FLOOR, defaults::CONFIDENCE_MAX)
}

/// Truncate a failure cause to the bounded length persisted as
/// `error_detail`. Truncation is char-boundary safe.
pub fn bounded_detail(detail: &str) -> String {
    let max = defaults::ERROR_DETAIL_MAX_CHARS;
    if detail.chars().count() <= max {
        return detail.to_string();
    }
    let mut out: String = detail.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

// =============================================================================
// QUERIES
// =============================================================================

/// Parameters for a ranked full-text search, scoped to one owner.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    /// Filter: documents created on or after this instant.
    pub created_after: Option<DateTime<Utc>>,
    /// Filter: documents created on or before this instant.
    pub created_before: Option<DateTime<Utc>>,
    /// Filter: restrict to one mime class.
    pub mime_class: Option<MimeClass>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: Uuid,
    pub file_name: String,
    pub mime_class: MimeClass,
    pub byte_size: i64,
    pub created_at: DateTime<Utc>,
    pub score: f32,
    pub snippet: String,
}

/// Ranked, paginated search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    /// Total number of matching documents (not just this page).
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl SearchResponse {
    /// An empty result page, used for blank queries.
    pub fn empty(limit: i64, offset: i64) -> Self {
        Self {
            hits: Vec::new(),
            total: 0,
            limit,
            offset,
        }
    }
}

/// Parameters for listing an owner's documents, newest first.
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    pub status: Option<DocumentStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated listing of an owner's documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub documents: Vec<DocumentSummary>,
    pub total: i64,
}
