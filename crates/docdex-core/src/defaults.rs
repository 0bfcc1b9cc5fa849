//! Centralized default constants for docdex.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates reference these constants instead of defining their own magic
//! numbers. When adding new constants, place them in the appropriate section
//! and document the rationale for the chosen value.

// =============================================================================
// RETRY / WORKER
// =============================================================================

/// Maximum automatic retry budget for a failed extraction. Once a document
/// has failed this many times it is terminal at `failed`; further
/// re-dispatches are no-ops. Overridable via `DOCDEX_MAX_RETRIES`.
pub const MAX_RETRIES: i32 = 3;

/// Maximum documents extracted concurrently by one worker.
pub const WORKER_MAX_CONCURRENT: usize = 4;

/// Wall-clock ceiling for a single document's extraction (fetch + engine).
pub const EXTRACTION_TIMEOUT_SECS: u64 = 300;

/// Per-invocation timeout for external extraction commands (tesseract,
/// pdftotext).
pub const EXTRACTION_CMD_TIMEOUT_SECS: u64 = 120;

/// Capacity of the pipeline event broadcast channel. Slow subscribers lag
/// rather than block the worker.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// CONFIDENCE
// =============================================================================

/// Lower bound of the extraction confidence range; also the value recorded
/// when a PDF text layer is empty.
pub const CONFIDENCE_FLOOR: f32 = 0.0;

/// Upper bound of the extraction confidence range.
pub const CONFIDENCE_MAX: f32 = 100.0;

/// Fixed confidence for a non-empty PDF text layer. The format carries a
/// reliable embedded text layer, unlike noisy OCR output.
pub const PDF_TEXT_CONFIDENCE: f32 = 95.0;

// =============================================================================
// UPLOAD LIMITS
// =============================================================================

/// Maximum accepted file size in bytes (50 MiB).
pub const MAX_FILE_BYTES: i64 = 50 * 1024 * 1024;

/// Maximum files accepted in one ingestion batch.
pub const MAX_BATCH_FILES: usize = 10;

// =============================================================================
// ERROR DETAIL
// =============================================================================

/// Maximum characters persisted as a document's `error_detail`.
pub const ERROR_DETAIL_MAX_CHARS: usize = 500;

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for document listings.
pub const PAGE_LIMIT: i64 = 50;

/// Default page size for search results.
pub const SEARCH_PAGE_LIMIT: i64 = 10;

/// Hard ceiling on any requested page size.
pub const PAGE_LIMIT_MAX: i64 = 100;

/// Default page offset.
pub const PAGE_OFFSET: i64 = 0;

// =============================================================================
// SNIPPET
// =============================================================================

/// Snippet length in characters for search results.
pub const SNIPPET_LENGTH: usize = 150;

// =============================================================================
// OCR
// =============================================================================

/// Default OCR language. Overridable via `DOCDEX_OCR_LANGUAGE`.
pub const OCR_LANGUAGE: &str = "eng";

// =============================================================================
// STALE SWEEP
// =============================================================================

/// Age after which a `processing` document is considered stuck and eligible
/// for the operator `reset_stale` sweep.
pub const STALE_PROCESSING_SECS: i64 = 3600;
