//! Structured logging schema and field name constants for docdex.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention (record store unavailable) |
//! | WARN  | Recoverable issue, outcome recorded as document state (extraction failure) |
//! | INFO  | Lifecycle events (worker start/stop), operation completions |
//! | DEBUG | Decision points, no-op claims, config choices |
//! | TRACE | Per-item iteration, high-volume data (search hits) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "db", "pipeline", "storage", "search"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "worker", "orchestrator", "pool", "image_ocr"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "ingest_batch", "claim", "extract", "search"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Document UUID being operated on.
pub const DOCUMENT_ID: &str = "document_id";

/// Owner UUID scoping an operation.
pub const OWNER_ID: &str = "owner_id";

/// Coarse mime class of a document.
pub const MIME_CLASS: &str = "mime_class";

/// Blob locator being fetched or deleted.
pub const SOURCE_REF: &str = "source_ref";

/// Search query text.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search or listing.
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of extracted text.
pub const TEXT_LEN: &str = "text_len";

/// Extraction confidence score.
pub const CONFIDENCE: &str = "confidence";

/// Retry attempts consumed by a document.
pub const RETRY_COUNT: &str = "retry_count";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Initialize the process-wide tracing subscriber.
///
/// Filter comes from `RUST_LOG`, defaulting to `info`. Safe to call more
/// than once; later calls are no-ops.
pub fn init() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
