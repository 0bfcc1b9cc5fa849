//! # docdex-core
//!
//! Core types, traits, and abstractions for the docdex document ingestion
//! library.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other docdex crates depend on: the `Document` record model and its
//! lifecycle states, the record-store and search contracts, the blob-store and
//! extraction-engine seams, the shared error type, centralized defaults, and
//! the structured logging schema.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
