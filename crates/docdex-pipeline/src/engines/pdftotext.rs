//! PDF text-layer engine — shells out to `pdftotext` (poppler-utils).

use std::io::Write;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;

use docdex_core::defaults::EXTRACTION_CMD_TIMEOUT_SECS;
use docdex_core::{Error, PdfTextEngine, Result};

use super::run_cmd_with_timeout;

/// Text-layer reader backed by the `pdftotext` CLI.
pub struct PopplerPdfText {
    cmd_timeout_secs: u64,
}

impl PopplerPdfText {
    /// Create a new engine with the default command timeout.
    pub fn new() -> Self {
        Self {
            cmd_timeout_secs: EXTRACTION_CMD_TIMEOUT_SECS,
        }
    }
}

impl Default for PopplerPdfText {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PdfTextEngine for PopplerPdfText {
    async fn text_layer(&self, data: &[u8]) -> Result<String> {
        // pdftotext reads from a file path
        let mut tmpfile = NamedTempFile::new()
            .map_err(|e| Error::Extraction(format!("failed to create temp file: {}", e)))?;
        tmpfile
            .write_all(data)
            .map_err(|e| Error::Extraction(format!("failed to write temp file: {}", e)))?;
        let tmp_path = tmpfile.path().to_string_lossy().to_string();

        run_cmd_with_timeout(
            Command::new("pdftotext").arg(&tmp_path).arg("-"),
            self.cmd_timeout_secs,
        )
        .await
    }

    async fn health_check(&self) -> Result<bool> {
        match Command::new("pdftotext").arg("-v").output().await {
            Ok(output) => {
                // pdftotext -v prints version to stderr and exits with 0 or 99
                // depending on the version. Both indicate the binary exists.
                Ok(output.status.success() || output.status.code() == Some(99))
            }
            Err(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_does_not_error() {
        // Passes whether or not pdftotext is installed
        let engine = PopplerPdfText::new();
        assert!(engine.health_check().await.is_ok());
    }
}
