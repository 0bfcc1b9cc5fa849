//! Concrete extraction engines shelling out to system binaries.

use tokio::process::Command;

use docdex_core::{Error, Result};

pub mod pdftotext;
pub mod tesseract;

pub use pdftotext::PopplerPdfText;
pub use tesseract::TesseractOcr;

/// Run a command with a timeout, returning stdout as a string.
pub(crate) async fn run_cmd_with_timeout(cmd: &mut Command, timeout_secs: u64) -> Result<String> {
    let output = tokio::time::timeout(std::time::Duration::from_secs(timeout_secs), cmd.output())
        .await
        .map_err(|_| {
            Error::Extraction(format!(
                "external command timed out after {}s",
                timeout_secs
            ))
        })?
        .map_err(|e| Error::Extraction(format!("failed to execute command: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Extraction(format!(
            "command failed (exit {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_cmd_missing_binary() {
        let mut cmd = Command::new("definitely-not-a-real-binary-xyz");
        let err = run_cmd_with_timeout(&mut cmd, 5).await.unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[tokio::test]
    async fn test_run_cmd_captures_stdout() {
        let mut cmd = Command::new("echo");
        cmd.arg("hello");
        let out = run_cmd_with_timeout(&mut cmd, 5).await.unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_cmd_nonzero_exit_is_error() {
        let mut cmd = Command::new("false");
        let err = run_cmd_with_timeout(&mut cmd, 5).await.unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
