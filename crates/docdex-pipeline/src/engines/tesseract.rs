//! Tesseract OCR engine — shells out to the `tesseract` binary.

use std::io::Write;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;

use docdex_core::defaults::{EXTRACTION_CMD_TIMEOUT_SECS, OCR_LANGUAGE};
use docdex_core::{Error, Extraction, OcrEngine, Result};

use super::run_cmd_with_timeout;

/// OCR engine backed by the Tesseract CLI.
///
/// Text comes from a plain recognition pass; confidence is the mean word
/// confidence parsed from a second pass in TSV output mode. A failed TSV
/// pass degrades to the floor confidence rather than failing the document.
pub struct TesseractOcr {
    language: String,
    cmd_timeout_secs: u64,
}

impl TesseractOcr {
    /// Create a new engine with the default language.
    pub fn new() -> Self {
        Self {
            language: OCR_LANGUAGE.to_string(),
            cmd_timeout_secs: EXTRACTION_CMD_TIMEOUT_SECS,
        }
    }

    /// Create an engine from environment variables.
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `DOCDEX_OCR_LANGUAGE` | `eng` | Tesseract language code |
    pub fn from_env() -> Self {
        let language = std::env::var("DOCDEX_OCR_LANGUAGE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| OCR_LANGUAGE.to_string());
        Self {
            language,
            cmd_timeout_secs: EXTRACTION_CMD_TIMEOUT_SECS,
        }
    }

    /// Set the recognition language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    fn temp_image(data: &[u8]) -> Result<NamedTempFile> {
        let mut tmpfile = NamedTempFile::new()
            .map_err(|e| Error::Extraction(format!("failed to create temp file: {}", e)))?;
        tmpfile
            .write_all(data)
            .map_err(|e| Error::Extraction(format!("failed to write temp file: {}", e)))?;
        Ok(tmpfile)
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean word confidence from Tesseract TSV output.
///
/// TSV columns: level, page_num, block_num, par_num, line_num, word_num,
/// left, top, width, height, conf, text. Rows with conf `-1` are layout
/// nodes, not words, and are skipped.
fn mean_word_confidence(tsv: &str) -> f32 {
    let mut sum = 0f64;
    let mut count = 0u32;

    for line in tsv.lines().skip(1) {
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }
        if let Ok(conf) = cols[10].parse::<f32>() {
            if conf >= 0.0 {
                sum += conf as f64;
                count += 1;
            }
        }
    }

    if count == 0 {
        0.0
    } else {
        (sum / count as f64) as f32
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, data: &[u8]) -> Result<Extraction> {
        let tmpfile = Self::temp_image(data)?;
        let tmp_path = tmpfile.path().to_string_lossy().to_string();

        let text = run_cmd_with_timeout(
            Command::new("tesseract")
                .arg(&tmp_path)
                .arg("stdout")
                .args(["-l", &self.language]),
            self.cmd_timeout_secs,
        )
        .await?;

        let confidence = match run_cmd_with_timeout(
            Command::new("tesseract")
                .arg(&tmp_path)
                .arg("stdout")
                .args(["-l", &self.language, "tsv"]),
            self.cmd_timeout_secs,
        )
        .await
        {
            Ok(tsv) => mean_word_confidence(&tsv),
            Err(e) => {
                tracing::warn!(
                    subsystem = "pipeline",
                    component = "tesseract",
                    error = %e,
                    "TSV confidence pass failed, recording floor confidence"
                );
                0.0
            }
        };

        Ok(Extraction::new(text, confidence))
    }

    async fn health_check(&self) -> Result<bool> {
        match Command::new("tesseract").arg("--version").output().await {
            Ok(output) => Ok(output.status.success()),
            Err(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_word_confidence_parses_tsv() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
                   1\t1\t0\t0\t0\t0\t0\t0\t100\t100\t-1\t\n\
                   5\t1\t1\t1\t1\t1\t10\t10\t30\t10\t90\thello\n\
                   5\t1\t1\t1\t1\t2\t50\t10\t30\t10\t70\tworld\n";
        let conf = mean_word_confidence(tsv);
        assert!((conf - 80.0).abs() < 0.001);
    }

    #[test]
    fn test_mean_word_confidence_skips_layout_rows() {
        let tsv = "header\n1\t1\t0\t0\t0\t0\t0\t0\t100\t100\t-1\t\n";
        assert_eq!(mean_word_confidence(tsv), 0.0);
    }

    #[test]
    fn test_mean_word_confidence_empty() {
        assert_eq!(mean_word_confidence(""), 0.0);
    }

    #[test]
    fn test_with_language() {
        let engine = TesseractOcr::new().with_language("deu");
        assert_eq!(engine.language, "deu");
    }

    #[tokio::test]
    async fn test_health_check_does_not_error() {
        // Passes whether or not tesseract is installed
        let engine = TesseractOcr::new();
        assert!(engine.health_check().await.is_ok());
    }
}
