//! PDF text-layer extraction adapter.

use std::sync::Arc;

use async_trait::async_trait;

use docdex_core::defaults::{CONFIDENCE_FLOOR, PDF_TEXT_CONFIDENCE};
use docdex_core::{
    BlobStore, Error, Extraction, ExtractionAdapter, MimeClass, PdfTextEngine, Result,
};

/// Adapter for extracting the embedded text layer from PDFs.
///
/// A PDF with a non-empty text layer gets a fixed high confidence: the
/// format carries reliable embedded text, unlike noisy OCR. An empty layer
/// (a scanned PDF with no embedded text) completes with empty text at the
/// floor confidence; it is a valid outcome, not a failure.
pub struct PdfTextAdapter {
    blobs: Arc<dyn BlobStore>,
    engine: Arc<dyn PdfTextEngine>,
}

impl PdfTextAdapter {
    /// Create a new PDF text adapter.
    pub fn new(blobs: Arc<dyn BlobStore>, engine: Arc<dyn PdfTextEngine>) -> Self {
        Self { blobs, engine }
    }
}

#[async_trait]
impl ExtractionAdapter for PdfTextAdapter {
    fn mime_class(&self) -> MimeClass {
        MimeClass::Pdf
    }

    async fn extract(&self, source_ref: &str) -> Result<Extraction> {
        let data = self.blobs.fetch(source_ref).await?;

        // Validate PDF magic bytes (%PDF)
        if data.len() < 4 || &data[0..4] != b"%PDF" {
            return Err(Error::Extraction(format!(
                "source {} is not a valid PDF (missing %PDF header)",
                source_ref
            )));
        }

        let text = self.engine.text_layer(&data).await?;
        if text.trim().is_empty() {
            return Ok(Extraction::new("", CONFIDENCE_FLOOR));
        }
        Ok(Extraction::new(text, PDF_TEXT_CONFIDENCE))
    }

    async fn health_check(&self) -> Result<bool> {
        self.engine.health_check().await
    }

    fn name(&self) -> &str {
        "pdf_text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdex_db::test_fixtures::MemoryBlobStore;

    struct StaticPdfText {
        text: &'static str,
    }

    #[async_trait]
    impl PdfTextEngine for StaticPdfText {
        async fn text_layer(&self, _data: &[u8]) -> Result<String> {
            Ok(self.text.to_string())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn adapter_with(text: &'static str, blobs: Arc<MemoryBlobStore>) -> PdfTextAdapter {
        PdfTextAdapter::new(blobs, Arc::new(StaticPdfText { text }))
    }

    #[tokio::test]
    async fn test_pdf_text_non_empty_layer() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs.put("docs/a.pdf", b"%PDF-1.7 content".to_vec()).await;

        let adapter = adapter_with("embedded text layer", blobs.clone());
        let extraction = adapter.extract("docs/a.pdf").await.unwrap();
        assert_eq!(extraction.text, "embedded text layer");
        assert_eq!(extraction.confidence, PDF_TEXT_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_pdf_text_empty_layer_is_valid_outcome() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs.put("docs/scan.pdf", b"%PDF-1.4 scan".to_vec()).await;

        let adapter = adapter_with("  \n ", blobs.clone());
        let extraction = adapter.extract("docs/scan.pdf").await.unwrap();
        assert_eq!(extraction.text, "");
        assert_eq!(extraction.confidence, CONFIDENCE_FLOOR);
    }

    #[tokio::test]
    async fn test_pdf_text_rejects_bad_magic() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs.put("docs/bad.pdf", b"not a pdf at all".to_vec()).await;

        let adapter = adapter_with("whatever", blobs.clone());
        let err = adapter.extract("docs/bad.pdf").await.unwrap_err();
        match err {
            Error::Extraction(msg) => assert!(msg.contains("not a valid PDF")),
            other => panic!("Expected Extraction error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pdf_text_missing_source_is_storage_error() {
        let adapter = adapter_with("whatever", Arc::new(MemoryBlobStore::new()));
        let err = adapter.extract("docs/missing.pdf").await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn test_pdf_text_identity() {
        let adapter = adapter_with("", Arc::new(MemoryBlobStore::new()));
        assert_eq!(adapter.mime_class(), MimeClass::Pdf);
        assert_eq!(adapter.name(), "pdf_text");
    }
}
