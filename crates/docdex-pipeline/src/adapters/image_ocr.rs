//! Image OCR extraction adapter.

use std::sync::Arc;

use async_trait::async_trait;

use docdex_core::{BlobStore, Error, Extraction, ExtractionAdapter, MimeClass, OcrEngine, Result};

/// Adapter for extracting text from scanned images via an OCR engine.
///
/// Fetches the source bytes itself and hands them to the injected engine;
/// it never touches the document record store. Fetch failures and engine
/// failures share one error channel with distinct messages.
pub struct ImageOcrAdapter {
    blobs: Arc<dyn BlobStore>,
    engine: Arc<dyn OcrEngine>,
}

impl ImageOcrAdapter {
    /// Create a new image OCR adapter.
    pub fn new(blobs: Arc<dyn BlobStore>, engine: Arc<dyn OcrEngine>) -> Self {
        Self { blobs, engine }
    }
}

#[async_trait]
impl ExtractionAdapter for ImageOcrAdapter {
    fn mime_class(&self) -> MimeClass {
        MimeClass::Image
    }

    async fn extract(&self, source_ref: &str) -> Result<Extraction> {
        let data = self.blobs.fetch(source_ref).await?;
        if data.is_empty() {
            return Err(Error::Extraction(format!(
                "empty source data for {}",
                source_ref
            )));
        }

        let outcome = self.engine.recognize(&data).await?;
        Ok(Extraction::new(outcome.text, outcome.confidence))
    }

    async fn health_check(&self) -> Result<bool> {
        self.engine.health_check().await
    }

    fn name(&self) -> &str {
        "image_ocr"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdex_db::test_fixtures::MemoryBlobStore;

    struct StaticOcr {
        text: &'static str,
        confidence: f32,
    }

    #[async_trait]
    impl OcrEngine for StaticOcr {
        async fn recognize(&self, _data: &[u8]) -> Result<Extraction> {
            Ok(Extraction::new(self.text, self.confidence))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    #[test]
    fn test_image_ocr_identity() {
        let adapter = ImageOcrAdapter::new(
            Arc::new(MemoryBlobStore::new()),
            Arc::new(StaticOcr {
                text: "",
                confidence: 0.0,
            }),
        );
        assert_eq!(adapter.mime_class(), MimeClass::Image);
        assert_eq!(adapter.name(), "image_ocr");
    }

    #[tokio::test]
    async fn test_image_ocr_extracts() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs.put("scans/a.png", b"image bytes".to_vec()).await;

        let adapter = ImageOcrAdapter::new(
            blobs,
            Arc::new(StaticOcr {
                text: "recognized text",
                confidence: 87.5,
            }),
        );

        let extraction = adapter.extract("scans/a.png").await.unwrap();
        assert_eq!(extraction.text, "recognized text");
        assert_eq!(extraction.confidence, 87.5);
    }

    #[tokio::test]
    async fn test_image_ocr_clamps_engine_confidence() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs.put("scans/a.png", b"image bytes".to_vec()).await;

        let adapter = ImageOcrAdapter::new(
            blobs,
            Arc::new(StaticOcr {
                text: "text",
                confidence: 250.0,
            }),
        );

        let extraction = adapter.extract("scans/a.png").await.unwrap();
        assert_eq!(extraction.confidence, 100.0);
    }

    #[tokio::test]
    async fn test_image_ocr_missing_source_is_storage_error() {
        let adapter = ImageOcrAdapter::new(
            Arc::new(MemoryBlobStore::new()),
            Arc::new(StaticOcr {
                text: "text",
                confidence: 50.0,
            }),
        );

        let err = adapter.extract("scans/missing.png").await.unwrap_err();
        match err {
            Error::Storage(msg) => assert!(msg.contains("failed to fetch source")),
            other => panic!("Expected Storage error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_image_ocr_empty_source_is_extraction_error() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs.put("scans/empty.png", Vec::new()).await;

        let adapter = ImageOcrAdapter::new(
            blobs,
            Arc::new(StaticOcr {
                text: "text",
                confidence: 50.0,
            }),
        );

        let err = adapter.extract("scans/empty.png").await.unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
