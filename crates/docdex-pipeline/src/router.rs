//! Extraction adapter registry keyed by mime class.

use std::collections::HashMap;
use std::sync::Arc;

use docdex_core::{ExtractionAdapter, MimeClass};

/// Registry mapping mime classes to their adapter implementations.
///
/// A mime class with no registered adapter cannot be extracted; the worker
/// records such documents as failed with an "unsupported format" detail.
pub struct ExtractionRouter {
    adapters: HashMap<MimeClass, Arc<dyn ExtractionAdapter>>,
}

impl ExtractionRouter {
    /// Create an empty router.
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Register an adapter. Replaces any existing adapter for the same
    /// mime class.
    pub fn register(&mut self, adapter: Arc<dyn ExtractionAdapter>) {
        self.adapters.insert(adapter.mime_class(), adapter);
    }

    /// Look up the adapter for a mime class.
    pub fn adapter_for(&self, mime_class: MimeClass) -> Option<Arc<dyn ExtractionAdapter>> {
        self.adapters.get(&mime_class).cloned()
    }

    /// Check if an adapter is registered for the given mime class.
    pub fn has_adapter(&self, mime_class: MimeClass) -> bool {
        self.adapters.contains_key(&mime_class)
    }

    /// List all mime classes that have registered adapters.
    pub fn registered_classes(&self) -> Vec<MimeClass> {
        self.adapters.keys().copied().collect()
    }

    /// Run health checks on all registered adapters.
    pub async fn health_check_all(&self) -> HashMap<MimeClass, bool> {
        let mut results = HashMap::new();
        for (mime_class, adapter) in &self.adapters {
            let healthy = adapter.health_check().await.unwrap_or(false);
            results.insert(*mime_class, healthy);
        }
        results
    }
}

impl Default for ExtractionRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docdex_core::{Extraction, Result};

    struct FixedAdapter {
        mime_class: MimeClass,
    }

    #[async_trait]
    impl ExtractionAdapter for FixedAdapter {
        fn mime_class(&self) -> MimeClass {
            self.mime_class
        }

        async fn extract(&self, _source_ref: &str) -> Result<Extraction> {
            Ok(Extraction::new("fixed", 80.0))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_router_new_is_empty() {
        let router = ExtractionRouter::new();
        assert!(router.registered_classes().is_empty());
        assert!(!router.has_adapter(MimeClass::Image));
        assert!(router.adapter_for(MimeClass::Pdf).is_none());
    }

    #[test]
    fn test_router_register_and_lookup() {
        let mut router = ExtractionRouter::new();
        router.register(Arc::new(FixedAdapter {
            mime_class: MimeClass::Image,
        }));

        assert!(router.has_adapter(MimeClass::Image));
        assert!(!router.has_adapter(MimeClass::Pdf));
        assert_eq!(router.registered_classes(), vec![MimeClass::Image]);
        assert!(router.adapter_for(MimeClass::Image).is_some());
    }

    #[test]
    fn test_router_register_replaces() {
        let mut router = ExtractionRouter::new();
        router.register(Arc::new(FixedAdapter {
            mime_class: MimeClass::Pdf,
        }));
        router.register(Arc::new(FixedAdapter {
            mime_class: MimeClass::Pdf,
        }));
        assert_eq!(router.registered_classes().len(), 1);
    }

    #[tokio::test]
    async fn test_router_health_check_all() {
        let mut router = ExtractionRouter::new();
        router.register(Arc::new(FixedAdapter {
            mime_class: MimeClass::Image,
        }));

        let results = router.health_check_all().await;
        assert_eq!(results.len(), 1);
        assert!(results[&MimeClass::Image]);
    }
}
