//! Page providers the pipeline resolves against.
//!
//! Rendering and text extraction live outside this crate; a `PageSource` is
//! the seam where the caller hands over a page's text layer.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::AnchorError;
use crate::layer::{PageViewport, TextLayer};

pub trait PageSource: Send + Sync {
    fn document_id(&self) -> Uuid;

    fn num_pages(&self) -> u32;

    /// Text layer for an in-range page (1-based)
    fn text_layer(&self, page: u32) -> Result<TextLayer, AnchorError>;
}

/// Pre-extracted pages held in memory
#[derive(Debug, Clone)]
pub struct InMemoryDocument {
    id: Uuid,
    num_pages: u32,
    default_viewport: PageViewport,
    layers: HashMap<u32, TextLayer>,
}

impl InMemoryDocument {
    pub fn new(id: Uuid, num_pages: u32, default_viewport: PageViewport) -> Self {
        Self {
            id,
            num_pages,
            default_viewport,
            layers: HashMap::new(),
        }
    }

    pub fn with_layer(mut self, layer: TextLayer) -> Self {
        self.insert_layer(layer);
        self
    }

    /// Add or replace a page. Pages past the current count extend it.
    pub fn insert_layer(&mut self, layer: TextLayer) {
        self.num_pages = self.num_pages.max(layer.page);
        self.layers.insert(layer.page, layer);
    }

    pub fn has_layer(&self, page: u32) -> bool {
        self.layers.contains_key(&page)
    }
}

impl PageSource for InMemoryDocument {
    fn document_id(&self) -> Uuid {
        self.id
    }

    fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// A page that was never extracted has no tokens
    fn text_layer(&self, page: u32) -> Result<TextLayer, AnchorError> {
        Ok(self
            .layers
            .get(&page)
            .cloned()
            .unwrap_or_else(|| TextLayer::new(page, self.default_viewport, Vec::new())))
    }
}

/// Documents keyed by language code (lowercased)
#[derive(Clone, Default)]
pub struct DocumentSet {
    docs: HashMap<String, Arc<dyn PageSource>>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, language: &str, document: Arc<dyn PageSource>) {
        self.docs.insert(language.to_lowercase(), document);
    }

    pub fn with(mut self, language: &str, document: Arc<dyn PageSource>) -> Self {
        self.insert(language, document);
        self
    }

    pub fn get(&self, language: &str) -> Result<&Arc<dyn PageSource>, AnchorError> {
        self.docs
            .get(&language.to_lowercase())
            .ok_or_else(|| AnchorError::UnknownLanguage(language.to_string()))
    }

    pub fn languages(&self) -> Vec<&str> {
        let mut langs: Vec<&str> = self.docs.keys().map(String::as_str).collect();
        langs.sort_unstable();
        langs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl std::fmt::Debug for DocumentSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSet").field("languages", &self.languages()).finish()
    }
}
