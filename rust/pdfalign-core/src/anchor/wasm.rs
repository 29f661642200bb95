// pdfalign-core/src/anchor/wasm.rs
//
// AnchorCortex: JS-facing anchor resolution.
// Pages arrive as pdf.js text items; the cortex keeps them per language and
// resolves dataset chunks against them.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use uuid::Uuid;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::dataset::{self, DatasetIngest, IngestConfig, LanguageChunk};
use crate::embeddings::{EmbedConfig, EmbeddingResource};
use crate::layer::{PageViewport, RawTextItem, TextLayer, TextToken};

use super::config::AnchorConfig;
use super::pipeline::{AnchorRequest, AnchorResolutionPipeline};
use super::source::{DocumentSet, InMemoryDocument, PageSource};

fn js_err<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Plain objects instead of `Map` for json values and flattened extras
fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_err)
}

fn config_or_default<T: serde::de::DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        Ok(T::default())
    } else {
        serde_wasm_bindgen::from_value(value).map_err(js_err)
    }
}

#[wasm_bindgen]
pub struct AnchorCortex {
    config: AnchorConfig,
    pipeline: Rc<AnchorResolutionPipeline>,
    embeddings: Option<Arc<EmbeddingResource>>,
    documents: HashMap<String, Arc<InMemoryDocument>>,
}

#[wasm_bindgen]
impl AnchorCortex {
    /// `config` is an optional AnchorConfig object
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<AnchorCortex, JsValue> {
        let config: AnchorConfig = config_or_default(config)?;
        Ok(AnchorCortex {
            pipeline: Rc::new(AnchorResolutionPipeline::new(config.clone())),
            config,
            embeddings: None,
            documents: HashMap::new(),
        })
    }

    /// Register (or replace) the document for a language.
    /// Returns the document id, generated when `document_id` is omitted.
    #[wasm_bindgen(js_name = registerDocument)]
    pub fn register_document(
        &mut self,
        language: &str,
        document_id: Option<String>,
        num_pages: u32,
        width: f64,
        height: f64,
    ) -> Result<String, JsValue> {
        let id = match document_id {
            Some(raw) => Uuid::parse_str(&raw).map_err(js_err)?,
            None => Uuid::new_v4(),
        };
        let doc = InMemoryDocument::new(id, num_pages, PageViewport::new(width, height, 1.0));
        self.documents.insert(language.to_lowercase(), Arc::new(doc));
        Ok(id.to_string())
    }

    /// Add a page's pdf.js text items. Returns the number of skipped items.
    #[wasm_bindgen(js_name = addPage)]
    pub fn add_page(
        &mut self,
        language: &str,
        page: u32,
        items: JsValue,
        width: f64,
        height: f64,
        scale: f64,
    ) -> Result<usize, JsValue> {
        let items: Vec<RawTextItem> = serde_wasm_bindgen::from_value(items).map_err(js_err)?;
        let doc = self
            .documents
            .get_mut(&language.to_lowercase())
            .ok_or_else(|| JsValue::from_str(&format!("no document registered for '{}'", language)))?;

        let (layer, skipped) = TextLayer::from_raw_items(page, PageViewport::new(width, height, scale), items);
        Arc::make_mut(doc).insert_layer(layer);
        Ok(skipped)
    }

    /// Attach an ONNX encoder. The model loads on first semantic call.
    #[wasm_bindgen(js_name = loadModel)]
    pub fn load_model(&mut self, model_bytes: Vec<u8>, tokenizer_json: String, config: JsValue) -> Result<(), JsValue> {
        let embed_config: EmbedConfig = config_or_default(config)?;
        let resource = Arc::new(EmbeddingResource::from_onnx_bytes(model_bytes, tokenizer_json, embed_config));
        self.pipeline = Rc::new(AnchorResolutionPipeline::new(self.config.clone()).with_embeddings(Arc::clone(&resource)));
        self.embeddings = Some(resource);
        Ok(())
    }

    #[wasm_bindgen(js_name = isModelLoaded)]
    pub fn is_model_loaded(&self) -> bool {
        self.embeddings.as_ref().map_or(false, |r| r.is_initialized())
    }

    /// Literal resolution of one LanguageChunk. Returns an AnchorResolution.
    #[wasm_bindgen(js_name = resolveLiteral)]
    pub fn resolve_literal(&self, chunk: JsValue) -> Result<JsValue, JsValue> {
        let chunk: LanguageChunk = serde_wasm_bindgen::from_value(chunk).map_err(js_err)?;
        let request = AnchorRequest::try_from(&chunk).map_err(js_err)?;
        let resolution = self
            .pipeline
            .resolve_literal(&request, &self.document_set())
            .map_err(js_err)?;
        to_js(&resolution)
    }

    /// Resolution with the configured strategy. Returns a Promise.
    #[wasm_bindgen(js_name = resolve)]
    pub fn resolve(&self, chunk: JsValue) -> Result<js_sys::Promise, JsValue> {
        let chunk: LanguageChunk = serde_wasm_bindgen::from_value(chunk).map_err(js_err)?;
        let request = AnchorRequest::try_from(&chunk).map_err(js_err)?;
        let pipeline = Rc::clone(&self.pipeline);
        let documents = self.document_set();

        Ok(future_to_promise(async move {
            let resolution = pipeline.resolve(&request, &documents).await.map_err(js_err)?;
            to_js(&resolution)
        }))
    }

    /// Resolve a whole dataset. Returns a Promise of
    /// `{ anchors, alignments, placeholders, failed, skippedAlignments, confidence }`.
    #[wasm_bindgen(js_name = ingestDataset)]
    pub fn ingest_dataset(
        &self,
        chunks_jsonl: String,
        alignments_jsonl: String,
        config: JsValue,
    ) -> Result<js_sys::Promise, JsValue> {
        let ingest = DatasetIngest::new(config_or_default::<IngestConfig>(config)?);
        let pipeline = Rc::clone(&self.pipeline);
        let documents = self.document_set();

        Ok(future_to_promise(async move {
            let chunks = dataset::parse_chunks(&chunks_jsonl);
            let pairs = dataset::parse_alignments(&alignments_jsonl);

            let anchored = ingest.anchor_chunks(&pipeline, &chunks.records, &documents).await;
            let report = ingest.build_alignments(&pairs.records, &anchored.chunk_map);

            let result = serde_json::json!({
                "anchors": anchored.anchors,
                "alignments": report.alignments,
                "placeholders": anchored.placeholders,
                "failed": anchored.failed,
                "skippedLines": chunks.skipped + pairs.skipped,
                "skippedAlignments": report.skipped,
                "confidence": report.confidence,
            });
            to_js(&result)
        }))
    }

    /// Literal match of a quote against raw tokens `{text, x, y, width, height}[]`
    #[wasm_bindgen(js_name = matchQuote)]
    pub fn match_quote(&self, quote: &str, tokens: JsValue) -> Result<JsValue, JsValue> {
        let tokens: Vec<TextToken> = serde_wasm_bindgen::from_value(tokens).map_err(js_err)?;
        to_js(&self.pipeline.locate(quote, &tokens))
    }

    #[wasm_bindgen(js_name = quoteHash)]
    pub fn quote_hash(quote: &str) -> String {
        super::hash::quote_hash(quote)
    }

    #[wasm_bindgen(js_name = parseChunks)]
    pub fn parse_chunks(text: &str) -> Result<JsValue, JsValue> {
        to_js(&dataset::parse_chunks(text))
    }

    #[wasm_bindgen(js_name = parseAlignments)]
    pub fn parse_alignments(text: &str) -> Result<JsValue, JsValue> {
        to_js(&dataset::parse_alignments(text))
    }

    #[wasm_bindgen(js_name = detectLanguages)]
    pub fn detect_languages(chunks_jsonl: &str) -> Result<JsValue, JsValue> {
        let chunks = dataset::parse_chunks(chunks_jsonl);
        to_js(&dataset::detect_language_pair(&chunks.records))
    }

    #[wasm_bindgen(js_name = documentCount)]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}

impl AnchorCortex {
    fn document_set(&self) -> DocumentSet {
        let mut set = DocumentSet::new();
        for (language, doc) in &self.documents {
            set.insert(language, Arc::clone(doc) as Arc<dyn PageSource>);
        }
        set
    }
}
