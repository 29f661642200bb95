// pdfalign-core/src/embeddings/mod.rs
//
// Sentence embeddings for the semantic matcher.
// `model.rs` runs ONNX encoders through `tract-onnx` (pure Rust, WASM-compatible).
//
// The model is an explicitly owned resource: callers build one
// `EmbeddingResource`, share it through an `Arc`, and hand it to every
// matcher that needs it. Initialization happens on first use, exactly once.

pub mod config;
pub mod distance;
pub mod model;

pub use config::{EmbedConfig, OnnxModel, PoolingStrategy};
pub use distance::{cosine_similarity, magnitude};
pub use model::EmbedModel;

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::OnceCell;

use crate::error::ModelError;

/// Anything that turns texts into fixed-size vectors
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embedding vector length
    fn dimensions(&self) -> usize;

    /// Embed a batch, one vector per input text, in order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError>;
}

type Loader = Box<dyn Fn() -> Result<Arc<dyn TextEmbedder>, ModelError> + Send + Sync>;

/// Lazily initialized, shared embedding model.
///
/// `get()` is single-flight: concurrent first callers block on one loader run
/// and all receive the same instance. A failed load is returned to the caller
/// and not cached, so a later call may retry.
pub struct EmbeddingResource {
    cell: OnceCell<Arc<dyn TextEmbedder>>,
    loader: Loader,
}

impl EmbeddingResource {
    /// Defer model construction until the first `get()`
    pub fn lazy<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn TextEmbedder>, ModelError> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            loader: Box::new(loader),
        }
    }

    /// Wrap an already constructed embedder
    pub fn ready(embedder: Arc<dyn TextEmbedder>) -> Self {
        Self {
            cell: OnceCell::with_value(embedder),
            loader: Box::new(|| Err(ModelError::Unavailable("resource was created initialized".to_string()))),
        }
    }

    /// ONNX model + tokenizer loaded from in-memory bytes on first use
    pub fn from_onnx_bytes(model_bytes: Vec<u8>, tokenizer_json: String, config: EmbedConfig) -> Self {
        Self::lazy(move || {
            let model = EmbedModel::from_bytes(&model_bytes, &tokenizer_json, config.clone())?;
            Ok(Arc::new(model) as Arc<dyn TextEmbedder>)
        })
    }

    /// Get the model, initializing it if needed
    pub fn get(&self) -> Result<Arc<dyn TextEmbedder>, ModelError> {
        self.cell
            .get_or_try_init(|| {
                log::info!("initializing embedding model");
                (self.loader)().map_err(|e| match e {
                    ModelError::Unavailable(_) => e,
                    other => ModelError::Unavailable(other.to_string()),
                })
            })
            .map(Arc::clone)
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl std::fmt::Debug for EmbeddingResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingResource")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
