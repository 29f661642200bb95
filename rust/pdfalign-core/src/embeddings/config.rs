// pdfalign-core/src/embeddings/config.rs
//
// Model selection and inference settings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported ONNX sentence encoders.
///
/// Quotes and page text are in different languages on the two sides of an
/// alignment, so the defaults are multilingual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OnnxModel {
    /// sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2 - 384 dimensions, 50+ languages
    #[default]
    #[serde(rename = "paraphrase-multilingual-minilm-l12-v2")]
    MultilingualMiniLML12V2,

    /// sentence-transformers/LaBSE - 768 dimensions, bitext-mining quality
    #[serde(rename = "labse")]
    LaBSE,

    /// BAAI/bge-small-en-v1.5 - 384 dimensions, English only
    #[serde(rename = "bge-small-en-v1.5")]
    BGESmallENV15,
}

impl fmt::Display for OnnxModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultilingualMiniLML12V2 => write!(f, "paraphrase-multilingual-minilm-l12-v2"),
            Self::LaBSE => write!(f, "labse"),
            Self::BGESmallENV15 => write!(f, "bge-small-en-v1.5"),
        }
    }
}

impl OnnxModel {
    pub fn dimensions(&self) -> usize {
        match self {
            Self::MultilingualMiniLML12V2 => 384,
            Self::LaBSE => 768,
            Self::BGESmallENV15 => 384,
        }
    }

    /// Maximum sequence length in tokens
    pub fn max_length(&self) -> usize {
        match self {
            Self::MultilingualMiniLML12V2 => 128,
            Self::LaBSE => 256,
            Self::BGESmallENV15 => 512,
        }
    }

    pub fn hf_model_id(&self) -> &'static str {
        match self {
            Self::MultilingualMiniLML12V2 => "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2",
            Self::LaBSE => "sentence-transformers/LaBSE",
            Self::BGESmallENV15 => "BAAI/bge-small-en-v1.5",
        }
    }

    /// Pooling the model was trained with
    pub fn native_pooling(&self) -> PoolingStrategy {
        match self {
            Self::MultilingualMiniLML12V2 => PoolingStrategy::Mean,
            Self::LaBSE | Self::BGESmallENV15 => PoolingStrategy::Cls,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "paraphrase-multilingual-minilm-l12-v2" | "multilingual-minilm" => Some(Self::MultilingualMiniLML12V2),
            "labse" => Some(Self::LaBSE),
            "bge-small" | "bge-small-en-v1.5" => Some(Self::BGESmallENV15),
            _ => None,
        }
    }
}

/// Token embeddings -> sentence embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PoolingStrategy {
    /// Mask-weighted mean over tokens
    #[default]
    Mean,

    /// [CLS] token embedding
    Cls,
}

/// Embedding inference configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    pub model: OnnxModel,

    /// Texts per inference call
    pub batch_size: usize,

    /// Pooling override (None = the model's native pooling)
    pub pooling: Option<PoolingStrategy>,

    /// L2-normalize output vectors
    pub normalize: bool,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            model: OnnxModel::default(),
            batch_size: 16,
            pooling: None,
            normalize: true,
        }
    }
}

impl EmbedConfig {
    pub fn labse() -> Self {
        Self {
            model: OnnxModel::LaBSE,
            ..Default::default()
        }
    }

    /// Builder: set batch size
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn effective_pooling(&self) -> PoolingStrategy {
        self.pooling.unwrap_or_else(|| self.model.native_pooling())
    }
}
