use serde::{Deserialize, Serialize};

use crate::matcher::{SemanticConfig, SequenceConfig};

/// How the pipeline locates quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Literal matching only
    #[default]
    Sequence,
    /// Embedding windows only (paraphrased or translated quotes)
    Semantic,
    /// Literal first, embeddings for the misses
    SequenceThenSemantic,
}

impl MatchStrategy {
    pub fn needs_embeddings(&self) -> bool {
        !matches!(self, Self::Sequence)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub strategy: MatchStrategy,
    pub sequence: SequenceConfig,
    pub semantic: SemanticConfig,
}

impl AnchorConfig {
    /// Builder: set strategy
    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}
