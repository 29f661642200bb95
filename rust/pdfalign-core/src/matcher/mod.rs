//! Quote matchers
//!
//! - `sequence.rs` - SequenceMatcher: gap-tolerant literal matching over one page
//! - `fallback.rs` - any-word grouping used when no literal run qualifies
//! - `semantic.rs` - EmbeddingMatcher: sliding-window embeddings + cosine similarity
//! - `text.rs` - normalization, word filtering, grapheme edit distance
//!
//! Every matcher answers with a [`MatchOutcome`]; a miss is a value, not an error.

pub mod config;
pub mod fallback;
pub mod semantic;
pub mod sequence;
pub mod text;

pub use config::{SemanticConfig, SequenceConfig};
pub use semantic::{CancellationToken, EmbeddingMatcher};
pub use sequence::SequenceMatcher;
pub use text::{normalize, normalize_whitespace, WordMatcher};

use serde::{Deserialize, Serialize};

/// Which strategy produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Sequence,
    AnyWord,
    Semantic,
}

/// A located run of tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Indices into the page's token list, strictly increasing
    pub token_indices: Vec<usize>,
    /// Literal score, or cosine similarity for semantic matches
    pub score: f64,
    /// Fraction of quote words matched (1.0 for semantic matches)
    pub completeness: f64,
    pub words_matched: usize,
    pub kind: MatchKind,
}

/// Why a quote could not be located
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NotFoundReason {
    /// No quote word longer than one character
    EmptyQuote,
    /// The page has no tokens
    EmptyTextLayer,
    /// No literal run qualified and the fallback is disabled
    NoQualifyingRun,
    /// Not a single token contains a quote word
    NoTokenContainsQuoteWord,
    /// The page is too short to build an embedding window
    NoWindows,
    /// Best window similarity under the threshold
    BelowSimilarity { best: f32 },
    PageOutOfRange { page: u32, num_pages: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched(MatchResult),
    NotFound(NotFoundReason),
}

impl MatchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    pub fn matched(&self) -> Option<&MatchResult> {
        match self {
            Self::Matched(result) => Some(result),
            Self::NotFound(_) => None,
        }
    }
}
