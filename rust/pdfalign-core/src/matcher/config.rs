//! Matcher configuration types and defaults

use serde::{Deserialize, Serialize};

use super::text::WordMatcher;

// =============================================================================
// Literal (sequence) matching
// =============================================================================

/// Parameters for the gap-tolerant literal matcher and its any-word fallback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Consecutive tokens without a matching word before a start is abandoned. Default: 5
    pub max_gap_tokens: usize,
    /// Quote words that may be skipped to re-synchronize after a missing word.
    /// Also bounds how far into the quote a start token may enter. Default: 0 (strict order)
    pub quote_lookahead: usize,
    /// Minimum fraction of quote words matched. Default: 0.4
    pub min_completeness: f64,
    /// Minimum absolute number of quote words matched. Default: 3
    pub min_words_matched: usize,
    /// Both words need at least this many graphemes for edit-distance matching. Default: 5
    pub fuzzy_min_len: usize,
    /// Maximum Levenshtein distance for a fuzzy word match. Default: 2
    pub max_edit_distance: usize,
    /// Run gap tolerances tried by the any-word fallback. Default: [2, 3]
    pub fallback_gap_tolerances: Vec<usize>,
    /// Preferred fallback run length as a multiple of the quote word count. Default: 1.5
    pub fallback_span_factor: f64,
    /// Hard cap on tokens returned by the fallback. Default: 10
    pub fallback_max_tokens: usize,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            max_gap_tokens: 5,
            quote_lookahead: 0,
            min_completeness: 0.4,
            min_words_matched: 3,
            fuzzy_min_len: 5,
            max_edit_distance: 2,
            fallback_gap_tolerances: vec![2, 3],
            fallback_span_factor: 1.5,
            fallback_max_tokens: 10,
        }
    }
}

impl SequenceConfig {
    pub fn word_matcher(&self) -> WordMatcher {
        WordMatcher {
            fuzzy_min_len: self.fuzzy_min_len,
            max_edit_distance: self.max_edit_distance,
        }
    }

    /// Builder: set gap tolerance
    pub fn with_max_gap_tokens(mut self, gaps: usize) -> Self {
        self.max_gap_tokens = gaps;
        self
    }

    /// Builder: let the walk skip up to `words` missing quote words
    pub fn with_quote_lookahead(mut self, words: usize) -> Self {
        self.quote_lookahead = words;
        self
    }

    /// Builder: disable the any-word fallback
    pub fn without_fallback(mut self) -> Self {
        self.fallback_gap_tolerances.clear();
        self
    }
}

// =============================================================================
// Semantic (embedding) matching
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Words per sliding window. Default: 50
    pub window_words: usize,
    /// Overlap between consecutive windows (0.0-0.9). Default: 0.5
    pub overlap: f64,
    /// Windows shorter than this fraction of `window_words` are dropped. Default: 0.3
    pub min_window_ratio: f64,
    /// Minimum cosine similarity for the best window. Default: 0.5
    pub min_similarity: f32,
    /// Windows embedded per model call. Default: 16
    pub batch_size: usize,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            window_words: 50,
            overlap: 0.5,
            min_window_ratio: 0.3,
            min_similarity: 0.5,
            batch_size: 16,
        }
    }
}

impl SemanticConfig {
    /// Words between window starts
    pub fn step(&self) -> usize {
        let overlap = self.overlap.clamp(0.0, 0.9);
        ((self.window_words as f64 * (1.0 - overlap)).round() as usize).max(1)
    }

    /// Shortest window kept
    pub fn min_window_words(&self) -> usize {
        (self.window_words as f64 * self.min_window_ratio - 1e-9).ceil().max(1.0) as usize
    }

    /// Builder: set window size
    pub fn with_window_words(mut self, words: usize) -> Self {
        self.window_words = words.max(1);
        self
    }

    /// Builder: set acceptance threshold
    pub fn with_min_similarity(mut self, threshold: f32) -> Self {
        self.min_similarity = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_defaults() {
        let config = SemanticConfig::default();
        assert_eq!(config.step(), 25);
        assert_eq!(config.min_window_words(), 15);
    }

    #[test]
    fn test_sequence_defaults() {
        let config = SequenceConfig::default();
        assert_eq!(config.max_gap_tokens, 5);
        assert_eq!(config.quote_lookahead, 0);
        assert_eq!(config.fallback_gap_tolerances, vec![2, 3]);
        assert!((config.min_completeness - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SequenceConfig = serde_json::from_str(r#"{"max_gap_tokens": 3}"#).unwrap();
        assert_eq!(config.max_gap_tokens, 3);
        assert_eq!(config.min_words_matched, 3);
    }
}
