//! EmbeddingMatcher: semantic quote location for paraphrased or translated
//! text where literal overlap is not guaranteed.
//!
//! The page's words are cut into overlapping windows, every window is
//! embedded, and the window closest to the quote embedding (cosine) wins if it
//! clears the similarity floor. The window's word range is mapped back to the
//! tokens the words came from.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::embeddings::{cosine_similarity, magnitude, EmbeddingResource};
use crate::error::ModelError;
use crate::layer::TextToken;

use super::config::SemanticConfig;
use super::{MatchKind, MatchOutcome, MatchResult, NotFoundReason};

/// Cooperative cancellation flag, checked between embedding batches
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Page word sequence with the token each word came from
struct PageWords<'a> {
    words: Vec<&'a str>,
    token_of: Vec<usize>,
}

impl<'a> PageWords<'a> {
    fn new(tokens: &'a [TextToken]) -> Self {
        let mut words = Vec::new();
        let mut token_of = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            for word in token.text.split_whitespace() {
                words.push(word);
                token_of.push(i);
            }
        }
        Self { words, token_of }
    }

    fn windows(&self, config: &SemanticConfig) -> Vec<Range<usize>> {
        let size = config.window_words.max(1);
        let step = config.step();
        let min_len = config.min_window_words();

        (0..self.words.len())
            .step_by(step)
            .map(|start| start..(start + size).min(self.words.len()))
            .filter(|range| range.len() >= min_len)
            .collect()
    }

    fn text(&self, range: &Range<usize>) -> String {
        self.words[range.clone()].join(" ")
    }

    /// Contiguous token span covering a word range
    fn token_span(&self, range: &Range<usize>) -> Vec<usize> {
        let first = self.token_of[range.start];
        let last = self.token_of[range.end - 1];
        (first..=last).collect()
    }
}

pub struct EmbeddingMatcher {
    config: SemanticConfig,
    resource: Arc<EmbeddingResource>,
}

impl EmbeddingMatcher {
    pub fn new(config: SemanticConfig, resource: Arc<EmbeddingResource>) -> Self {
        Self { config, resource }
    }

    pub fn config(&self) -> &SemanticConfig {
        &self.config
    }

    /// Locate `quote` among `tokens` by embedding similarity.
    ///
    /// Errors only when the model is unavailable, inference fails, or the
    /// call is cancelled; a weak match is `NotFound(BelowSimilarity)`.
    pub async fn find(
        &self,
        quote: &str,
        tokens: &[TextToken],
        cancel: Option<&CancellationToken>,
    ) -> Result<MatchOutcome, ModelError> {
        let quote = super::text::normalize_whitespace(quote);
        if quote.is_empty() {
            return Ok(MatchOutcome::NotFound(NotFoundReason::EmptyQuote));
        }
        if tokens.is_empty() {
            return Ok(MatchOutcome::NotFound(NotFoundReason::EmptyTextLayer));
        }

        let page = PageWords::new(tokens);
        let windows = page.windows(&self.config);
        if windows.is_empty() {
            return Ok(MatchOutcome::NotFound(NotFoundReason::NoWindows));
        }

        let embedder = self.resource.get()?;
        let check = || match cancel {
            Some(token) if token.is_cancelled() => Err(ModelError::Cancelled),
            _ => Ok(()),
        };

        check()?;
        let quote_vec = embedder
            .embed(&[quote])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InferenceFailed("no embedding returned for quote".to_string()))?;
        let quote_mag = magnitude(&quote_vec);

        let mut best: Option<(usize, f32)> = None;
        for (batch_no, batch) in windows.chunks(self.config.batch_size.max(1)).enumerate() {
            check()?;
            let texts: Vec<String> = batch.iter().map(|range| page.text(range)).collect();
            let vectors = embedder.embed(&texts).await?;
            if vectors.len() != texts.len() {
                return Err(ModelError::Shape(format!(
                    "embedded {} windows, got {} vectors",
                    texts.len(),
                    vectors.len()
                )));
            }

            let offset = batch_no * self.config.batch_size.max(1);
            for (i, vector) in vectors.iter().enumerate() {
                let similarity = cosine_similarity(&quote_vec, vector, Some(quote_mag), None);
                if best.map_or(true, |(_, s)| similarity > s) {
                    best = Some((offset + i, similarity));
                }
            }
        }

        let Some((window_idx, similarity)) = best else {
            return Ok(MatchOutcome::NotFound(NotFoundReason::NoWindows));
        };

        if similarity < self.config.min_similarity {
            log::debug!(
                "semantic match rejected: best window {} similarity {:.3} < {:.3}",
                window_idx,
                similarity,
                self.config.min_similarity
            );
            return Ok(MatchOutcome::NotFound(NotFoundReason::BelowSimilarity { best: similarity }));
        }

        let range = &windows[window_idx];
        log::debug!(
            "semantic match: window {} (words {}..{}) similarity {:.3}",
            window_idx,
            range.start,
            range.end,
            similarity
        );

        Ok(MatchOutcome::Matched(MatchResult {
            token_indices: page.token_span(range),
            score: f64::from(similarity),
            completeness: 1.0,
            words_matched: range.len(),
            kind: MatchKind::Semantic,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: usize) -> Vec<TextToken> {
        (0..words)
            .map(|i| TextToken::new(format!("w{}", i), i as f64, 0.0, 1.0, 1.0))
            .collect()
    }

    #[test]
    fn test_windows_step_and_discard() {
        let page_tokens = tokens(60);
        let page = PageWords::new(&page_tokens);
        let windows = page.windows(&SemanticConfig::default());
        // 0..50, 25..60 (35 words); 50..60 is 10 words < 15 and dropped
        assert_eq!(windows, vec![0..50, 25..60]);
    }

    #[test]
    fn test_short_page_single_window() {
        let page_tokens = tokens(20);
        let page = PageWords::new(&page_tokens);
        assert_eq!(page.windows(&SemanticConfig::default()), vec![0..20]);

        let tiny = tokens(10);
        assert!(PageWords::new(&tiny).windows(&SemanticConfig::default()).is_empty());
    }

    #[test]
    fn test_multi_word_tokens_map_back() {
        let page_tokens = vec![
            TextToken::new("one two", 0.0, 0.0, 1.0, 1.0),
            TextToken::new("three", 1.0, 0.0, 1.0, 1.0),
            TextToken::new("four five six", 2.0, 0.0, 1.0, 1.0),
        ];
        let page = PageWords::new(&page_tokens);
        assert_eq!(page.words.len(), 6);
        assert_eq!(page.token_span(&(1..4)), vec![0, 1, 2]);
        assert_eq!(page.token_span(&(2..3)), vec![1]);
    }

    #[test]
    fn test_cancellation_token() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
