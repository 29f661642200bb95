//! SequenceMatcher: best-of-all-starts greedy alignment of a quote against
//! one page's tokens.
//!
//! Each start index walks forward through the tokens, consuming quote words in
//! order. Token-boundary noise is absorbed by fuzzy word equality and a bounded
//! run of gap tokens. An opt-in quote look-ahead (`quote_lookahead`) lets the
//! walk re-synchronize when a quote word is missing from the page; with the
//! default of 0 every quote word must be met in turn.
//!
//! Cost is O(tokens x quote words) per page. Never feed a whole document.

use crate::layer::TextToken;

use super::config::SequenceConfig;
use super::fallback;
use super::text::{significant_words, WordMatcher};
use super::{MatchKind, MatchOutcome, MatchResult, NotFoundReason};

/// Result of walking from one start index
#[derive(Debug, Clone)]
struct Candidate {
    start: usize,
    end: usize,
    words_matched: usize,
    best_streak: usize,
    gap_count: usize,
    completeness: f64,
    score: f64,
}

pub struct SequenceMatcher {
    config: SequenceConfig,
    words: WordMatcher,
}

impl Default for SequenceMatcher {
    fn default() -> Self {
        Self::new(SequenceConfig::default())
    }
}

impl SequenceMatcher {
    pub fn new(config: SequenceConfig) -> Self {
        let words = config.word_matcher();
        Self { config, words }
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    /// Locate `quote` in `tokens`.
    pub fn find(&self, quote: &str, tokens: &[TextToken]) -> MatchOutcome {
        let quote_words = significant_words(quote);
        if quote_words.is_empty() {
            return MatchOutcome::NotFound(NotFoundReason::EmptyQuote);
        }
        if tokens.is_empty() {
            return MatchOutcome::NotFound(NotFoundReason::EmptyTextLayer);
        }

        let token_words: Vec<Vec<String>> = tokens.iter().map(|t| significant_words(&t.text)).collect();

        let mut best: Option<Candidate> = None;
        for start in 0..tokens.len() {
            let Some(candidate) = self.walk(start, &quote_words, &token_words) else {
                continue;
            };
            if !self.qualifies(&candidate) {
                continue;
            }
            // Strict comparison keeps the earliest start on ties
            if best.as_ref().map_or(true, |b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }

        if let Some(best) = best {
            log::trace!(
                "sequence match: tokens {}..={} score {:.1} ({} / {} words, streak {}, {} gaps)",
                best.start,
                best.end,
                best.score,
                best.words_matched,
                quote_words.len(),
                best.best_streak,
                best.gap_count
            );
            return MatchOutcome::Matched(MatchResult {
                token_indices: (best.start..=best.end).collect(),
                score: best.score,
                completeness: best.completeness,
                words_matched: best.words_matched,
                kind: MatchKind::Sequence,
            });
        }

        if self.config.fallback_gap_tolerances.is_empty() {
            return MatchOutcome::NotFound(NotFoundReason::NoQualifyingRun);
        }
        fallback::any_word(&quote_words, &token_words, &self.config, &self.words)
    }

    fn qualifies(&self, candidate: &Candidate) -> bool {
        candidate.completeness >= self.config.min_completeness
            && candidate.words_matched >= self.config.min_words_matched
    }

    /// Offset of the first quote word in `quote[from..from+window]` that
    /// matches `token_word`.
    fn lookup(&self, quote: &[String], from: usize, window: usize, token_word: &str) -> Option<usize> {
        quote[from..]
            .iter()
            .take(window)
            .position(|q| self.words.matches(q, token_word))
    }

    fn walk(&self, start: usize, quote: &[String], token_words: &[Vec<String>]) -> Option<Candidate> {
        let mut qi = 0;
        let mut words_matched = 0;
        let mut streak = 0;
        let mut best_streak = 0;
        let mut gap_count = 0;
        let mut pending_gaps = 0;
        let mut last_hit: Option<usize> = None;

        let window = self.config.quote_lookahead + 1;

        for (t, words) in token_words.iter().enumerate().skip(start) {

            let mut hit = false;
            for word in words {
                if qi >= quote.len() {
                    break;
                }
                if let Some(skipped) = self.lookup(quote, qi, window, word) {
                    if skipped > 0 {
                        streak = 0;
                    }
                    qi += skipped + 1;
                    words_matched += 1;
                    streak += 1;
                    best_streak = best_streak.max(streak);
                    hit = true;
                }
            }

            if hit {
                gap_count += pending_gaps;
                pending_gaps = 0;
                last_hit = Some(t);
            } else {
                if t == start {
                    return None;
                }
                pending_gaps += 1;
                streak = 0;
                if pending_gaps > self.config.max_gap_tokens {
                    break;
                }
            }

            if qi >= quote.len() {
                break;
            }
        }

        let end = last_hit?;
        let completeness = words_matched as f64 / quote.len() as f64;
        let score = completeness * 100.0 + best_streak as f64 * 5.0 - gap_count as f64 * 2.0;

        Some(Candidate {
            start,
            end,
            words_matched,
            best_streak,
            gap_count,
            completeness,
            score,
        })
    }
}
