//! Any-word grouping
//!
//! Last resort for the literal matcher: mark every token that contains some
//! quote word, group marked tokens into runs, and return the run whose length
//! is closest to the expected span of the quote.

use super::config::SequenceConfig;
use super::text::WordMatcher;
use super::{MatchKind, MatchOutcome, MatchResult, NotFoundReason};

/// Inclusive run of token indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Run {
    pub first: usize,
    pub last: usize,
}

impl Run {
    fn len(&self) -> usize {
        self.last - self.first + 1
    }
}

/// Group sorted indices; at most `gap` unmarked tokens may sit between two
/// members of a run.
pub(crate) fn group_runs(marked: &[usize], gap: usize) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut iter = marked.iter().copied();
    let Some(first) = iter.next() else {
        return runs;
    };

    let mut current = Run { first, last: first };
    for idx in iter {
        if idx - current.last - 1 <= gap {
            current.last = idx;
        } else {
            runs.push(current);
            current = Run { first: idx, last: idx };
        }
    }
    runs.push(current);
    runs
}

/// Longer-than-target runs cost twice as much per token as shorter ones
fn run_cost(len: usize, target: f64) -> f64 {
    let len = len as f64;
    if len > target {
        (len - target) * 2.0
    } else {
        target - len
    }
}

pub(crate) fn any_word(
    quote_words: &[String],
    token_words: &[Vec<String>],
    config: &SequenceConfig,
    matcher: &WordMatcher,
) -> MatchOutcome {
    let marked: Vec<usize> = token_words
        .iter()
        .enumerate()
        .filter(|(_, words)| words.iter().any(|w| quote_words.iter().any(|q| matcher.matches(q, w))))
        .map(|(i, _)| i)
        .collect();

    if marked.is_empty() {
        return MatchOutcome::NotFound(NotFoundReason::NoTokenContainsQuoteWord);
    }

    let runs: Vec<Run> = config
        .fallback_gap_tolerances
        .iter()
        .flat_map(|&gap| group_runs(&marked, gap))
        .collect();

    let target = config.fallback_span_factor * quote_words.len() as f64;
    let Some(mut best) = runs.first().copied() else {
        return MatchOutcome::NotFound(NotFoundReason::NoQualifyingRun);
    };
    let mut best_cost = run_cost(best.len(), target);
    for run in &runs[1..] {
        let cost = run_cost(run.len(), target);
        if cost < best_cost || (cost == best_cost && run.first < best.first) {
            best = *run;
            best_cost = cost;
        }
    }

    let cap = config.fallback_max_tokens.min(target.ceil() as usize).max(1);
    let last = best.last.min(best.first + cap - 1);
    let token_indices: Vec<usize> = (best.first..=last).collect();

    let words_matched = quote_words
        .iter()
        .filter(|q| {
            token_indices
                .iter()
                .any(|&i| token_words[i].iter().any(|w| matcher.matches(q, w)))
        })
        .count();
    let completeness = words_matched as f64 / quote_words.len() as f64;

    log::debug!(
        "any-word fallback: tokens {}..={} ({} / {} words)",
        best.first,
        last,
        words_matched,
        quote_words.len()
    );

    MatchOutcome::Matched(MatchResult {
        token_indices,
        score: completeness * 100.0,
        completeness,
        words_matched,
        kind: MatchKind::AnyWord,
    })
}
