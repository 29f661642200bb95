//! Text normalization and fuzzy word comparison shared by the matchers

use unicode_segmentation::UnicodeSegmentation;

/// Lowercase, collapse whitespace runs to a single space, trim. Idempotent.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for word in lowered.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Collapse whitespace and trim, keeping case. Used for quote hashing.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Length in grapheme clusters
pub fn grapheme_len(word: &str) -> usize {
    word.graphemes(true).count()
}

/// Normalized words longer than one grapheme
pub fn significant_words(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|w| grapheme_len(w) > 1)
        .map(str::to_string)
        .collect()
}

/// Levenshtein distance over grapheme clusters (two-row DP)
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<&str> = a.graphemes(true).collect();
    let b: Vec<&str> = b.graphemes(true).collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ga) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, gb) in b.iter().enumerate() {
            let cost = usize::from(ga != gb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Word equality with OCR/token-boundary tolerance.
///
/// Matches on exact equality, substring containment in either direction, or
/// (both words at least `fuzzy_min_len` graphemes) an edit distance of at
/// most `max_edit_distance`.
#[derive(Debug, Clone, Copy)]
pub struct WordMatcher {
    pub fuzzy_min_len: usize,
    pub max_edit_distance: usize,
}

impl Default for WordMatcher {
    fn default() -> Self {
        Self {
            fuzzy_min_len: 5,
            max_edit_distance: 2,
        }
    }
}

impl WordMatcher {
    pub fn matches(&self, quote_word: &str, token_word: &str) -> bool {
        if quote_word == token_word || quote_word.contains(token_word) || token_word.contains(quote_word) {
            return true;
        }

        let lq = grapheme_len(quote_word);
        let lt = grapheme_len(token_word);
        if lq < self.fuzzy_min_len || lt < self.fuzzy_min_len {
            return false;
        }
        // Length gap alone already exceeds the budget
        if lq.abs_diff(lt) > self.max_edit_distance {
            return false;
        }

        edit_distance(quote_word, token_word) <= self.max_edit_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses() {
        assert_eq!(normalize("  The\tQuick\n\nBrown   fox "), "the quick brown fox");
    }

    #[test]
    fn test_normalize_idempotent() {
        let samples = ["", "   ", "A  b\tC", "Ünïcödé  ÇASE", "line\r\nbreak", "İstanbul"];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_significant_words_drops_single_chars() {
        assert_eq!(significant_words("a cat, I think"), vec!["cat,", "think"]);
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("same", "same"), 0);
        // Combining accent counts as part of one grapheme
        assert_eq!(edit_distance("cafe\u{301}", "cafe"), 1);
    }

    #[test]
    fn test_substring_containment() {
        let m = WordMatcher::default();
        assert!(m.matches("translation", "trans"));
        assert!(m.matches("tion", "translation"));
        assert!(!m.matches("alpha", "omega"));
    }

    #[test]
    fn test_fuzzy_boundary() {
        let m = WordMatcher::default();
        // distance 2, both length >= 5
        assert_eq!(edit_distance("mouse", "moxsy"), 2);
        assert!(m.matches("mouse", "moxsy"));
        // distance 3
        assert_eq!(edit_distance("mouse", "mxxsy"), 3);
        assert!(!m.matches("mouse", "mxxsy"));
    }

    #[test]
    fn test_short_words_not_fuzzy() {
        let m = WordMatcher::default();
        // length 4: distance 1 but below the fuzzy length floor
        assert!(!m.matches("cats", "cots"));
    }
}
