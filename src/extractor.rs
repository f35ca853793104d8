use indexmap::IndexMap;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};

/// Configuration for the feature extractor.
///
/// `clean` (the default) strips punctuation and drops short words and
/// stop-words before stemming. With `clean` off, punctuation runs are
/// retained as terms of their own and no word is filtered out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub clean: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig { clean: true }
    }
}

/// Words too common to carry topical signal. Applied in clean mode only,
/// against the lower-cased word before stemming.
const STOP_WORDS: &[&str] = &[
    "a", "again", "all", "along", "also", "an", "and", "are", "as", "at",
    "but", "by", "came", "can", "cant", "couldnt", "did", "didn", "didnt",
    "do", "doesnt", "dont", "ever", "first", "from", "have", "her", "here",
    "him", "how", "i", "if", "in", "into", "is", "isnt", "it", "itll",
    "just", "last", "least", "like", "most", "my", "new", "no", "not",
    "now", "of", "on", "or", "should", "sinc", "so", "some", "th", "than",
    "that", "the", "their", "then", "this", "those", "to", "told", "too",
    "true", "try", "until", "url", "us", "were", "when", "whether", "while",
    "with", "within", "yes", "you", "youll",
];

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

/// Map raw text to a term -> count mapping.
///
/// Words are split on whitespace and punctuation, case-folded and stemmed
/// (Snowball English). In clean mode, stop-words and words of two characters
/// or fewer are dropped. In raw mode every word survives and each run of
/// punctuation becomes a term itself.
pub fn term_frequencies(text: &str, config: &ExtractorConfig) -> IndexMap<String, u32> {
    let stemmer = Stemmer::create(Algorithm::English);
    let mut counts: IndexMap<String, u32> = IndexMap::new();

    let stripped: String = text
        .chars()
        .map(|c| if is_word_char(c) || c.is_whitespace() { c } else { ' ' })
        .collect();

    for word in stripped.split_whitespace() {
        let lower = word.to_lowercase();
        if config.clean && (word.chars().count() <= 2 || is_stop_word(&lower)) {
            continue;
        }
        let stem = stemmer.stem(&lower).into_owned();
        *counts.entry(stem).or_insert(0) += 1;
    }

    if !config.clean {
        // Punctuation runs become single terms: blank out the word
        // characters and split what remains.
        let punct: String = text
            .chars()
            .map(|c| if is_word_char(c) { ' ' } else { c })
            .collect();
        for symbol in punct.split_whitespace() {
            *counts.entry(symbol.to_string()).or_insert(0) += 1;
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean() -> ExtractorConfig {
        ExtractorConfig { clean: true }
    }

    fn raw() -> ExtractorConfig {
        ExtractorConfig { clean: false }
    }

    #[test]
    fn stop_word_list_is_sorted_for_binary_search() {
        for pair in STOP_WORDS.windows(2) {
            assert!(pair[0] < pair[1], "{:?} out of order", pair);
        }
    }

    #[test]
    fn clean_mode_stems_and_filters() {
        let counts = term_frequencies(
            "here are some good words of test's. I hope you love them!",
            &clean(),
        );
        let expected = ["good", "word", "test", "hope", "love", "them"];
        assert_eq!(counts.len(), expected.len());
        for term in expected {
            assert_eq!(counts.get(term), Some(&1), "missing {term}");
        }
    }

    #[test]
    fn clean_mode_counts_repeats() {
        let counts = term_frequencies("Dogs bark. Dogs bite. Dogs!", &clean());
        assert_eq!(counts.get("dog"), Some(&3));
        assert_eq!(counts.get("bark"), Some(&1));
        assert_eq!(counts.get("bite"), Some(&1));
    }

    #[test]
    fn clean_mode_drops_short_words() {
        let counts = term_frequencies("go up to it", &clean());
        assert!(counts.is_empty());
    }

    #[test]
    fn raw_mode_keeps_punctuation_terms() {
        let counts = term_frequencies("! ! aaa !", &raw());
        assert_eq!(counts.get("!"), Some(&3));
        assert_eq!(counts.get("aaa"), Some(&1));
    }

    #[test]
    fn raw_mode_groups_punctuation_runs() {
        let counts = term_frequencies("what?! really?!", &raw());
        assert_eq!(counts.get("?!"), Some(&2));
        assert_eq!(counts.get("what"), Some(&1));
        assert_eq!(counts.get("realli"), Some(&1));
    }

    #[test]
    fn case_folding_merges_terms() {
        let counts = term_frequencies("Dog DOG dog", &clean());
        assert_eq!(counts.get("dog"), Some(&3));
        assert_eq!(counts.len(), 1);
    }
}
