use crate::spelling::SpellingCorrector;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

lazy_static::lazy_static! {
    static ref STOPWORDS: HashSet<&'static str> = {
        [
            "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're",
            "you've", "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he",
            "him", "his", "himself", "she", "she's", "her", "hers", "herself", "it", "it's",
            "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
            "who", "whom", "this", "that", "that'll", "these", "those", "am", "is", "are",
            "was", "were", "be", "been", "being", "have", "has", "had", "having", "do",
            "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or", "because",
            "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
            "between", "into", "through", "during", "before", "after", "above", "below",
            "to", "from", "up", "down", "in", "out", "on", "off", "over", "under", "again",
            "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
            "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
            "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t",
            "can", "will", "just", "don", "don't", "should", "should've", "now", "d", "ll",
            "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't",
            "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't",
            "haven", "haven't", "isn", "isn't", "ma", "mightn", "mightn't", "mustn",
            "mustn't", "needn", "needn't", "shan", "shan't", "shouldn", "shouldn't", "wasn",
            "wasn't", "weren", "weren't", "won", "won't", "wouldn", "wouldn't",
        ]
        .iter()
        .copied()
        .collect()
    };
}

/// Whether `word` (lowercase) is an English stop-word
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Normalization pipeline settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub remove_stop_words: bool,
    pub stem: bool,
    /// Tokens shorter than this many characters are dropped.
    pub min_token_len: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            remove_stop_words: true,
            stem: true,
            min_token_len: 1,
        }
    }
}

impl NormalizerConfig {
    /// Stemming without stop-word removal.
    ///
    /// Boolean queries use this so that operands such as "not" or "or" inside a
    /// document still index.
    pub fn keep_stop_words() -> Self {
        Self {
            remove_stop_words: false,
            ..Self::default()
        }
    }
}

/// Turns text into an ordered sequence of normalized terms
pub struct Normalizer {
    config: NormalizerConfig,
    stemmer: Stemmer,
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer").field("config", &self.config).finish()
    }
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            config,
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    pub fn config(&self) -> NormalizerConfig {
        self.config
    }

    /// Split text into word tokens (runs of alphanumerics and underscores)
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.chars()
            .fold(vec![String::new()], |mut tokens, c| {
                if c.is_alphanumeric() || c == '_' {
                    if let Some(last) = tokens.last_mut() {
                        last.push(c);
                    }
                } else if tokens.last().map_or(false, |s| !s.is_empty()) {
                    tokens.push(String::new());
                }
                tokens
            })
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Lowercase tokens that survive the length and stop-word filters, unstemmed
    pub fn words(&self, text: &str) -> Vec<String> {
        self.tokenize(text)
            .into_iter()
            .map(|t| t.to_lowercase())
            .filter(|t| self.keep(t))
            .collect()
    }

    fn keep(&self, token: &str) -> bool {
        token.chars().count() >= self.config.min_token_len
            && !(self.config.remove_stop_words && is_stopword(token))
    }

    fn stem_word(&self, token: &str) -> String {
        if self.config.stem {
            self.stemmer.stem(token).into_owned()
        } else {
            token.to_string()
        }
    }

    /// Full pipeline: tokenize, lowercase, filter, stem. Order and duplicates are kept.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        self.stem_all(&self.words(text))
    }

    /// Like [`words`](Self::words), correcting each lowercase token before filtering
    pub fn words_corrected(&self, text: &str, corrector: &dyn SpellingCorrector) -> Vec<String> {
        self.tokenize(text)
            .into_iter()
            .map(|t| corrector.correct(&t.to_lowercase()))
            .filter(|t| self.keep(t))
            .collect()
    }

    /// Like [`normalize`](Self::normalize), correcting each lowercase token first
    pub fn normalize_corrected(
        &self,
        text: &str,
        corrector: &dyn SpellingCorrector,
    ) -> Vec<String> {
        self.words_corrected(text, corrector)
            .iter()
            .map(|t| self.stem_word(t))
            .collect()
    }

    /// Stem already-filtered words
    pub fn stem_all(&self, words: &[String]) -> Vec<String> {
        words.iter().map(|t| self.stem_word(t)).collect()
    }

    /// Distinct normalized terms
    pub fn unique_terms(&self, text: &str) -> HashSet<String> {
        self.normalize(text).into_iter().collect()
    }

    /// Raw occurrence counts of normalized terms
    pub fn term_counts(&self, text: &str) -> HashMap<String, usize> {
        count_terms(self.normalize(text))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

/// Occurrence count of each term
pub fn count_terms<I>(terms: I) -> HashMap<String, usize>
where
    I: IntoIterator<Item = String>,
{
    let mut counts = HashMap::new();
    for term in terms {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

/// Lowercase whitespace split, no other processing
pub fn raw_terms(text: &str) -> Vec<String> {
    text.split_whitespace().map(|t| t.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spelling::VocabularyCorrector;

    #[test]
    fn test_tokenize() {
        let normalizer = Normalizer::default();
        let tokens = normalizer.tokenize("Hello, World! This is a test_case.");
        assert_eq!(tokens, vec!["Hello", "World", "This", "is", "a", "test_case"]);
    }

    #[test]
    fn test_normalize() {
        let normalizer = Normalizer::default();
        let tokens = normalizer.normalize("The quick brown fox jumps");
        assert!(tokens.contains(&"quick".to_string()));
        assert!(tokens.contains(&"brown".to_string()));
        assert!(tokens.contains(&"jump".to_string()));
        assert!(!tokens.contains(&"the".to_string()));
    }

    #[test]
    fn test_duplicates_and_order_kept() {
        let normalizer = Normalizer::default();
        let tokens = normalizer.normalize("apples and apple, then Apple");
        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(|t| t == &tokens[0]));
    }

    #[test]
    fn test_stop_words_configurable() {
        let normalizer = Normalizer::new(NormalizerConfig::keep_stop_words());
        assert_eq!(normalizer.normalize("not the"), vec!["not", "the"]);

        let normalizer = Normalizer::default();
        assert!(normalizer.normalize("not the").is_empty());
    }

    #[test]
    fn test_min_token_len() {
        let normalizer = Normalizer::new(NormalizerConfig {
            remove_stop_words: false,
            stem: false,
            min_token_len: 4,
        });
        assert_eq!(normalizer.normalize("the cat sat quietly"), vec!["quietly"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(Normalizer::default().normalize("").is_empty());
        assert!(Normalizer::default().normalize("  ,.! ").is_empty());
    }

    #[test]
    fn test_normalize_corrected() {
        let normalizer = Normalizer::default();
        let dict = VocabularyCorrector::from_text(["mango juice"]);
        assert_eq!(
            normalizer.normalize_corrected("Mnago", &dict),
            normalizer.normalize("mango")
        );
    }

    #[test]
    fn test_term_counts() {
        let counts = Normalizer::default().term_counts("red apple, green apple");
        assert_eq!(counts.get("appl"), Some(&2));
        assert_eq!(counts.get("red"), Some(&1));
    }

    #[test]
    fn test_count_terms_raw() {
        let counts = count_terms(raw_terms("Apple apple APPLE."));
        assert_eq!(counts.get("apple"), Some(&2));
        assert_eq!(counts.get("apple."), Some(&1));
    }

    #[test]
    fn test_raw_terms() {
        assert_eq!(raw_terms("Apple  Pie!"), vec!["apple", "pie!"]);
    }
}
