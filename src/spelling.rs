use levenshtein_automata::{Distance, LevenshteinAutomatonBuilder};
use std::collections::HashMap;

/// Largest edit distance a correction may span
const MAX_EDITS: u8 = 2;

lazy_static::lazy_static! {
    // Adjacent transpositions count as one edit
    static ref LEVENSHTEIN: LevenshteinAutomatonBuilder =
        LevenshteinAutomatonBuilder::new(MAX_EDITS, true);
}

/// Query-side spelling correction.
pub trait SpellingCorrector: Send + Sync {
    /// Return the corrected form of one lowercase word.
    fn correct(&self, word: &str) -> String;
}

/// Identity corrector
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCorrection;

impl SpellingCorrector for NoCorrection {
    fn correct(&self, word: &str) -> String {
        word.to_string()
    }
}

/// Frequency-dictionary corrector.
///
/// Known words are kept. Otherwise the most frequent known word at edit
/// distance 1 wins, then distance 2, found by running every dictionary word
/// through one Levenshtein automaton. Ties go to the lexicographically
/// smaller word. Words with no known neighbour come back unchanged.
#[derive(Debug, Clone, Default)]
pub struct VocabularyCorrector {
    frequencies: HashMap<String, usize>,
}

impl VocabularyCorrector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary from raw text, counting lowercase alphabetic words
    pub fn from_text<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut corrector = Self::new();
        for text in texts {
            for word in text
                .split(|c: char| !c.is_alphabetic())
                .filter(|w| !w.is_empty())
            {
                corrector.add_word(&word.to_lowercase());
            }
        }
        corrector
    }

    pub fn add_word(&mut self, word: &str) {
        *self.frequencies.entry(word.to_string()).or_insert(0) += 1;
    }

    pub fn is_known(&self, word: &str) -> bool {
        self.frequencies.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

impl SpellingCorrector for VocabularyCorrector {
    fn correct(&self, word: &str) -> String {
        if word.is_empty() || self.is_known(word) {
            return word.to_string();
        }

        let dfa = LEVENSHTEIN.build_dfa(word);
        // best (frequency, word) per edit distance 1 and 2
        let mut best: [Option<(usize, &str)>; 2] = [None, None];
        for (known, &freq) in &self.frequencies {
            let slot = match dfa.eval(known) {
                Distance::Exact(distance) => usize::from(distance)
                    .checked_sub(1)
                    .and_then(|i| best.get_mut(i)),
                Distance::AtLeast(_) => None,
            };
            let Some(slot) = slot else {
                continue;
            };
            let better = match *slot {
                Some((f, w)) => freq > f || (freq == f && known.as_str() < w),
                None => true,
            };
            if better {
                *slot = Some((freq, known.as_str()));
            }
        }

        best.iter()
            .flatten()
            .next()
            .map(|(_, w)| w.to_string())
            .unwrap_or_else(|| word.to_string())
    }
}
