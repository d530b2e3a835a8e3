//! Term statistics and vector similarity.
//!
//! All functions are pure. Degenerate inputs (empty documents, zero vectors)
//! produce empty maps or `0.0`, never NaN.

use std::collections::{BTreeMap, HashMap, HashSet};

/// Term -> weight, ordered so that sums are reproducible
pub type TermWeights = BTreeMap<String, f64>;

/// Relative frequency of each term: count / document length.
///
/// An empty document yields an empty map.
pub fn term_frequency(terms: &[String]) -> TermWeights {
    let mut tf = TermWeights::new();
    if terms.is_empty() {
        return tf;
    }

    for term in terms {
        *tf.entry(term.clone()).or_insert(0.0) += 1.0;
    }
    let total = terms.len() as f64;
    for value in tf.values_mut() {
        *value /= total;
    }
    tf
}

/// `ln(N / (1 + df))` for every distinct term of the corpus.
///
/// Terms present in most documents get a negative weight.
pub fn inverse_document_frequency(corpus: &[Vec<String>]) -> TermWeights {
    let total = corpus.len() as f64;
    let mut doc_frequency: HashMap<&str, usize> = HashMap::new();
    for doc in corpus {
        let distinct: HashSet<&str> = doc.iter().map(String::as_str).collect();
        for term in distinct {
            *doc_frequency.entry(term).or_insert(0) += 1;
        }
    }

    doc_frequency
        .into_iter()
        .map(|(term, df)| (term.to_string(), (total / (1.0 + df as f64)).ln()))
        .collect()
}

/// Elementwise product; terms missing from `idf` weigh 0
pub fn tfidf(tf: &TermWeights, idf: &TermWeights) -> TermWeights {
    tf.iter()
        .map(|(term, value)| (term.clone(), value * idf.get(term).copied().unwrap_or(0.0)))
        .collect()
}

fn norm<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    values.map(|v| v * v).sum::<f64>().sqrt()
}

/// Cosine of the angle between two sparse vectors, `0.0` if either has zero norm
pub fn cosine_similarity(a: &TermWeights, b: &TermWeights) -> f64 {
    let dot: f64 = b
        .iter()
        .map(|(term, vb)| a.get(term).copied().unwrap_or(0.0) * vb)
        .sum();
    let norm_a = norm(a.values());
    let norm_b = norm(b.values());
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Presence flags of `terms`, aligned to `vocabulary`
pub fn binary_vector(terms: &HashSet<String>, vocabulary: &[String]) -> Vec<u8> {
    vocabulary
        .iter()
        .map(|term| u8::from(terms.contains(term)))
        .collect()
}

/// Cosine similarity of two equal-length {0,1} vectors, `0.0` on a zero norm
pub fn binary_cosine(a: &[u8], b: &[u8]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let dot: u32 = a.iter().zip(b).map(|(x, y)| u32::from(x & y)).sum();
    let ones_a: u32 = a.iter().map(|x| u32::from(*x)).sum();
    let ones_b: u32 = b.iter().map(|x| u32::from(*x)).sum();
    if ones_a == 0 || ones_b == 0 {
        return 0.0;
    }
    f64::from(dot) / (f64::from(ones_a).sqrt() * f64::from(ones_b).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn weights(pairs: &[(&str, f64)]) -> TermWeights {
        pairs.iter().map(|(t, w)| (t.to_string(), *w)).collect()
    }

    #[test]
    fn test_term_frequency_bounds() {
        let tf = term_frequency(&terms(&["a", "b", "a", "c"]));
        assert_eq!(tf["a"], 0.5);
        assert_eq!(tf["b"], 0.25);
        assert!(tf.values().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_term_frequency_empty() {
        assert!(term_frequency(&[]).is_empty());
    }

    #[test]
    fn test_idf_negative_for_ubiquitous_term() {
        let corpus = vec![terms(&["x", "y"]), terms(&["x"]), terms(&["x", "x"])];
        let idf = inverse_document_frequency(&corpus);
        assert_eq!(idf["x"], (3.0f64 / 4.0).ln());
        assert!(idf["x"] < 0.0);
        assert_eq!(idf["y"], (3.0f64 / 2.0).ln());
    }

    #[test]
    fn test_idf_single_document() {
        let idf = inverse_document_frequency(&[terms(&["only"])]);
        assert!(idf["only"] < 0.0);
        assert!(inverse_document_frequency(&[]).is_empty());
    }

    #[test]
    fn test_tfidf_unseen_term_weighs_zero() {
        let tf = weights(&[("known", 0.5), ("unseen", 0.5)]);
        let idf = weights(&[("known", 2.0)]);
        let w = tfidf(&tf, &idf);
        assert_eq!(w["known"], 1.0);
        assert_eq!(w["unseen"], 0.0);
    }

    #[test]
    fn test_cosine_self_similarity() {
        let v = weights(&[("a", 0.3), ("b", -1.2), ("c", 4.0)]);
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let v = weights(&[("a", 1.0)]);
        let zero = weights(&[("a", 0.0)]);
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&TermWeights::new(), &TermWeights::new()), 0.0);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = weights(&[("a", 1.0)]);
        let b = weights(&[("b", 1.0)]);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_binary_vector_alignment() {
        let vocabulary = terms(&["apple", "juice", "mango"]);
        let doc: HashSet<String> = terms(&["mango", "apple", "kiwi"]).into_iter().collect();
        assert_eq!(binary_vector(&doc, &vocabulary), vec![1, 0, 1]);
    }

    #[test]
    fn test_binary_cosine() {
        assert!((binary_cosine(&[1, 0, 1], &[1, 0, 1]) - 1.0).abs() < 1e-12);
        assert!((binary_cosine(&[1, 0, 0], &[1, 1, 0]) - 1.0 / 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(binary_cosine(&[0, 0, 0], &[1, 1, 0]), 0.0);
    }
}
