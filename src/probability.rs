//! Probabilistic relevance: query likelihood and a small belief table.

use std::collections::HashMap;

/// Likelihood of a query given one document.
///
/// Sum over query terms (repeats included) of the term's count in the document
/// divided by the number of terms in the whole corpus.
pub fn query_likelihood(
    query_terms: &[String],
    doc_counts: &HashMap<String, usize>,
    corpus_term_total: usize,
) -> f64 {
    if corpus_term_total == 0 {
        return 0.0;
    }
    let total = corpus_term_total as f64;
    query_terms
        .iter()
        .filter_map(|term| doc_counts.get(term))
        .map(|count| *count as f64 / total)
        .sum()
}

/// Joint probability table over (query, document, relevant)
#[derive(Debug, Clone, Default)]
pub struct JointProbabilities {
    table: HashMap<(String, String, bool), f64>,
}

impl JointProbabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, query: &str, doc_id: &str, relevant: bool, probability: f64) {
        self.table
            .insert((query.to_string(), doc_id.to_string(), relevant), probability);
    }

    pub fn get(&self, query: &str, doc_id: &str, relevant: bool) -> f64 {
        self.table
            .get(&(query.to_string(), doc_id.to_string(), relevant))
            .copied()
            .unwrap_or(0.0)
    }

    /// P(relevant | query, doc) by Bayes' rule; 0 when neither outcome is recorded
    pub fn posterior_relevance(&self, query: &str, doc_id: &str) -> f64 {
        let relevant = self.get(query, doc_id, true);
        let evidence = relevant + self.get(query, doc_id, false);
        if evidence == 0.0 {
            0.0
        } else {
            relevant / evidence
        }
    }

    /// Sum of the entries whose key satisfies `condition`
    pub fn marginal<F>(&self, condition: F) -> f64
    where
        F: Fn(&str, &str, bool) -> bool,
    {
        self.table
            .iter()
            .filter(|((q, d, r), _)| condition(q.as_str(), d.as_str(), *r))
            .map(|(_, p)| p)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_likelihood() {
        let counts: HashMap<String, usize> =
            [("python".to_string(), 2), ("language".to_string(), 1)].into_iter().collect();
        let query = vec!["python".to_string(), "python".to_string(), "what".to_string()];
        assert_eq!(query_likelihood(&query, &counts, 10), 0.4);
        assert_eq!(query_likelihood(&query, &counts, 0), 0.0);
    }

    #[test]
    fn test_posterior_relevance() {
        let mut joint = JointProbabilities::new();
        joint.insert("what is python", "1", true, 0.6);
        joint.insert("what is python", "1", false, 0.4);

        assert!((joint.posterior_relevance("what is python", "1") - 0.6).abs() < 1e-12);
        assert_eq!(joint.posterior_relevance("what is python", "2"), 0.0);
    }

    #[test]
    fn test_marginal() {
        let mut joint = JointProbabilities::new();
        joint.insert("q", "1", true, 0.25);
        joint.insert("q", "2", true, 0.25);
        joint.insert("q", "2", false, 0.5);

        assert_eq!(joint.marginal(|_, _, relevant| relevant), 0.5);
        assert_eq!(joint.marginal(|_, doc, _| doc == "2"), 0.75);
    }
}
