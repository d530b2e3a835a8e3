use crate::document::Document;
use regex::{Captures, Regex};
use serde::Serialize;

/// Ranked search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub document: Document,
    pub score: f64,
    /// Content with query terms wrapped in highlight markers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<String>,
}

impl RankedResult {
    pub fn new(document: Document, score: f64) -> Self {
        Self {
            document,
            score,
            highlighted: None,
        }
    }
}

/// Sort by score descending, keeping input order among equal scores
pub fn sort_by_score(results: &mut [RankedResult]) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Sort and cut to the first `top_k` results
pub fn format(mut results: Vec<RankedResult>, top_k: Option<usize>) -> Vec<RankedResult> {
    sort_by_score(&mut results);
    if let Some(k) = top_k {
        results.truncate(k);
    }
    results
}

/// Wraps whole-word term matches in markers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighter {
    pub open: String,
    pub close: String,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self {
            open: r#"<span class="highlight">"#.to_string(),
            close: "</span>".to_string(),
        }
    }
}

impl Highlighter {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Rewrite `content` once per term, in the order given.
    ///
    /// Each pass sees the output of the previous one, so a later term can match
    /// text inside markers inserted earlier.
    pub fn highlight(&self, content: &str, terms: &[String]) -> String {
        let mut content = content.to_string();
        for term in terms.iter().filter(|t| !t.is_empty()) {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
            let re = match Regex::new(&pattern) {
                Ok(re) => re,
                Err(err) => {
                    tracing::warn!(term = %term, error = %err, "skipping highlight term");
                    continue;
                }
            };
            content = re
                .replace_all(&content, |caps: &Captures| {
                    format!("{}{}{}", self.open, &caps[0], self.close)
                })
                .into_owned();
        }
        content
    }
}
