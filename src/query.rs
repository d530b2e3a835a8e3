use serde::{Deserialize, Serialize};

/// How positive terms of a boolean query combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOperation {
    #[default]
    And,
    Or,
}

/// A flat boolean query: `(positive, negative, operation)`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BooleanQuery {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub operation: BooleanOperation,
}

impl BooleanQuery {
    /// Scan lowercase whitespace tokens left to right.
    ///
    /// A bare token is a positive term. `not` turns the next token into a
    /// negative term and is dropped when nothing follows it. `and`/`or` set the
    /// operation for the whole query; the last one seen wins.
    pub fn parse(query: &str) -> Self {
        let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        let mut parsed = BooleanQuery::default();

        let mut i = 0;
        while i < tokens.len() {
            match tokens[i].as_str() {
                "and" => parsed.operation = BooleanOperation::And,
                "or" => parsed.operation = BooleanOperation::Or,
                "not" => {
                    if let Some(next) = tokens.get(i + 1) {
                        parsed.negative.push(next.clone());
                        i += 1;
                    }
                }
                term => parsed.positive.push(term.to_string()),
            }
            i += 1;
        }

        parsed
    }

    /// Evaluate against a presence predicate.
    ///
    /// With no positive terms, AND holds vacuously and OR fails.
    pub fn matches<F>(&self, contains: F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        let positive = match self.operation {
            BooleanOperation::And => self.positive.iter().all(|t| contains(t.as_str())),
            BooleanOperation::Or => self.positive.iter().any(|t| contains(t.as_str())),
        };
        positive && !self.negative.iter().any(|t| contains(t.as_str()))
    }
}
