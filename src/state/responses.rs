// SPDX-License-Identifier: MIT

//! Response snapshot: question id to recorded answer

use serde_json::Value;
use std::collections::HashMap;

/// Answers recorded so far in a session. At most one entry per question;
/// recording again replaces the previous answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Responses {
    answers: HashMap<String, Value>,
}

impl Responses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer, returning the value it replaced
    pub fn record(&mut self, question_id: &str, answer: Value) -> Option<Value> {
        self.answers.insert(question_id.to_string(), answer)
    }

    /// Get an answer
    pub fn get(&self, question_id: &str) -> Option<&Value> {
        self.answers.get(question_id)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.answers.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.answers.iter()
    }

    /// Association-list form sorted by question id, used for persistence
    pub fn to_pairs(&self) -> Vec<(String, Value)> {
        let mut pairs: Vec<(String, Value)> = self
            .answers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }

    /// Convert to a JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.answers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl FromIterator<(String, Value)> for Responses {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, Value)> for Responses {
    fn from_iter<I: IntoIterator<Item = (&'a str, Value)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_responses() {
        let responses = Responses::new();
        assert!(responses.get("anything").is_none());
        assert!(responses.is_empty());
    }

    #[test]
    fn test_record_replaces_previous_answer() {
        let mut responses = Responses::new();

        assert_eq!(responses.record("q1", json!("first")), None);
        assert_eq!(responses.record("q1", json!("second")), Some(json!("first")));
        assert_eq!(responses.get("q1"), Some(&json!("second")));
        assert_eq!(responses.len(), 1);
    }

    #[test]
    fn test_to_pairs_sorted() {
        let responses: Responses = [("b", json!(2)), ("a", json!(1))].into_iter().collect();
        assert_eq!(
            responses.to_pairs(),
            vec![("a".to_string(), json!(1)), ("b".to_string(), json!(2))]
        );
    }

    #[test]
    fn test_to_json() {
        let mut responses = Responses::new();
        responses.record("a", json!(1));
        responses.record("b", json!("hello"));

        let json = responses.to_json();
        assert_eq!(json["a"], 1);
        assert_eq!(json["b"], "hello");
    }
}
