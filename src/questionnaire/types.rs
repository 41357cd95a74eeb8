// SPDX-License-Identifier: MIT

//! Questionnaire type definitions

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::ConditionError;

/// An ordered questionnaire. Question order defines traversal order.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    /// Unique identifier of the questionnaire
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Questionnaire {
    /// Look up a question by id
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Position of a question in traversal order
    pub fn position(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// A single question
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique identifier within the questionnaire
    pub id: String,
    /// Answer type; only consumed by presentation and validators
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    /// Prompt text
    #[serde(default)]
    pub text: String,
    /// Static required flag
    #[serde(default)]
    pub required: bool,
    /// Conditional show/hide/skip/required rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Conditional>,
}

impl Question {
    pub fn new(id: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id: id.into(),
            kind,
            text: String::new(),
            required: false,
            conditional: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_conditional(mut self, conditional: Conditional) -> Self {
        self.conditional = Some(conditional);
        self
    }
}

/// Supported answer types
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[default]
    Text,
    Number,
    Boolean,
    SingleChoice,
    MultipleChoice,
    Date,
    Email,
    Scale,
}

/// Show/hide/skip/required rules attached to a question
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conditional {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_if: Option<ConditionGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_if: Option<ConditionGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_if: Option<ConditionGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_if: Option<ConditionGroup>,
}

impl Conditional {
    /// All rule groups that are present, in show/hide/skip/required order
    pub fn groups(&self) -> impl Iterator<Item = &ConditionGroup> {
        [
            self.show_if.as_ref(),
            self.hide_if.as_ref(),
            self.skip_if.as_ref(),
            self.required_if.as_ref(),
        ]
        .into_iter()
        .flatten()
    }
}

/// A rule slot: one condition, or a list combined with AND
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ConditionGroup {
    Single(Condition),
    All(Vec<Condition>),
}

// Branches on the document shape so errors from the inner condition (such as
// an unknown operator) reach the caller unchanged.
impl<'de> Deserialize<'de> for ConditionGroup {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let group = if raw.is_array() {
            Vec::<Condition>::deserialize(raw).map(ConditionGroup::All)
        } else {
            Condition::deserialize(raw).map(ConditionGroup::Single)
        };
        group.map_err(de::Error::custom)
    }
}

impl ConditionGroup {
    /// The member conditions in evaluation order
    pub fn conditions(&self) -> &[Condition] {
        match self {
            ConditionGroup::Single(c) => std::slice::from_ref(c),
            ConditionGroup::All(v) => v,
        }
    }
}

impl From<Condition> for ConditionGroup {
    fn from(condition: Condition) -> Self {
        ConditionGroup::Single(condition)
    }
}

impl From<Vec<Condition>> for ConditionGroup {
    fn from(conditions: Vec<Condition>) -> Self {
        ConditionGroup::All(conditions)
    }
}

/// An atomic comparison against one question's answer
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub question_id: String,
    pub operator: Operator,
    /// Comparison operand for every operator except `in`/`notIn`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Candidate set for `in`/`notIn`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

impl Condition {
    pub fn new(question_id: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            question_id: question_id.into(),
            operator,
            value: Some(value),
            values: None,
        }
    }

    /// Condition for operators that take no operand (`isEmpty`, `isNotEmpty`)
    pub fn unary(question_id: impl Into<String>, operator: Operator) -> Self {
        Self {
            question_id: question_id.into(),
            operator,
            value: None,
            values: None,
        }
    }

    /// Membership condition for `in`/`notIn`
    pub fn one_of(question_id: impl Into<String>, operator: Operator, values: Vec<Value>) -> Self {
        Self {
            question_id: question_id.into(),
            operator,
            value: None,
            values: Some(values),
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Contains,
    NotContains,
    In,
    NotIn,
    Matches,
    NotMatches,
    IsEmpty,
    IsNotEmpty,
    HasLength,
    HasMinLength,
    HasMaxLength,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::GreaterThan => "greaterThan",
            Operator::LessThan => "lessThan",
            Operator::GreaterThanOrEqual => "greaterThanOrEqual",
            Operator::LessThanOrEqual => "lessThanOrEqual",
            Operator::Contains => "contains",
            Operator::NotContains => "notContains",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::Matches => "matches",
            Operator::NotMatches => "notMatches",
            Operator::IsEmpty => "isEmpty",
            Operator::IsNotEmpty => "isNotEmpty",
            Operator::HasLength => "hasLength",
            Operator::HasMinLength => "hasMinLength",
            Operator::HasMaxLength => "hasMaxLength",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "equals" => Operator::Equals,
            "notEquals" => Operator::NotEquals,
            "greaterThan" => Operator::GreaterThan,
            "lessThan" => Operator::LessThan,
            "greaterThanOrEqual" => Operator::GreaterThanOrEqual,
            "lessThanOrEqual" => Operator::LessThanOrEqual,
            "contains" => Operator::Contains,
            "notContains" => Operator::NotContains,
            "in" => Operator::In,
            "notIn" => Operator::NotIn,
            "matches" => Operator::Matches,
            "notMatches" => Operator::NotMatches,
            "isEmpty" => Operator::IsEmpty,
            "isNotEmpty" => Operator::IsNotEmpty,
            "hasLength" => Operator::HasLength,
            "hasMinLength" => Operator::HasMinLength,
            "hasMaxLength" => Operator::HasMaxLength,
            other => return Err(ConditionError::UnknownOperator(other.to_string())),
        };
        Ok(op)
    }
}

impl TryFrom<String> for Operator {
    type Error = ConditionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_display_matches_parse() {
        for op in [
            Operator::Equals,
            Operator::GreaterThanOrEqual,
            Operator::NotContains,
            Operator::NotIn,
            Operator::IsNotEmpty,
            Operator::HasMaxLength,
        ] {
            assert_eq!(op.to_string().parse::<Operator>().unwrap(), op);
        }
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let err = "between".parse::<Operator>().unwrap_err();
        assert!(matches!(err, ConditionError::UnknownOperator(ref s) if s == "between"));
    }

    #[test]
    fn test_condition_group_single() {
        let yaml = r#"
            questionId: q1
            operator: equals
            value: true
        "#;
        let group: ConditionGroup = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(group, ConditionGroup::Single(_)));
        assert_eq!(group.conditions().len(), 1);
        assert_eq!(group.conditions()[0].value, Some(json!(true)));
    }

    #[test]
    fn test_condition_group_list() {
        let yaml = r#"
            - questionId: q1
              operator: greaterThan
              value: 18
            - questionId: q2
              operator: in
              values: [a, b]
        "#;
        let group: ConditionGroup = serde_yaml::from_str(yaml).unwrap();
        let conditions = group.conditions();
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].operator, Operator::GreaterThan);
        assert_eq!(conditions[1].values, Some(vec![json!("a"), json!("b")]));
    }

    #[test]
    fn test_question_with_conditional() {
        let yaml = r#"
            id: q2
            type: text
            required: true
            conditional:
              showIf:
                questionId: q1
                operator: equals
                value: true
              skipIf:
                - questionId: q3
                  operator: isEmpty
        "#;
        let question: Question = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(question.kind, QuestionKind::Text);
        assert!(question.required);
        let conditional = question.conditional.unwrap();
        assert!(conditional.show_if.is_some());
        assert!(conditional.hide_if.is_none());
        assert_eq!(conditional.groups().count(), 2);
    }

    #[test]
    fn test_question_defaults() {
        let question: Question = serde_yaml::from_str("id: q1").unwrap();
        assert_eq!(question.kind, QuestionKind::Text);
        assert!(!question.required);
        assert!(question.conditional.is_none());
    }

    #[test]
    fn test_unknown_operator_fails_deserialization() {
        let yaml = r#"
            questionId: q1
            operator: approximately
            value: 3
        "#;
        let result: Result<Condition, _> = serde_yaml::from_str(yaml);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("approximately"));
    }

    #[test]
    fn test_questionnaire_lookup() {
        let questionnaire = Questionnaire {
            id: "survey".to_string(),
            questions: vec![
                Question::new("q1", QuestionKind::Boolean),
                Question::new("q2", QuestionKind::Text),
            ],
            ..Default::default()
        };
        assert_eq!(questionnaire.position("q2"), Some(1));
        assert!(questionnaire.question("q3").is_none());
        assert!(questionnaire.contains("q1"));
        assert_eq!(questionnaire.len(), 2);
    }

    #[test]
    fn test_condition_serializes_camel_case() {
        let condition = Condition::new("age", Operator::GreaterThanOrEqual, json!(18));
        let value = serde_json::to_value(&condition).unwrap();
        assert_eq!(
            value,
            json!({"questionId": "age", "operator": "greaterThanOrEqual", "value": 18})
        );
    }
}
