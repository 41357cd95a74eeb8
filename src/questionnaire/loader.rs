// SPDX-License-Identifier: MIT

//! Questionnaire loader - YAML/JSON file loading and parsing

use super::types::Questionnaire;
use crate::error::LoadError;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Loads questionnaire definitions from YAML or JSON files
pub struct QuestionnaireLoader;

impl QuestionnaireLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a questionnaire from a file. JSON is accepted since it is valid YAML.
    pub fn load_questionnaire<P: AsRef<Path>>(&self, path: P) -> Result<Questionnaire, LoadError> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a questionnaire from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Questionnaire, LoadError> {
        let questionnaire: Questionnaire = serde_yaml::from_str(content)?;
        Self::check_ids(&questionnaire)?;
        log::debug!(
            "Parsed questionnaire '{}' with {} questions",
            questionnaire.id,
            questionnaire.len()
        );
        Ok(questionnaire)
    }

    fn check_ids(questionnaire: &Questionnaire) -> Result<(), LoadError> {
        let mut seen = HashSet::new();
        for question in &questionnaire.questions {
            if question.id.trim().is_empty() {
                return Err(LoadError::EmptyQuestionId(questionnaire.id.clone()));
            }
            if !seen.insert(question.id.as_str()) {
                return Err(LoadError::DuplicateQuestion {
                    questionnaire: questionnaire.id.clone(),
                    question: question.id.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for QuestionnaireLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::{ConditionGroup, Operator, QuestionKind};

    #[test]
    fn test_parse_linear_questionnaire() {
        let yaml = r#"
id: onboarding
title: Onboarding
questions:
  - id: name
    type: text
    required: true
  - id: age
    type: number
"#;
        let questionnaire = QuestionnaireLoader::parse_yaml(yaml).unwrap();
        assert_eq!(questionnaire.id, "onboarding");
        assert_eq!(questionnaire.title, "Onboarding");
        assert_eq!(questionnaire.len(), 2);
        assert!(questionnaire.questions[0].required);
        assert_eq!(questionnaire.questions[1].kind, QuestionKind::Number);
    }

    #[test]
    fn test_parse_conditional_questionnaire() {
        let yaml = r#"
id: pets
questions:
  - id: has_pets
    type: boolean
  - id: pet_names
    type: text
    conditional:
      showIf:
        questionId: has_pets
        operator: equals
        value: true
      requiredIf:
        - questionId: has_pets
          operator: equals
          value: true
        - questionId: pet_count
          operator: greaterThan
          value: 0
"#;
        let questionnaire = QuestionnaireLoader::parse_yaml(yaml).unwrap();
        let conditional = questionnaire.questions[1].conditional.as_ref().unwrap();
        match conditional.show_if.as_ref().unwrap() {
            ConditionGroup::Single(c) => assert_eq!(c.operator, Operator::Equals),
            ConditionGroup::All(_) => panic!("Expected Single, got All"),
        }
        assert_eq!(
            conditional.required_if.as_ref().unwrap().conditions().len(),
            2
        );
    }

    #[test]
    fn test_parse_json_document() {
        let json = r#"{"id": "j", "questions": [{"id": "q1", "type": "email"}]}"#;
        let questionnaire = QuestionnaireLoader::parse_yaml(json).unwrap();
        assert_eq!(questionnaire.questions[0].kind, QuestionKind::Email);
    }

    #[test]
    fn test_duplicate_question_ids_rejected() {
        let yaml = r#"
id: dup
questions:
  - id: q1
  - id: q1
"#;
        let err = QuestionnaireLoader::parse_yaml(yaml).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateQuestion { ref question, .. } if question == "q1"));
    }

    #[test]
    fn test_empty_question_id_rejected() {
        let yaml = r#"
id: blank
questions:
  - id: ""
"#;
        let err = QuestionnaireLoader::parse_yaml(yaml).unwrap_err();
        assert!(matches!(err, LoadError::EmptyQuestionId(_)));
    }

    #[test]
    fn test_invalid_yaml_returns_error() {
        let yaml = r#"
id:
  - invalid structure
"#;
        assert!(QuestionnaireLoader::parse_yaml(yaml).is_err());
    }

    #[test]
    fn test_unknown_operator_in_questionnaire_named_in_error() {
        let yaml = r#"
id: pets
questions:
  - id: q1
    type: number
  - id: q2
    type: text
    conditional:
      showIf:
        questionId: q1
        operator: approximately
        value: 3
"#;
        let err = QuestionnaireLoader::parse_yaml(yaml).unwrap_err().to_string();
        assert!(err.contains("Unknown condition operator: approximately"), "{}", err);
    }

    #[test]
    fn test_unknown_operator_in_condition_list_named_in_error() {
        let yaml = r#"
id: pets
questions:
  - id: q1
    type: number
  - id: q2
    type: text
    conditional:
      skipIf:
        - questionId: q1
          operator: isEmpty
        - questionId: q1
          operator: roughly
          value: 3
"#;
        let err = QuestionnaireLoader::parse_yaml(yaml).unwrap_err().to_string();
        assert!(err.contains("roughly"), "{}", err);
    }

    #[test]
    fn test_missing_file_returns_io_error() {
        let loader = QuestionnaireLoader::new();
        let err = loader
            .load_questionnaire("/nonexistent/questionnaire.yaml")
            .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
