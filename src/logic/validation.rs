// SPDX-License-Identifier: MIT

//! Structural validation of a questionnaire's conditional logic

use serde::Serialize;
use std::fmt;

use super::rules::extract_dependencies;
use crate::graph::DependencyGraph;
use crate::questionnaire::Questionnaire;

/// A problem found in a questionnaire's conditional logic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogicIssue {
    /// Dependency cycle, as a closed path
    Cycle { path: Vec<String> },
    /// A condition reads a question that does not exist
    UnknownReference { question: String, dependency: String },
    /// A question's conditions read its own answer
    SelfReference { question: String },
    /// `showIf` reads a later question, so the answer cannot exist yet
    /// under linear traversal
    PotentiallyUnreachable { question: String, dependency: String },
}

impl fmt::Display for LogicIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicIssue::Cycle { path } => {
                write!(f, "Circular dependency detected: {}", path.join(" -> "))
            }
            LogicIssue::UnknownReference {
                question,
                dependency,
            } => write!(
                f,
                "Question '{}' references non-existent question '{}'",
                question, dependency
            ),
            LogicIssue::SelfReference { question } => {
                write!(f, "Question '{}' references itself", question)
            }
            LogicIssue::PotentiallyUnreachable {
                question,
                dependency,
            } => write!(
                f,
                "Question '{}' may be unreachable: it depends on later question '{}'",
                question, dependency
            ),
        }
    }
}

/// Accumulated result of `validate_conditional_logic`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<LogicIssue>,
    pub warnings: Vec<LogicIssue>,
}

impl ValidationReport {
    pub fn new(errors: Vec<LogicIssue>, warnings: Vec<LogicIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Edge `question -> dependency` for every dependency of every question
pub fn build_dependency_graph(questionnaire: &Questionnaire) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for question in &questionnaire.questions {
        if let Some(conditional) = &question.conditional {
            for dep in extract_dependencies(conditional) {
                graph.add_dependency(&question.id, &dep);
            }
        }
    }
    graph
}

/// Check cycles, dangling and self references, and forward `showIf`
/// references. Never fails; every problem is collected.
pub fn validate_conditional_logic(questionnaire: &Questionnaire) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let graph = build_dependency_graph(questionnaire);
    for path in graph.find_cycles() {
        errors.push(LogicIssue::Cycle { path });
    }

    for (position, question) in questionnaire.questions.iter().enumerate() {
        let Some(conditional) = &question.conditional else {
            continue;
        };
        let dependencies = extract_dependencies(conditional);

        for dep in &dependencies {
            if !questionnaire.contains(dep) {
                errors.push(LogicIssue::UnknownReference {
                    question: question.id.clone(),
                    dependency: dep.clone(),
                });
            }
        }

        if dependencies.contains(&question.id) {
            errors.push(LogicIssue::SelfReference {
                question: question.id.clone(),
            });
        }

        // Only showIf is considered for forward references
        if conditional.show_if.is_some() {
            let forward = dependencies.iter().find(|dep| {
                questionnaire
                    .position(dep)
                    .is_some_and(|dep_position| dep_position > position)
            });
            if let Some(dep) = forward {
                warnings.push(LogicIssue::PotentiallyUnreachable {
                    question: question.id.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }

    if !errors.is_empty() {
        log::warn!(
            "Questionnaire '{}' has {} conditional logic error(s)",
            questionnaire.id,
            errors.len()
        );
    }
    ValidationReport::new(errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::{Condition, Conditional, Operator, Question, QuestionKind};
    use serde_json::json;

    fn show_if(id: &str, dep: &str) -> Question {
        Question::new(id, QuestionKind::Text).with_conditional(Conditional {
            show_if: Some(Condition::new(dep, Operator::Equals, json!(true)).into()),
            ..Default::default()
        })
    }

    fn skip_if(id: &str, dep: &str) -> Question {
        Question::new(id, QuestionKind::Text).with_conditional(Conditional {
            skip_if: Some(Condition::unary(dep, Operator::IsEmpty).into()),
            ..Default::default()
        })
    }

    fn plain(id: &str) -> Question {
        Question::new(id, QuestionKind::Boolean)
    }

    fn questionnaire(questions: Vec<Question>) -> Questionnaire {
        Questionnaire {
            id: "test".to_string(),
            questions,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_dependency_graph() {
        let q = questionnaire(vec![plain("q1"), show_if("q2", "q1"), skip_if("q3", "q2")]);
        let graph = build_dependency_graph(&q);

        assert_eq!(graph.size(), 2);
        assert_eq!(graph.get_dependencies("q2"), vec!["q1".to_string()]);
        assert!(graph.has_path("q3", "q1"));
    }

    #[test]
    fn test_valid_questionnaire() {
        let q = questionnaire(vec![plain("q1"), show_if("q2", "q1"), plain("q3")]);
        let report = validate_conditional_logic(&q);

        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_dangling_reference_single_error() {
        let q = questionnaire(vec![plain("q1"), show_if("q2", "q5"), plain("q3")]);
        let report = validate_conditional_logic(&q);

        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
        let message = report.errors[0].to_string();
        assert!(message.contains("q2"));
        assert!(message.contains("q5"));
    }

    #[test]
    fn test_cycle_is_error() {
        let q = questionnaire(vec![show_if("a", "b"), skip_if("b", "a")]);
        let report = validate_conditional_logic(&q);

        assert!(!report.is_valid);
        let cycles: Vec<&LogicIssue> = report
            .errors
            .iter()
            .filter(|e| matches!(e, LogicIssue::Cycle { .. }))
            .collect();
        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].to_string().contains("a -> b -> a"));
    }

    #[test]
    fn test_self_reference_reported_separately() {
        let q = questionnaire(vec![skip_if("q1", "q1")]);
        let report = validate_conditional_logic(&q);

        assert!(report
            .errors
            .contains(&LogicIssue::SelfReference {
                question: "q1".to_string()
            }));
        assert!(report.errors.contains(&LogicIssue::Cycle {
            path: vec!["q1".to_string(), "q1".to_string()]
        }));
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_forward_show_if_is_warning() {
        let q = questionnaire(vec![show_if("q1", "q2"), plain("q2")]);
        let report = validate_conditional_logic(&q);

        assert!(report.is_valid);
        assert_eq!(
            report.warnings,
            vec![LogicIssue::PotentiallyUnreachable {
                question: "q1".to_string(),
                dependency: "q2".to_string()
            }]
        );
    }

    #[test]
    fn test_forward_skip_if_not_warned() {
        let q = questionnaire(vec![skip_if("q1", "q2"), plain("q2")]);
        let report = validate_conditional_logic(&q);

        assert!(report.is_valid);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_report_serializes() {
        let q = questionnaire(vec![show_if("q2", "q5")]);
        let value = serde_json::to_value(validate_conditional_logic(&q)).unwrap();

        assert_eq!(value["isValid"], json!(false));
        assert_eq!(value["errors"][0]["kind"], json!("unknown_reference"));
        assert_eq!(value["errors"][0]["dependency"], json!("q5"));
    }
}
