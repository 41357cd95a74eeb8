// SPDX-License-Identifier: MIT

//! Show/hide/skip/required decisions for a single question

use std::collections::BTreeSet;

use crate::condition;
use crate::error::ConditionError;
use crate::questionnaire::{ConditionGroup, Conditional, Question};
use crate::state::Responses;

/// True iff every condition in the group holds. Stops at the first false.
pub fn evaluate_condition_group(
    group: &ConditionGroup,
    responses: &Responses,
) -> Result<bool, ConditionError> {
    for condition in group.conditions() {
        if !condition::evaluate(condition, responses)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// A question is shown unless its `showIf` fails or its `hideIf` holds
pub fn should_show_question(
    question: &Question,
    responses: &Responses,
) -> Result<bool, ConditionError> {
    let Some(conditional) = &question.conditional else {
        return Ok(true);
    };

    if let Some(show_if) = &conditional.show_if {
        if !evaluate_condition_group(show_if, responses)? {
            return Ok(false);
        }
    }
    if let Some(hide_if) = &conditional.hide_if {
        if evaluate_condition_group(hide_if, responses)? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub fn should_skip_question(
    question: &Question,
    responses: &Responses,
) -> Result<bool, ConditionError> {
    match question
        .conditional
        .as_ref()
        .and_then(|c| c.skip_if.as_ref())
    {
        Some(skip_if) => evaluate_condition_group(skip_if, responses),
        None => Ok(false),
    }
}

/// Static `required` flag, or a `requiredIf` group that holds
pub fn is_question_required(
    question: &Question,
    responses: &Responses,
) -> Result<bool, ConditionError> {
    if question.required {
        return Ok(true);
    }
    match question
        .conditional
        .as_ref()
        .and_then(|c| c.required_if.as_ref())
    {
        Some(required_if) => evaluate_condition_group(required_if, responses),
        None => Ok(false),
    }
}

/// Every question id referenced by any rule slot
pub fn extract_dependencies(conditional: &Conditional) -> BTreeSet<String> {
    conditional
        .groups()
        .flat_map(|group| group.conditions())
        .map(|condition| condition.question_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::{Condition, Operator, QuestionKind};
    use serde_json::{json, Value};

    fn responses_with(pairs: Vec<(&str, Value)>) -> Responses {
        pairs.into_iter().collect()
    }

    fn eq(id: &str, value: Value) -> Condition {
        Condition::new(id, Operator::Equals, value)
    }

    fn question_with(conditional: Conditional) -> Question {
        Question::new("target", QuestionKind::Text).with_conditional(conditional)
    }

    #[test]
    fn test_group_is_conjunction() {
        let responses = responses_with(vec![("a", json!(1)), ("b", json!(2))]);
        let conditions = vec![eq("a", json!(1)), eq("b", json!(2)), eq("c", json!(3))];

        let expected = conditions
            .iter()
            .all(|c| condition::evaluate(c, &responses).unwrap());
        let group = ConditionGroup::All(conditions);
        assert_eq!(evaluate_condition_group(&group, &responses).unwrap(), expected);
        assert!(!expected);

        let single = ConditionGroup::Single(eq("a", json!(1)));
        assert!(evaluate_condition_group(&single, &responses).unwrap());
        assert!(evaluate_condition_group(&ConditionGroup::All(vec![]), &responses).unwrap());
    }

    #[test]
    fn test_group_short_circuits_before_bad_pattern() {
        let responses = responses_with(vec![("a", json!(1)), ("s", json!("x"))]);
        let group = ConditionGroup::All(vec![
            eq("a", json!(2)),
            Condition::new("s", Operator::Matches, json!("(")),
        ]);
        assert!(!evaluate_condition_group(&group, &responses).unwrap());
    }

    #[test]
    fn test_show_without_conditional() {
        let question = Question::new("q1", QuestionKind::Boolean);
        let responses = Responses::new();
        assert!(should_show_question(&question, &responses).unwrap());
        assert!(!should_skip_question(&question, &responses).unwrap());
        assert!(!is_question_required(&question, &responses).unwrap());
    }

    #[test]
    fn test_show_if() {
        let question = question_with(Conditional {
            show_if: Some(eq("q1", json!(true)).into()),
            ..Default::default()
        });

        assert!(should_show_question(&question, &responses_with(vec![("q1", json!(true))])).unwrap());
        assert!(!should_show_question(&question, &responses_with(vec![("q1", json!(false))])).unwrap());
        assert!(!should_show_question(&question, &Responses::new()).unwrap());
    }

    #[test]
    fn test_hide_if_wins_over_show_if() {
        let question = question_with(Conditional {
            show_if: Some(eq("q1", json!(true)).into()),
            hide_if: Some(eq("q2", json!("no")).into()),
            ..Default::default()
        });

        let shown = responses_with(vec![("q1", json!(true)), ("q2", json!("yes"))]);
        let hidden = responses_with(vec![("q1", json!(true)), ("q2", json!("no"))]);
        assert!(should_show_question(&question, &shown).unwrap());
        assert!(!should_show_question(&question, &hidden).unwrap());
    }

    #[test]
    fn test_skip_if() {
        let question = question_with(Conditional {
            skip_if: Some(Condition::unary("email", Operator::IsNotEmpty).into()),
            ..Default::default()
        });

        assert!(should_skip_question(&question, &responses_with(vec![("email", json!("a@b.c"))])).unwrap());
        assert!(!should_skip_question(&question, &Responses::new()).unwrap());
    }

    #[test]
    fn test_required_if() {
        let question = question_with(Conditional {
            required_if: Some(
                vec![
                    Condition::new("age", Operator::GreaterThanOrEqual, json!(18)),
                    eq("employed", json!(true)),
                ]
                .into(),
            ),
            ..Default::default()
        });

        let adult_employed = responses_with(vec![("age", json!(30)), ("employed", json!(true))]);
        let minor = responses_with(vec![("age", json!(12)), ("employed", json!(true))]);
        assert!(is_question_required(&question, &adult_employed).unwrap());
        assert!(!is_question_required(&question, &minor).unwrap());

        let statically_required = question.clone().required();
        assert!(is_question_required(&statically_required, &minor).unwrap());
    }

    #[test]
    fn test_extract_dependencies_flattens_all_slots() {
        let conditional = Conditional {
            show_if: Some(eq("q1", json!(true)).into()),
            hide_if: Some(vec![eq("q2", json!(1)), eq("q3", json!(2))].into()),
            skip_if: Some(Condition::unary("q1", Operator::IsEmpty).into()),
            required_if: Some(Condition::one_of("q4", Operator::In, vec![json!("x")]).into()),
        };

        let deps: Vec<String> = extract_dependencies(&conditional).into_iter().collect();
        assert_eq!(deps, vec!["q1", "q2", "q3", "q4"]);
        assert!(extract_dependencies(&Conditional::default()).is_empty());
    }
}
