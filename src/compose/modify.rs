//! @acp:module "Modify Composition"
//! @acp:summary "Form seeding and update requests for existing tests"
//! @acp:domain cli
//! @acp:layer model
//!
//! Editing an existing test

use super::{validate_metadata, TestDraft};
use crate::api::{LoadedTest, ModifyOrder, ModifyRequest, TestId, TestType};
use crate::ui::{Field, UiState};

/// Copies the loaded test's metadata into the form
pub fn seed_form(test: &LoadedTest, state: &mut UiState) {
    if let Some(name) = &test.test_name {
        state.form.test_name = name.clone();
    }
    if let Some(description) = &test.test_description {
        state.form.test_description = description.clone();
    }
    if let Some(active) = test.is_active {
        state.form.is_active = active;
    }
}

/// Builds the update request. Rows without a usable order go out as null;
/// the server decides what to do with them.
pub fn prepare_update(
    draft: &TestDraft,
    state: &mut UiState,
    test_id: TestId,
) -> Result<ModifyRequest, Vec<Field>> {
    let mut invalid = Vec::new();
    if !state.check(Field::Questions, !draft.is_empty()) {
        invalid.push(Field::Questions);
    }
    if !validate_metadata(state) {
        invalid.extend(
            [Field::TestName, Field::TestDescription]
                .into_iter()
                .filter(|f| state.is_invalid(*f)),
        );
    }
    if !invalid.is_empty() {
        return Err(invalid);
    }

    Ok(ModifyRequest {
        question_order: draft
            .rows()
            .iter()
            .map(|row| ModifyOrder {
                question_id: row.question_id,
                question_order: row.order.filter(|n| *n > 0),
            })
            .collect(),
        total_score: draft.total_points(),
        test_name: state.form.test_name.trim().to_string(),
        is_active: state.form.is_active,
        test_description: state.form.test_description.trim().to_string(),
        test_type: TestType::Manual,
        test_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{LoadedQuestion, QuestionId};
    use serde_json::json;

    fn loaded() -> LoadedTest {
        LoadedTest {
            question_order: vec![
                LoadedQuestion {
                    question_id: QuestionId(3),
                    question_order: Some(1),
                    max_points: 4,
                    question_desc: None,
                },
                LoadedQuestion {
                    question_id: QuestionId(8),
                    question_order: None,
                    max_points: 6,
                    question_desc: None,
                },
            ],
            total_score: Some(10),
            test_name: Some("Midterm".to_string()),
            test_description: Some("Chapters 1-4".to_string()),
            is_active: Some(true),
        }
    }

    #[test]
    fn test_seed_form_copies_metadata() {
        let mut state = UiState::default();
        seed_form(&loaded(), &mut state);
        assert_eq!(state.form.test_name, "Midterm");
        assert_eq!(state.form.test_description, "Chapters 1-4");
        assert!(state.form.is_active);
    }

    #[test]
    fn test_unset_orders_are_sent_as_null() {
        let test = loaded();
        let draft = TestDraft::from_loaded(&test.question_order);
        let mut state = UiState::default();
        seed_form(&test, &mut state);

        let request = prepare_update(&draft, &mut state, TestId(12)).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["testId"], json!(12));
        assert_eq!(body["test_type"], json!("manual"));
        assert_eq!(body["total_score"], json!(10));
        assert_eq!(body["question_order"][1]["question_order"], json!(null));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let draft = TestDraft::from_loaded(&loaded().question_order);
        let mut state = UiState::default();
        state.form.test_description = "desc".to_string();

        let invalid = prepare_update(&draft, &mut state, TestId(1)).unwrap_err();
        assert_eq!(invalid, vec![Field::TestName]);
    }
}
