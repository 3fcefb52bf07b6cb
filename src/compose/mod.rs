//! @acp:module "Composition"
//! @acp:summary "Hand-assembled test drafts and their validation"
//! @acp:domain cli
//! @acp:layer model
//!
//! Hand-assembled tests
//!
//! A [`TestDraft`] is the list of questions picked for a test, each with the
//! position the author gave it. Drafts are built from search results for new
//! tests and from a loaded test when modifying one.

pub mod modify;

use crate::api::{
    LoadedQuestion, Question, QuestionId, QuestionOrder, TestCreationRequest, TestType,
};
use crate::ui::{Field, UiState};

/// Alert shown when any required field is missing or malformed
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all the required fields correctly.";

/// One selected question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRow {
    pub question_id: QuestionId,
    pub max_points: u32,
    pub description: Option<String>,
    /// Position in the test, `None` until the author sets one
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestDraft {
    rows: Vec<DraftRow>,
}

impl TestDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a draft from an existing test, keeping its orders
    pub fn from_loaded(questions: &[LoadedQuestion]) -> Self {
        let mut draft = Self::new();
        for q in questions {
            if draft.contains(q.question_id) {
                continue;
            }
            draft.rows.push(DraftRow {
                question_id: q.question_id,
                max_points: q.max_points,
                description: q.question_desc.clone(),
                order: q.question_order,
            });
        }
        draft
    }

    /// Appends `question` without an order. Returns false if it is already
    /// part of the draft.
    pub fn add(&mut self, question: &Question) -> bool {
        if self.contains(question.question_id) {
            return false;
        }
        self.rows.push(DraftRow {
            question_id: question.question_id,
            max_points: question.max_points,
            description: question.question_desc.clone(),
            order: None,
        });
        true
    }

    pub fn remove(&mut self, id: QuestionId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.question_id != id);
        self.rows.len() != before
    }

    pub fn set_order(&mut self, id: QuestionId, order: Option<u32>) -> bool {
        match self.rows.iter_mut().find(|row| row.question_id == id) {
            Some(row) => {
                row.order = order;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.rows.iter().any(|row| row.question_id == id)
    }

    pub fn rows(&self) -> &[DraftRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_points(&self) -> u32 {
        self.rows.iter().map(|row| row.max_points).sum()
    }

    /// Orders for a creation request. `None` if any row lacks a valid order.
    pub fn question_order(&self) -> Option<Vec<QuestionOrder>> {
        self.rows
            .iter()
            .map(|row| {
                row.order.filter(|n| *n > 0).map(|order| QuestionOrder {
                    question_id: row.question_id,
                    question_order: order,
                })
            })
            .collect()
    }
}

/// Checks the name and description inputs, marking each that is blank
pub fn validate_metadata(state: &mut UiState) -> bool {
    let name_ok = !state.form.test_name.trim().is_empty();
    let description_ok = !state.form.test_description.trim().is_empty();
    state.check(Field::TestName, name_ok);
    state.check(Field::TestDescription, description_ok);
    name_ok && description_ok
}

/// Validates a manual draft and the metadata inputs and builds the creation
/// request. On failure every offending field is marked on `state` and
/// returned.
pub fn prepare_creation(
    draft: &TestDraft,
    state: &mut UiState,
) -> Result<TestCreationRequest, Vec<Field>> {
    let mut invalid = Vec::new();

    if !state.check(Field::Questions, !draft.is_empty()) {
        invalid.push(Field::Questions);
    }
    for row in draft.rows() {
        let field = Field::QuestionOrder(row.question_id);
        if !state.check(field, row.order.is_some_and(|n| n > 0)) {
            invalid.push(field);
        }
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

    let question_order = draft.question_order().ok_or_else(Vec::new)?;
    Ok(TestCreationRequest {
        question_order,
        total_score: draft.total_points(),
        test_name: state.form.test_name.trim().to_string(),
        is_active: state.form.is_active,
        test_description: state.form.test_description.trim().to_string(),
        test_type: TestType::Manual,
    })
}
