//! @acp:module "Manual Flow"
//! @acp:summary "Search and manual test creation"
//! @acp:domain cli
//! @acp:layer service
//!
//! Manual test creation: search the bank, pick questions, create

use tracing::info;

use super::negotiation::filter_from_form;
use super::{Flow, FlowOutcome};
use crate::api::{PoolOutcome, PoolQuery, Question, TestType, Transport};
use crate::artifact::ArtifactViewer;
use crate::compose::{prepare_creation, TestDraft, REQUIRED_FIELDS_MESSAGE};
use crate::error::Result;
use crate::ui::{positive_number, Field, Interaction, UiState};

const QUESTION_POINTS_MESSAGE: &str =
    "Please ensure the maximum points for a question is a valid number greater than 0.";

/// Result of a question search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Vec<Question>),
    /// The search ended the flow (invalid input, nothing found, failure)
    Ended(FlowOutcome),
}

impl<T, I, V> Flow<'_, T, I, V>
where
    T: Transport,
    I: Interaction,
    V: ArtifactViewer,
{
    /// Questions matching the dropdowns whose points do not exceed the
    /// per-question cap
    pub async fn search(&mut self, state: &mut UiState) -> Result<SearchOutcome> {
        let cap = positive_number(&state.form.question_max_points);
        if !state.check(Field::QuestionMaxPoints, cap.is_some()) {
            let outcome = self.invalid_input(vec![Field::QuestionMaxPoints], QUESTION_POINTS_MESSAGE);
            return Ok(SearchOutcome::Ended(outcome));
        }

        let query = PoolQuery {
            filter: filter_from_form(&state.form),
            test_type: TestType::Manual,
            question_max_points: cap,
        };

        self.ui.show_overlay("Searching questions...");
        let result = self.bank.request_pool(&query).await;
        self.ui.hide_overlay();

        let outcome = match result {
            Ok(PoolOutcome::Pool(questions)) => {
                info!(found = questions.len(), "search returned questions");
                SearchOutcome::Found(questions)
            }
            Ok(PoolOutcome::Empty) => SearchOutcome::Ended(self.no_questions(state)),
            Ok(PoolOutcome::Failed(failure)) => {
                SearchOutcome::Ended(self.report_failure(state, &failure))
            }
            Err(e) => SearchOutcome::Ended(self.recover(state, e)?),
        };
        Ok(outcome)
    }

    /// Creates a test from a hand-picked draft
    pub async fn create_manual(
        &mut self,
        state: &mut UiState,
        draft: &TestDraft,
    ) -> Result<FlowOutcome> {
        if !state.trigger_enabled() {
            return Ok(FlowOutcome::Ignored);
        }

        let request = match prepare_creation(draft, state) {
            Ok(request) => request,
            Err(fields) => return Ok(self.invalid_input(fields, REQUIRED_FIELDS_MESSAGE)),
        };

        state.disable_trigger();
        self.ui.show_overlay("Creating test...");
        let result = self.create_and_open(state, &request).await;
        self.ui.hide_overlay();
        state.enable_trigger();

        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) => self.recover(state, e),
        }
    }
}
