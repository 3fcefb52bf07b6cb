//! @acp:module "Modify Flow"
//! @acp:summary "Loading and updating an existing test"
//! @acp:domain cli
//! @acp:layer service
//!
//! Modifying an existing test

use tracing::{info, warn};

use super::{Flow, FlowOutcome};
use crate::api::{Failure, FailureKind, LoadOutcome, SubmitOutcome, TestId, Transport};
use crate::artifact::ArtifactViewer;
use crate::compose::modify::{prepare_update, seed_form};
use crate::compose::{TestDraft, REQUIRED_FIELDS_MESSAGE};
use crate::error::{Result, TestbankError};
use crate::ui::{Interaction, Notice, UiState};

const NETWORK_MESSAGE: &str = "An error occurred while processing your request. Please check your network connection and try again.";

/// Result of loading a test for editing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    Loaded(TestDraft),
    Ended(FlowOutcome),
}

fn failure_text(failure: &Failure) -> &str {
    failure
        .server_message
        .as_deref()
        .unwrap_or_else(|| failure.kind.user_message())
}

fn is_network(err: &TestbankError) -> bool {
    matches!(
        err,
        TestbankError::Http(_) | TestbankError::Json(_) | TestbankError::InvalidResponse { .. }
    )
}

impl<T, I, V> Flow<'_, T, I, V>
where
    T: Transport,
    I: Interaction,
    V: ArtifactViewer,
{
    /// Loads `test_id` into a draft and copies its metadata into the form
    pub async fn load_for_modify(
        &mut self,
        state: &mut UiState,
        test_id: TestId,
    ) -> Result<LoadResult> {
        self.ui.show_overlay("Loading test...");
        let result = self.bank.load_test(test_id).await;
        self.ui.hide_overlay();

        let test = match result {
            Ok(LoadOutcome::Loaded(test)) => test,
            Ok(LoadOutcome::Failed(failure)) => {
                warn!(%test_id, kind = %failure.kind, "loading test failed");
                self.ui.notify(
                    Notice::Error,
                    &format!(
                        "An error occurred while retrieving questions: {}",
                        failure_text(&failure)
                    ),
                );
                return Ok(LoadResult::Ended(FlowOutcome::Failed(failure.kind)));
            }
            Err(e) if is_network(&e) => {
                warn!(%test_id, error = %e, "loading test failed");
                self.ui.notify(
                    Notice::Error,
                    &format!("An error occurred while retrieving questions: {}", e),
                );
                return Ok(LoadResult::Ended(FlowOutcome::Failed(FailureKind::Unspecified)));
            }
            Err(e) => return Err(e),
        };

        if test.question_order.is_empty() {
            self.ui
                .notify(Notice::Warning, "No questions found for the provided test.");
            return Ok(LoadResult::Ended(FlowOutcome::NoQuestions));
        }

        info!(%test_id, questions = test.question_order.len(), "test loaded");
        seed_form(&test, state);
        Ok(LoadResult::Loaded(TestDraft::from_loaded(&test.question_order)))
    }

    /// Sends the edited draft back to the server
    pub async fn submit_modify(
        &mut self,
        state: &mut UiState,
        draft: &TestDraft,
        test_id: TestId,
    ) -> Result<FlowOutcome> {
        let request = match prepare_update(draft, state, test_id) {
            Ok(request) => request,
            Err(fields) => return Ok(self.invalid_input(fields, REQUIRED_FIELDS_MESSAGE)),
        };

        self.ui.show_overlay("Saving test...");
        let result = self.bank.update_test(&request).await;
        self.ui.hide_overlay();

        match result {
            Ok(SubmitOutcome::Accepted) => {
                info!(%test_id, "test updated");
                self.ui.notify(Notice::Success, "Test updated successfully!");
                Ok(FlowOutcome::Updated)
            }
            Ok(SubmitOutcome::Failed(failure)) => {
                warn!(%test_id, kind = %failure.kind, "update rejected");
                self.ui.notify(
                    Notice::Error,
                    &format!(
                        "An error occurred while creating the test: {}",
                        failure_text(&failure)
                    ),
                );
                Ok(FlowOutcome::Failed(failure.kind))
            }
            Err(e) if is_network(&e) => {
                warn!(%test_id, error = %e, "update request failed");
                self.ui.notify(Notice::Error, NETWORK_MESSAGE);
                Ok(FlowOutcome::Failed(FailureKind::Unspecified))
            }
            Err(e) => Err(e),
        }
    }
}
