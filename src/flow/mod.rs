//! @acp:module "Flows"
//! @acp:summary "User-driven sequences of server calls"
//! @acp:domain cli
//! @acp:layer service
//!
//! User-driven flows
//!
//! Each flow is a sequence of awaited server calls with the user consulted
//! in between. Flows never hold state of their own: the form lives in a
//! [`UiState`] passed by `&mut`, and everything they show goes through an
//! [`Interaction`].

pub mod manual;
pub mod modify;
pub mod negotiation;

use std::path::PathBuf;

use tracing::{info, warn};

use crate::api::{
    CreateOutcome, Failure, FailureKind, QuestionBank, TestCreationRequest, TestId, Transport,
};
use crate::artifact::ArtifactViewer;
use crate::error::{Result, TestbankError};
use crate::ui::{Field, Interaction, Notice, UiState};

pub use manual::SearchOutcome;
pub use modify::LoadResult;
pub use negotiation::{filter_from_form, SelectionCriteria, DEFAULT_MAX_ROUNDS};

/// How a flow ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Created {
        test_id: TestId,
        artifact: Option<PathBuf>,
    },
    Updated,
    /// Local validation failed; nothing was sent
    InvalidInput(Vec<Field>),
    /// The server had no questions for the criteria
    NoQuestions,
    /// The user turned down an adjusted request
    Declined,
    Failed(FailureKind),
    /// The trigger was disabled; a flow is already running
    Ignored,
}

/// The collaborators a flow works with
pub struct Flow<'a, T, I, V> {
    pub bank: &'a QuestionBank<T>,
    pub ui: &'a mut I,
    pub viewer: &'a mut V,
}

impl<'a, T, I, V> Flow<'a, T, I, V>
where
    T: Transport,
    I: Interaction,
    V: ArtifactViewer,
{
    pub fn new(bank: &'a QuestionBank<T>, ui: &'a mut I, viewer: &'a mut V) -> Self {
        Self { bank, ui, viewer }
    }

    /// Shows a failure and returns the form to a usable state.
    ///
    /// A duplicate name keeps the inputs so the author only has to rename;
    /// every other failure resets them.
    pub(crate) fn report_failure(&mut self, state: &mut UiState, failure: &Failure) -> FlowOutcome {
        warn!(kind = %failure.kind, status = ?failure.status, "request failed");
        self.ui.hide_overlay();

        if let Some(message) = &failure.server_message {
            self.ui.notify(Notice::Error, message);
        }
        self.ui.notify(Notice::Error, failure.kind.user_message());

        if failure.kind == FailureKind::DuplicateName {
            state.mark_invalid(Field::TestName);
            state.focus(Field::TestName);
        } else {
            state.reset();
        }
        FlowOutcome::Failed(failure.kind)
    }

    pub(crate) fn no_questions(&mut self, state: &mut UiState) -> FlowOutcome {
        self.ui.hide_overlay();
        state.reset();
        self.ui
            .notify(Notice::Warning, FailureKind::NoMatchingQuestions.user_message());
        FlowOutcome::NoQuestions
    }

    /// Turns a broken request into a reported failure. Errors that are not
    /// about talking to the server are passed on.
    pub(crate) fn recover(&mut self, state: &mut UiState, err: TestbankError) -> Result<FlowOutcome> {
        match err {
            TestbankError::Http(_)
            | TestbankError::Json(_)
            | TestbankError::InvalidResponse { .. } => {
                warn!(error = %err, "request did not complete");
                self.ui.hide_overlay();
                self.ui.notify(Notice::Error, &err.to_string());
                self.ui
                    .notify(Notice::Error, FailureKind::Unspecified.user_message());
                state.reset();
                Ok(FlowOutcome::Failed(FailureKind::Unspecified))
            }
            other => Err(other),
        }
    }

    /// Persists the test, then opens its document once.
    pub(crate) async fn create_and_open(
        &mut self,
        state: &mut UiState,
        request: &TestCreationRequest,
    ) -> Result<FlowOutcome> {
        let test_id = match self.bank.create_test(request).await? {
            CreateOutcome::Created(id) => id,
            CreateOutcome::Failed(failure) => return Ok(self.report_failure(state, &failure)),
        };
        info!(%test_id, name = %request.test_name, "test created");

        self.ui.hide_overlay();
        self.ui.notify(
            Notice::Success,
            &format!("Test created successfully with ID: {}", test_id),
        );

        let artifact = match self.open_artifact(test_id).await {
            Ok(path) => path,
            Err(e) => {
                warn!(%test_id, error = %e, "could not open test document");
                self.ui.notify(
                    Notice::Warning,
                    &format!("The test document could not be opened: {}", e),
                );
                None
            }
        };

        state.reset();
        Ok(FlowOutcome::Created { test_id, artifact })
    }

    async fn open_artifact(&mut self, test_id: TestId) -> Result<Option<PathBuf>> {
        let artifact = self.bank.generate_artifact(test_id).await?;
        let path = self.viewer.open(&artifact)?;
        if let Some(path) = &path {
            self.ui
                .notify(Notice::Info, &format!("Test document: {}", path.display()));
        }
        Ok(path)
    }

    /// Alerts about invalid inputs
    pub(crate) fn invalid_input(&mut self, fields: Vec<Field>, message: &str) -> FlowOutcome {
        self.ui.notify(Notice::Error, message);
        FlowOutcome::InvalidInput(fields)
    }
}
