//! @acp:module "Selection Negotiation"
//! @acp:summary "Randomized selection with shortfall retries"
//! @acp:domain cli
//! @acp:layer logic
//!
//! Randomized test creation
//!
//! The server picks questions in two steps. First the filter yields a pool,
//! then the server chooses `count` questions from it whose points stay under
//! the budget. When it cannot, it says what it could do instead (a
//! shortfall) and the user decides whether to accept the reduced request.
//! Accepted adjustments are retried until a selection comes back, the user
//! declines, or the round limit runs out.

use tracing::{debug, info, warn};

use super::{Flow, FlowOutcome};
use crate::api::wire::single_choice;
use crate::api::{
    Failure, FailureKind, Limits, PoolOutcome, PoolQuery, Question, QuestionFilter,
    SubsetOutcome, TestCreationRequest, TestMetadata, TestType, Transport,
};
use crate::artifact::ArtifactViewer;
use crate::compose::{validate_metadata, REQUIRED_FIELDS_MESSAGE};
use crate::error::Result;
use crate::ui::{positive_number, Field, FormInputs, Interaction, Notice, UiState};

/// Shortfall rounds allowed before giving up
pub const DEFAULT_MAX_ROUNDS: u32 = 5;

const SELECTING: &str = "Selecting questions...";
const CREATING: &str = "Creating test...";

/// What the author asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCriteria {
    pub filter: QuestionFilter,
    pub limits: Limits,
}

impl SelectionCriteria {
    /// Reads the criteria from the form, marking every field that does not
    /// parse.
    pub fn from_form(state: &mut UiState) -> std::result::Result<Self, Vec<Field>> {
        let count = positive_number(&state.form.question_count);
        let max_points = positive_number(&state.form.max_points);

        let mut invalid = Vec::new();
        if !state.check(Field::QuestionCount, count.is_some()) {
            invalid.push(Field::QuestionCount);
        }
        if !state.check(Field::MaxPoints, max_points.is_some()) {
            invalid.push(Field::MaxPoints);
        }

        match (count, max_points) {
            (Some(count), Some(max_points)) => Ok(Self {
                filter: filter_from_form(&state.form),
                limits: Limits { count, max_points },
            }),
            _ => Err(invalid),
        }
    }
}

/// Category filter from the dropdowns; "all" leaves a category open
pub fn filter_from_form(form: &FormInputs) -> QuestionFilter {
    QuestionFilter {
        blooms_taxonomy: QuestionFilter::choice(&form.blooms_taxonomy),
        subjects: QuestionFilter::choice(&form.subject),
        topics: QuestionFilter::choice(&form.topic),
        question_types: QuestionFilter::choice(&form.question_type),
        question_difficulties: QuestionFilter::choice(&form.question_difficulty),
        training_level: single_choice(&form.training_level),
    }
}

fn metadata_from_form(form: &FormInputs) -> TestMetadata {
    TestMetadata {
        name: form.test_name.clone(),
        description: form.test_description.clone(),
        is_active: form.is_active,
    }
}

impl<T, I, V> Flow<'_, T, I, V>
where
    T: Transport,
    I: Interaction,
    V: ArtifactViewer,
{
    /// Builds a test from randomly selected questions.
    ///
    /// The trigger stays disabled and the overlay shown until the flow
    /// settles, whatever the outcome.
    pub async fn create_random(
        &mut self,
        state: &mut UiState,
        max_rounds: u32,
    ) -> Result<FlowOutcome> {
        if !state.trigger_enabled() {
            debug!("random creation already running");
            return Ok(FlowOutcome::Ignored);
        }

        let criteria = SelectionCriteria::from_form(state);
        let metadata_ok = validate_metadata(state);
        let criteria = match criteria {
            Ok(criteria) if metadata_ok => criteria,
            _ => {
                let fields = state.invalid_fields();
                return Ok(self.invalid_input(fields, REQUIRED_FIELDS_MESSAGE));
            }
        };
        let metadata = metadata_from_form(&state.form);

        state.disable_trigger();
        self.ui.show_overlay(SELECTING);
        let result = self.negotiate(state, &criteria, &metadata, max_rounds).await;
        self.ui.hide_overlay();
        state.enable_trigger();

        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) => self.recover(state, e),
        }
    }

    async fn negotiate(
        &mut self,
        state: &mut UiState,
        criteria: &SelectionCriteria,
        metadata: &TestMetadata,
        max_rounds: u32,
    ) -> Result<FlowOutcome> {
        let query = PoolQuery {
            filter: criteria.filter.clone(),
            test_type: TestType::Random,
            question_max_points: None,
        };

        let pool: Vec<Question> = match self.bank.request_pool(&query).await? {
            PoolOutcome::Pool(pool) => pool,
            PoolOutcome::Empty => return Ok(self.no_questions(state)),
            PoolOutcome::Failed(failure) => return Ok(self.report_failure(state, &failure)),
        };
        info!(pool = pool.len(), "question pool retrieved");

        let max_rounds = max_rounds.max(1);
        let mut limits = criteria.limits;
        for round in 1..=max_rounds {
            let shortfall = match self.bank.select_subset(&pool, limits).await? {
                SubsetOutcome::Selected(selection) => {
                    debug!(round, picked = selection.question_order.len(), "subset selected");
                    let request =
                        TestCreationRequest::from_selection(selection, metadata, TestType::Random);
                    self.ui.show_overlay(CREATING);
                    return self.create_and_open(state, &request).await;
                }
                SubsetOutcome::Shortfall(shortfall) => shortfall,
                SubsetOutcome::Failed(failure) => return Ok(self.report_failure(state, &failure)),
            };

            let Some(adjusted) = shortfall.adjust(limits) else {
                warn!(round, reason = ?shortfall.reason, "shortfall without usable limits");
                let failure = Failure {
                    kind: FailureKind::NoValidCombination,
                    status: None,
                    server_message: shortfall.server_message.clone(),
                };
                return Ok(self.report_failure(state, &failure));
            };
            // An accepted adjustment always gets its retry
            if round == max_rounds {
                break;
            }

            self.ui.hide_overlay();
            if !self.ui.confirm(&shortfall.describe(limits, adjusted))? {
                info!(round, "adjusted selection declined");
                state.reset();
                self.ui.notify(Notice::Info, "Test creation cancelled.");
                return Ok(FlowOutcome::Declined);
            }

            info!(
                round,
                count = adjusted.count,
                max_points = adjusted.max_points,
                "retrying with adjusted limits"
            );
            state.form.question_count = adjusted.count.to_string();
            state.form.max_points = adjusted.max_points.to_string();
            limits = adjusted;
            self.ui.show_overlay(SELECTING);
        }

        warn!(max_rounds, "selection did not converge");
        Ok(self.report_failure(state, &Failure::local(FailureKind::NoValidCombination)))
    }
}
