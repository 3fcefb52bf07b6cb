//! @acp:module "Random Command"
//! @acp:summary "Create a test from randomly selected questions"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `testbank random`: create a test from randomly selected
//! questions.

use anyhow::{bail, Result};
use tracing::debug;

use super::{blank_fields, connect, fill_fields, CriteriaArgs, CRITERIA_FIELDS};
use crate::api::{FailureKind, QuestionBank};
use crate::artifact::FileViewer;
use crate::config::Config;
use crate::flow::{Flow, FlowOutcome};
use crate::ui::{Field, FormInputs, Interaction, TerminalInteraction, UiState};

const REQUIRED: [Field; 4] = [
    Field::QuestionCount,
    Field::MaxPoints,
    Field::TestName,
    Field::TestDescription,
];

/// Options for the random command
#[derive(Debug, Clone, Default)]
pub struct RandomOptions {
    pub criteria: CriteriaArgs,
    /// Number of questions
    pub count: Option<u32>,
    /// Total point budget
    pub max_points: Option<u32>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Publish the test right away
    pub active: bool,
    /// Skip interactive prompts
    pub yes: bool,
}

impl RandomOptions {
    fn form(&self) -> FormInputs {
        let mut form = FormInputs {
            question_count: self.count.map(|n| n.to_string()).unwrap_or_default(),
            max_points: self.max_points.map(|n| n.to_string()).unwrap_or_default(),
            test_name: self.name.clone().unwrap_or_default(),
            test_description: self.description.clone().unwrap_or_default(),
            is_active: self.active,
            ..FormInputs::default()
        };
        self.criteria.apply(&mut form);
        form
    }
}

/// Execute the random command
pub async fn execute_random(options: RandomOptions, config: &Config) -> Result<()> {
    let bank = QuestionBank::new(connect(config)?, config.endpoints.clone());
    let mut ui = TerminalInteraction::new(options.yes);
    let mut viewer = FileViewer::new(config.artifact_dir(), config.open_artifacts);
    let mut state = UiState::new(options.form());
    let interactive = ui.is_interactive();

    if interactive {
        let missing = blank_fields(&mut state, &REQUIRED);
        fill_fields(&mut ui, &mut state, &missing)?;
    }

    loop {
        let outcome = Flow::new(&bank, &mut ui, &mut viewer)
            .create_random(&mut state, config.max_negotiation_rounds)
            .await?;
        debug!(?outcome, "random creation settled");

        let ask: Vec<Field> = match &outcome {
            FlowOutcome::Created { .. } | FlowOutcome::Updated => return Ok(()),
            FlowOutcome::InvalidInput(fields) => fields.clone(),
            FlowOutcome::Failed(FailureKind::DuplicateName) => vec![Field::TestName],
            FlowOutcome::NoQuestions | FlowOutcome::Declined | FlowOutcome::Failed(_)
                if interactive && ui.confirm("Start over with new criteria?")? =>
            {
                CRITERIA_FIELDS.iter().chain(REQUIRED.iter()).copied().collect()
            }
            _ => Vec::new(),
        };

        if !interactive || ask.is_empty() {
            return match outcome {
                FlowOutcome::Declined => Ok(()),
                _ => bail!("No test was created"),
            };
        }
        fill_fields(&mut ui, &mut state, &ask)?;
    }
}
