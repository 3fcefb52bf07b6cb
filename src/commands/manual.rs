//! @acp:module "Manual Command"
//! @acp:summary "Create a test from hand-picked questions"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `testbank manual`: search the bank, pick questions and create
//! a test from them.

use anyhow::{bail, Result};
use console::style;

use super::{
    apply_picks, blank_fields, choose_questions, connect, fill_fields, fill_orders, print_draft,
    question_label, CriteriaArgs, CRITERIA_FIELDS,
};
use crate::api::{FailureKind, QuestionBank};
use crate::artifact::FileViewer;
use crate::compose::TestDraft;
use crate::config::Config;
use crate::flow::{Flow, FlowOutcome, SearchOutcome};
use crate::ui::{Field, FormInputs, Interaction, TerminalInteraction, UiState};

/// Options for the manual command
#[derive(Debug, Clone, Default)]
pub struct ManualOptions {
    pub criteria: CriteriaArgs,
    /// Highest point value a listed question may have
    pub question_max_points: Option<u32>,
    /// Questions to include, as `ID` or `ID:ORDER`
    pub questions: Vec<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: bool,
    pub yes: bool,
}

impl ManualOptions {
    fn form(&self) -> FormInputs {
        let mut form = FormInputs {
            question_max_points: self
                .question_max_points
                .map(|n| n.to_string())
                .unwrap_or_default(),
            test_name: self.name.clone().unwrap_or_default(),
            test_description: self.description.clone().unwrap_or_default(),
            is_active: self.active,
            ..FormInputs::default()
        };
        self.criteria.apply(&mut form);
        form
    }
}

/// Execute the manual command
pub async fn execute_manual(options: ManualOptions, config: &Config) -> Result<()> {
    let bank = QuestionBank::new(connect(config)?, config.endpoints.clone());
    let mut ui = TerminalInteraction::new(options.yes);
    let mut viewer = FileViewer::new(config.artifact_dir(), config.open_artifacts);
    let mut state = UiState::new(options.form());
    let interactive = ui.is_interactive();

    if interactive {
        let missing = blank_fields(&mut state, &[Field::QuestionMaxPoints]);
        fill_fields(&mut ui, &mut state, &missing)?;
    }

    let found = loop {
        let outcome = Flow::new(&bank, &mut ui, &mut viewer)
            .search(&mut state)
            .await?;
        match outcome {
            SearchOutcome::Found(found) => break found,
            SearchOutcome::Ended(outcome) => {
                let again = interactive
                    && match outcome {
                        FlowOutcome::InvalidInput(_) => true,
                        _ => ui.confirm("Search again with new criteria?")?,
                    };
                if !again {
                    bail!("No questions to choose from");
                }
                let mut ask = CRITERIA_FIELDS.to_vec();
                ask.push(Field::QuestionMaxPoints);
                fill_fields(&mut ui, &mut state, &ask)?;
            }
        }
    };

    println!("{} {} questions found", style("✓").green(), found.len());
    for question in &found {
        println!("  {}", question_label(question));
    }

    let mut draft = TestDraft::new();
    apply_picks(&mut draft, &found, &options.questions)?;
    if interactive {
        choose_questions(&mut ui, &mut draft, &found)?;
        let unordered: Vec<_> = draft
            .rows()
            .iter()
            .filter(|r| r.order.is_none())
            .map(|r| r.question_id)
            .collect();
        fill_orders(&mut ui, &mut draft, &unordered)?;

        let missing = blank_fields(&mut state, &[Field::TestName, Field::TestDescription]);
        fill_fields(&mut ui, &mut state, &missing)?;
    }
    print_draft(&draft);

    loop {
        let outcome = Flow::new(&bank, &mut ui, &mut viewer)
            .create_manual(&mut state, &draft)
            .await?;

        let fields = match outcome {
            FlowOutcome::Created { .. } => return Ok(()),
            FlowOutcome::InvalidInput(fields) if interactive => fields,
            FlowOutcome::Failed(FailureKind::DuplicateName) if interactive => {
                vec![Field::TestName]
            }
            _ => bail!("No test was created"),
        };

        if fields.contains(&Field::Questions) {
            choose_questions(&mut ui, &mut draft, &found)?;
        }
        let orders: Vec<_> = fields
            .iter()
            .filter_map(|f| match f {
                Field::QuestionOrder(id) => Some(*id),
                _ => None,
            })
            .collect();
        fill_orders(&mut ui, &mut draft, &orders)?;
        fill_fields(&mut ui, &mut state, &fields)?;
    }
}
