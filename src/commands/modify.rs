//! @acp:module "Modify Command"
//! @acp:summary "Change an existing test"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `testbank modify`: change the questions, order or metadata of
//! an existing test.

use anyhow::{bail, Result};
use console::style;

use super::{
    apply_picks, blank_fields, choose_questions, connect, fill_fields, fill_orders, parse_pick,
    print_draft, CriteriaArgs,
};
use crate::api::{QuestionBank, QuestionId, TestId};
use crate::artifact::FileViewer;
use crate::config::Config;
use crate::flow::{Flow, FlowOutcome, LoadResult, SearchOutcome};
use crate::ui::{Field, FormInputs, Interaction, TerminalInteraction, UiState};

/// Options for the modify command
#[derive(Debug, Clone, Default)]
pub struct ModifyOptions {
    pub test_id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    /// Questions to add, as `ID` or `ID:ORDER`
    pub add: Vec<String>,
    /// Question ids to drop
    pub remove: Vec<i64>,
    /// New positions, as `ID:ORDER`
    pub order: Vec<String>,
    /// Filters for the search that finds questions to add
    pub criteria: CriteriaArgs,
    pub question_max_points: Option<u32>,
    pub yes: bool,
}

/// Execute the modify command
pub async fn execute_modify(options: ModifyOptions, config: &Config) -> Result<()> {
    let bank = QuestionBank::new(connect(config)?, config.endpoints.clone());
    let mut ui = TerminalInteraction::new(options.yes);
    let mut viewer = FileViewer::new(config.artifact_dir(), config.open_artifacts);
    let mut state = UiState::default();
    let interactive = ui.is_interactive();
    let test_id = TestId(options.test_id);

    let mut draft = match Flow::new(&bank, &mut ui, &mut viewer)
        .load_for_modify(&mut state, test_id)
        .await?
    {
        LoadResult::Loaded(draft) => draft,
        LoadResult::Ended(_) => bail!("Test {} could not be loaded", test_id),
    };

    if let Some(name) = &options.name {
        state.form.test_name = name.clone();
    }
    if let Some(description) = &options.description {
        state.form.test_description = description.clone();
    }
    if let Some(active) = options.active {
        state.form.is_active = active;
    }
    for id in &options.remove {
        if !draft.remove(QuestionId(*id)) {
            println!("{} Question {} is not part of the test", style("!").yellow(), id);
        }
    }
    for pick in &options.order {
        let (id, order) = parse_pick(pick)?;
        if !draft.set_order(id, order) {
            println!("{} Question {} is not part of the test", style("!").yellow(), id);
        }
    }

    print_draft(&draft);

    let wants_search = !options.add.is_empty()
        || (interactive && ui.confirm("Search for questions to add?")?);
    if wants_search {
        // The search panel has inputs of its own; a reset there must not
        // clear the loaded metadata.
        let mut search = UiState::new(FormInputs {
            question_max_points: options
                .question_max_points
                .map(|n| n.to_string())
                .unwrap_or_default(),
            ..FormInputs::default()
        });
        options.criteria.apply(&mut search.form);
        if interactive {
            let missing = blank_fields(&mut search, &[Field::QuestionMaxPoints]);
            fill_fields(&mut ui, &mut search, &missing)?;
        }

        let outcome = Flow::new(&bank, &mut ui, &mut viewer)
            .search(&mut search)
            .await?;
        match outcome {
            SearchOutcome::Found(found) => {
                apply_picks(&mut draft, &found, &options.add)?;
                if interactive {
                    choose_questions(&mut ui, &mut draft, &found)?;
                }
            }
            SearchOutcome::Ended(_) if !options.add.is_empty() => {
                bail!(
                    "Questions {} could not be added to test {}; nothing was updated",
                    options.add.join(", "),
                    test_id
                );
            }
            SearchOutcome::Ended(_) => {}
        }
    }

    if interactive {
        let ids: Vec<_> = draft.rows().iter().map(|r| r.question_id).collect();
        fill_orders(&mut ui, &mut draft, &ids)?;
        print_draft(&draft);
    }

    loop {
        let outcome = Flow::new(&bank, &mut ui, &mut viewer)
            .submit_modify(&mut state, &draft, test_id)
            .await?;

        match outcome {
            FlowOutcome::Updated => return Ok(()),
            FlowOutcome::InvalidInput(fields) if interactive => {
                if fields.contains(&Field::Questions) {
                    println!(
                        "{} A test needs at least one question",
                        style("!").yellow()
                    );
                    bail!("Test {} was not updated", test_id);
                }
                fill_fields(&mut ui, &mut state, &fields)?;
            }
            _ => bail!("Test {} was not updated", test_id),
        }
    }
}
