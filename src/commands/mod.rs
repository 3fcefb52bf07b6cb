//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! CLI command implementations
//!
//! Each command is in its own submodule. Commands own the terminal and the
//! retry decisions; the server conversations they drive live in
//! [`crate::flow`] and [`crate::records`].

pub mod init;
pub mod manual;
pub mod modify;
pub mod question;
pub mod random;
pub mod records;

pub use init::{execute_init, InitOptions};
pub use manual::{execute_manual, ManualOptions};
pub use modify::{execute_modify, ModifyOptions};
pub use question::{execute_question, QuestionOptions};
pub use random::{execute_random, RandomOptions};
pub use records::{execute_records, RecordsSubcommand};

use anyhow::{anyhow, Context, Result};
use console::style;

use crate::api::{HttpTransport, Question, QuestionId};
use crate::compose::TestDraft;
use crate::config::Config;
use crate::ui::{positive_number, Field, FormInputs, Interaction, TerminalInteraction, UiState};

/// Dropdown fields, in the order they are asked
pub(crate) const CRITERIA_FIELDS: [Field; 6] = [
    Field::BloomsTaxonomy,
    Field::Subject,
    Field::Topic,
    Field::TrainingLevel,
    Field::QuestionType,
    Field::QuestionDifficulty,
];

/// Category filters given on the command line
#[derive(Debug, Clone, Default)]
pub struct CriteriaArgs {
    pub blooms_taxonomy: Option<String>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub training_level: Option<String>,
    pub question_type: Option<String>,
    pub question_difficulty: Option<String>,
}

impl CriteriaArgs {
    /// Copies the given filters into the form; absent ones stay "all"
    pub fn apply(&self, form: &mut FormInputs) {
        let pairs = [
            (&self.blooms_taxonomy, &mut form.blooms_taxonomy),
            (&self.subject, &mut form.subject),
            (&self.topic, &mut form.topic),
            (&self.training_level, &mut form.training_level),
            (&self.question_type, &mut form.question_type),
            (&self.question_difficulty, &mut form.question_difficulty),
        ];
        for (arg, slot) in pairs {
            if let Some(value) = arg {
                *slot = value.clone();
            }
        }
    }
}

pub(crate) fn connect(config: &Config) -> Result<HttpTransport> {
    HttpTransport::new(&config.server_url, config.request_timeout())
        .with_context(|| format!("Cannot reach question bank at {}", config.server_url))
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Form fields among `fields` that are still blank
pub(crate) fn blank_fields(state: &mut UiState, fields: &[Field]) -> Vec<Field> {
    fields
        .iter()
        .copied()
        .filter(|f| {
            state
                .form
                .value_mut(*f)
                .is_some_and(|v| v.trim().is_empty())
        })
        .collect()
}

/// Asks for each field, offering its current value as the default
pub(crate) fn fill_fields(
    ui: &mut TerminalInteraction,
    state: &mut UiState,
    fields: &[Field],
) -> Result<()> {
    for field in fields {
        let Some(slot) = state.form.value_mut(*field) else {
            continue;
        };
        let current = slot.trim().to_string();
        let default = (!current.is_empty()).then_some(current.as_str());
        if let Some(value) = ui.prompt(&capitalize(&field.label()), default)? {
            *slot = value;
        }
    }
    Ok(())
}

/// Parses `ID` or `ID:ORDER`
pub(crate) fn parse_pick(value: &str) -> Result<(QuestionId, Option<u32>)> {
    let (id, order) = match value.split_once(':') {
        Some((id, order)) => (id, Some(order)),
        None => (value, None),
    };
    let id = id
        .trim()
        .parse::<i64>()
        .map_err(|_| anyhow!("Invalid question id in '{}'", value))?;
    let order = match order {
        Some(order) => Some(
            positive_number(order).ok_or_else(|| anyhow!("Invalid order in '{}'", value))?,
        ),
        None => None,
    };
    Ok((QuestionId(id), order))
}

pub(crate) fn question_label(question: &Question) -> String {
    format!(
        "#{} ({} pts) {}",
        question.question_id,
        question.max_points,
        question.question_desc.as_deref().unwrap_or("")
    )
}

/// Adds questions picked on the command line from `found`
pub(crate) fn apply_picks(draft: &mut TestDraft, found: &[Question], picks: &[String]) -> Result<()> {
    for pick in picks {
        let (id, order) = parse_pick(pick)?;
        match found.iter().find(|q| q.question_id == id) {
            Some(question) => {
                draft.add(question);
                if order.is_some() {
                    draft.set_order(id, order);
                }
            }
            None => println!(
                "{} Question {} is not among the search results, skipped",
                style("!").yellow(),
                id
            ),
        }
    }
    Ok(())
}

/// Lets the user tick questions from `found` to add to the draft
pub(crate) fn choose_questions(
    ui: &mut TerminalInteraction,
    draft: &mut TestDraft,
    found: &[Question],
) -> Result<()> {
    let candidates: Vec<&Question> = found
        .iter()
        .filter(|q| !draft.contains(q.question_id))
        .collect();
    let items: Vec<String> = candidates.iter().map(|q| question_label(q)).collect();
    for index in ui.choose_many("Select questions to add", &items)? {
        draft.add(candidates[index]);
    }
    Ok(())
}

/// Asks for the order of the given questions; the suggestion is the row's
/// current order or its position
pub(crate) fn fill_orders(
    ui: &mut TerminalInteraction,
    draft: &mut TestDraft,
    ids: &[QuestionId],
) -> Result<()> {
    for id in ids {
        let Some(position) = draft.rows().iter().position(|r| r.question_id == *id) else {
            continue;
        };
        let suggested = draft.rows()[position]
            .order
            .unwrap_or(position as u32 + 1)
            .to_string();
        let answer = ui.prompt(&format!("Order of question {}", id), Some(&suggested))?;
        draft.set_order(*id, answer.as_deref().and_then(positive_number));
    }
    Ok(())
}

pub(crate) fn print_draft(draft: &TestDraft) {
    println!("{}", style("Selected questions:").bold());
    for row in draft.rows() {
        let order = row
            .order
            .map(|o| o.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>3}  #{} ({} pts) {}",
            style(order).cyan(),
            row.question_id,
            row.max_points,
            style(row.description.as_deref().unwrap_or("")).dim()
        );
    }
    println!(
        "  {} {} points",
        style("Total:").bold(),
        draft.total_points()
    );
}
