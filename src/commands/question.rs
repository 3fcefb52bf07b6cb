//! @acp:module "Question Command"
//! @acp:summary "Submit a new question to the bank"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `testbank question add`: submit a new question to the bank.
//!
//! Question text and answer are pre-authored HTML read from files.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use console::style;

use super::connect;
use crate::api::{NewQuestion, QuestionBank};
use crate::config::Config;

/// Options for the question command
#[derive(Debug, Clone, Default)]
pub struct QuestionOptions {
    /// Learning objective the question belongs to
    pub obj_id: String,
    pub description: String,
    pub text_file: PathBuf,
    pub answer_file: PathBuf,
    pub question_type: String,
    pub difficulty: String,
    pub explanation: Option<String>,
    pub points_definition: Option<String>,
    pub max_points: u32,
    pub source: Option<String>,
}

fn read_html(path: &Path, what: &str) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} from {}", what, path.display()))?;
    if content.trim().is_empty() {
        bail!("{} file {} is empty", what, path.display());
    }
    Ok(content)
}

/// Execute the question command
pub async fn execute_question(options: QuestionOptions, config: &Config) -> Result<()> {
    if options.max_points == 0 {
        bail!("Maximum points must be greater than 0");
    }

    let question = NewQuestion {
        obj_id: options.obj_id.trim().to_string(),
        question_desc: options.description.trim().to_string(),
        question_text: read_html(&options.text_file, "Question text")?,
        question_answer: read_html(&options.answer_file, "Answer")?,
        question_type: options.question_type,
        question_difficulty: options.difficulty,
        answer_explanation: options.explanation.unwrap_or_default(),
        points_definition: options.points_definition.unwrap_or_default(),
        max_points: options.max_points.to_string(),
        source: options.source.unwrap_or_default(),
    };

    let bank = QuestionBank::new(connect(config)?, config.endpoints.clone());
    let reply = bank
        .submit_question(&question)
        .await
        .context("Question was not submitted")?;

    let reply = reply.trim();
    println!(
        "{} {}",
        style("✓").green(),
        if reply.is_empty() {
            "Question submitted"
        } else {
            reply
        }
    );
    Ok(())
}
