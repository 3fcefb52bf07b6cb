//! @acp:module "Records Command"
//! @acp:summary "Manage tester attempts, scores and history"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `testbank records`: tester attempts, scores and history.

use anyhow::{bail, Result};
use console::style;

use super::connect;
use crate::api::TestId;
use crate::config::Config;
use crate::records::{AttemptInput, RecordBook, ScoreRow, TesterRef};

/// Subcommand types for the records command
#[derive(Debug, Clone)]
pub enum RecordsSubcommand {
    Add {
        test_id: i64,
        tester_id: String,
        date: String,
        score: Option<String>,
        passed: bool,
    },
    AddTester {
        test_id: i64,
        name: Option<String>,
        tester_id: Option<String>,
        date: String,
        score: Option<String>,
        passed: bool,
    },
    Score {
        score_id: String,
        tester_id: String,
        test_id: i64,
        grade: String,
    },
    Date {
        score_id: String,
        tester_id: String,
        test_id: i64,
        date: String,
    },
    Status {
        score_id: String,
        tester_id: String,
        test_id: i64,
        passed: bool,
    },
    History {
        tester_id: String,
        test_id: i64,
    },
}

fn saved(reply: &str, fallback: &str) {
    let reply = reply.trim();
    println!(
        "{} {}",
        style("✓").green(),
        if reply.is_empty() { fallback } else { reply }
    );
}

/// A tester is either named (new) or referenced by id (existing), never both
fn tester_ref(name: Option<String>, tester_id: Option<String>) -> Result<TesterRef> {
    match (name, tester_id) {
        (Some(_), Some(_)) => bail!("Give either a tester name or a tester id, not both"),
        (None, Some(id)) => Ok(TesterRef::Existing { id }),
        (name, None) => Ok(TesterRef::New {
            name: name.unwrap_or_default(),
        }),
    }
}

/// Execute the records command
pub async fn execute_records(subcommand: RecordsSubcommand, config: &Config) -> Result<()> {
    let book = RecordBook::new(connect(config)?, config.endpoints.clone());

    match subcommand {
        RecordsSubcommand::Add {
            test_id,
            tester_id,
            date,
            score,
            passed,
        } => {
            let attempt = AttemptInput {
                date,
                score: score.unwrap_or_default(),
                passed,
            };
            let reply = book.add_record(TestId(test_id), &tester_id, &attempt).await?;
            saved(&reply, "Attempt recorded");
        }

        RecordsSubcommand::AddTester {
            test_id,
            name,
            tester_id,
            date,
            score,
            passed,
        } => {
            let tester = tester_ref(name, tester_id)?;
            let attempt = AttemptInput {
                date,
                score: score.unwrap_or_default(),
                passed,
            };
            let reply = book.add_tester(TestId(test_id), &tester, &attempt).await?;
            saved(&reply, "Tester added");
        }

        RecordsSubcommand::Score {
            score_id,
            tester_id,
            test_id,
            grade,
        } => {
            let row = ScoreRow {
                score_id,
                tester_id,
                test_id: TestId(test_id),
            };
            let reply = book.update_score(&row, &grade).await?;
            saved(&reply, "Score updated");
        }

        RecordsSubcommand::Date {
            score_id,
            tester_id,
            test_id,
            date,
        } => {
            let row = ScoreRow {
                score_id,
                tester_id,
                test_id: TestId(test_id),
            };
            let reply = book.update_date(&row, &date).await?;
            saved(&reply, "Attempt date updated");
        }

        RecordsSubcommand::Status {
            score_id,
            tester_id,
            test_id,
            passed,
        } => {
            let row = ScoreRow {
                score_id,
                tester_id,
                test_id: TestId(test_id),
            };
            let reply = book.update_status(&row, passed).await?;
            saved(&reply, "Status updated");
        }

        RecordsSubcommand::History { tester_id, test_id } => {
            let lines = book.history(&tester_id, TestId(test_id)).await?;
            if lines.is_empty() {
                println!("{} No attempts recorded", style("→").cyan());
            } else {
                println!("{}", style("Attempt history:").bold());
                for line in lines {
                    println!("  {}", line);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tester_ref_picks_one_kind() {
        assert_eq!(
            tester_ref(None, Some("12".to_string())).unwrap(),
            TesterRef::Existing {
                id: "12".to_string()
            }
        );
        assert_eq!(
            tester_ref(Some("Ada".to_string()), None).unwrap(),
            TesterRef::New {
                name: "Ada".to_string()
            }
        );
    }

    #[test]
    fn test_tester_ref_rejects_name_and_id() {
        let err = tester_ref(Some("Ada".to_string()), Some("12".to_string())).unwrap_err();
        assert!(err.to_string().contains("not both"));
    }
}
