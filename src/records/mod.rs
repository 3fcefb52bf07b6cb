//! @acp:module "Tester Records"
//! @acp:summary "Attempt validation and the record endpoints"
//! @acp:domain cli
//! @acp:layer service
//!
//! Tester attempt records
//!
//! Scores, attempt dates and pass/fail status of testers who sat a test.
//! Inputs are validated locally and nothing is sent until every field
//! passes.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::json;
use tracing::{debug, info};

use crate::api::{RawResponse, TestId, Transport};
use crate::config::Endpoints;
use crate::error::{Result, TestbankError};
use crate::ui::Field;

/// Wire format of attempt dates (an HTML `datetime-local` value)
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Score sent when none was entered
const NO_SCORE: &str = "-1";

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static ROW_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</(p|div|tr|li|h[1-6]|table)>").unwrap());
static CELL_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</t[dh]>").unwrap());
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

/// Attempt fields as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptInput {
    pub date: String,
    pub score: String,
    pub passed: bool,
}

/// A validated attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub date: NaiveDateTime,
    pub score: Option<u32>,
    pub passed: bool,
}

/// Parses an attempt date. Accepts the `datetime-local` form, with or without
/// seconds, a space instead of `T`, or a bare date (midnight).
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parses a score; blank means none. Only digits are accepted.
pub fn parse_score(value: &str) -> std::result::Result<Option<u32>, Field> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(Field::Score);
    }
    value.parse().map(Some).map_err(|_| Field::Score)
}

impl AttemptInput {
    pub fn validate(&self) -> std::result::Result<Attempt, Vec<Field>> {
        let date = parse_date(&self.date);
        let score = parse_score(&self.score);

        let mut invalid = Vec::new();
        if date.is_none() {
            invalid.push(Field::AttemptDate);
        }
        if score.is_err() {
            invalid.push(Field::Score);
        }

        match (date, score) {
            (Some(date), Ok(score)) => Ok(Attempt {
                date,
                score,
                passed: self.passed,
            }),
            _ => Err(invalid),
        }
    }
}

impl Attempt {
    pub fn wire_date(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn wire_score(&self) -> String {
        self.score
            .map(|s| s.to_string())
            .unwrap_or_else(|| NO_SCORE.to_string())
    }

    pub fn wire_status(&self) -> u8 {
        u8::from(self.passed)
    }
}

/// Who an attempt belongs to: a new tester by name or an existing one by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TesterRef {
    New { name: String },
    Existing { id: String },
}

impl TesterRef {
    pub fn validate(&self) -> std::result::Result<(), Field> {
        match self {
            TesterRef::New { name } if name.trim().is_empty() => Err(Field::TesterName),
            TesterRef::Existing { id } if id.trim().is_empty() => Err(Field::TesterId),
            _ => Ok(()),
        }
    }
}

/// Identifies one stored score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub score_id: String,
    pub tester_id: String,
    pub test_id: TestId,
}

/// Client for the tester record endpoints
pub struct RecordBook<T> {
    transport: T,
    endpoints: Endpoints,
}

fn invalid(fields: Vec<Field>) -> TestbankError {
    let names: Vec<String> = fields.iter().map(Field::label).collect();
    TestbankError::InvalidInput(format!("missing or invalid {}", names.join(", ")))
}

fn ensure_success(endpoint: &str, response: RawResponse) -> Result<String> {
    if !response.status.is_success() {
        return Err(TestbankError::invalid_response(
            endpoint,
            response.status.as_u16(),
            response.text(),
        ));
    }
    Ok(response.text())
}

impl<T: Transport> RecordBook<T> {
    pub fn new(transport: T, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Records an attempt for a tester already linked to the test
    pub async fn add_record(
        &self,
        test_id: TestId,
        tester_id: &str,
        attempt: &AttemptInput,
    ) -> Result<String> {
        if tester_id.trim().is_empty() {
            return Err(invalid(vec![Field::TesterId]));
        }
        let attempt = attempt.validate().map_err(invalid)?;

        let body = json!({
            "test_id": test_id,
            "tester_id": tester_id.trim(),
            "attemptDate": attempt.wire_date(),
            "score": attempt.wire_score(),
            "passStatus": attempt.wire_status(),
        });
        let path = &self.endpoints.add_record;
        let response = self.transport.post_json(path, &body).await?;
        info!(%test_id, tester_id, "attempt recorded");
        ensure_success(path, response)
    }

    /// Links a new or existing tester to the test with a first attempt
    pub async fn add_tester(
        &self,
        test_id: TestId,
        tester: &TesterRef,
        attempt: &AttemptInput,
    ) -> Result<String> {
        let mut fields = Vec::new();
        if let Err(field) = tester.validate() {
            fields.push(field);
        }
        let attempt = match attempt.validate() {
            Ok(attempt) if fields.is_empty() => attempt,
            Ok(_) => return Err(invalid(fields)),
            Err(more) => {
                fields.extend(more);
                return Err(invalid(fields));
            }
        };

        let (path, key, value) = match tester {
            TesterRef::New { name } => (&self.endpoints.add_new_tester, "testerName", name),
            TesterRef::Existing { id } => (&self.endpoints.add_existing_tester, "testerId", id),
        };
        let mut body = json!({
            "attemptDate": attempt.wire_date(),
            "score": attempt.wire_score(),
            "passStatus": attempt.wire_status(),
            "testId": test_id,
        });
        body[key] = json!(value.trim());
        let response = self.transport.post_json(path, &body).await?;
        info!(%test_id, "tester added");
        ensure_success(path, response)
    }

    pub async fn update_score(&self, row: &ScoreRow, grade: &str) -> Result<String> {
        let grade = match parse_score(grade) {
            Ok(Some(grade)) => grade,
            _ => return Err(invalid(vec![Field::Score])),
        };
        let path = &self.endpoints.update_score;
        let response = self
            .transport
            .get(
                path,
                &[
                    ("scoreId", row.score_id.clone()),
                    ("testerId", row.tester_id.clone()),
                    ("testId", row.test_id.to_string()),
                    ("newGrade", grade.to_string()),
                ],
            )
            .await?;
        debug!(score_id = %row.score_id, grade, "score updated");
        ensure_success(path, response)
    }

    pub async fn update_date(&self, row: &ScoreRow, date: &str) -> Result<String> {
        let date = parse_date(date).ok_or_else(|| invalid(vec![Field::AttemptDate]))?;
        let body = json!({
            "scoreId": row.score_id,
            "newDate": date.format(DATE_FORMAT).to_string(),
            "testerId": row.tester_id,
            "testId": row.test_id,
        });
        let path = &self.endpoints.update_date;
        let response = self.transport.post_json(path, &body).await?;
        debug!(score_id = %row.score_id, "date updated");
        ensure_success(path, response)
    }

    pub async fn update_status(&self, row: &ScoreRow, passed: bool) -> Result<String> {
        let body = json!({
            "scoreId": row.score_id,
            "newStatus": u8::from(passed),
            "testerId": row.tester_id,
            "testId": row.test_id,
        });
        let path = &self.endpoints.update_status;
        let response = self.transport.post_json(path, &body).await?;
        debug!(score_id = %row.score_id, passed, "status updated");
        ensure_success(path, response)
    }

    /// Attempt history of a tester on a test, as plain text lines
    pub async fn history(&self, tester_id: &str, test_id: TestId) -> Result<Vec<String>> {
        let path = &self.endpoints.display_history;
        let response = self
            .transport
            .get(
                path,
                &[
                    ("testerId", tester_id.to_string()),
                    ("testId", test_id.to_string()),
                ],
            )
            .await?;
        let html = ensure_success(path, response)?;
        Ok(history_lines(&html))
    }
}

/// Reduces an HTML fragment to its visible text, one line per row or block.
/// Table cells are separated by " | "; a missing score (-1) reads "N/A".
pub fn history_lines(html: &str) -> Vec<String> {
    let text = ROW_BREAK.replace_all(html, "\n");
    let text = CELL_BREAK.replace_all(&text, " | ");
    let text = TAG.replace_all(&text, "");
    let text = decode_entities(&text);

    text.lines()
        .map(|line| SPACES.replace_all(line.trim(), " ").into_owned())
        .map(|line| line.trim_end_matches('|').trim().to_string())
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.split(" | ")
                .map(|cell| if cell.trim() == NO_SCORE { "N/A" } else { cell })
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
