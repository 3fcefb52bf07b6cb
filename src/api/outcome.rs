//! @acp:module "Response Outcomes"
//! @acp:summary "Status code and error body interpretation"
//! @acp:domain cli
//! @acp:layer logic
//!
//! Response interpretation
//!
//! Maps status codes and bodies onto the outcomes the flows branch on:
//!
//! | status | meaning                                    |
//! |--------|--------------------------------------------|
//! | 200    | success                                    |
//! | 204    | empty pool                                 |
//! | 409    | duplicate test name                        |
//! | 422    | not enough questions for the count         |
//! | 412    | not enough questions under the point limit |
//! | 406    | no valid combination                       |
//! | 5xx    | server error                               |
//!
//! A 2xx body with `"status": "error"` is still a failure.

use std::fmt;

use reqwest::StatusCode;

use super::transport::RawResponse;
use super::wire::{ErrorBody, LoadedTest, PoolBody, Question, SelectionResult, TestId};
use crate::error::{Result, TestbankError};

/// User-facing failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    NoMatchingQuestions,
    DuplicateName,
    NoValidCombination,
    ServerError,
    Unspecified,
}

impl FailureKind {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NO_CONTENT => FailureKind::NoMatchingQuestions,
            StatusCode::CONFLICT => FailureKind::DuplicateName,
            StatusCode::NOT_ACCEPTABLE => FailureKind::NoValidCombination,
            s if s.is_server_error() => FailureKind::ServerError,
            _ => FailureKind::Unspecified,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            FailureKind::NoMatchingQuestions => {
                "No questions found that meet the selection criteria. Select new criteria and try again."
            }
            FailureKind::DuplicateName => {
                "A test with this name already exists. Choose a different name."
            }
            FailureKind::NoValidCombination => {
                "No combination of questions satisfies the requested count and point limit."
            }
            FailureKind::ServerError => "An unexpected server error occurred. Please try again later.",
            FailureKind::Unspecified => "An unexpected error occurred.",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::NoMatchingQuestions => "no matching questions",
            FailureKind::DuplicateName => "duplicate name",
            FailureKind::NoValidCombination => "no valid combination",
            FailureKind::ServerError => "server error",
            FailureKind::Unspecified => "unspecified error",
        };
        f.write_str(name)
    }
}

/// A failed request, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    /// HTTP status, `None` for failures detected locally
    pub status: Option<StatusCode>,
    pub server_message: Option<String>,
}

impl Failure {
    pub fn from_response(response: &RawResponse) -> Self {
        let body = error_body(response);
        Self {
            kind: FailureKind::from_status(response.status),
            status: Some(response.status),
            server_message: body.text().map(str::to_string),
        }
    }

    pub fn local(kind: FailureKind) -> Self {
        Self {
            kind,
            status: None,
            server_message: None,
        }
    }
}

/// Requested question count and point budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub count: u32,
    pub max_points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortfallReason {
    /// 422: fewer questions than requested
    Count,
    /// 412: too few questions fit under the point ceiling
    Points,
}

/// Server report that the request cannot be met as asked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub reason: ShortfallReason,
    pub available_questions: Option<u32>,
    pub available_points: Option<u32>,
    pub server_message: Option<String>,
}

impl Shortfall {
    /// Limits the server says it can satisfy.
    ///
    /// `None` when the response carries nothing usable, or nothing that
    /// differs from what was just asked.
    pub fn adjust(&self, requested: Limits) -> Option<Limits> {
        let usable = |v: Option<u32>| v.filter(|n| *n > 0);

        let adjusted = Limits {
            count: usable(self.available_questions).unwrap_or(requested.count),
            max_points: usable(self.available_points).unwrap_or(requested.max_points),
        };

        (adjusted != requested).then_some(adjusted)
    }

    /// Confirmation text for accepting `adjusted` in place of `requested`
    pub fn describe(&self, requested: Limits, adjusted: Limits) -> String {
        let headline = self.server_message.clone().unwrap_or_else(|| match self.reason {
            ShortfallReason::Count => format!(
                "Only {} questions match the selection criteria",
                adjusted.count
            ),
            ShortfallReason::Points => format!(
                "Not enough questions fit within {} points",
                requested.max_points
            ),
        });

        let mut changes = Vec::new();
        if adjusted.count != requested.count {
            changes.push(format!("{} questions", adjusted.count));
        }
        if adjusted.max_points != requested.max_points {
            changes.push(format!("a {}-point limit", adjusted.max_points));
        }

        format!(
            "{}. Continue with {}?",
            headline.trim_end_matches('.'),
            changes.join(" and ")
        )
    }
}

/// Result of a pool or search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolOutcome {
    Pool(Vec<Question>),
    Empty,
    Failed(Failure),
}

/// Result of a subset selection request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubsetOutcome {
    Selected(SelectionResult),
    Shortfall(Shortfall),
    Failed(Failure),
}

/// Result of a test creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(TestId),
    Failed(Failure),
}

/// Result of loading a test for modification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(LoadedTest),
    Failed(Failure),
}

/// Result of a request whose success carries no payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Failed(Failure),
}

fn error_body(response: &RawResponse) -> ErrorBody {
    response.parse_json().unwrap_or_default()
}

/// 2xx without an error marker in the body
fn succeeded(response: &RawResponse) -> bool {
    response.status.is_success() && !error_body(response).is_error()
}

fn decode<T: serde::de::DeserializeOwned>(endpoint: &str, response: &RawResponse) -> Result<T> {
    response.parse_json().map_err(|e| {
        TestbankError::invalid_response(endpoint, response.status.as_u16(), e.to_string())
    })
}

pub fn classify_pool(endpoint: &str, response: &RawResponse) -> Result<PoolOutcome> {
    if response.status == StatusCode::NO_CONTENT {
        return Ok(PoolOutcome::Empty);
    }
    if !succeeded(response) {
        return Ok(PoolOutcome::Failed(Failure::from_response(response)));
    }

    let body: PoolBody = decode(endpoint, response)?;
    if body.selected_questions.is_empty() {
        // Some routes answer an empty pool with 200 and a message.
        return Ok(PoolOutcome::Empty);
    }
    if let Some(message) = &body.message {
        tracing::debug!(endpoint, message = %message, "pool retrieved");
    }
    Ok(PoolOutcome::Pool(body.selected_questions))
}

pub fn classify_subset(endpoint: &str, response: &RawResponse) -> Result<SubsetOutcome> {
    let reason = match response.status {
        StatusCode::UNPROCESSABLE_ENTITY => Some(ShortfallReason::Count),
        StatusCode::PRECONDITION_FAILED => Some(ShortfallReason::Points),
        _ => None,
    };

    if let Some(reason) = reason {
        let body = error_body(response);
        return Ok(SubsetOutcome::Shortfall(Shortfall {
            reason,
            available_questions: body.available_questions,
            available_points: body.available_points,
            server_message: body.text().map(str::to_string),
        }));
    }
    if !succeeded(response) {
        return Ok(SubsetOutcome::Failed(Failure::from_response(response)));
    }

    Ok(SubsetOutcome::Selected(decode(endpoint, response)?))
}

pub fn classify_creation(endpoint: &str, response: &RawResponse) -> Result<CreateOutcome> {
    if !succeeded(response) {
        return Ok(CreateOutcome::Failed(Failure::from_response(response)));
    }

    let body: super::wire::CreationBody = decode(endpoint, response)?;
    body.test_id.map(CreateOutcome::Created).ok_or_else(|| {
        TestbankError::invalid_response(endpoint, response.status.as_u16(), "missing test_id")
    })
}

pub fn classify_load(endpoint: &str, response: &RawResponse) -> Result<LoadOutcome> {
    if !succeeded(response) {
        return Ok(LoadOutcome::Failed(Failure::from_response(response)));
    }
    Ok(LoadOutcome::Loaded(decode(endpoint, response)?))
}

pub fn classify_submit(response: &RawResponse) -> SubmitOutcome {
    if succeeded(response) {
        SubmitOutcome::Accepted
    } else {
        SubmitOutcome::Failed(Failure::from_response(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::wire::QuestionId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const LIMITS: Limits = Limits {
        count: 10,
        max_points: 50,
    };

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            FailureKind::from_status(StatusCode::CONFLICT),
            FailureKind::DuplicateName
        );
        assert_eq!(
            FailureKind::from_status(StatusCode::NOT_ACCEPTABLE),
            FailureKind::NoValidCombination
        );
        assert_eq!(
            FailureKind::from_status(StatusCode::INTERNAL_SERVER_ERROR),
            FailureKind::ServerError
        );
        assert_eq!(
            FailureKind::from_status(StatusCode::BAD_GATEWAY),
            FailureKind::ServerError
        );
        assert_eq!(
            FailureKind::from_status(StatusCode::BAD_REQUEST),
            FailureKind::Unspecified
        );
        assert_eq!(FailureKind::from_status(StatusCode::OK), FailureKind::Unspecified);
    }

    #[test]
    fn test_each_failure_has_distinct_message() {
        let kinds = [
            FailureKind::NoMatchingQuestions,
            FailureKind::DuplicateName,
            FailureKind::NoValidCombination,
            FailureKind::ServerError,
            FailureKind::Unspecified,
        ];
        let messages: std::collections::HashSet<_> =
            kinds.iter().map(|k| k.user_message()).collect();
        assert_eq!(messages.len(), kinds.len());
    }

    #[test]
    fn test_pool_no_content_is_empty() {
        let response = RawResponse::new(StatusCode::NO_CONTENT, Vec::new());
        assert_eq!(classify_pool("/p", &response).unwrap(), PoolOutcome::Empty);
    }

    #[test]
    fn test_pool_empty_list_is_empty() {
        let response = RawResponse::json(
            200,
            &json!({"selected_questions": [], "message": "No questions found"}),
        );
        assert_eq!(classify_pool("/p", &response).unwrap(), PoolOutcome::Empty);
    }

    #[test]
    fn test_pool_success() {
        let response = RawResponse::json(
            200,
            &json!({"selected_questions": [
                {"question_id": 1, "max_points": 5, "question_desc": "TCP handshake"},
                {"question_id": "2", "max_points": 3}
            ]}),
        );
        match classify_pool("/p", &response).unwrap() {
            PoolOutcome::Pool(pool) => {
                assert_eq!(pool.len(), 2);
                assert_eq!(pool[1].question_id, QuestionId(2));
                assert_eq!(pool[0].question_desc.as_deref(), Some("TCP handshake"));
            }
            other => panic!("expected pool, got {:?}", other),
        }
    }

    #[test]
    fn test_ok_status_with_error_body_is_failure() {
        let response =
            RawResponse::json(200, &json!({"status": "error", "message": "Bad filter"}));
        match classify_pool("/p", &response).unwrap() {
            PoolOutcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::Unspecified);
                assert_eq!(failure.server_message.as_deref(), Some("Bad filter"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_pool_garbage_body_is_error() {
        let response = RawResponse::new(StatusCode::OK, "<html>");
        assert!(classify_pool("/p", &response).is_err());
    }

    #[test]
    fn test_subset_count_shortfall() {
        let response = RawResponse::json(
            422,
            &json!({"status": "error", "message": "Only 6 questions", "available_questions": 6}),
        );
        match classify_subset("/s", &response).unwrap() {
            SubsetOutcome::Shortfall(shortfall) => {
                assert_eq!(shortfall.reason, ShortfallReason::Count);
                assert_eq!(
                    shortfall.adjust(LIMITS),
                    Some(Limits {
                        count: 6,
                        max_points: 50
                    })
                );
            }
            other => panic!("expected shortfall, got {:?}", other),
        }
    }

    #[test]
    fn test_subset_points_shortfall_with_both_limits() {
        let response = RawResponse::json(
            412,
            &json!({"status": "error", "available_questions": 8, "available_points": 40}),
        );
        match classify_subset("/s", &response).unwrap() {
            SubsetOutcome::Shortfall(shortfall) => {
                assert_eq!(shortfall.reason, ShortfallReason::Points);
                assert_eq!(
                    shortfall.adjust(LIMITS),
                    Some(Limits {
                        count: 8,
                        max_points: 40
                    })
                );
            }
            other => panic!("expected shortfall, got {:?}", other),
        }
    }

    #[test]
    fn test_shortfall_without_new_limits_cannot_adjust() {
        let shortfall = Shortfall {
            reason: ShortfallReason::Count,
            available_questions: None,
            available_points: None,
            server_message: None,
        };
        assert_eq!(shortfall.adjust(LIMITS), None);

        let same = Shortfall {
            available_questions: Some(10),
            ..shortfall.clone()
        };
        assert_eq!(same.adjust(LIMITS), None);

        let zero = Shortfall {
            available_questions: Some(0),
            ..shortfall
        };
        assert_eq!(zero.adjust(LIMITS), None);
    }

    #[test]
    fn test_shortfall_describe() {
        let shortfall = Shortfall {
            reason: ShortfallReason::Count,
            available_questions: Some(6),
            available_points: None,
            server_message: None,
        };
        let adjusted = shortfall.adjust(LIMITS).unwrap();
        assert_eq!(
            shortfall.describe(LIMITS, adjusted),
            "Only 6 questions match the selection criteria. Continue with 6 questions?"
        );

        let both = Shortfall {
            reason: ShortfallReason::Points,
            available_questions: Some(4),
            available_points: Some(30),
            server_message: Some("Point ceiling too low.".to_string()),
        };
        let adjusted = both.adjust(LIMITS).unwrap();
        assert_eq!(
            both.describe(LIMITS, adjusted),
            "Point ceiling too low. Continue with 4 questions and a 30-point limit?"
        );
    }

    #[test]
    fn test_subset_no_combination() {
        let response = RawResponse::json(406, &json!({"status": "error", "message": "None"}));
        match classify_subset("/s", &response).unwrap() {
            SubsetOutcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::NoValidCombination)
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_subset_selected() {
        let response = RawResponse::json(
            200,
            &json!({
                "question_order": [
                    {"question_id": 3, "question_order": 1},
                    {"question_id": 9, "question_order": 2}
                ],
                "total_score": 12
            }),
        );
        match classify_subset("/s", &response).unwrap() {
            SubsetOutcome::Selected(selection) => {
                assert_eq!(selection.total_score, 12);
                assert_eq!(selection.question_order[1].question_id, QuestionId(9));
            }
            other => panic!("expected selection, got {:?}", other),
        }
    }

    #[test]
    fn test_creation_outcomes() {
        let created = RawResponse::json(200, &json!({"status": "success", "test_id": 41}));
        assert_eq!(
            classify_creation("/c", &created).unwrap(),
            CreateOutcome::Created(TestId(41))
        );

        let conflict = RawResponse::json(
            409,
            &json!({"status": "error", "message": "Test name already exists."}),
        );
        match classify_creation("/c", &conflict).unwrap() {
            CreateOutcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::DuplicateName);
                assert_eq!(failure.status, Some(StatusCode::CONFLICT));
            }
            other => panic!("expected failure, got {:?}", other),
        }

        let missing = RawResponse::json(200, &json!({"status": "success"}));
        assert!(classify_creation("/c", &missing).is_err());
    }

    #[test]
    fn test_submit_legacy_error_field() {
        let response = RawResponse::json(400, &json!({"error": "Missing test name"}));
        match classify_submit(&response) {
            SubmitOutcome::Failed(failure) => {
                assert_eq!(failure.server_message.as_deref(), Some("Missing test name"))
            }
            SubmitOutcome::Accepted => panic!("expected failure"),
        }
    }
}
