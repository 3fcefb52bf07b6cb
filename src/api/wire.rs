//! @acp:module "Wire Types"
//! @acp:summary "JSON request and response shapes"
//! @acp:domain cli
//! @acp:layer types
//!
//! Wire types
//!
//! JSON shapes exchanged with the question bank server. Field names follow
//! the server's routes exactly; a few legacy camelCase keys survive on the
//! modify endpoint.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

/// Accepts an id serialized as a JSON number or as a numeric string.
fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid identifier '{}'", s))),
    }
}

/// Reads a shortfall limit. Values that are not a non-negative whole number
/// become `None` so the rest of the error body survives.
fn lenient_limit<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let limit = match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(limit.and_then(|n| u32::try_from(n).ok()))
}

/// Question identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QuestionId(pub i64);

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient_i64(deserializer).map(QuestionId)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted test identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TestId(pub i64);

impl<'de> Deserialize<'de> for TestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient_i64(deserializer).map(TestId)
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a test is being assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Random,
    Manual,
}

/// Category filters. An empty list means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuestionFilter {
    pub blooms_taxonomy: Vec<String>,
    pub subjects: Vec<String>,
    pub topics: Vec<String>,
    pub question_types: Vec<String>,
    pub question_difficulties: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_level: Option<String>,
}

impl QuestionFilter {
    /// Turns a single dropdown choice into a filter list; "all" and blank
    /// select everything.
    pub fn choice(value: &str) -> Vec<String> {
        single_choice(value).into_iter().collect()
    }
}

/// A dropdown value, `None` when it is "all" or blank.
pub fn single_choice(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(value.to_string())
    }
}

/// Body of a pool/search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolQuery {
    #[serde(flatten)]
    pub filter: QuestionFilter,
    pub test_type: TestType,
    /// Per-question point cap used by manual search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_max_points: Option<u32>,
}

/// Question as returned in a pool or search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: QuestionId,
    pub max_points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_desc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PoolBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub selected_questions: Vec<Question>,
}

/// Pool entry sent back for subset selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolEntry {
    pub question_id: QuestionId,
    pub max_points: u32,
}

impl From<&Question> for PoolEntry {
    fn from(question: &Question) -> Self {
        Self {
            question_id: question.question_id,
            max_points: question.max_points,
        }
    }
}

/// Body of a subset selection request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsetRequest {
    pub question_pool: Vec<PoolEntry>,
    pub num_questions: u32,
    pub max_points: u32,
}

/// Position of a question inside a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOrder {
    pub question_id: QuestionId,
    pub question_order: u32,
}

/// Questions chosen by the server plus their combined score
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelectionResult {
    pub question_order: Vec<QuestionOrder>,
    pub total_score: u32,
}

/// Name, description and visibility of a test being created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMetadata {
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

/// Body of a test creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCreationRequest {
    pub question_order: Vec<QuestionOrder>,
    pub total_score: u32,
    pub test_name: String,
    pub is_active: bool,
    pub test_description: String,
    pub test_type: TestType,
}

impl TestCreationRequest {
    pub fn from_selection(
        selection: SelectionResult,
        metadata: &TestMetadata,
        test_type: TestType,
    ) -> Self {
        Self {
            question_order: selection.question_order,
            total_score: selection.total_score,
            test_name: metadata.name.trim().to_string(),
            is_active: metadata.is_active,
            test_description: metadata.description.trim().to_string(),
            test_type,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreationBody {
    pub test_id: Option<TestId>,
}

/// A question row of an existing test
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoadedQuestion {
    pub question_id: QuestionId,
    #[serde(default)]
    pub question_order: Option<u32>,
    #[serde(default)]
    pub max_points: u32,
    #[serde(default)]
    pub question_desc: Option<String>,
}

/// An existing test as returned for modification
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoadedTest {
    #[serde(default)]
    pub question_order: Vec<LoadedQuestion>,
    #[serde(default)]
    pub total_score: Option<u32>,
    #[serde(default)]
    pub test_name: Option<String>,
    #[serde(default)]
    pub test_description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Question position on the modify endpoint; unparseable orders go out as null
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModifyOrder {
    pub question_id: QuestionId,
    pub question_order: Option<u32>,
}

/// Body of a test update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModifyRequest {
    pub question_order: Vec<ModifyOrder>,
    pub total_score: u32,
    pub test_name: String,
    pub is_active: bool,
    pub test_description: String,
    pub test_type: TestType,
    #[serde(rename = "testId")]
    pub test_id: TestId,
}

/// Fields of a new question submission (form-encoded)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewQuestion {
    pub obj_id: String,
    pub question_desc: String,
    pub question_text: String,
    pub question_answer: String,
    pub question_type: String,
    pub question_difficulty: String,
    pub answer_explanation: String,
    pub points_definition: String,
    pub max_points: String,
    pub source: String,
}

impl NewQuestion {
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("obj_id", self.obj_id.clone()),
            ("question_desc", self.question_desc.clone()),
            ("question_text", self.question_text.clone()),
            ("question_answer", self.question_answer.clone()),
            ("question_type", self.question_type.clone()),
            ("question_difficulty", self.question_difficulty.clone()),
            ("answer_explanation", self.answer_explanation.clone()),
            ("points_definition", self.points_definition.clone()),
            ("max_points", self.max_points.clone()),
            ("source", self.source.clone()),
        ]
    }
}

/// Error body. Newer routes send `message`, older ones `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient_limit")]
    pub available_questions: Option<u32>,
    #[serde(default, deserialize_with = "lenient_limit")]
    pub available_points: Option<u32>,
}

impl ErrorBody {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }

    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_question_id_accepts_number_and_string() {
        let a: Question = serde_json::from_value(json!({"question_id": 7, "max_points": 3})).unwrap();
        let b: Question =
            serde_json::from_value(json!({"question_id": " 7", "max_points": 3})).unwrap();
        assert_eq!(a.question_id, QuestionId(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_question_id_rejects_garbage() {
        let result: Result<Question, _> =
            serde_json::from_value(json!({"question_id": "q-7", "max_points": 3}));
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_choice_all_is_empty() {
        assert!(QuestionFilter::choice("all").is_empty());
        assert!(QuestionFilter::choice("ALL").is_empty());
        assert!(QuestionFilter::choice("  ").is_empty());
        assert_eq!(QuestionFilter::choice(" Apply "), vec!["Apply".to_string()]);
    }

    #[test]
    fn test_pool_query_shape() {
        let query = PoolQuery {
            filter: QuestionFilter {
                subjects: vec!["Networking".to_string()],
                ..QuestionFilter::default()
            },
            test_type: TestType::Manual,
            question_max_points: Some(10),
        };

        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "blooms_taxonomy": [],
                "subjects": ["Networking"],
                "topics": [],
                "question_types": [],
                "question_difficulties": [],
                "test_type": "manual",
                "question_max_points": 10
            })
        );
    }

    #[test]
    fn test_training_level_included_when_set() {
        let query = PoolQuery {
            filter: QuestionFilter {
                training_level: Some("Advanced".to_string()),
                ..QuestionFilter::default()
            },
            test_type: TestType::Random,
            question_max_points: None,
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["training_level"], "Advanced");
        assert_eq!(value["test_type"], "random");
        assert!(value.get("question_max_points").is_none());
    }

    #[test]
    fn test_modify_request_uses_camel_case_test_id() {
        let request = ModifyRequest {
            question_order: vec![ModifyOrder {
                question_id: QuestionId(4),
                question_order: None,
            }],
            total_score: 5,
            test_name: "Midterm".to_string(),
            is_active: false,
            test_description: "Week 6".to_string(),
            test_type: TestType::Manual,
            test_id: TestId(12),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["testId"], 12);
        assert_eq!(value["question_order"][0]["question_order"], serde_json::Value::Null);
    }

    #[test]
    fn test_error_body_prefers_message() {
        let body: ErrorBody = serde_json::from_value(json!({
            "status": "error",
            "message": "Name taken",
            "error": "legacy"
        }))
        .unwrap();
        assert!(body.is_error());
        assert_eq!(body.text(), Some("Name taken"));

        let legacy: ErrorBody = serde_json::from_value(json!({"error": "boom"})).unwrap();
        assert!(!legacy.is_error());
        assert_eq!(legacy.text(), Some("boom"));
    }

    #[test]
    fn test_error_body_tolerates_odd_limits() {
        let body: ErrorBody = serde_json::from_value(json!({
            "status": "error",
            "message": "Only 6 questions match",
            "available_questions": 6.0,
            "available_points": -3
        }))
        .unwrap();
        assert_eq!(body.text(), Some("Only 6 questions match"));
        assert_eq!(body.available_questions, Some(6));
        assert_eq!(body.available_points, None);

        let body: ErrorBody = serde_json::from_value(json!({
            "available_questions": "4",
            "available_points": 12.5
        }))
        .unwrap();
        assert_eq!(body.available_questions, Some(4));
        assert_eq!(body.available_points, None);
    }

    #[test]
    fn test_creation_request_trims_metadata() {
        let selection = SelectionResult {
            question_order: vec![QuestionOrder {
                question_id: QuestionId(1),
                question_order: 1,
            }],
            total_score: 4,
        };
        let metadata = TestMetadata {
            name: "  Quiz 1 ".to_string(),
            description: " Intro ".to_string(),
            is_active: true,
        };
        let request = TestCreationRequest::from_selection(selection, &metadata, TestType::Random);
        assert_eq!(request.test_name, "Quiz 1");
        assert_eq!(request.test_description, "Intro");
        assert_eq!(request.total_score, 4);
    }

    #[test]
    fn test_new_question_form_fields() {
        let question = NewQuestion {
            obj_id: "3".to_string(),
            question_text: "<p>What is a VLAN?</p>".to_string(),
            max_points: "4".to_string(),
            ..NewQuestion::default()
        };

        let fields = question.form_fields();

        assert_eq!(fields.len(), 10);
        assert_eq!(fields[0], ("obj_id", "3".to_string()));
        assert_eq!(fields[2], ("question_text", "<p>What is a VLAN?</p>".to_string()));
        assert_eq!(fields[8], ("max_points", "4".to_string()));
        assert_eq!(fields[9], ("source", String::new()));
    }
}
