//! @acp:module "Form State"
//! @acp:summary "Explicit form inputs, marks and focus"
//! @acp:domain cli
//! @acp:layer data
//!
//! Explicit form state
//!
//! Everything a flow reads from or marks on the form lives in [`UiState`]
//! and is passed through the flow by `&mut`.

use std::collections::BTreeSet;
use std::fmt;

use crate::api::QuestionId;

/// Value of an untouched dropdown
pub const ALL: &str = "all";

/// Input fields a flow can mark invalid or focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    BloomsTaxonomy,
    Subject,
    Topic,
    TrainingLevel,
    QuestionType,
    QuestionDifficulty,
    QuestionCount,
    MaxPoints,
    QuestionMaxPoints,
    TestName,
    TestDescription,
    Questions,
    QuestionOrder(QuestionId),
    AttemptDate,
    Score,
    TesterName,
    TesterId,
}

impl Field {
    pub fn label(&self) -> String {
        match self {
            Field::BloomsTaxonomy => "Bloom's taxonomy level".to_string(),
            Field::Subject => "subject".to_string(),
            Field::Topic => "topic".to_string(),
            Field::TrainingLevel => "training level".to_string(),
            Field::QuestionType => "question type".to_string(),
            Field::QuestionDifficulty => "question difficulty".to_string(),
            Field::QuestionCount => "number of questions".to_string(),
            Field::MaxPoints => "maximum total points".to_string(),
            Field::QuestionMaxPoints => "maximum points per question".to_string(),
            Field::TestName => "test name".to_string(),
            Field::TestDescription => "test description".to_string(),
            Field::Questions => "selected questions".to_string(),
            Field::QuestionOrder(id) => format!("order of question {}", id),
            Field::AttemptDate => "attempt date".to_string(),
            Field::Score => "score".to_string(),
            Field::TesterName => "tester name".to_string(),
            Field::TesterId => "tester".to_string(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Raw form values, as typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInputs {
    pub blooms_taxonomy: String,
    pub subject: String,
    pub topic: String,
    pub training_level: String,
    pub question_type: String,
    pub question_difficulty: String,
    pub question_count: String,
    pub max_points: String,
    pub question_max_points: String,
    pub test_name: String,
    pub test_description: String,
    pub is_active: bool,
}

impl Default for FormInputs {
    fn default() -> Self {
        Self {
            blooms_taxonomy: ALL.to_string(),
            subject: ALL.to_string(),
            topic: ALL.to_string(),
            training_level: ALL.to_string(),
            question_type: ALL.to_string(),
            question_difficulty: ALL.to_string(),
            question_count: String::new(),
            max_points: String::new(),
            question_max_points: String::new(),
            test_name: String::new(),
            test_description: String::new(),
            is_active: false,
        }
    }
}

impl FormInputs {
    /// The text behind a form field, `None` for fields that are not form inputs
    pub fn value_mut(&mut self, field: Field) -> Option<&mut String> {
        let value = match field {
            Field::BloomsTaxonomy => &mut self.blooms_taxonomy,
            Field::Subject => &mut self.subject,
            Field::Topic => &mut self.topic,
            Field::TrainingLevel => &mut self.training_level,
            Field::QuestionType => &mut self.question_type,
            Field::QuestionDifficulty => &mut self.question_difficulty,
            Field::QuestionCount => &mut self.question_count,
            Field::MaxPoints => &mut self.max_points,
            Field::QuestionMaxPoints => &mut self.question_max_points,
            Field::TestName => &mut self.test_name,
            Field::TestDescription => &mut self.test_description,
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub form: FormInputs,
    invalid: BTreeSet<Field>,
    focused: Option<Field>,
    trigger_enabled: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(FormInputs::default())
    }
}

impl UiState {
    pub fn new(form: FormInputs) -> Self {
        Self {
            form,
            invalid: BTreeSet::new(),
            focused: None,
            trigger_enabled: true,
        }
    }

    /// Dropdowns back to "all", text and number inputs emptied. The active
    /// switch keeps its position.
    pub fn reset(&mut self) {
        let is_active = self.form.is_active;
        self.form = FormInputs {
            is_active,
            ..FormInputs::default()
        };
        self.invalid.clear();
        self.focused = None;
    }

    /// True when every dropdown and text input is at its initial value
    pub fn is_reset(&self) -> bool {
        let initial = FormInputs {
            is_active: self.form.is_active,
            ..FormInputs::default()
        };
        self.form == initial
    }

    pub fn mark_invalid(&mut self, field: Field) {
        self.invalid.insert(field);
    }

    pub fn clear_invalid(&mut self, field: Field) {
        self.invalid.remove(&field);
    }

    /// Marks or clears `field` depending on `valid`; returns `valid`
    pub fn check(&mut self, field: Field, valid: bool) -> bool {
        if valid {
            self.clear_invalid(field);
        } else {
            self.mark_invalid(field);
        }
        valid
    }

    pub fn is_invalid(&self, field: Field) -> bool {
        self.invalid.contains(&field)
    }

    pub fn invalid_fields(&self) -> Vec<Field> {
        self.invalid.iter().copied().collect()
    }

    pub fn focus(&mut self, field: Field) {
        self.focused = Some(field);
    }

    pub fn focused(&self) -> Option<Field> {
        self.focused
    }

    pub fn trigger_enabled(&self) -> bool {
        self.trigger_enabled
    }

    pub fn disable_trigger(&mut self) {
        self.trigger_enabled = false;
    }

    pub fn enable_trigger(&mut self) {
        self.trigger_enabled = true;
    }
}

/// Parses a positive integer input
pub fn positive_number(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|n| *n > 0)
}
