use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use url::Url;

use crate::error::ApiError;

/// A quiz question with its explanation steps and answer options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub solution: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub steps: Vec<ExplanationStep>,
    pub options: Vec<QuestionOption>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One step of a worked explanation, ordered by `step_number` (1-based).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationStep {
    pub step_number: i32,
    pub title: String,
    pub result: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub text: String,
    pub is_correct: bool,
}

impl Question {
    pub fn correct_answer(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.is_correct)
            .map(|option| option.text.as_str())
    }
}

/// Inbound payload for creating or replacing a question.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionInput {
    pub text: String,
    pub solution: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub steps: Vec<StepInput>,
    pub options: Vec<OptionInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepInput {
    pub title: String,
    pub result: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionInput {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

const BLANK: &str = "This field may not be blank.";
const EMPTY_LIST: &str = "This list may not be empty.";
const MIN_OPTIONS: &str = "Ensure this field has at least 2 elements.";
const ONE_CORRECT: &str = "Exactly one option must be marked as correct.";
const INVALID_URL: &str = "Enter a valid URL.";

impl QuestionInput {
    /// Validate the payload, collecting per-field errors in declaration
    /// order. Errors for individual steps and options nest under the
    /// entry's index, e.g. `{"steps": {"0": {"title": [...]}}}`.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Map::new();

        if self.text.trim().is_empty() {
            errors.insert("text".to_string(), json!([BLANK]));
        }
        if self.solution.trim().is_empty() {
            errors.insert("solution".to_string(), json!([BLANK]));
        }

        if self.steps.is_empty() {
            errors.insert("steps".to_string(), json!([EMPTY_LIST]));
        } else if let Some(step_errors) = validate_steps(&self.steps) {
            errors.insert("steps".to_string(), step_errors);
        }

        if self.options.len() < 2 {
            errors.insert("options".to_string(), json!([MIN_OPTIONS]));
        } else if let Some(option_errors) = validate_options(&self.options) {
            errors.insert("options".to_string(), option_errors);
        } else if self.options.iter().filter(|o| o.is_correct).count() != 1 {
            errors.insert("options".to_string(), json!([ONE_CORRECT]));
        }

        if let Some(image_url) = &self.image_url {
            if Url::parse(image_url).is_err() {
                errors.insert("image_url".to_string(), json!([INVALID_URL]));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(errors))
        }
    }
}

fn validate_steps(steps: &[StepInput]) -> Option<Value> {
    let mut step_errors = Map::new();

    for (index, step) in steps.iter().enumerate() {
        let mut fields = Map::new();
        if step.title.trim().is_empty() {
            fields.insert("title".to_string(), json!([BLANK]));
        }
        if step.result.trim().is_empty() {
            fields.insert("result".to_string(), json!([BLANK]));
        }
        if let Some(image_url) = &step.image_url {
            if Url::parse(image_url).is_err() {
                fields.insert("image_url".to_string(), json!([INVALID_URL]));
            }
        }
        if !fields.is_empty() {
            step_errors.insert(index.to_string(), Value::Object(fields));
        }
    }

    if step_errors.is_empty() {
        None
    } else {
        Some(Value::Object(step_errors))
    }
}

fn validate_options(options: &[OptionInput]) -> Option<Value> {
    let mut option_errors = Map::new();

    for (index, option) in options.iter().enumerate() {
        if option.text.trim().is_empty() {
            option_errors.insert(index.to_string(), json!({ "text": [BLANK] }));
        }
    }

    if option_errors.is_empty() {
        None
    } else {
        Some(Value::Object(option_errors))
    }
}

/// Outbound representation of a question. Option texts are listed without
/// their correctness flags; the correct answer is surfaced separately.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionResponse {
    pub id: i64,
    pub text: String,
    pub solution: String,
    pub correct_answer: String,
    pub steps: Vec<ExplanationStep>,
    pub options: Vec<String>,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Question> for QuestionResponse {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            text: question.text.clone(),
            solution: question.solution.clone(),
            correct_answer: question.correct_answer().unwrap_or_default().to_string(),
            steps: question.steps.clone(),
            options: question
                .options
                .iter()
                .map(|option| option.text.clone())
                .collect(),
            image_url: question.image_url.clone(),
            tags: question.tags.clone(),
            created_at: question.created_at,
            updated_at: question.updated_at,
        }
    }
}
