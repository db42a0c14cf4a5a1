use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::question::{ExplanationStep, Question, QuestionInput, QuestionOption};

/// Errors from the question store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("question {0} not found")]
    NotFound(i64),

    #[error("question text already exists")]
    DuplicateText,
}

/// Process-local question storage.
///
/// Stands in for the deployment's persistence layer; guarantees id
/// assignment and question-text uniqueness, nothing more. Shared across
/// handlers behind an `Arc`.
pub struct QuestionStore {
    questions: RwLock<HashMap<i64, Question>>,
    next_id: AtomicI64,
}

impl QuestionStore {
    pub fn new() -> Self {
        Self {
            questions: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// All questions, ordered by id.
    pub async fn list(&self) -> Vec<Question> {
        let questions = self.questions.read().await;
        let mut all: Vec<Question> = questions.values().cloned().collect();
        all.sort_by_key(|question| question.id);
        all
    }

    pub async fn get(&self, id: i64) -> Result<Question, StoreError> {
        self.questions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    pub async fn count(&self) -> usize {
        self.questions.read().await.len()
    }

    pub async fn create(&self, input: QuestionInput) -> Result<Question, StoreError> {
        let mut questions = self.questions.write().await;
        if questions.values().any(|question| question.text == input.text) {
            return Err(StoreError::DuplicateText);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        let question = build_question(id, input, now, now);
        questions.insert(id, question.clone());
        Ok(question)
    }

    /// Full replacement of an existing question. The original creation
    /// timestamp is kept.
    pub async fn update(&self, id: i64, input: QuestionInput) -> Result<Question, StoreError> {
        let mut questions = self.questions.write().await;
        let created_at = questions
            .get(&id)
            .map(|question| question.created_at)
            .ok_or(StoreError::NotFound(id))?;

        if questions
            .values()
            .any(|question| question.id != id && question.text == input.text)
        {
            return Err(StoreError::DuplicateText);
        }

        let question = build_question(id, input, created_at, Utc::now());
        questions.insert(id, question.clone());
        Ok(question)
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.questions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}

impl Default for QuestionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn build_question(
    id: i64,
    input: QuestionInput,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Question {
    Question {
        id,
        text: input.text,
        solution: input.solution,
        image_url: input.image_url,
        tags: input.tags,
        steps: input
            .steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| ExplanationStep {
                step_number: index as i32 + 1,
                title: step.title,
                result: step.result,
                image_url: step.image_url,
            })
            .collect(),
        options: input
            .options
            .into_iter()
            .map(|option| QuestionOption {
                text: option.text,
                is_correct: option.is_correct,
            })
            .collect(),
        created_at,
        updated_at,
    }
}
