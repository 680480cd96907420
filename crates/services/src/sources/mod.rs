//! Collaborators the session controller talks to.
//!
//! Each seam is an async trait object so bindings can mix the HTTP backend
//! with the in-memory sources used for mistake review and generated sets.

mod mistakes;
mod review;
mod scoreboard;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quiz_core::model::{FilterCriteria, Question, QuestionId};

use crate::auth::AuthToken;
use crate::error::ServiceError;

pub use mistakes::{DateWindow, MistakeFilter, MistakeRecord, MistakeSource, NavigationMode};
pub use review::{DEFAULT_REVIEW_COUNT, ReviewSetSource};
pub use scoreboard::{Score, ScoreboardSink};

/// Hands out the next question for a set of filters.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `ServiceError` if no valid question could be obtained.
    async fn fetch(
        &self,
        criteria: &FilterCriteria,
        token: &AuthToken,
    ) -> Result<Question, ServiceError>;
}

/// Records the learner's combined answer for a question.
#[async_trait]
pub trait AnswerSink: Send + Sync {
    /// # Errors
    ///
    /// Returns `ServiceError` if the submission could not be delivered.
    async fn submit(
        &self,
        submission: &AnswerSubmission,
        token: &AuthToken,
    ) -> Result<SubmissionReceipt, ServiceError>;
}

/// Dictionary lookup behind the word-click side panel.
#[async_trait]
pub trait WordLookup: Send + Sync {
    /// # Errors
    ///
    /// Returns `ServiceError` if the word could not be explained.
    async fn explain(&self, word: &str, token: &AuthToken)
    -> Result<WordExplanation, ServiceError>;
}

/// Both stage answers for one question, sent as a single payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSubmission {
    pub question_id: QuestionId,
    pub word_choice_answer: String,
    pub translation_answer: String,
    pub answered_at: DateTime<Utc>,
}

impl AnswerSubmission {
    /// Same question and answers, ignoring the timestamp.
    #[must_use]
    pub fn same_answers(&self, other: &Self) -> bool {
        self.question_id == other.question_id
            && self.word_choice_answer == other.word_choice_answer
            && self.translation_answer == other.translation_answer
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub accepted: bool,
    /// Backend verdict when it grades the answer itself.
    pub correct: Option<bool>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDefinition {
    pub part_of_speech: String,
    pub meanings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordExplanation {
    pub word: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub definitions: Vec<WordDefinition>,
}
