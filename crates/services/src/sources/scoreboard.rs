use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use quiz_core::Stage;
use quiz_core::model::{Question, QuestionId};

use crate::auth::AuthToken;
use crate::error::ServiceError;
use crate::sources::{AnswerSink, AnswerSubmission, SubmissionReceipt};

/// Running tally of graded submissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub answered: u32,
    pub word_choice_correct: u32,
    pub translation_correct: u32,
}

#[derive(Debug, Default)]
struct Tally {
    score: Score,
    perfect: u32,
}

/// Grades submissions locally against the questions it was built from.
///
/// Used for offline review sets where nothing is sent to the backend.
pub struct ScoreboardSink {
    questions: HashMap<QuestionId, Question>,
    tally: Mutex<Tally>,
}

impl ScoreboardSink {
    #[must_use]
    pub fn new(questions: impl IntoIterator<Item = Question>) -> Self {
        Self {
            questions: questions
                .into_iter()
                .map(|question| (question.id().clone(), question))
                .collect(),
            tally: Mutex::new(Tally::default()),
        }
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.tally.lock().map(|tally| tally.score).unwrap_or_default()
    }

    /// Questions answered with both stages correct.
    #[must_use]
    pub fn perfect(&self) -> u32 {
        self.tally.lock().map(|tally| tally.perfect).unwrap_or_default()
    }

    pub fn reset(&self) {
        if let Ok(mut tally) = self.tally.lock() {
            *tally = Tally::default();
        }
    }
}

#[async_trait]
impl AnswerSink for ScoreboardSink {
    async fn submit(
        &self,
        submission: &AnswerSubmission,
        _token: &AuthToken,
    ) -> Result<SubmissionReceipt, ServiceError> {
        let Some(question) = self.questions.get(&submission.question_id) else {
            return Err(ServiceError::Validation(format!(
                "unknown question {}",
                submission.question_id
            )));
        };

        let word_ok = question.is_correct(Stage::WordChoice, &submission.word_choice_answer);
        let translation_ok =
            question.is_correct(Stage::Translation, &submission.translation_answer);

        let mut tally = self
            .tally
            .lock()
            .map_err(|e| ServiceError::transient(e.to_string()))?;
        tally.score.answered += 1;
        tally.score.word_choice_correct += u32::from(word_ok);
        tally.score.translation_correct += u32::from(translation_ok);
        tally.perfect += u32::from(word_ok && translation_ok);

        let correct_parts = u32::from(word_ok) + u32::from(translation_ok);
        Ok(SubmissionReceipt {
            accepted: true,
            correct: Some(word_ok && translation_ok),
            feedback: Some(format!("{correct_parts}/2 correct")),
        })
    }
}
