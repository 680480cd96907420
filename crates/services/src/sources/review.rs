use std::sync::Mutex;

use async_trait::async_trait;

use quiz_core::model::{FilterCriteria, Question};

use crate::auth::AuthToken;
use crate::error::ServiceError;
use crate::sources::QuestionSource;
use crate::sources::mistakes::matches_grammar_focus;

pub const DEFAULT_REVIEW_COUNT: u32 = 5;

#[derive(Debug, Default)]
struct ReviewProgress {
    criteria: Option<FilterCriteria>,
    set: Vec<usize>,
    next: usize,
}

/// Fixed-length review set drawn from a question pool.
///
/// The set is built the first time a given set of filters is requested:
/// grammar-focus matches first, narrowed to the requested difficulty, then
/// padded with the rest of the pool up to `question_count`. Changing the
/// filters starts a new set.
pub struct ReviewSetSource {
    pool: Vec<Question>,
    progress: Mutex<ReviewProgress>,
}

impl ReviewSetSource {
    #[must_use]
    pub fn new(pool: Vec<Question>) -> Self {
        Self {
            pool,
            progress: Mutex::new(ReviewProgress::default()),
        }
    }

    /// Question ids the given filters select, in serving order.
    #[must_use]
    pub fn plan(&self, criteria: &FilterCriteria) -> Vec<&Question> {
        build_set(&self.pool, criteria)
            .into_iter()
            .map(|idx| &self.pool[idx])
            .collect()
    }

    /// `(served, total)` for the set currently being served.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        self.progress
            .lock()
            .map_or((0, 0), |progress| (progress.next, progress.set.len()))
    }

    /// Forget the current set so the next fetch starts over.
    pub fn restart(&self) {
        if let Ok(mut progress) = self.progress.lock() {
            *progress = ReviewProgress::default();
        }
    }
}

fn build_set(pool: &[Question], criteria: &FilterCriteria) -> Vec<usize> {
    let count = criteria.question_count.unwrap_or(DEFAULT_REVIEW_COUNT) as usize;

    let mut chosen: Vec<usize> = pool
        .iter()
        .enumerate()
        .filter(|(_, question)| matches_grammar_focus(question, &criteria.grammar_focus))
        .filter(|(_, question)| question.difficulty() == Some(criteria.difficulty))
        .map(|(idx, _)| idx)
        .collect();

    if chosen.len() < count {
        let padding: Vec<usize> = (0..pool.len()).filter(|idx| !chosen.contains(idx)).collect();
        chosen.extend(padding);
    }
    chosen.truncate(count);
    chosen
}

#[async_trait]
impl QuestionSource for ReviewSetSource {
    async fn fetch(
        &self,
        criteria: &FilterCriteria,
        _token: &AuthToken,
    ) -> Result<Question, ServiceError> {
        let mut progress = self
            .progress
            .lock()
            .map_err(|e| ServiceError::transient(e.to_string()))?;

        if progress.criteria.as_ref() != Some(criteria) {
            *progress = ReviewProgress {
                criteria: Some(criteria.clone()),
                set: build_set(&self.pool, criteria),
                next: 0,
            };
        }

        let Some(&idx) = progress.set.get(progress.next) else {
            return Err(ServiceError::Validation("review set exhausted".into()));
        };
        progress.next += 1;
        Ok(self.pool[idx].clone())
    }
}
