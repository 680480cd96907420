use std::fmt;

use crate::model::Question;

//
// ─── STAGE ─────────────────────────────────────────────────────────────────────
//

/// The three sequential steps of a question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    #[default]
    WordChoice,
    Translation,
    Explanation,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::WordChoice, Stage::Translation, Stage::Explanation];

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Stage::WordChoice => 0,
            Stage::Translation => 1,
            Stage::Explanation => 2,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::WordChoice => "word choice",
            Stage::Translation => "translation",
            Stage::Explanation => "explanation",
        };
        f.write_str(name)
    }
}

//
// ─── STAGE ANSWER ──────────────────────────────────────────────────────────────
//

/// Provisional or final answer for one answerable stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageAnswer {
    pub(crate) selection: Option<String>,
    pub(crate) locked: bool,
}

impl StageAnswer {
    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The answer, but only once it can no longer change.
    #[must_use]
    pub fn locked_answer(&self) -> Option<&str> {
        if self.locked {
            self.selection()
        } else {
            None
        }
    }
}

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Coarse lifecycle position, derived from the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingQuestion,
    WordChoiceActive,
    TranslationActive,
    ExplanationActive,
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) question: Option<Question>,
    pub(crate) active: Stage,
    pub(crate) word_choice: StageAnswer,
    pub(crate) translation: StageAnswer,
    pub(crate) submitted: bool,
}

impl SessionState {
    /// State before any question has been loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    #[must_use]
    pub fn active_stage(&self) -> Stage {
        self.active
    }

    #[must_use]
    pub fn word_choice(&self) -> &StageAnswer {
        &self.word_choice
    }

    #[must_use]
    pub fn translation(&self) -> &StageAnswer {
        &self.translation
    }

    /// `None` for the explanation stage, which takes no answer.
    #[must_use]
    pub fn answer(&self, stage: Stage) -> Option<&StageAnswer> {
        match stage {
            Stage::WordChoice => Some(&self.word_choice),
            Stage::Translation => Some(&self.translation),
            Stage::Explanation => None,
        }
    }

    /// True once the combined submission has been confirmed by the sink.
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    #[must_use]
    pub fn is_unlocked(&self, stage: Stage) -> bool {
        if self.question.is_none() {
            return false;
        }
        match stage {
            Stage::WordChoice => true,
            Stage::Translation => self.word_choice.locked,
            Stage::Explanation => self.submitted,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.question.is_none() {
            return SessionPhase::AwaitingQuestion;
        }
        match self.active {
            Stage::WordChoice => SessionPhase::WordChoiceActive,
            Stage::Translation => SessionPhase::TranslationActive,
            Stage::Explanation => SessionPhase::ExplanationActive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_index_round_trips() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_index(stage.index()), Some(stage));
        }
        assert_eq!(Stage::from_index(3), None);
    }

    #[test]
    fn empty_state_awaits_question_and_unlocks_nothing() {
        let state = SessionState::new();
        assert_eq!(state.phase(), SessionPhase::AwaitingQuestion);
        assert!(Stage::ALL.iter().all(|stage| !state.is_unlocked(*stage)));
    }

    #[test]
    fn locked_answer_hidden_until_lock() {
        let mut answer = StageAnswer {
            selection: Some("x".into()),
            locked: false,
        };
        assert_eq!(answer.locked_answer(), None);
        answer.locked = true;
        assert_eq!(answer.locked_answer(), Some("x"));
    }
}
