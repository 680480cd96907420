use thiserror::Error;

use crate::model::{Question, QuestionId};
use crate::session::{SessionState, Stage};

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new question replaces whatever was on screen.
    QuestionLoaded(Question),
    SelectWordChoice(String),
    SubmitWordChoice,
    SelectTranslation(String),
    /// Request the combined submission; the state only changes once the
    /// sink confirms via `FinalAnswerAccepted`.
    SubmitTranslation,
    FinalAnswerAccepted { question_id: QuestionId },
    AdvanceToExplanation,
    NavigateToStage(Stage),
}

impl SessionEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::QuestionLoaded(_) => "question_loaded",
            SessionEvent::SelectWordChoice(_) => "select_word_choice",
            SessionEvent::SubmitWordChoice => "submit_word_choice",
            SessionEvent::SelectTranslation(_) => "select_translation",
            SessionEvent::SubmitTranslation => "submit_translation",
            SessionEvent::FinalAnswerAccepted { .. } => "final_answer_accepted",
            SessionEvent::AdvanceToExplanation => "advance_to_explanation",
            SessionEvent::NavigateToStage(_) => "navigate_to_stage",
        }
    }
}

/// Work the caller has to perform on behalf of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send both answers for `question_id` as one submission.
    SubmitFinalAnswer {
        question_id: QuestionId,
        word_choice: String,
        translation: String,
    },
}

/// Result of a legal event: the next state plus any effect to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub effect: Option<Effect>,
}

impl Transition {
    pub(crate) fn to(state: SessionState) -> Self {
        Self {
            state,
            effect: None,
        }
    }
}

/// An event that violates the current state's preconditions.
///
/// The calling UI disables the controls that would produce these, so seeing
/// one means a binding is out of sync with the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionError {
    #[error("{event}: no question loaded")]
    NoQuestion { event: &'static str },

    #[error("{event}: {stage} stage is already locked")]
    StageLocked { event: &'static str, stage: Stage },

    #[error("{event}: {stage} stage is not unlocked yet")]
    StageNotUnlocked { event: &'static str, stage: Stage },

    #[error("{event}: nothing selected for the {stage} stage")]
    NoSelection { event: &'static str, stage: Stage },

    #[error("{candidate:?} is not a {stage} candidate")]
    NotACandidate { stage: Stage, candidate: String },

    #[error("confirmation for {got} does not match current question {expected}")]
    QuestionMismatch {
        expected: QuestionId,
        got: QuestionId,
    },
}
