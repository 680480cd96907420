use quiz_core::model::{CandidateMark, Question, QuestionId, VocabEntry};
use quiz_core::{SessionPhase, SessionState, Stage};

use crate::error::{FailureKind, SessionFailure};

use super::request::RetryTarget;

/// Presentation-agnostic snapshot of a session.
///
/// Bindings render this and send intents back to the controller; they never
/// inspect `SessionState` directly. Nothing here is localized or formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub active_stage: Stage,
    pub question_id: Option<QuestionId>,
    pub sentence: String,
    pub stages: [StageTab; 3],
    pub word_choice: Option<ChoiceView>,
    pub translation: Option<ChoiceView>,
    /// Present once the combined answer has been accepted.
    pub explanation: Option<ExplanationView>,
    pub loading: bool,
    pub submitting: bool,
    pub error: Option<ErrorView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTab {
    pub stage: Stage,
    pub unlocked: bool,
    pub locked: bool,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceView {
    pub stage: Stage,
    pub prompt: Option<String>,
    pub candidates: Vec<CandidateView>,
    pub locked: bool,
    pub can_submit: bool,
    /// Only known once the stage is locked.
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateView {
    pub text: String,
    pub selected: bool,
    /// `None` until the stage is revealed.
    pub mark: Option<CandidateMark>,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationView {
    pub correct_word: String,
    pub word_choice_explanation: String,
    pub word_choice_correct: bool,
    pub correct_translation: String,
    pub translation_explanation: String,
    pub translation_correct: bool,
    pub grammar_points: Vec<String>,
    pub vocabulary: Vec<VocabEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub kind: FailureKind,
    pub message: String,
    pub retryable: bool,
    /// The call a retry repeats; `None` when the error is not retryable.
    pub retry: Option<RetryTarget>,
}

impl From<&SessionFailure> for ErrorView {
    fn from(failure: &SessionFailure) -> Self {
        Self {
            kind: failure.kind(),
            message: failure.to_string(),
            retryable: failure.is_retryable(),
            retry: None,
        }
    }
}

pub(crate) fn build(
    state: &SessionState,
    loading: bool,
    submitting: bool,
    error: Option<&SessionFailure>,
    retry: Option<&RetryTarget>,
) -> SessionView {
    let stages = Stage::ALL.map(|stage| StageTab {
        stage,
        unlocked: state.is_unlocked(stage),
        locked: state.answer(stage).is_some_and(|answer| answer.is_locked())
            || (stage == Stage::Explanation && state.is_submitted()),
        active: state.question().is_some() && state.active_stage() == stage,
    });

    let (word_choice, translation, explanation) = match state.question() {
        Some(question) => (
            Some(choice(question, state, Stage::WordChoice, loading || submitting)),
            Some(choice(question, state, Stage::Translation, loading || submitting)),
            state.is_submitted().then(|| explanation(question, state)),
        ),
        None => (None, None, None),
    };

    SessionView {
        phase: state.phase(),
        active_stage: state.active_stage(),
        question_id: state.question().map(|question| question.id().clone()),
        sentence: state
            .question()
            .map(|question| question.sentence().to_string())
            .unwrap_or_default(),
        stages,
        word_choice,
        translation,
        explanation,
        loading,
        submitting,
        error: error.map(|failure| {
            let mut view = ErrorView::from(failure);
            view.retry = retry.filter(|_| view.retryable).cloned();
            view
        }),
    }
}

fn choice(question: &Question, state: &SessionState, stage: Stage, busy: bool) -> ChoiceView {
    let answer = state.answer(stage).cloned().unwrap_or_default();
    let locked = answer.is_locked();
    let selected = answer.selection();
    let open = state.is_unlocked(stage) && !locked;
    let marks = locked.then(|| question.marks(stage, selected));

    let candidates = question
        .candidates(stage)
        .iter()
        .enumerate()
        .map(|(idx, text)| CandidateView {
            text: text.clone(),
            selected: selected == Some(text.as_str()),
            mark: marks.as_ref().and_then(|marks| marks.get(idx).copied()),
            enabled: open && !(busy && stage == Stage::Translation),
        })
        .collect();

    // Stage 0 submission is local; stage 1 goes through the sink.
    let can_submit = open
        && selected.is_some()
        && (stage == Stage::WordChoice || !busy);

    ChoiceView {
        stage,
        prompt: (stage == Stage::WordChoice).then(|| question.word_choice().prompt.clone()),
        candidates,
        locked,
        can_submit,
        is_correct: answer
            .locked_answer()
            .map(|locked| question.is_correct(stage, locked)),
    }
}

fn explanation(question: &Question, state: &SessionState) -> ExplanationView {
    let word_choice = question.word_choice();
    let translation = question.translation();
    ExplanationView {
        correct_word: word_choice.correct_answer.clone(),
        word_choice_explanation: word_choice.explanation.clone(),
        word_choice_correct: state
            .word_choice()
            .locked_answer()
            .is_some_and(|answer| question.is_correct(Stage::WordChoice, answer)),
        correct_translation: translation.correct_answer.clone(),
        translation_explanation: translation.explanation.clone(),
        translation_correct: state
            .translation()
            .locked_answer()
            .is_some_and(|answer| question.is_correct(Stage::Translation, answer)),
        grammar_points: question.grammar_points().to_vec(),
        vocabulary: question.vocabulary().to_vec(),
    }
}
