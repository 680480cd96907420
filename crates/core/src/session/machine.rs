use crate::session::{
    Effect, SessionEvent, SessionState, Stage, StageAnswer, Transition, TransitionError,
};

impl SessionState {
    /// Compute the state that follows `event`.
    ///
    /// `self` is never modified; on error the caller keeps its current state.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` when the event is not legal in this state.
    pub fn apply(&self, event: SessionEvent) -> Result<Transition, TransitionError> {
        let name = event.name();
        match event {
            SessionEvent::QuestionLoaded(question) => Ok(Transition::to(SessionState {
                question: Some(question),
                active: Stage::WordChoice,
                word_choice: StageAnswer::default(),
                translation: StageAnswer::default(),
                submitted: false,
            })),

            SessionEvent::SelectWordChoice(candidate) => {
                self.require_question(name)?;
                self.require_open(name, Stage::WordChoice)?;
                self.require_candidate(Stage::WordChoice, &candidate)?;
                let mut next = self.clone();
                next.word_choice.selection = Some(candidate);
                Ok(Transition::to(next))
            }

            SessionEvent::SubmitWordChoice => {
                self.require_question(name)?;
                self.require_open(name, Stage::WordChoice)?;
                self.require_selection(name, Stage::WordChoice)?;
                let mut next = self.clone();
                next.word_choice.locked = true;
                next.active = Stage::Translation;
                Ok(Transition::to(next))
            }

            SessionEvent::SelectTranslation(candidate) => {
                self.require_question(name)?;
                self.require_unlocked(name, Stage::Translation)?;
                self.require_open(name, Stage::Translation)?;
                self.require_candidate(Stage::Translation, &candidate)?;
                let mut next = self.clone();
                next.translation.selection = Some(candidate);
                Ok(Transition::to(next))
            }

            SessionEvent::SubmitTranslation => {
                let question = self.require_question(name)?;
                self.require_unlocked(name, Stage::Translation)?;
                self.require_open(name, Stage::Translation)?;
                let translation = self.require_selection(name, Stage::Translation)?;
                let word_choice = self
                    .word_choice
                    .locked_answer()
                    .ok_or(TransitionError::NoSelection {
                        event: name,
                        stage: Stage::WordChoice,
                    })?;
                Ok(Transition {
                    state: self.clone(),
                    effect: Some(Effect::SubmitFinalAnswer {
                        question_id: question.id().clone(),
                        word_choice: word_choice.to_string(),
                        translation: translation.to_string(),
                    }),
                })
            }

            SessionEvent::FinalAnswerAccepted { question_id } => {
                let question = self.require_question(name)?;
                if question.id() != &question_id {
                    return Err(TransitionError::QuestionMismatch {
                        expected: question.id().clone(),
                        got: question_id,
                    });
                }
                self.require_unlocked(name, Stage::Translation)?;
                self.require_open(name, Stage::Translation)?;
                self.require_selection(name, Stage::Translation)?;
                let mut next = self.clone();
                next.translation.locked = true;
                next.submitted = true;
                Ok(Transition::to(next))
            }

            SessionEvent::AdvanceToExplanation => {
                self.require_question(name)?;
                self.require_unlocked(name, Stage::Explanation)?;
                let mut next = self.clone();
                next.active = Stage::Explanation;
                Ok(Transition::to(next))
            }

            SessionEvent::NavigateToStage(stage) => {
                self.require_question(name)?;
                self.require_unlocked(name, stage)?;
                let mut next = self.clone();
                next.active = stage;
                Ok(Transition::to(next))
            }
        }
    }

    /// Apply `event` in place, keeping the current state on error.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` when the event is not legal in this state.
    pub fn dispatch(&mut self, event: SessionEvent) -> Result<Option<Effect>, TransitionError> {
        let Transition { state, effect } = self.apply(event)?;
        *self = state;
        Ok(effect)
    }

    fn require_question(
        &self,
        event: &'static str,
    ) -> Result<&crate::model::Question, TransitionError> {
        self.question
            .as_ref()
            .ok_or(TransitionError::NoQuestion { event })
    }

    fn require_unlocked(&self, event: &'static str, stage: Stage) -> Result<(), TransitionError> {
        if self.is_unlocked(stage) {
            Ok(())
        } else {
            Err(TransitionError::StageNotUnlocked { event, stage })
        }
    }

    fn require_open(&self, event: &'static str, stage: Stage) -> Result<(), TransitionError> {
        match self.answer(stage) {
            Some(answer) if answer.is_locked() => {
                Err(TransitionError::StageLocked { event, stage })
            }
            _ => Ok(()),
        }
    }

    fn require_selection(
        &self,
        event: &'static str,
        stage: Stage,
    ) -> Result<&str, TransitionError> {
        self.answer(stage)
            .and_then(StageAnswer::selection)
            .ok_or(TransitionError::NoSelection { event, stage })
    }

    fn require_candidate(&self, stage: Stage, candidate: &str) -> Result<(), TransitionError> {
        let known = self
            .question
            .as_ref()
            .is_some_and(|question| question.is_candidate(stage, candidate));
        if known {
            Ok(())
        } else {
            Err(TransitionError::NotACandidate {
                stage,
                candidate: candidate.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::question;
    use crate::model::{CandidateMark, QuestionId};
    use crate::session::SessionPhase;

    fn loaded() -> SessionState {
        let mut state = SessionState::new();
        state
            .dispatch(SessionEvent::QuestionLoaded(question("Q1", &["x", "y"], "y")))
            .unwrap();
        state
    }

    fn word_choice_locked(choice: &str) -> SessionState {
        let mut state = loaded();
        state
            .dispatch(SessionEvent::SelectWordChoice(choice.into()))
            .unwrap();
        state.dispatch(SessionEvent::SubmitWordChoice).unwrap();
        state
    }

    fn submitted() -> SessionState {
        let mut state = word_choice_locked("y");
        state
            .dispatch(SessionEvent::SelectTranslation("t1".into()))
            .unwrap();
        state
            .dispatch(SessionEvent::FinalAnswerAccepted {
                question_id: QuestionId::new("Q1"),
            })
            .unwrap();
        state
    }

    #[test]
    fn question_loaded_starts_at_word_choice() {
        let state = loaded();
        assert_eq!(state.phase(), SessionPhase::WordChoiceActive);
        assert!(state.is_unlocked(Stage::WordChoice));
        assert!(!state.is_unlocked(Stage::Translation));
    }

    #[test]
    fn last_selection_before_lock_wins() {
        let mut state = loaded();
        for choice in ["x", "y", "x", "x"] {
            state
                .dispatch(SessionEvent::SelectWordChoice(choice.into()))
                .unwrap();
        }
        state.dispatch(SessionEvent::SubmitWordChoice).unwrap();
        assert_eq!(state.word_choice().locked_answer(), Some("x"));

        let err = state
            .dispatch(SessionEvent::SelectWordChoice("y".into()))
            .unwrap_err();
        assert!(matches!(err, TransitionError::StageLocked { .. }));
        assert_eq!(state.word_choice().locked_answer(), Some("x"));
    }

    #[test]
    fn reselecting_same_candidate_is_idempotent() {
        let mut state = loaded();
        state
            .dispatch(SessionEvent::SelectWordChoice("x".into()))
            .unwrap();
        let before = state.clone();
        state
            .dispatch(SessionEvent::SelectWordChoice("x".into()))
            .unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn submit_without_selection_is_rejected() {
        let state = loaded();
        let err = state.apply(SessionEvent::SubmitWordChoice).unwrap_err();
        assert_eq!(
            err,
            TransitionError::NoSelection {
                event: "submit_word_choice",
                stage: Stage::WordChoice
            }
        );
    }

    #[test]
    fn unknown_candidate_is_rejected() {
        let state = loaded();
        let err = state
            .apply(SessionEvent::SelectWordChoice("nope".into()))
            .unwrap_err();
        assert!(matches!(err, TransitionError::NotACandidate { .. }));
    }

    #[test]
    fn wrong_word_choice_reveals_marks_and_unlocks_translation() {
        let state = word_choice_locked("x");
        let question = state.question().unwrap();
        let marks = question.marks(Stage::WordChoice, state.word_choice().locked_answer());
        assert_eq!(marks, vec![CandidateMark::Wrong, CandidateMark::Correct]);
        assert!(state.is_unlocked(Stage::Translation));
        assert_eq!(state.active_stage(), Stage::Translation);
    }

    #[test]
    fn navigate_to_translation_requires_word_choice_lock() {
        let state = loaded();
        let err = state
            .apply(SessionEvent::NavigateToStage(Stage::Translation))
            .unwrap_err();
        assert!(matches!(err, TransitionError::StageNotUnlocked { .. }));

        let locked = word_choice_locked("y");
        let mut back = locked.clone();
        back.dispatch(SessionEvent::NavigateToStage(Stage::WordChoice))
            .unwrap();
        back.dispatch(SessionEvent::NavigateToStage(Stage::Translation))
            .unwrap();
        assert_eq!(back.active_stage(), Stage::Translation);
        assert_eq!(back.word_choice(), locked.word_choice());
    }

    #[test]
    fn navigate_to_explanation_before_submission_keeps_state() {
        let mut state = word_choice_locked("y");
        let before = state.clone();
        assert!(state
            .dispatch(SessionEvent::NavigateToStage(Stage::Explanation))
            .is_err());
        assert_eq!(state, before);
        assert_eq!(state.active_stage(), Stage::Translation);
    }

    #[test]
    fn select_translation_before_word_choice_lock_is_rejected() {
        let state = loaded();
        let err = state
            .apply(SessionEvent::SelectTranslation("t1".into()))
            .unwrap_err();
        assert!(matches!(
            err,
            TransitionError::StageNotUnlocked {
                stage: Stage::Translation,
                ..
            }
        ));
    }

    #[test]
    fn submit_translation_emits_effect_without_locking() {
        let mut state = word_choice_locked("x");
        state
            .dispatch(SessionEvent::SelectTranslation("t2".into()))
            .unwrap();
        let transition = state.apply(SessionEvent::SubmitTranslation).unwrap();
        assert_eq!(
            transition.effect,
            Some(Effect::SubmitFinalAnswer {
                question_id: QuestionId::new("Q1"),
                word_choice: "x".into(),
                translation: "t2".into(),
            })
        );
        assert!(!transition.state.translation().is_locked());
        assert!(!transition.state.is_submitted());
    }

    #[test]
    fn confirmation_locks_translation_exactly_once() {
        let state = submitted();
        assert!(state.translation().is_locked());
        assert!(state.is_submitted());

        let err = state
            .apply(SessionEvent::FinalAnswerAccepted {
                question_id: QuestionId::new("Q1"),
            })
            .unwrap_err();
        assert!(matches!(err, TransitionError::StageLocked { .. }));
    }

    #[test]
    fn confirmation_for_other_question_is_rejected() {
        let mut state = word_choice_locked("y");
        state
            .dispatch(SessionEvent::SelectTranslation("t1".into()))
            .unwrap();
        let err = state
            .apply(SessionEvent::FinalAnswerAccepted {
                question_id: QuestionId::new("Q0"),
            })
            .unwrap_err();
        assert!(matches!(err, TransitionError::QuestionMismatch { .. }));
    }

    #[test]
    fn advance_to_explanation_is_idempotent() {
        let mut state = submitted();
        state.dispatch(SessionEvent::AdvanceToExplanation).unwrap();
        let once = state.clone();
        state.dispatch(SessionEvent::AdvanceToExplanation).unwrap();
        assert_eq!(state, once);
        assert_eq!(state.phase(), SessionPhase::ExplanationActive);
    }

    #[test]
    fn advance_before_submission_is_rejected() {
        let state = word_choice_locked("y");
        assert!(state.apply(SessionEvent::AdvanceToExplanation).is_err());
    }

    #[test]
    fn question_loaded_always_resets() {
        let mut partial = loaded();
        partial
            .dispatch(SessionEvent::SelectWordChoice("x".into()))
            .unwrap();

        for prior in [SessionState::new(), partial, word_choice_locked("x"), submitted()] {
            let next = prior
                .apply(SessionEvent::QuestionLoaded(question("Q2", &["a", "b"], "a")))
                .unwrap()
                .state;
            assert_eq!(next.active_stage(), Stage::WordChoice);
            assert_eq!(next.word_choice(), &StageAnswer::default());
            assert_eq!(next.translation(), &StageAnswer::default());
            assert!(!next.is_submitted());
            assert_eq!(next.question().unwrap().id(), &QuestionId::new("Q2"));
        }
    }

    #[test]
    fn events_without_question_are_rejected() {
        let state = SessionState::new();
        let err = state.apply(SessionEvent::SubmitWordChoice).unwrap_err();
        assert!(matches!(err, TransitionError::NoQuestion { .. }));
        let err = state
            .apply(SessionEvent::NavigateToStage(Stage::WordChoice))
            .unwrap_err();
        assert!(matches!(err, TransitionError::NoQuestion { .. }));
    }
}
