use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use quiz_core::model::FilterCriteria;
use quiz_core::{Clock, Effect, SessionEvent, SessionState, Stage, TransitionError};

use crate::auth::AuthToken;
use crate::config::{ApiConfig, DEFAULT_REVEAL_DELAY};
use crate::error::{ServiceError, SessionFailure};
use crate::sources::{AnswerSink, AnswerSubmission, QuestionSource, SubmissionReceipt};

use super::request::{
    LoadRequest, LoadResponse, RequestSeq, RetryTarget, SubmitRequest, SubmitResponse,
};
use super::view::{self, SessionView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Load(RequestSeq),
    Submit(RequestSeq),
}

/// What happened to a finished question fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer request was issued in the meantime; the response was dropped.
    Stale,
    Failed(SessionFailure),
}

/// What happened to a finished answer submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Stage 1 is locked. The binding should wait `reveal_after` and then
    /// call `advance_to_explanation`.
    Accepted {
        receipt: SubmissionReceipt,
        reveal_after: Duration,
    },
    Stale,
    Failed(SessionFailure),
}

/// Drives one practice session against a question source and answer sink.
///
/// Network calls are split into `begin_*` / `run` / `finish_*` so a UI can
/// release the controller while a request is in flight. Every request gets a
/// fresh `RequestSeq`; a response is applied only if it belongs to the most
/// recent request, so issuing a new load silently supersedes anything still
/// outstanding.
pub struct SessionController {
    source: Arc<dyn QuestionSource>,
    sink: Arc<dyn AnswerSink>,
    clock: Clock,
    reveal_delay: Duration,

    state: SessionState,
    criteria: FilterCriteria,
    next_seq: RequestSeq,
    pending: Option<Pending>,
    prepared: Option<AnswerSubmission>,
    last_receipt: Option<SubmissionReceipt>,
    error: Option<SessionFailure>,
    retry: Option<RetryTarget>,
}

impl SessionController {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>, sink: Arc<dyn AnswerSink>) -> Self {
        Self {
            source,
            sink,
            clock: Clock::system(),
            reveal_delay: DEFAULT_REVEAL_DELAY,
            state: SessionState::new(),
            criteria: FilterCriteria::default(),
            next_seq: RequestSeq::first(),
            pending: None,
            prepared: None,
            last_receipt: None,
            error: None,
            retry: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: &ApiConfig) -> Self {
        self.reveal_delay = config.reveal_delay;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    #[must_use]
    pub fn error(&self) -> Option<&SessionFailure> {
        self.error.as_ref()
    }

    /// Which call to repeat for the error on display.
    #[must_use]
    pub fn retry_target(&self) -> Option<&RetryTarget> {
        self.retry.as_ref()
    }

    #[must_use]
    pub fn last_receipt(&self) -> Option<&SubmissionReceipt> {
        self.last_receipt.as_ref()
    }

    #[must_use]
    pub fn reveal_delay(&self) -> Duration {
        self.reveal_delay
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.pending, Some(Pending::Load(_)))
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self.pending, Some(Pending::Submit(_)))
    }

    pub fn clear_error(&mut self) {
        self.error = None;
        self.retry = None;
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        view::build(
            &self.state,
            self.is_loading(),
            self.is_submitting(),
            self.error.as_ref(),
            self.retry.as_ref(),
        )
    }

    //
    // ─── LOADING ───────────────────────────────────────────────────────────────
    //

    /// Start fetching a question for `criteria`, superseding any request
    /// still in flight.
    pub fn begin_load(&mut self, criteria: FilterCriteria) -> LoadRequest {
        let seq = self.issue();
        if let Some(previous) = self.pending.replace(Pending::Load(seq)) {
            debug!("load {seq} supersedes {previous:?}");
        }
        self.criteria = criteria.clone();
        self.clear_error();
        LoadRequest {
            seq,
            criteria,
            source: Arc::clone(&self.source),
        }
    }

    pub fn finish_load(&mut self, response: LoadResponse) -> LoadOutcome {
        if self.pending != Some(Pending::Load(response.seq)) {
            debug!("dropping stale load response {}", response.seq);
            return LoadOutcome::Stale;
        }
        self.pending = None;

        match response.result {
            Ok(question) => {
                debug!("load {} applied question {}", response.seq, question.id());
                if let Err(err) = self.state.dispatch(SessionEvent::QuestionLoaded(question)) {
                    return LoadOutcome::Failed(self.reject(err));
                }
                self.prepared = None;
                self.last_receipt = None;
                LoadOutcome::Applied
            }
            Err(err) => {
                warn!("load {} failed: {err}", response.seq);
                let criteria = self.criteria.clone();
                LoadOutcome::Failed(self.fail(err, RetryTarget::Load(criteria)))
            }
        }
    }

    /// Fetch and apply a question in one step.
    pub async fn load_question(
        &mut self,
        criteria: FilterCriteria,
        token: &AuthToken,
    ) -> LoadOutcome {
        let response = self.begin_load(criteria).run(token).await;
        self.finish_load(response)
    }

    /// Same as `load_question`; any unsubmitted answers are discarded.
    pub async fn change_filters(
        &mut self,
        criteria: FilterCriteria,
        token: &AuthToken,
    ) -> LoadOutcome {
        self.load_question(criteria, token).await
    }

    /// Reload with the filters of the last load.
    pub async fn request_next_question(&mut self, token: &AuthToken) -> LoadOutcome {
        let criteria = self.criteria.clone();
        self.load_question(criteria, token).await
    }

    //
    // ─── LOCAL INTENTS ─────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `SessionFailure::IllegalTransition` if stage 0 is locked or the
    /// candidate is unknown.
    pub fn select_word_choice(
        &mut self,
        candidate: impl Into<String>,
    ) -> Result<(), SessionFailure> {
        self.apply(SessionEvent::SelectWordChoice(candidate.into()))
    }

    /// # Errors
    ///
    /// Returns `SessionFailure::IllegalTransition` without a selection or once
    /// stage 0 is locked.
    pub fn submit_word_choice(&mut self) -> Result<(), SessionFailure> {
        self.apply(SessionEvent::SubmitWordChoice)
    }

    /// # Errors
    ///
    /// Returns `SessionFailure::Busy` while the final answer is being
    /// submitted, or `SessionFailure::IllegalTransition` if stage 1 is not
    /// open.
    pub fn select_translation(
        &mut self,
        candidate: impl Into<String>,
    ) -> Result<(), SessionFailure> {
        if self.is_submitting() {
            warn!("select_translation ignored while submitting");
            return Err(SessionFailure::Busy);
        }
        self.apply(SessionEvent::SelectTranslation(candidate.into()))
    }

    /// # Errors
    ///
    /// Returns `SessionFailure::IllegalTransition` if `stage` is not unlocked.
    pub fn navigate_to(&mut self, stage: Stage) -> Result<(), SessionFailure> {
        self.apply(SessionEvent::NavigateToStage(stage))
    }

    /// # Errors
    ///
    /// Returns `SessionFailure::IllegalTransition` before the final answer is
    /// accepted.
    pub fn advance_to_explanation(&mut self) -> Result<(), SessionFailure> {
        self.apply(SessionEvent::AdvanceToExplanation)
    }

    //
    // ─── SUBMISSION ────────────────────────────────────────────────────────────
    //

    /// Prepare the combined submission for the current question.
    ///
    /// Retrying with unchanged answers re-sends the identical payload,
    /// `answered_at` included.
    ///
    /// # Errors
    ///
    /// Returns `SessionFailure::Busy` while another request is outstanding and
    /// `SessionFailure::IllegalTransition` if stage 1 cannot be submitted.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, SessionFailure> {
        if let Some(pending) = self.pending {
            warn!("submit refused, {pending:?} still outstanding");
            return Err(SessionFailure::Busy);
        }

        let effect = match self.state.dispatch(SessionEvent::SubmitTranslation) {
            Ok(effect) => effect,
            Err(err) => return Err(self.reject(err)),
        };
        let Some(Effect::SubmitFinalAnswer {
            question_id,
            word_choice,
            translation,
        }) = effect
        else {
            return Err(self.reject(TransitionError::NoSelection {
                event: "submit_translation",
                stage: Stage::Translation,
            }));
        };

        let fresh = AnswerSubmission {
            question_id,
            word_choice_answer: word_choice,
            translation_answer: translation,
            answered_at: self.clock.now(),
        };
        let submission = match self.prepared.take() {
            Some(previous) if previous.same_answers(&fresh) => previous,
            _ => fresh,
        };
        self.prepared = Some(submission.clone());

        let seq = self.issue();
        self.pending = Some(Pending::Submit(seq));
        self.clear_error();
        debug!("submit {seq} for question {}", submission.question_id);

        Ok(SubmitRequest {
            seq,
            submission,
            sink: Arc::clone(&self.sink),
        })
    }

    pub fn finish_submit(&mut self, response: SubmitResponse) -> SubmitOutcome {
        if self.pending != Some(Pending::Submit(response.seq)) {
            debug!("dropping stale submit response {}", response.seq);
            return SubmitOutcome::Stale;
        }
        self.pending = None;

        let receipt = match response.result {
            Ok(receipt) if receipt.accepted => receipt,
            Ok(_) => {
                warn!("submit {} was not accepted", response.seq);
                return SubmitOutcome::Failed(
                    self.fail(
                        ServiceError::Validation("submission was not accepted".into()),
                        RetryTarget::Submit,
                    ),
                );
            }
            Err(err) => {
                warn!("submit {} failed: {err}", response.seq);
                return SubmitOutcome::Failed(self.fail(err, RetryTarget::Submit));
            }
        };

        let accepted = SessionEvent::FinalAnswerAccepted {
            question_id: response.submission.question_id,
        };
        if let Err(err) = self.state.dispatch(accepted) {
            return SubmitOutcome::Failed(self.reject(err));
        }
        self.prepared = None;
        self.last_receipt = Some(receipt.clone());
        SubmitOutcome::Accepted {
            receipt,
            reveal_after: self.reveal_delay,
        }
    }

    /// Submit both answers in one step.
    ///
    /// # Errors
    ///
    /// Returns the same errors as `begin_submit`; delivery failures are
    /// reported through `SubmitOutcome::Failed`.
    pub async fn submit_final_answer(
        &mut self,
        token: &AuthToken,
    ) -> Result<SubmitOutcome, SessionFailure> {
        let request = self.begin_submit()?;
        let response = request.run(token).await;
        Ok(self.finish_submit(response))
    }

    //
    // ─── HELPERS ───────────────────────────────────────────────────────────────
    //

    fn issue(&mut self) -> RequestSeq {
        let seq = self.next_seq;
        self.next_seq = seq.next();
        seq
    }

    fn apply(&mut self, event: SessionEvent) -> Result<(), SessionFailure> {
        self.state
            .dispatch(event)
            .map(drop)
            .map_err(|err| self.reject(err))
    }

    fn reject(&self, err: TransitionError) -> SessionFailure {
        warn!("illegal transition: {err}");
        SessionFailure::IllegalTransition(err)
    }

    fn fail(&mut self, err: ServiceError, retry: RetryTarget) -> SessionFailure {
        let failure = SessionFailure::Service(err);
        self.error = Some(failure.clone());
        self.retry = Some(retry);
        failure
    }
}
