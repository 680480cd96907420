use std::fmt;
use std::sync::Arc;

use quiz_core::model::{FilterCriteria, Question};

use crate::auth::AuthToken;
use crate::error::ServiceError;
use crate::sources::{AnswerSink, AnswerSubmission, QuestionSource, SubmissionReceipt};

/// Tag on every outgoing request; only the newest one may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestSeq(u64);

impl RequestSeq {
    pub(crate) fn first() -> Self {
        Self(1)
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The request behind the error currently on display, so a retry repeats
/// exactly that call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryTarget {
    Load(FilterCriteria),
    Submit,
}

/// A question fetch detached from the controller so it can run without
/// holding a borrow across the await.
pub struct LoadRequest {
    pub(crate) seq: RequestSeq,
    pub(crate) criteria: FilterCriteria,
    pub(crate) source: Arc<dyn QuestionSource>,
}

impl LoadRequest {
    #[must_use]
    pub fn seq(&self) -> RequestSeq {
        self.seq
    }

    #[must_use]
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub async fn run(self, token: &AuthToken) -> LoadResponse {
        let result = match token.require() {
            Ok(_) => self.source.fetch(&self.criteria, token).await,
            Err(err) => Err(err),
        };
        LoadResponse {
            seq: self.seq,
            result,
        }
    }
}

#[derive(Debug)]
pub struct LoadResponse {
    pub(crate) seq: RequestSeq,
    pub(crate) result: Result<Question, ServiceError>,
}

impl LoadResponse {
    #[must_use]
    pub fn seq(&self) -> RequestSeq {
        self.seq
    }
}

/// The combined answer submission, ready to send.
pub struct SubmitRequest {
    pub(crate) seq: RequestSeq,
    pub(crate) submission: AnswerSubmission,
    pub(crate) sink: Arc<dyn AnswerSink>,
}

impl SubmitRequest {
    #[must_use]
    pub fn seq(&self) -> RequestSeq {
        self.seq
    }

    #[must_use]
    pub fn submission(&self) -> &AnswerSubmission {
        &self.submission
    }

    pub async fn run(self, token: &AuthToken) -> SubmitResponse {
        let result = match token.require() {
            Ok(_) => self.sink.submit(&self.submission, token).await,
            Err(err) => Err(err),
        };
        SubmitResponse {
            seq: self.seq,
            submission: self.submission,
            result,
        }
    }
}

#[derive(Debug)]
pub struct SubmitResponse {
    pub(crate) seq: RequestSeq,
    pub(crate) submission: AnswerSubmission,
    pub(crate) result: Result<SubmissionReceipt, ServiceError>,
}

impl SubmitResponse {
    #[must_use]
    pub fn seq(&self) -> RequestSeq {
        self.seq
    }
}
