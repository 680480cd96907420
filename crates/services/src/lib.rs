#![forbid(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod sessions;
pub mod sources;

pub use quiz_core::Clock;

pub use auth::AuthToken;
pub use config::ApiConfig;
pub use error::{ConfigError, FailureKind, ServiceError, SessionFailure};
pub use http::HttpPracticeApi;

pub use sessions::{
    LoadOutcome, RequestSeq, RetryTarget, SessionController, SessionView, SubmitOutcome,
};
pub use sources::{
    AnswerSink, AnswerSubmission, DEFAULT_REVIEW_COUNT, DateWindow, MistakeFilter, MistakeRecord,
    MistakeSource, NavigationMode, QuestionSource, ReviewSetSource, ScoreboardSink,
    SubmissionReceipt, WordExplanation, WordLookup,
};
